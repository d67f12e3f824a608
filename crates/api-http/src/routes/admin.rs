use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{
    AddBarberBody, BarberDto, CreateCustomerBody, CreateShopBody, CustomerDto, ShopDto,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// POST /admin/shops
pub async fn create_shop(
    State(state): State<AppState>,
    body: Result<Json<CreateShopBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ShopDto>)> {
    let Json(body) = body?;
    let shop = state
        .provisioning
        .create_shop(&body.name.unwrap_or_default(), body.trial_days)
        .await?;
    Ok((StatusCode::CREATED, Json(shop.into())))
}

/// POST /admin/barbers
pub async fn add_barber(
    State(state): State<AppState>,
    body: Result<Json<AddBarberBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BarberDto>)> {
    let Json(body) = body?;
    let barber = state
        .provisioning
        .add_barber(
            &body.shop_id.unwrap_or_default(),
            &body.name.unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(barber.into())))
}

/// POST /admin/customers
pub async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CreateCustomerBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CustomerDto>)> {
    let Json(body) = body?;
    let customer = state
        .provisioning
        .create_customer(&body.name.unwrap_or_default())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerDto {
            id: customer.id,
            name: customer.name,
            has_pending_rating: customer.pending_rating.is_some(),
        }),
    ))
}

/// GET /shops, shops whose trial has not been marked expired
pub async fn open_shops(State(state): State<AppState>) -> ApiResult<Json<Vec<ShopDto>>> {
    let shops = state.views.open_shops().await?;
    Ok(Json(shops.into_iter().map(Into::into).collect()))
}
