use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{
    required, AddHistoryBody, BarberDto, BarberProfileResponse, CompletionResponse,
    MessageResponse, RateBody, RateResponse, ResetPendingBody, ShopQuery,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use walkin_core::application::{CompleteServiceRequest, SubmitRatingRequest};

/// POST /barber/add-history
pub async fn add_history(
    State(state): State<AppState>,
    body: Result<Json<AddHistoryBody>, JsonRejection>,
) -> ApiResult<Json<CompletionResponse>> {
    let Json(body) = body?;
    let req = CompleteServiceRequest {
        shop_id: required(body.shop_id, "shopId")?,
        customer_ref: body.customer_ref.unwrap_or_default(),
        barber_id: body.barber_id.unwrap_or_default(),
        services: body
            .service
            .map(|s| s.into_split_list())
            .unwrap_or_default(),
        cost: body.cost.ok_or_else(|| ApiError::missing("cost"))?,
    };

    let summary = state.completion.complete_service(req).await?;
    Ok(Json(summary.into()))
}

/// POST /barber/rate
pub async fn rate(
    State(state): State<AppState>,
    body: Result<Json<RateBody>, JsonRejection>,
) -> ApiResult<Json<RateResponse>> {
    let Json(body) = body?;
    let req = SubmitRatingRequest {
        shop_id: required(body.shop_id, "shopId")?,
        customer_ref: body.customer_ref.unwrap_or_default(),
        rating: body.rating.ok_or_else(|| ApiError::missing("rating"))?,
    };

    let outcome = state.completion.submit_rating(req).await?;
    Ok(Json(RateResponse {
        message: "Rating submitted".to_string(),
        barber_id: outcome.barber_id,
        average_rating: outcome.average_rating,
    }))
}

/// POST /reset-pending-rating
pub async fn reset_pending_rating(
    State(state): State<AppState>,
    body: Result<Json<ResetPendingBody>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = body?;
    let customer_ref = required(body.customer_ref, "customerRef")?;

    state.completion.reset_pending_rating(&customer_ref).await?;
    Ok(Json(MessageResponse::new("Pending rating cleared")))
}

/// GET /barbers?shopId=S
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<BarberDto>>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let barbers = state.views.barbers(&shop_id).await?;
    Ok(Json(barbers.into_iter().map(Into::into).collect()))
}

/// GET /barber/{barberId}?shopId=S
pub async fn profile(
    State(state): State<AppState>,
    Path(barber_id): Path<String>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<BarberProfileResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let profile = state.views.barber_profile(&shop_id, &barber_id).await?;
    Ok(Json(profile.into()))
}
