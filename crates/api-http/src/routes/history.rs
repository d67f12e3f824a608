use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{required, HistoryResponse, ShopQuery};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use walkin_core::application::parse_history_date;

/// GET /history?shopId=S
pub async fn all(
    State(state): State<AppState>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let records = state.views.shop_history(&shop_id, None).await?;
    Ok(Json(records.into()))
}

/// GET /history/{date}?shopId=S, date as YYYY-MM-DD (UTC)
pub async fn on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;
    let day = parse_history_date(&date)?;

    let records = state.views.shop_history(&shop_id, Some(day)).await?;
    Ok(Json(records.into()))
}
