use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{
    required, JoinQueueBody, MessageResponse, MoveDownBody, QueueEntryDto, QueueListResponse,
    RemoveQuery, RemoveResponse, ShopQuery, UpdateServicesBody, UpdateServicesResponse,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use walkin_core::application::{InsertRequest, UpdateServicesRequest};

/// GET /queue?shopId=S
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<QueueListResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let snapshot = state.queue.list_sorted(&shop_id).await?;
    let data: Vec<QueueEntryDto> = snapshot.into_entries().into_iter().map(Into::into).collect();

    Ok(Json(QueueListResponse {
        queue_length: data.len(),
        data,
    }))
}

/// POST /queue
pub async fn join(
    State(state): State<AppState>,
    body: Result<Json<JoinQueueBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<QueueEntryDto>)> {
    let Json(body) = body?;
    let req = InsertRequest {
        shop_id: required(body.shop_id, "shopId")?,
        name: body.name.unwrap_or_default(),
        customer_ref: body.customer_ref.filter(|r| !r.trim().is_empty()),
        services: body.services.map(|s| s.into_list()).unwrap_or_default(),
        code: body.code.filter(|c| !c.trim().is_empty()),
        total_cost: body.total_cost,
    };

    let entry = state.queue.insert(req).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// PATCH /queue/move
pub async fn move_down(
    State(state): State<AppState>,
    body: Result<Json<MoveDownBody>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = body?;
    let shop_id = required(body.shop_id, "shopId")?;
    let entry_id = required(body.id, "id")?;

    state.queue.move_down(&shop_id, &entry_id).await?;
    Ok(Json(MessageResponse::new("Item moved down")))
}

/// PATCH /update-services
pub async fn update_services(
    State(state): State<AppState>,
    body: Result<Json<UpdateServicesBody>, JsonRejection>,
) -> ApiResult<Json<UpdateServicesResponse>> {
    let Json(body) = body?;
    let req = UpdateServicesRequest {
        shop_id: required(body.shop_id, "shopId")?,
        customer_ref: required(body.customer_ref, "customerRef")?,
        services: body
            .services
            .ok_or_else(|| ApiError::missing("services"))?,
        total_cost: body
            .total_cost
            .ok_or_else(|| ApiError::missing("totalCost"))?,
    };

    let entry = state.queue.update_services(req).await?;
    Ok(Json(UpdateServicesResponse {
        message: "Services updated".to_string(),
        updated_entry: entry.into(),
    }))
}

/// DELETE /queue?shopId=S[&uid=U]
///
/// With `uid` the customer's entry is removed, otherwise the head is served.
pub async fn remove(
    State(state): State<AppState>,
    query: Result<Query<RemoveQuery>, QueryRejection>,
) -> ApiResult<Json<RemoveResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let response = match query.uid.filter(|u| !u.trim().is_empty()) {
        Some(uid) => {
            let removed = state.queue.remove_by_customer(&shop_id, &uid).await?;
            RemoveResponse {
                message: "Customer removed from queue".to_string(),
                removed: Some(removed.into()),
            }
        }
        None => match state.queue.remove_head(&shop_id).await? {
            Some(removed) => RemoveResponse {
                message: "Customer served".to_string(),
                removed: Some(removed.into()),
            },
            None => RemoveResponse {
                message: "Queue is empty".to_string(),
                removed: None,
            },
        },
    };

    Ok(Json(response))
}

/// DELETE /queue/{entryId}?shopId=S
pub async fn remove_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    query: Result<Query<ShopQuery>, QueryRejection>,
) -> ApiResult<Json<RemoveResponse>> {
    let Query(query) = query?;
    let shop_id = required(query.shop_id, "shopId")?;

    let removed = state.queue.remove_by_id(&shop_id, &entry_id).await?;
    Ok(Json(RemoveResponse {
        message: "Entry removed from queue".to_string(),
        removed: Some(removed.into()),
    }))
}
