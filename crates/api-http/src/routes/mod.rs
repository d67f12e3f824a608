//! Route table
//!
//! Handlers are thin: parse, call one use case, shape the JSON reply.

mod admin;
mod barber;
mod history;
mod queue;

#[cfg(test)]
mod tests;

use crate::state::AppState;
use crate::ws;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Queue ordering
        .route(
            "/queue",
            get(queue::list).post(queue::join).delete(queue::remove),
        )
        .route("/queue/move", patch(queue::move_down))
        .route("/queue/{entry_id}", delete(queue::remove_entry))
        .route("/update-services", patch(queue::update_services))
        // Completion + ratings
        .route("/barber/add-history", post(barber::add_history))
        .route("/barber/rate", post(barber::rate))
        .route("/reset-pending-rating", post(barber::reset_pending_rating))
        .route("/barbers", get(barber::list))
        .route("/barber/{barber_id}", get(barber::profile))
        .route("/history", get(history::all))
        .route("/history/{date}", get(history::on_date))
        // Provisioning
        .route("/shops", get(admin::open_shops))
        .route("/admin/shops", post(admin::create_shop))
        .route("/admin/barbers", post(admin::add_barber))
        .route("/admin/customers", post(admin::create_customer))
        // Live channel
        .route("/ws", get(ws::handle_queue_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": walkin_core::VERSION }))
}
