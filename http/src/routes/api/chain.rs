use crate::models::*;
use crate::routes::api::error_status;
use axum::{Json, extract::State, http::StatusCode};
use kod_core::Context;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/chain/status",
    summary = "Get node connection status",
    description = "Reports whether the explorer is attached to a node, the chain name and the latest imported block.",
    responses(
        (status = 200, description = "Connection status", body = StatusResponse)
    ),
    tag = "chain"
)]
pub async fn get_status(State(ctx): State<Arc<Context>>) -> Json<StatusResponse> {
    Json(StatusResponse::ok(ctx.status().await.into()))
}

#[utoipa::path(
    get,
    path = "/api/chain/stats",
    summary = "Get trade statistics",
    description = "Reads the trade pallet counters: trades opened, trades completed, total volume and listings created.",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ChainStatsResponse),
        (status = 503, description = "Not connected to a node", body = ErrorResponse),
        (status = 502, description = "Node request failed", body = ErrorResponse)
    ),
    tag = "chain"
)]
pub async fn get_chain_stats(State(ctx): State<Arc<Context>>) -> (StatusCode, Json<ChainStatsResponse>) {
    match ctx.load_stats().await {
        Ok(stats) => (StatusCode::OK, Json(ChainStatsResponse::ok(Stats::from(&stats)))),
        Err(e) => (error_status(&e), Json(ChainStatsResponse::error(&e.to_string()))),
    }
}
