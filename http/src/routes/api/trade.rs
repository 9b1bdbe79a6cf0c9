use crate::models::*;
use crate::routes::api::error_status;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kod_core::Context;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/trade/{id}",
    summary = "Get trade by id",
    description = "Looks up an escrow trade with its status, parties, amounts and diagnostics summary.",
    responses(
        (status = 200, description = "Trade found", body = TradeResponse),
        (status = 404, description = "Trade not found", body = ErrorResponse),
        (status = 503, description = "Not connected to a node", body = ErrorResponse)
    ),
    params(
        ("id" = u64, Path, description = "Trade id", example = 1)
    ),
    tag = "trade"
)]
pub async fn get_trade(State(ctx): State<Arc<Context>>, Path(id): Path<u64>) -> (StatusCode, Json<TradeResponse>) {
    match ctx.query_trade(id).await {
        Ok(lookup) => (StatusCode::OK, Json(TradeResponse::ok(TradeInfo::new(&lookup, ctx.config().ss58_prefix)))),
        Err(e) => (error_status(&e), Json(TradeResponse::error(&e.to_string()))),
    }
}

#[utoipa::path(
    post,
    path = "/api/trade/{id}/decrypt",
    summary = "Decrypt a trade contract",
    description = "Derives the party keys from a 12-word recovery phrase inside this process and opens the trade's encrypted contract. The phrase is never sent to the node.",
    request_body = DecryptRequest,
    responses(
        (status = 200, description = "Contract decrypted", body = ContractResponse),
        (status = 400, description = "Malformed recovery phrase", body = ErrorResponse),
        (status = 403, description = "Phrase does not belong to a party of this trade", body = ErrorResponse),
        (status = 404, description = "Trade or encrypted contract not found", body = ErrorResponse),
        (status = 422, description = "Stored contract is malformed or tampered", body = ErrorResponse)
    ),
    params(
        ("id" = u64, Path, description = "Trade id", example = 1)
    ),
    tag = "trade"
)]
pub async fn decrypt_trade(
    State(ctx): State<Arc<Context>>,
    Path(id): Path<u64>,
    Json(req): Json<DecryptRequest>,
) -> (StatusCode, Json<ContractResponse>) {
    match ctx.decrypt_trade(id, &req.phrase).await {
        Ok(decrypted) => (StatusCode::OK, Json(ContractResponse::ok(decrypted.into()))),
        Err(e) => (error_status(&e), Json(ContractResponse::error(&e.to_string()))),
    }
}
