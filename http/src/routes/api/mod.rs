use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use kod_core::Context;
use kod_core::context::Error;
use kod_core::decrypt::Error as DecryptError;
use serde_json::Value;
use std::sync::Arc;

pub mod chain;
pub mod trade;

pub fn api_router(ctx: Arc<Context>) -> Router {
    Router::new()
        .route("/chain/status", get(chain::get_status))
        .route("/chain/stats", get(chain::get_chain_stats))
        .route("/trade/{id}", get(trade::get_trade))
        .route("/trade/{id}/decrypt", post(trade::decrypt_trade))
        .route("/metrics", get(api_metrics))
        .route("/metrics/prometheus", get(prometheus_metrics))
        .with_state(ctx)
}

async fn api_metrics(State(ctx): State<Arc<Context>>) -> Json<Value> {
    Json(ctx.get_json_metrics())
}

async fn prometheus_metrics(State(ctx): State<Arc<Context>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], ctx.get_prometheus_metrics())
}

/// HTTP status for an explorer failure, the message goes in the body
pub(crate) fn error_status(e: &Error) -> StatusCode {
    match e {
        Error::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
        Error::TradeNotFound(_) => StatusCode::NOT_FOUND,
        Error::Rpc(_) | Error::Storage(_) => StatusCode::BAD_GATEWAY,
        Error::Decrypt(d) => match d {
            DecryptError::EmptyPhrase | DecryptError::WrongWordCount(_) | DecryptError::InvalidMnemonic => {
                StatusCode::BAD_REQUEST
            }
            DecryptError::NoEncryptedContract => StatusCode::NOT_FOUND,
            DecryptError::NotAParty | DecryptError::UnwrapFailed => StatusCode::FORBIDDEN,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
    }
}
