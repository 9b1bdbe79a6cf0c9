use axum::{Router, http::StatusCode, http::header, response::IntoResponse, routing::get};
use tracing::error;
use utoipa::OpenApi;

use crate::models::*;
use crate::routes::api::{chain, trade};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "KOD Trade Explorer API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Read-only API over the KOD trade pallet: chain statistics, trade lookup and local contract decryption.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://127.0.0.1:3000", description = "Local explorer (HTTP_PORT=3000)")
    ),
    paths(
        chain::get_status,
        chain::get_chain_stats,
        trade::get_trade,
        trade::decrypt_trade,
    ),
    components(schemas(
        ErrorResponse,
        NodeStatus,
        StatusResponse,
        Stats,
        ChainStatsResponse,
        Diagnostics,
        TradeInfo,
        TradeResponse,
        DecryptRequest,
        ContractRow,
        ContractSection,
        Contract,
        ContractResponse,
    )),
    tags(
        (name = "chain", description = "Node connection and pallet counters"),
        (name = "trade", description = "Trade lookup and contract decryption")
    )
)]
pub struct ApiDoc;

async fn get_openapi_yaml() -> impl IntoResponse {
    match serde_yaml::to_string(&ApiDoc::openapi()) {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/x-yaml")], yaml),
        Err(e) => {
            error!("failed to generate OpenAPI YAML: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, [(header::CONTENT_TYPE, "text/plain")], String::new())
        }
    }
}

pub fn openapi_route<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/openapi.yaml", get(get_openapi_yaml))
}
