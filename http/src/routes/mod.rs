use crate::openapi;
use axum::Router;
use kod_core::Context;
use std::sync::Arc;

pub mod api;
pub mod dashboard;
pub mod not_found;
pub mod trade;

pub fn app(ctx: Arc<Context>) -> Router {
    Router::new()
        .merge(dashboard::router(ctx.clone()))
        .merge(trade::router(ctx.clone()))
        .nest("/api", api::api_router(ctx).merge(openapi::openapi_route()))
        .fallback(not_found::not_found_handler)
}
