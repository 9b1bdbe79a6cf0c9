use crate::utils::parse_trade_id;
use crate::views::trade::{self, TradePage};
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use kod_core::Context;
use kod_core::context::Error;
use serde::Deserialize;
use std::sync::Arc;

pub fn router(ctx: Arc<Context>) -> Router {
    Router::new().route("/trade", get(lookup)).route("/trade/{id}/decrypt", post(decrypt)).with_state(ctx)
}

#[derive(Debug, Deserialize)]
pub struct TradeQuery {
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct DecryptForm {
    pub phrase: String,
}

fn lookup_status(e: &Error) -> StatusCode {
    match e {
        Error::TradeNotFound(_) => StatusCode::NOT_FOUND,
        Error::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    }
}

async fn lookup(State(ctx): State<Arc<Context>>, Query(q): Query<TradeQuery>) -> Response {
    let input = q.id.unwrap_or_default();
    if input.trim().is_empty() {
        return Redirect::to("/").into_response();
    }

    let status = ctx.status().await;
    let (code, lookup) = match parse_trade_id(&input) {
        None => (StatusCode::BAD_REQUEST, Err(format!("Invalid trade ID: {}", input.trim()))),
        Some(id) => match ctx.query_trade(id).await {
            Ok(found) => (StatusCode::OK, Ok(found)),
            Err(e) => (lookup_status(&e), Err(e.to_string())),
        },
    };

    let page = trade::page(&TradePage {
        status: &status,
        query: input.trim(),
        lookup,
        decrypt: None,
        ss58_prefix: ctx.config().ss58_prefix,
    });
    (code, Html(page)).into_response()
}

async fn decrypt(State(ctx): State<Arc<Context>>, Path(id): Path<u64>, Form(form): Form<DecryptForm>) -> Response {
    let status = ctx.status().await;
    // bound to the id in the url, a bad phrase fails before any storage read
    let outcome = ctx.decrypt_trade(id, &form.phrase).await.map_err(|e| e.to_string());

    let (code, lookup, decrypt) = match ctx.query_trade(id).await {
        Ok(found) => (StatusCode::OK, Ok(found), Some(outcome)),
        Err(e) => (lookup_status(&e), Err(e.to_string()), None),
    };

    let page = trade::page(&TradePage {
        status: &status,
        query: &id.to_string(),
        lookup,
        decrypt,
        ss58_prefix: ctx.config().ss58_prefix,
    });
    (code, Html(page)).into_response()
}
