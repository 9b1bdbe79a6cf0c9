use crate::views::dashboard::{self, Dashboard};
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use kod_core::Context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn router(ctx: Arc<Context>) -> Router {
    Router::new().route("/", get(index)).route("/connect", post(connect)).with_state(ctx)
}

#[derive(Debug, Deserialize)]
pub struct ConnectForm {
    pub ws_url: String,
}

async fn index(State(ctx): State<Arc<Context>>) -> Html<String> {
    let status = ctx.status().await;
    let stats = match status.connected {
        true => Some(ctx.load_stats().await.map_err(|e| e.to_string())),
        false => None,
    };
    let endpoint = status.endpoint.clone().unwrap_or_else(|| ctx.config().ws_url.clone());

    Html(dashboard::page(&Dashboard {
        status: &status,
        endpoint: &endpoint,
        stats,
        connect_error: None,
        refresh_secs: ctx.config().stats_refresh_secs,
    }))
}

async fn connect(State(ctx): State<Arc<Context>>, Form(form): Form<ConnectForm>) -> Response {
    let endpoint = form.ws_url.trim();
    match ctx.connect(endpoint).await {
        Ok(chain) => {
            info!("explorer attached to {chain}");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            let status = ctx.status().await;
            let msg = format!("Connection failed: {e}");
            let page = dashboard::page(&Dashboard {
                status: &status,
                endpoint,
                stats: None,
                connect_error: Some(&msg),
                refresh_secs: 0,
            });
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}
