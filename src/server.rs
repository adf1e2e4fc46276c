//! HTTP surface
//!
//! `GET /` serves the home view, the two update endpoints trigger refreshes,
//! everything else gets the not-found view with a 404.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::cache::ViewKey;
use crate::error::{Error, Result};
use crate::refresh::{Partition, Refreshers};
use crate::site::Site;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub refreshers: Arc<Refreshers>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route(
            "/updatePending",
            get(update_pending).post(update_pending),
        )
        .route(
            "/updateResponded",
            get(update_responded).post(update_responded),
        )
        .fallback(not_found)
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Response {
    match state.site.serve(ViewKey::Home) {
        Ok(bytes) => html(StatusCode::OK, bytes),
        Err(err) => error_response(err),
    }
}

async fn not_found(State(state): State<AppState>) -> Response {
    match state.site.serve(ViewKey::NotFound) {
        Ok(bytes) => html(StatusCode::NOT_FOUND, bytes),
        Err(err) => error_response(err),
    }
}

async fn update_pending(State(state): State<AppState>) -> Response {
    refresh(&state, Partition::Pending).await
}

async fn update_responded(State(state): State<AppState>) -> Response {
    refresh(&state, Partition::Responded).await
}

async fn refresh(state: &AppState, partition: Partition) -> Response {
    match state.refreshers.get(partition).run().await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(err) => error_response(err),
    }
}

fn html(status: StatusCode, bytes: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        bytes,
    )
        .into_response()
}

fn error_response(err: Error) -> Response {
    let status = if err.is_storage() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    log::error!("{}: {}", status, err);
    (status, err.to_string()).into_response()
}
