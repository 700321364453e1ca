//! HTTP surface: `GET /aggregate?account=...` and `GET /ping`

use crate::core::{AggregationError, Aggregator, Transaction};
use crate::providers::PingClient;
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub ping: Arc<PingClient>,
}

#[derive(Debug, Deserialize)]
pub struct AggregateQuery {
    pub account: String,
}

impl IntoResponse for AggregationError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            // Upstream exhaustion is signalled by the status alone.
            AggregationError::RateLimited | AggregationError::Unavailable => status.into_response(),
            AggregationError::Validation(message) | AggregationError::Internal(message) => {
                (status, message).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/aggregate", get(aggregate))
        .route("/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn aggregate(
    State(state): State<AppState>,
    Query(query): Query<AggregateQuery>,
) -> Result<Json<Vec<Transaction>>, AggregationError> {
    let transactions = state.aggregator.aggregate(&query.account).await?;
    Ok(Json(transactions))
}

async fn ping(State(state): State<AppState>) -> Result<String, (StatusCode, String)> {
    state.ping.ping().await.map_err(|e| {
        warn!(error = %e, "Ping failed");
        (StatusCode::SERVICE_UNAVAILABLE, format!("{e:#}"))
    })
}

/// Serves until Ctrl-C.
pub async fn run(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Server error")
}
