//! HTTP surface for the utterance parser.
//!
//! `POST /api/parser/parse` and `POST /api/parser/parse-expense` both take
//! `{ "text": "..." }` and answer `{ "success": bool, "message": "...", "data": ... }`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::{Config, ServerConfig};
use crate::extractors::{ExpenseQueryExtractor, Extractor, TripIntentExtractor};
use crate::types::{ExpenseQueryIntent, TripIntent};

/// Request body for both parse endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    /// Utterance to parse.
    pub text: String,
}

/// Response envelope for both parse endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse<T> {
    /// Whether parsing ran.
    pub success: bool,
    /// Human-readable status.
    pub message: String,
    /// The parsed intent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ParseResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            message: "parsed".to_owned(),
            data: Some(data),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            data: None,
        }
    }
}

/// Request errors, rendered as `400` with the failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body missing, not JSON, or without a `text` string.
    #[error("request body must be JSON with a text field")]
    MalformedPayload,

    /// `text` was empty or whitespace.
    #[error("text must not be empty")]
    EmptyText,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ParseResponse::<()>::failure(self.to_string());
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    trip: Arc<TripIntentExtractor>,
    expense: Arc<ExpenseQueryExtractor>,
    fixed_today: Option<NaiveDate>,
}

impl AppState {
    /// State resolving relative dates against the local calendar.
    pub fn new(default_duration_days: u32) -> Self {
        Self {
            trip: Arc::new(TripIntentExtractor::new(default_duration_days)),
            expense: Arc::new(ExpenseQueryExtractor),
            fixed_today: None,
        }
    }

    /// Pin "today" to a fixed date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

fn request_text(payload: Result<Json<ParseRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected parse request");
        ApiError::MalformedPayload
    })?;
    if request.text.trim().is_empty() {
        warn!("rejected parse request with empty text");
        return Err(ApiError::EmptyText);
    }
    Ok(request.text)
}

/// `POST /api/parser/parse`
pub async fn parse_trip_handler(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse<TripIntent>>, ApiError> {
    let text = request_text(payload)?;
    let intent = state.trip.extract(&text, state.today());
    info!(
        extractor = state.trip.name(),
        confidence = %intent.confidence,
        "trip utterance parsed"
    );
    Ok(Json(ParseResponse::ok(intent)))
}

/// `POST /api/parser/parse-expense`
pub async fn parse_expense_handler(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse<ExpenseQueryIntent>>, ApiError> {
    let text = request_text(payload)?;
    let intent = state.expense.extract(&text, state.today());
    info!(
        extractor = state.expense.name(),
        category = ?intent.category,
        start = %intent.start_date,
        end = %intent.end_date,
        "expense query parsed"
    );
    Ok(Json(ParseResponse::ok(intent)))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Build the router with CORS applied.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/api/parser/parse", post(parse_trip_handler))
        .route("/api/parser/parse-expense", post(parse_expense_handler))
        .route("/healthz", get(health_handler))
        .layer(cors_layer(&server.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(origin)
        .max_age(Duration::from_secs(3600))
}

/// Bind and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::new(config.parser.default_duration_days);
    let app = router(state, &config.server);

    let listener = TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "parser service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("parser service failed")?;

    info!("parser service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
