//! Billbook Web Server
//!
//! Axum-based REST API for the Billbook household bills tracker.
//!
//! - JSON API under `/api` (bills CRUD, paid status, monthly summary, chat)
//! - Optional static file serving for the dashboard bundle
//! - CORS limited to configured origins
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use billbook_core::{AIBackend, BillStore, BillsAssistant};

mod handlers;

/// Maximum accepted JSON request body (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only, "*" = any origin)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub store: BillStore,
    pub config: ServerConfig,
    pub assistant: BillsAssistant,
}

/// Parse a comma-separated origin list (e.g. from `BILLBOOK_ALLOWED_ORIGINS`)
pub fn parse_allowed_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Create the application router
pub fn create_router(store: BillStore, static_dir: Option<&str>, config: ServerConfig) -> Router {
    create_router_with_options(store, static_dir, config, BillsAssistant::from_env())
}

/// Create the application router with an explicit assistant (for testing)
pub fn create_router_with_options(
    store: BillStore,
    static_dir: Option<&str>,
    config: ServerConfig,
    assistant: BillsAssistant,
) -> Router {
    let state = Arc::new(AppState {
        store,
        config: config.clone(),
        assistant,
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/bills",
            get(handlers::list_bills).post(handlers::create_bill),
        )
        .route(
            "/bills/:id",
            get(handlers::get_bill)
                .put(handlers::update_bill)
                .delete(handlers::delete_bill),
        )
        .route("/bills/:id/paid", post(handlers::set_paid_status))
        .route("/summary", get(handlers::get_summary))
        .route("/chat", post(handlers::chat))
        .fallback(handlers::not_found);

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    // Build CORS layer
    let cors = if config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: the dashboard is same-origin only, inline styles allowed
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state);

    // Serve static files if directory provided
    app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.fallback(handlers::not_found),
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    store: BillStore,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    // Surface a corrupt data file at startup rather than on the first request
    let bills = store.list_bills()?;
    info!(
        "Loaded {} bill(s) from {}",
        bills.len(),
        store.path().display()
    );

    check_ai_connection().await;

    let app = create_router(store, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Bills API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log chat backend connection status
async fn check_ai_connection() {
    let assistant = BillsAssistant::from_env();
    match assistant.client() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Chat backend connected: {} at {} (model: {})",
                    client.backend_name(),
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Chat backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  Chat backend not configured (set OPENAI_API_KEY, or AI_BACKEND=ollama with OLLAMA_HOST)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Per-field validation messages, rendered as `{"errors": [...]}`
    errors: Option<Vec<String>>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            errors: None,
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn unavailable(msg: &str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: errors.join("; "),
            errors: Some(errors),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        } else if self.status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(error = %self.message, "Service unavailable");
        }

        let body = match self.errors {
            Some(errors) => Json(serde_json::json!({ "errors": errors })),
            None => Json(serde_json::json!({ "error": self.message })),
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Domain errors map onto specific status codes
        let err = match err.downcast::<billbook_core::Error>() {
            Ok(billbook_core::Error::Validation(errors)) => return Self::validation(errors),
            Ok(billbook_core::Error::InvalidMonth(month)) => {
                return Self::bad_request(&format!("'month' must be in YYYY-MM format (got '{}')", month))
            }
            Ok(billbook_core::Error::NotFound(what)) => return Self::not_found(&what),
            Ok(billbook_core::Error::AiUnavailable(message)) => return Self::unavailable(&message),
            Ok(other) => anyhow::Error::new(other),
            Err(err) => err,
        };

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            errors: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
