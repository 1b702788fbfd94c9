use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::database::store::RecordStore;
use crate::error::BotError;
use crate::poll::LifecycleStage;
use crate::services::shutdown::Shutdown;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub stage: String,
    pub store: StoreHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: String,
}

#[derive(Clone)]
pub struct AppState {
    pub stage: watch::Receiver<LifecycleStage>,
    pub store: Arc<dyn RecordStore>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(stage: watch::Receiver<LifecycleStage>, store: Arc<dyn RecordStore>) -> Self {
        let state = AppState {
            stage,
            store,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state);

        Self { router }
    }

    /// Claims the health port, if one is configured. Called before anything is posted to the chat.
    pub async fn bind(port: Option<u16>) -> Result<Option<TcpListener>, BotError> {
        let Some(port) = port else {
            return Ok(None);
        };

        let listener = TcpListener::bind(("0.0.0.0", port))
            .await
            .map_err(|e| BotError::config(format!("Failed to bind HTTP_PORT {port}: {e}")))?;
        Ok(Some(listener))
    }

    /// Serves until the shutdown signal is set.
    pub async fn serve(self, listener: TcpListener, shutdown: Shutdown) {
        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
            })
            .await;

        if let Err(e) = result {
            tracing::error!("Health server error: {}", e);
        }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let stage = *state.stage.borrow();
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let healthy = stage != LifecycleStage::Aborted;
    let health_response = HealthResponse {
        status: if healthy { "healthy".to_string() } else { "unhealthy".to_string() },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stage: stage.to_string(),
        store: StoreHealth {
            status: if state.store.is_available() { "available".to_string() } else { "disabled".to_string() },
        },
        uptime_seconds: uptime,
    };

    if healthy {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    // Ready once the poll is posted and collecting votes
    if state.stage.borrow().is_live() {
        Ok(Json("ready"))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
