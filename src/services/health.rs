//! HTTP health endpoints.
//!
//! `/health` reports store reachability, the number of active registrations
//! and, when this process runs the notifier, the outcome of its latest pass.
//! `/health/ready` answers 503 until the store can be queried.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::models::Registration;
use crate::services::notifier::{LastPass, Notifier};
use crate::utils::datetime::{format_timestamp, timestamp_now};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub checked_at: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreHealth,
    /// Absent when the notifier runs in another process
    pub notifier: Option<NotifierHealth>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreHealth {
    pub reachable: bool,
    pub pool_size: u32,
    pub response_time_ms: u64,
    pub active_registrations: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifierHealth {
    pub last_pass_at: Option<String>,
    pub restaurants_checked: usize,
    pub users_notified: usize,
    pub failures: usize,
}

impl NotifierHealth {
    fn from_last_pass(last: Option<LastPass>) -> Self {
        match last {
            Some(LastPass { finished_at, report }) => Self {
                last_pass_at: Some(format_timestamp(&finished_at)),
                restaurants_checked: report.restaurants_checked,
                users_notified: report.users_notified,
                failures: report.lookup_failures + report.delivery_failures + report.store_failures,
            },
            None => Self {
                last_pass_at: None,
                restaurants_checked: 0,
                users_notified: 0,
                failures: 0,
            },
        }
    }
}

#[derive(Clone)]
struct HealthState {
    db: Arc<DatabaseManager>,
    notifier: Option<Notifier>,
    started: Instant,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>, notifier: Option<Notifier>) -> Self {
        let state = HealthState {
            db,
            notifier,
            started: Instant::now(),
        };

        let router = Router::new()
            .route("/health", get(health))
            .route("/health/ready", get(ready))
            .route("/health/live", get(|| async { Json("alive") }))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let probe = Instant::now();
    // Counting doubles as the connectivity probe
    let active_registrations = match Registration::count_active(&state.db.pool).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("Health probe failed: {}", e);
            None
        }
    };
    let reachable = active_registrations.is_some();

    let report = HealthReport {
        status: if reachable { "healthy" } else { "unhealthy" }.to_string(),
        checked_at: timestamp_now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        store: StoreHealth {
            reachable,
            pool_size: state.db.pool.size(),
            response_time_ms: probe.elapsed().as_millis() as u64,
            active_registrations,
        },
        notifier: state
            .notifier
            .as_ref()
            .map(|n| NotifierHealth::from_last_pass(n.last_pass())),
    };

    let code = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

async fn ready(State(state): State<HealthState>) -> Result<Json<&'static str>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(&state.db.pool)
        .await
        .map(|_| Json("ready"))
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}
