//! `soawatch serve` - HTTP trigger endpoint.

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use soawatch_monitor::Monitor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::Context;
use crate::cli::args::ServeArgs;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    monitor: Arc<Monitor>,
    // One tick at a time, so overlapping triggers never race on a zone
    running: Arc<Mutex<()>>,
}

impl AppState {
    /// Wrap a monitor for serving
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor: Arc::new(monitor),
            running: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

pub async fn execute(ctx: Context, args: ServeArgs) -> Result<()> {
    let listen = args.listen.unwrap_or(ctx.config.server.listen);
    let monitor = ctx.monitor().await?;

    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(addr = %listen, "trigger endpoint listening");

    axum::serve(listener, router(AppState::new(monitor)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("trigger endpoint stopped");
    Ok(())
}

/// `POST /tick` and `GET /health`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tick", post(tick))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn tick(State(state): State<AppState>) -> Response {
    let _running = state.running.lock().await;
    match state.monitor.tick().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!(error = %e, "tick failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "soawatch",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use soawatch_core::{
        ChangeEvent, ChannelTarget, Notifier, ResolverObservation, Result as WatchResult,
        SoaObserver, WatchError, Zone, ZoneCheckRecord,
    };
    use soawatch_monitor::{LocalStore, ZoneStore};
    use tower::ServiceExt;

    struct Unanimous;

    #[async_trait]
    impl SoaObserver for Unanimous {
        fn priority(&self) -> Vec<String> {
            vec!["a".into(), "b".into(), "c".into()]
        }

        async fn observe(&self, _zone: &str) -> Vec<ResolverObservation> {
            let soa: soawatch_core::SoaRecord = "ns1.example.com. hostmaster.example.com. 9 7200 3600 1209600 300"
                .parse()
                .unwrap();
            ["a", "b", "c"]
                .into_iter()
                .map(|name| ResolverObservation::success(name, soa.clone()))
                .collect()
        }

        async fn nameservers(&self, _zone: &str) -> Vec<String> {
            Vec::new()
        }
    }

    struct Silent;

    #[async_trait]
    impl Notifier for Silent {
        async fn deliver(&self, _target: &ChannelTarget, _event: &ChangeEvent) -> WatchResult<()> {
            Ok(())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ZoneStore for Unreachable {
        async fn due_zones(&self, _now: DateTime<Utc>) -> WatchResult<Vec<Zone>> {
            Err(WatchError::Config("store credentials missing".into()))
        }
        async fn schedule(
            &self,
            _zone_id: &str,
            _last_checked: DateTime<Utc>,
            _next_check_at: DateTime<Utc>,
        ) -> WatchResult<()> {
            Ok(())
        }
        async fn set_last_known_serial(&self, _zone_id: &str, _serial: u32) -> WatchResult<()> {
            Ok(())
        }
        async fn append_check(&self, _record: &ZoneCheckRecord) -> WatchResult<()> {
            Ok(())
        }
        async fn recent_changes(
            &self,
            _zone_id: &str,
            _since: DateTime<Utc>,
        ) -> WatchResult<Vec<ZoneCheckRecord>> {
            Ok(Vec::new())
        }
        async fn last_observed(&self, _zone_id: &str) -> WatchResult<Option<ZoneCheckRecord>> {
            Ok(None)
        }
        async fn channels(&self, _owner_id: &str) -> WatchResult<Vec<ChannelTarget>> {
            Ok(Vec::new())
        }
    }

    fn app(store: Arc<dyn ZoneStore>) -> Router {
        let monitor = Monitor::builder(store, Arc::new(Unanimous), Arc::new(Silent)).build();
        router(AppState::new(monitor))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn tick_returns_summary() {
        let store = Arc::new(LocalStore::in_memory());
        store.add_zone(Zone::new("z1", "example.com", "u1", 30)).await.unwrap();

        let response = app(store)
            .oneshot(Request::post("/tick").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["zonesChecked"], 1);
        assert_eq!(body["results"][0]["zoneId"], "z1");
        assert_eq!(body["results"][0]["serial"], 9);
        assert_eq!(body["results"][0]["status"], "baseline");
    }

    #[tokio::test]
    async fn tick_failure_is_500() {
        let response = app(Arc::new(Unreachable))
            .oneshot(Request::post("/tick").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("store credentials"));
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = app(Arc::new(LocalStore::in_memory()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "soawatch");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
