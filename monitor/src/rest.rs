use crate::acquisition::LinkStatus;
use crate::metrics::{gather_metrics, OVERRIDES_TOTAL};
use crate::model::{SensorSnapshot, SnapshotUpdate};
use crate::store::SnapshotStore;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone)]
struct AppState {
    store: SnapshotStore,
    status: watch::Receiver<LinkStatus>,
}

pub fn create_router(store: SnapshotStore, status: watch::Receiver<LinkStatus>) -> Router {
    let state = AppState { store, status };

    Router::new()
        .route("/api/v1/snapshot", get(get_snapshot).post(override_snapshot))
        .route("/api/v1/status", get(get_status))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn get_snapshot(State(state): State<AppState>) -> Json<SensorSnapshot> {
    Json(state.store.snapshot())
}

async fn override_snapshot(
    State(state): State<AppState>,
    Json(update): Json<SnapshotUpdate>,
) -> Json<SensorSnapshot> {
    OVERRIDES_TOTAL.inc();
    info!("Snapshot override with {} fields", update.field_count());
    Json(state.store.update(update))
}

async fn get_status(State(state): State<AppState>) -> Json<LinkStatus> {
    Json(state.status.borrow().clone())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn metrics_handler() -> String {
    gather_metrics()
}
