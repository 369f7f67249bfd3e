#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

struct HubState {
    response: Mutex<(StatusCode, String)>,
    delay: Duration,
    hits: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Stand-in for the readings hub serving `/esp32/latest`
pub struct MockHub {
    pub addr: SocketAddr,
    state: Arc<HubState>,
    task: JoinHandle<()>,
}

impl MockHub {
    pub async fn start(status: StatusCode, body: &str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(status: StatusCode, body: &str, delay: Duration) -> Self {
        let state = Arc::new(HubState {
            response: Mutex::new((status, body.to_string())),
            delay,
            hits: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/esp32/latest", get(latest))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, task }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_response(&self, status: StatusCode, body: &str) {
        *self.state.response.lock().unwrap() = (status, body.to_string());
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for MockHub {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn latest(State(hub): State<Arc<HubState>>) -> (StatusCode, String) {
    hub.hits.fetch_add(1, Ordering::SeqCst);
    let now = hub.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    hub.max_in_flight.fetch_max(now, Ordering::SeqCst);

    if !hub.delay.is_zero() {
        tokio::time::sleep(hub.delay).await;
    }

    hub.in_flight.fetch_sub(1, Ordering::SeqCst);
    hub.response.lock().unwrap().clone()
}

pub const FULL_READING: &str = r#"{
    "esp32_001": {
        "device_id": "esp32_001",
        "temperature": 26.4,
        "humidity": 61.2,
        "pm25": 18.3,
        "pm10": 29.9,
        "co2": 702,
        "mq135_raw": 412,
        "mq135_ppm": 2.35
    }
}"#;
