use crate::endpoint::{latest_url, resolve_api_base};
use crate::errors::{Error, Result};
use crate::metrics::{
    CYCLES_TOTAL, FETCH_FAILURES_TOTAL, FETCH_LATENCY_SECONDS, REMOTE_UPDATES_TOTAL,
    SYNTHESIZED_TOTAL,
};
use crate::reading::{parse_latest, select_device, DeviceReading};
use crate::store::SnapshotStore;
use crate::synthesis::synthesize;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2500;

/// Shortest cadence the loop accepts; `tokio::time::interval` rejects zero
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Resolved base address, fixed for the lifetime of the loop
    pub api_base: String,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
}

impl AcquisitionConfig {
    pub fn new(override_base: Option<&str>) -> Self {
        Self {
            api_base: resolve_api_base(override_base),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    /// Sets the cadence, raised to [`MIN_POLL_INTERVAL`] if shorter.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Unknown,
    Connected,
    Disconnected,
}

/// State of the link to the remote endpoint, as seen by the last cycles
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    pub state: LinkState,
    pub base_url: String,
    pub last_device: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u64,
    pub last_error: Option<String>,
}

impl LinkStatus {
    fn new(base_url: String) -> Self {
        Self {
            state: LinkState::Unknown,
            base_url,
            last_device: None,
            last_success: None,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A remote reading was merged; `fields` counts the fields it carried
    Remote { device_id: String, fields: usize },
    /// The fetch failed and the snapshot was synthesized
    Synthesized { kind: &'static str },
}

/// Periodically refreshes a [`SnapshotStore`] from the remote endpoint,
/// synthesizing the next snapshot whenever the fetch fails.
pub struct Acquisition {
    client: reqwest::Client,
    latest_url: String,
    poll_interval: Duration,
    store: SnapshotStore,
    status: watch::Sender<LinkStatus>,
}

impl Acquisition {
    pub fn new(config: &AcquisitionConfig, store: SnapshotStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        let (status, _rx) = watch::channel(LinkStatus::new(config.api_base.clone()));

        Ok(Self {
            client,
            latest_url: latest_url(&config.api_base),
            poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
            store,
            status,
        })
    }

    pub fn latest_url(&self) -> &str {
        &self.latest_url
    }

    pub fn status(&self) -> watch::Receiver<LinkStatus> {
        self.status.subscribe()
    }

    /// Runs one cycle: fetch and merge, or synthesize on any failure.
    /// Errors never leave this function.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let start = Instant::now();
        let fetched = self.fetch_reading().await;
        FETCH_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());

        let outcome = match fetched {
            Ok(reading) => self.apply_reading(reading),
            Err(e) => self.apply_synthesis(e),
        };
        CYCLES_TOTAL.inc();
        outcome
    }

    async fn fetch_reading(&self) -> Result<DeviceReading> {
        let response = self.client.get(&self.latest_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = response.bytes().await?;
        select_device(parse_latest(&body)?)
    }

    fn apply_reading(&self, reading: DeviceReading) -> CycleOutcome {
        let update = reading.to_update();
        let fields = update.field_count();
        self.store.update(update);
        REMOTE_UPDATES_TOTAL.inc();

        debug!(
            "Applied reading from {} ({} of 7 fields)",
            reading.device_id, fields
        );

        self.status.send_modify(|s| {
            s.state = LinkState::Connected;
            s.last_device = Some(reading.device_id.clone());
            s.last_success = Some(Utc::now());
            s.consecutive_failures = 0;
            s.last_error = None;
        });

        CycleOutcome::Remote {
            device_id: reading.device_id,
            fields,
        }
    }

    fn apply_synthesis(&self, e: Error) -> CycleOutcome {
        let kind = e.kind();
        warn!(
            "Fetch from {} failed ({}): {}. Synthesizing snapshot",
            self.latest_url, kind, e
        );
        FETCH_FAILURES_TOTAL.with_label_values(&[kind]).inc();

        self.store
            .update_with(|prev| synthesize(&mut rand::thread_rng(), prev).into());
        SYNTHESIZED_TOTAL.inc();

        self.status.send_modify(|s| {
            s.state = LinkState::Disconnected;
            s.consecutive_failures += 1;
            s.last_error = Some(e.to_string());
        });

        CycleOutcome::Synthesized { kind }
    }

    /// Starts the loop on the current runtime.
    ///
    /// The first cycle runs immediately. Cycles never overlap: a tick that
    /// comes due while a cycle is in flight is skipped.
    pub fn spawn(self) -> AcquisitionHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let status = self.status();

        let task = tokio::spawn(async move {
            info!(
                "Starting acquisition loop: url={}, interval={:?}",
                self.latest_url, self.poll_interval
            );

            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                }

                // Dropping the in-flight cycle on shutdown also drops its
                // pending write.
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = self.run_cycle() => {}
                }
            }

            info!("Acquisition loop stopped");
        });

        AcquisitionHandle {
            shutdown: Some(shutdown_tx),
            task,
            status,
        }
    }
}

/// Owner of a running acquisition loop. Dropping it stops the loop.
pub struct AcquisitionHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    status: watch::Receiver<LinkStatus>,
}

impl AcquisitionHandle {
    pub fn status(&self) -> watch::Receiver<LinkStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop, cancelling any pending tick and in-flight fetch,
    /// and waits for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            error!("Acquisition task ended abnormally: {}", e);
        }
    }
}

impl Drop for AcquisitionHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
