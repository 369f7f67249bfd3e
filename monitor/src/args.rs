use crate::acquisition::{AcquisitionConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "monitor", about = "Keeps a live air-quality snapshot from the ESP32 hub")]
pub struct Args {
    /// Base address of the readings hub, tried before the local fallbacks
    #[arg(long, env = "API_BASE")]
    pub api_base: Option<String>,

    #[arg(long, env = "HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub http_addr: String,

    #[arg(
        long,
        env = "POLL_INTERVAL_MS",
        default_value_t = DEFAULT_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_ms: u64,

    #[arg(
        long,
        env = "FETCH_TIMEOUT_MS",
        default_value_t = DEFAULT_FETCH_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_ms: u64,
}

impl Args {
    pub fn acquisition_config(&self) -> AcquisitionConfig {
        AcquisitionConfig::new(self.api_base.as_deref())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_fetch_timeout(Duration::from_millis(self.fetch_timeout_ms))
    }
}
