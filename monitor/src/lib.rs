pub mod acquisition;
pub mod args;
pub mod endpoint;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod reading;
pub mod rest;
pub mod store;
pub mod synthesis;

pub use acquisition::{Acquisition, AcquisitionConfig, AcquisitionHandle, CycleOutcome, LinkStatus};
pub use model::{SensorSnapshot, SnapshotUpdate};
pub use store::SnapshotStore;
