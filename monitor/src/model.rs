use serde::{Deserialize, Serialize};

pub const PM_MIN: f64 = 0.0;
pub const CO2_MIN: f64 = 400.0;
pub const HUMIDITY_MIN: f64 = 0.0;
pub const HUMIDITY_MAX: f64 = 100.0;
pub const TEMP_MIN: f64 = 0.0;
pub const TEMP_MAX: f64 = 50.0;
pub const MQ135_MIN: f64 = 0.0;
pub const MQ135_MAX: f64 = 1000.0;
pub const MQ135_PPM_MIN: f64 = 0.1;

/// Current environmental reading exposed to consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub pm10: f64,
    pub pm25: f64,
    pub co2: f64,
    pub humidity: f64,
    pub temperature: f64,
    pub mq135: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mq135_ppm: Option<f64>,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            pm10: 45.0,
            pm25: 32.0,
            co2: 450.0,
            humidity: 55.0,
            temperature: 24.0,
            mq135: 350.0,
            mq135_ppm: Some(1.2),
        }
    }
}

impl SensorSnapshot {
    /// Returns a copy with every field present in `update` overwritten.
    pub fn merged(&self, update: &SnapshotUpdate) -> Self {
        Self {
            pm10: update.pm10.unwrap_or(self.pm10),
            pm25: update.pm25.unwrap_or(self.pm25),
            co2: update.co2.unwrap_or(self.co2),
            humidity: update.humidity.unwrap_or(self.humidity),
            temperature: update.temperature.unwrap_or(self.temperature),
            mq135: update.mq135.unwrap_or(self.mq135),
            mq135_ppm: update.mq135_ppm.or(self.mq135_ppm),
        }
    }
}

/// Partial snapshot; `None` leaves the stored field as it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotUpdate {
    pub pm10: Option<f64>,
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub mq135: Option<f64>,
    pub mq135_ppm: Option<f64>,
}

impl SnapshotUpdate {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of fields this update carries
    pub fn field_count(&self) -> usize {
        [
            self.pm10,
            self.pm25,
            self.co2,
            self.humidity,
            self.temperature,
            self.mq135,
            self.mq135_ppm,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

impl From<SensorSnapshot> for SnapshotUpdate {
    fn from(s: SensorSnapshot) -> Self {
        Self {
            pm10: Some(s.pm10),
            pm25: Some(s.pm25),
            co2: Some(s.co2),
            humidity: Some(s.humidity),
            temperature: Some(s.temperature),
            mq135: Some(s.mq135),
            mq135_ppm: s.mq135_ppm,
        }
    }
}
