use crate::errors::{Error, Result};
use crate::model::SnapshotUpdate;
use serde_json::{Map, Value};

/// One device's record from the latest-readings response
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReading {
    pub device_id: String,
    pub record: Map<String, Value>,
}

impl DeviceReading {
    /// Snapshot fields carried by this reading.
    ///
    /// A field is taken only when it is present and numeric; anything else
    /// is left out so the stored value survives.
    pub fn to_update(&self) -> SnapshotUpdate {
        SnapshotUpdate {
            pm10: self.number("pm10"),
            pm25: self.number("pm25"),
            co2: self.number("co2"),
            humidity: self.number("humidity"),
            temperature: self.number("temperature"),
            mq135: self.number("mq135_raw"),
            mq135_ppm: self.number("mq135_ppm"),
        }
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.record
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

/// Parses a response body into the device-id → record mapping
pub fn parse_latest(body: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Schema(format!(
            "expected an object of device readings, got {}",
            value_kind(&other)
        ))),
    }
}

/// Takes the first device in document order.
///
/// No recency or priority ordering is applied between devices.
pub fn select_device(devices: Map<String, Value>) -> Result<DeviceReading> {
    let (device_id, record) = devices.into_iter().next().ok_or(Error::NoDeviceData)?;

    match record {
        Value::Object(record) => Ok(DeviceReading { device_id, record }),
        other => Err(Error::Schema(format!(
            "reading for {} is {}, not an object",
            device_id,
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
