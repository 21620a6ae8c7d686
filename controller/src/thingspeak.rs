use serde::Deserialize;
use serde_json::Value;

use heatbot_common::{SensorReading, ThingSpeakConfig};

use crate::error::ThingSpeakError;

const THINGSPEAK_BASE: &str = "https://api.thingspeak.com";

/// Last entry of a channel feed. ThingSpeak sends field values as strings.
#[derive(Debug, Default, Deserialize)]
pub struct FeedEntry {
    #[serde(default)]
    pub entry_id: Option<u64>,
    #[serde(default)]
    pub field1: Option<Value>,
    #[serde(default)]
    pub field2: Option<Value>,
    #[serde(default)]
    pub field3: Option<Value>,
}

impl FeedEntry {
    pub fn to_reading(&self) -> SensorReading {
        SensorReading {
            temperature: self.field1.as_ref().and_then(lenient_number),
            humidity: self.field2.as_ref().and_then(lenient_number),
            gas_level: self.field3.as_ref().and_then(lenient_number),
        }
    }
}

/// Accepts numbers and numeric strings; everything else counts as absent.
pub fn lenient_number(value: &Value) -> Option<f32> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let number = number as f32;
    number.is_finite().then_some(number)
}

#[derive(Clone)]
pub struct ThingSpeakClient {
    http: reqwest::Client,
    config: ThingSpeakConfig,
}

impl ThingSpeakClient {
    pub fn new(http: reqwest::Client, config: ThingSpeakConfig) -> Self {
        Self { http, config }
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.config.poll_interval_ms
    }

    pub async fn last_entry(&self) -> Result<FeedEntry, ThingSpeakError> {
        let url = format!(
            "{THINGSPEAK_BASE}/channels/{}/feeds/last.json",
            self.config.channel_id
        );
        let mut request = self.http.get(url);
        if !self.config.read_api_key.is_empty() {
            request = request.query(&[("api_key", self.config.read_api_key.as_str())]);
        }

        Ok(request.send().await?.error_for_status()?.json().await?)
    }
}
