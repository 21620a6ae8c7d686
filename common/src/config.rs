use serde::{Deserialize, Serialize};

pub const MIN_DESIRED_TEMP_C: i32 = 16;
pub const MAX_DESIRED_TEMP_C: i32 = 36;
pub const DEFAULT_DESIRED_TEMP_C: i32 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub start_enabled: bool,
    pub gas_alert_threshold: f32,
    pub forward_readings: bool,
    pub state_publish_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            start_enabled: true,
            gas_alert_threshold: 70.0,
            forward_readings: true,
            state_publish_interval_ms: 10_000,
        }
    }
}

impl ControllerConfig {
    pub fn sanitize(&mut self) {
        self.gas_alert_threshold = self.gas_alert_threshold.clamp(0.0, 100.0);
        self.state_publish_interval_ms = self.state_publish_interval_ms.max(1_000);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSettings {
    #[serde(rename = "desiredTemp")]
    pub desired_temp_c: i32,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            desired_temp_c: DEFAULT_DESIRED_TEMP_C,
        }
    }
}

impl PersistedSettings {
    pub fn sanitize(&mut self) {
        self.desired_temp_c = clamp_desired(self.desired_temp_c);
    }
}

pub fn clamp_desired(value: i32) -> i32 {
    value.clamp(MIN_DESIRED_TEMP_C, MAX_DESIRED_TEMP_C)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub http_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "127.0.0.1".to_string(),
            mqtt_port: 1883,
            mqtt_user: String::new(),
            mqtt_pass: String::new(),
            http_port: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub webhook_secret: Option<String>,
    pub api_base: Option<String>,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub city: String,
    pub forecast_days: u8,
    pub model_path: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            city: "Almaty".to_string(),
            forecast_days: 5,
            model_path: None,
        }
    }
}

impl WeatherConfig {
    pub fn sanitize(&mut self) {
        self.forecast_days = self.forecast_days.clamp(1, 5);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingSpeakConfig {
    pub channel_id: String,
    #[serde(default)]
    pub read_api_key: String,
    #[serde(default = "default_thingspeak_poll_ms")]
    pub poll_interval_ms: u64,
}

fn default_thingspeak_poll_ms() -> u64 {
    60_000
}

impl ThingSpeakConfig {
    pub fn sanitize(&mut self) {
        self.poll_interval_ms = self.poll_interval_ms.max(15_000);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub controller: ControllerConfig,
    pub timezone: String,
    pub http_timeout_ms: u64,
    pub network: NetworkConfig,
    pub telegram: TelegramConfig,
    pub weather: WeatherConfig,
    pub thingspeak: Option<ThingSpeakConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            timezone: "Asia/Almaty".to_string(),
            http_timeout_ms: 10_000,
            network: NetworkConfig::default(),
            telegram: TelegramConfig::default(),
            weather: WeatherConfig::default(),
            thingspeak: None,
        }
    }
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.controller.sanitize();
        self.weather.sanitize();
        if let Some(thingspeak) = self.thingspeak.as_mut() {
            thingspeak.sanitize();
        }
        self.http_timeout_ms = self.http_timeout_ms.clamp(1_000, 60_000);
    }
}
