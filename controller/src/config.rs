use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono_tz::Tz;
use tracing::warn;

use heatbot_common::{RuntimeConfig, ThingSpeakConfig};

pub fn data_dir() -> PathBuf {
    std::env::var("HEATBOT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./.heatbot"))
}

pub async fn load_runtime_config(path: &Path) -> anyhow::Result<RuntimeConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => serde_json::from_slice::<RuntimeConfig>(&raw)
            .with_context(|| format!("invalid runtime config at {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
        Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Unknown zone names fall back to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    name.parse().unwrap_or_else(|_| {
        warn!("unknown timezone '{name}', falling back to UTC");
        Tz::UTC
    })
}

/// Environment variables win over the runtime file, matching how the bot is deployed.
pub fn apply_env_overrides(runtime: &mut RuntimeConfig, var: impl Fn(&str) -> Option<String>) {
    let set = |target: &mut String, key: &str| {
        if let Some(value) = var(key).filter(|value| !value.is_empty()) {
            *target = value;
        }
    };

    set(&mut runtime.telegram.bot_token, "TELEGRAM_API_KEY");
    set(&mut runtime.telegram.chat_id, "TELEGRAM_CHAT_ID");
    set(&mut runtime.weather.api_key, "OPENWEATHER_API_KEY");
    set(&mut runtime.weather.city, "WEATHER_CITY");
    set(&mut runtime.network.mqtt_host, "MQTT_HOST");
    set(&mut runtime.network.mqtt_user, "MQTT_USER");
    set(&mut runtime.network.mqtt_pass, "MQTT_PASS");

    if let Some(secret) = var("TELEGRAM_WEBHOOK_SECRET").filter(|value| !value.is_empty()) {
        runtime.telegram.webhook_secret = Some(secret);
    }
    if let Some(path) = var("FORECAST_MODEL_PATH").filter(|value| !value.is_empty()) {
        runtime.weather.model_path = Some(path);
    }
    if let Some(port) = var("MQTT_PORT").and_then(|value| value.parse::<u16>().ok()) {
        runtime.network.mqtt_port = port;
    }
    if let Some(port) = var("CONTROLLER_HTTP_PORT").and_then(|value| value.parse::<u16>().ok()) {
        runtime.network.http_port = port;
    }

    if let Some(channel_id) = var("THINGSPEAK_CHANNEL_ID").filter(|value| !value.is_empty()) {
        let thingspeak = runtime.thingspeak.get_or_insert_with(|| ThingSpeakConfig {
            channel_id: String::new(),
            read_api_key: String::new(),
            poll_interval_ms: 60_000,
        });
        thingspeak.channel_id = channel_id;
    }
    if let Some(thingspeak) = runtime.thingspeak.as_mut() {
        if let Some(key) = var("THINGSPEAK_API_KEY").filter(|value| !value.is_empty()) {
            thingspeak.read_api_key = key;
        }
    }

    runtime.sanitize();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_runtime_values() {
        let mut runtime = RuntimeConfig::default();
        apply_env_overrides(
            &mut runtime,
            lookup(&[
                ("TELEGRAM_API_KEY", "123:abc"),
                ("TELEGRAM_CHAT_ID", "-100"),
                ("MQTT_PORT", "1884"),
                ("CONTROLLER_HTTP_PORT", "not-a-port"),
                ("THINGSPEAK_CHANNEL_ID", "998877"),
                ("THINGSPEAK_API_KEY", "READKEY"),
            ]),
        );

        assert!(runtime.telegram.is_configured());
        assert_eq!(runtime.telegram.chat_id, "-100");
        assert_eq!(runtime.network.mqtt_port, 1884);
        assert_eq!(runtime.network.http_port, 5000);
        let thingspeak = runtime.thingspeak.unwrap();
        assert_eq!(thingspeak.channel_id, "998877");
        assert_eq!(thingspeak.read_api_key, "READKEY");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut runtime = RuntimeConfig::default();
        runtime.weather.city = "Astana".to_string();
        apply_env_overrides(&mut runtime, lookup(&[("WEATHER_CITY", "")]));
        assert_eq!(runtime.weather.city, "Astana");
        assert!(runtime.thingspeak.is_none());
    }

    #[test]
    fn timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Asia/Almaty"), chrono_tz::Asia::Almaty);
        assert_eq!(resolve_timezone("Mars/Olympus"), Tz::UTC);
    }

    #[tokio::test]
    async fn missing_runtime_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("heatbot-missing-{}.json", std::process::id()));
        let runtime = load_runtime_config(&path).await.unwrap();
        assert_eq!(runtime.controller.gas_alert_threshold, 70.0);
    }
}
