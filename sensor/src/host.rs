use std::time::Duration;

use anyhow::Context;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tracing::{info, warn};

use heatbot_common::{
    TOPIC_SENSOR_FAULT, TOPIC_SENSOR_GAS, TOPIC_SENSOR_HUMIDITY, TOPIC_SENSOR_STATUS,
    TOPIC_SENSOR_TEMP,
};

/// Readings produced by one simulated sample.
#[derive(Debug, Clone, PartialEq)]
struct Sample {
    temperature_c: f32,
    humidity: f32,
    gas_level: f32,
    fault: Option<&'static str>,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mqtt_host = std::env::var("MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let mqtt_port = std::env::var("MQTT_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(1883);
    let period_secs = std::env::var("SENSOR_PERIOD_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(30);

    let mut mqtt_options = MqttOptions::new("heatbot-sensor", mqtt_host, mqtt_port);

    if let Ok(user) = std::env::var("MQTT_USER") {
        let pass = std::env::var("MQTT_PASS").unwrap_or_default();
        mqtt_options.set_credentials(user, pass);
    }

    let (mqtt, mut eventloop) = AsyncClient::new(mqtt_options, 32);

    mqtt.publish(TOPIC_SENSOR_STATUS, QoS::AtLeastOnce, true, "online")
        .await
        .context("failed to publish sensor online status")?;

    tokio::spawn(async move {
        loop {
            if let Err(err) = eventloop.poll().await {
                warn!("sensor mqtt poll error: {err}");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    });

    info!("sensor publisher started");

    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(Duration::from_secs(period_secs));

    loop {
        interval.tick().await;
        tick = tick.saturating_add(1);

        let sample = simulate(tick);
        let readings = [
            (TOPIC_SENSOR_TEMP, sample.temperature_c),
            (TOPIC_SENSOR_HUMIDITY, sample.humidity),
            (TOPIC_SENSOR_GAS, sample.gas_level),
        ];
        for (topic, value) in readings {
            mqtt.publish(topic, QoS::AtLeastOnce, true, format!("{value:.1}"))
                .await
                .with_context(|| format!("failed to publish {topic}"))?;
        }

        if let Some(fault) = sample.fault {
            warn!("simulated fault: {fault}");
            mqtt.publish(TOPIC_SENSOR_FAULT, QoS::AtLeastOnce, false, fault)
                .await
                .context("failed to publish sensor fault")?;
        }
    }
}

/// Slow temperature swing around 22°C with a gas spike and a sensor fault now and then.
fn simulate(tick: u64) -> Sample {
    let phase = (tick % 20) as f32;
    let swing = if phase < 10.0 { phase } else { 20.0 - phase };

    Sample {
        temperature_c: 18.0 + swing * 0.8,
        humidity: 40.0 + (tick % 6) as f32 * 1.5,
        gas_level: if tick % 120 == 0 { 75.0 } else { 5.0 + (tick % 4) as f32 },
        fault: (tick % 240 == 0).then_some("temperature_sensor_fail"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_swings_through_typical_targets() {
        let temps: Vec<f32> = (0..20).map(|tick| simulate(tick).temperature_c).collect();
        let min = temps.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = temps.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min - 18.0).abs() < 1e-4);
        assert!((max - 26.0).abs() < 1e-4);
    }

    #[test]
    fn gas_spike_and_fault_are_periodic() {
        assert_eq!(simulate(120).gas_level, 75.0);
        assert!(simulate(121).gas_level <= 70.0);
        assert_eq!(simulate(240).fault, Some("temperature_sensor_fail"));
        assert_eq!(simulate(239).fault, None);
    }
}
