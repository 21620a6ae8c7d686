use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValvePosition {
    Open,
    Closed,
    Half,
}

impl ValvePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Half => "HALF",
        }
    }
}

impl fmt::Display for ValvePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware or sensor failure category reported by the sensor node.
///
/// Anything outside the known set is kept verbatim in `Unknown` so it can
/// still be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    TemperatureSensorFail,
    GasSensorFail,
    MotorFail,
    Overheat,
    VoltageSpike,
    Unknown(String),
}

impl FaultKind {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "temperature_sensor_fail" => Self::TemperatureSensorFail,
            "gas_sensor_fail" => Self::GasSensorFail,
            "motor_fail" => Self::MotorFail,
            "overheat" => Self::Overheat,
            "voltage_spike" => Self::VoltageSpike,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::TemperatureSensorFail => "temperature_sensor_fail",
            Self::GasSensorFail => "gas_sensor_fail",
            Self::MotorFail => "motor_fail",
            Self::Overheat => "overheat",
            Self::VoltageSpike => "voltage_spike",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FaultKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FaultKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    pub kind: FaultKind,
    pub timestamp: DateTime<Utc>,
}

/// One report from the sensor node. Missing fields leave the stored value as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
    pub gas_level: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reading,
    GasLeak,
    Enabled,
    Disabled,
    Fault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub severity: Severity,
    pub text: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, severity: Severity, text: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            text: text.into(),
        }
    }
}

/// What the valve-driving microcontroller polls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub target: i32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    pub enabled: bool,
    #[serde(rename = "valvePosition")]
    pub valve_position: &'static str,
    #[serde(rename = "desiredTemp")]
    pub desired_temp: i32,
    #[serde(rename = "currentTemp")]
    pub current_temp: Option<f32>,
    #[serde(rename = "currentHumidity")]
    pub current_humidity: Option<f32>,
    #[serde(rename = "gasLevel")]
    pub gas_level: Option<f32>,
    #[serde(rename = "gasAlarm")]
    pub gas_alarm: bool,
    #[serde(rename = "faultCount")]
    pub fault_count: usize,
    #[serde(rename = "lastFault")]
    pub last_fault: Option<FaultRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatePayload {
    pub temp: Option<f32>,
    pub humidity: Option<f32>,
    pub gas: Option<f32>,
    pub target: i32,
    pub enabled: bool,
    pub valve: &'static str,
    #[serde(rename = "faultCount")]
    pub fault_count: usize,
}
