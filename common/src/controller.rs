use chrono::{DateTime, Utc};

use crate::{
    config::{clamp_desired, ControllerConfig, PersistedSettings},
    store::{StoreError, TargetStore},
    types::{
        ControllerStatePayload, ControllerStatus, FaultKind, FaultRecord, Notification,
        NotificationKind, SensorReading, Severity, TargetSnapshot, ValvePosition,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct SystemState {
    pub enabled: bool,
    pub valve_position: ValvePosition,
    pub desired_temp_c: i32,
    pub current_temp_c: Option<f32>,
    pub humidity: Option<f32>,
    pub gas_level: Option<f32>,
    error_log: Vec<FaultRecord>,
}

impl SystemState {
    pub fn error_log(&self) -> &[FaultRecord] {
        &self.error_log
    }
}

/// Outcome of applying one fault kind to the state.
struct FaultEffect {
    valve: Option<ValvePosition>,
    disable: bool,
    severity: Option<Severity>,
}

/// Owns the heating state and derives valve position from readings and faults.
///
/// Mutating operations hand back the notifications they want delivered; the
/// caller decides how and when to send them.
#[derive(Debug, Clone)]
pub struct ValveController {
    pub config: ControllerConfig,
    state: SystemState,
}

impl ValveController {
    pub fn new(config: ControllerConfig, mut settings: PersistedSettings) -> Self {
        settings.sanitize();
        Self {
            state: SystemState {
                enabled: config.start_enabled,
                valve_position: ValvePosition::Closed,
                desired_temp_c: settings.desired_temp_c,
                current_temp_c: None,
                humidity: None,
                gas_level: None,
                error_log: Vec::new(),
            },
            config,
        }
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn valve_position(&self) -> ValvePosition {
        self.state.valve_position
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn desired_temp_c(&self) -> i32 {
        self.state.desired_temp_c
    }

    pub fn error_log(&self) -> &[FaultRecord] {
        &self.state.error_log
    }

    pub fn report_reading(&mut self, reading: SensorReading) -> Vec<Notification> {
        let mut notifications = Vec::new();
        if self.config.forward_readings {
            notifications.push(Notification::new(
                NotificationKind::Reading,
                Severity::Info,
                reading_summary(&reading),
            ));
        }
        notifications.extend(self.record_reading(reading));
        notifications
    }

    /// Stores the fields present in `reading` without forwarding it. Meant for
    /// single-value feeds where each message carries one field of a report.
    pub fn record_reading(&mut self, reading: SensorReading) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if let Some(temp) = reading.temperature.filter(|value| value.is_finite()) {
            self.state.current_temp_c = Some(temp);
        }
        if let Some(humidity) = reading.humidity.filter(|value| value.is_finite()) {
            self.state.humidity = Some(humidity);
        }
        let gas = reading.gas_level.filter(|value| value.is_finite());
        if let Some(gas) = gas {
            self.state.gas_level = Some(gas);
            if gas > self.config.gas_alert_threshold {
                notifications.push(Notification::new(
                    NotificationKind::GasLeak,
                    Severity::Critical,
                    format!("Gas leak detected ({gas:.1}%)! Check the system."),
                ));
            }
        }

        notifications
    }

    pub fn adjust_valve(&mut self) -> ValvePosition {
        if !self.state.enabled {
            return self.state.valve_position;
        }
        let Some(current) = self.state.current_temp_c else {
            return self.state.valve_position;
        };

        let desired = self.state.desired_temp_c as f32;
        self.state.valve_position = if current < desired {
            ValvePosition::Open
        } else if current > desired {
            ValvePosition::Closed
        } else {
            ValvePosition::Half
        };
        self.state.valve_position
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Vec<Notification> {
        self.state.enabled = enabled;
        self.state.valve_position = ValvePosition::Closed;

        let notification = if enabled {
            Notification::new(
                NotificationKind::Enabled,
                Severity::Info,
                "Heating control enabled. Valve closed until the next reading.",
            )
        } else {
            Notification::new(
                NotificationKind::Disabled,
                Severity::Info,
                "Heating control disabled. Valve closed; gas monitoring stays active.",
            )
        };
        vec![notification]
    }

    pub fn report_fault(&mut self, kind: FaultKind, timestamp: DateTime<Utc>) -> Vec<Notification> {
        let effect = fault_effect(&kind);

        self.state.error_log.push(FaultRecord {
            kind: kind.clone(),
            timestamp,
        });
        if let Some(valve) = effect.valve {
            self.state.valve_position = valve;
        }
        if effect.disable {
            self.state.enabled = false;
        }

        let Some(severity) = effect.severity else {
            return Vec::new();
        };

        let text = format!(
            "{} {}. Valve: {}, control: {}.",
            match severity {
                Severity::Critical => "CRITICAL:",
                _ => "Warning:",
            },
            fault_description(&kind),
            self.state.valve_position,
            if self.state.enabled { "enabled" } else { "disabled" },
        );
        vec![Notification::new(NotificationKind::Fault, severity, text)]
    }

    pub fn adjust_desired_temperature(&mut self, delta: i32) -> i32 {
        self.state.desired_temp_c = clamp_desired(self.state.desired_temp_c.saturating_add(delta));
        self.state.desired_temp_c
    }

    pub fn set_desired_temperature(&mut self, desired_temp_c: i32) -> bool {
        let clamped = clamp_desired(desired_temp_c);
        if clamped != self.state.desired_temp_c {
            self.state.desired_temp_c = clamped;
            true
        } else {
            false
        }
    }

    pub fn persist_desired_temperature<S: TargetStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<(), StoreError> {
        store.save(self.state.desired_temp_c)
    }

    pub fn current_target(&self) -> TargetSnapshot {
        TargetSnapshot {
            target: self.state.desired_temp_c,
            enabled: self.state.enabled,
        }
    }

    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            enabled: self.state.enabled,
            valve_position: self.state.valve_position.as_str(),
            desired_temp: self.state.desired_temp_c,
            current_temp: self.state.current_temp_c,
            current_humidity: self.state.humidity,
            gas_level: self.state.gas_level,
            gas_alarm: self.gas_alarm(),
            fault_count: self.state.error_log.len(),
            last_fault: self.state.error_log.last().cloned(),
        }
    }

    pub fn state_payload(&self) -> ControllerStatePayload {
        ControllerStatePayload {
            temp: self.state.current_temp_c,
            humidity: self.state.humidity,
            gas: self.state.gas_level,
            target: self.state.desired_temp_c,
            enabled: self.state.enabled,
            valve: self.state.valve_position.as_str(),
            fault_count: self.state.error_log.len(),
        }
    }

    fn gas_alarm(&self) -> bool {
        self.state
            .gas_level
            .is_some_and(|gas| gas > self.config.gas_alert_threshold)
    }

}

fn fault_effect(kind: &FaultKind) -> FaultEffect {
    match kind {
        FaultKind::TemperatureSensorFail => FaultEffect {
            valve: Some(ValvePosition::Half),
            disable: false,
            severity: Some(Severity::Warning),
        },
        FaultKind::GasSensorFail | FaultKind::Overheat | FaultKind::VoltageSpike => FaultEffect {
            valve: Some(ValvePosition::Closed),
            disable: true,
            severity: Some(Severity::Critical),
        },
        // The motor cannot move the valve, so its last position is kept.
        FaultKind::MotorFail => FaultEffect {
            valve: None,
            disable: false,
            severity: Some(Severity::Warning),
        },
        FaultKind::Unknown(_) => FaultEffect {
            valve: None,
            disable: false,
            severity: None,
        },
    }
}

fn fault_description(kind: &FaultKind) -> String {
    match kind {
        FaultKind::TemperatureSensorFail => "temperature sensor failure".to_string(),
        FaultKind::GasSensorFail => "gas sensor failure".to_string(),
        FaultKind::MotorFail => "valve motor failure, valve position unknown".to_string(),
        FaultKind::Overheat => "overheat detected".to_string(),
        FaultKind::VoltageSpike => "voltage spike detected".to_string(),
        FaultKind::Unknown(raw) => format!("unrecognized fault '{raw}'"),
    }
}

fn reading_summary(reading: &SensorReading) -> String {
    fn field(value: Option<f32>, unit: &str) -> String {
        value
            .map(|value| format!("{value:.1}{unit}"))
            .unwrap_or_else(|| "n/a".to_string())
    }

    format!(
        "Temperature: {}\nHumidity: {}\nGas: {}",
        field(reading.temperature, "°C"),
        field(reading.humidity, "%"),
        field(reading.gas_level, "%"),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn quiet_config() -> ControllerConfig {
        ControllerConfig {
            forward_readings: false,
            ..ControllerConfig::default()
        }
    }

    fn controller() -> ValveController {
        ValveController::new(quiet_config(), PersistedSettings::default())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn reading(temperature: f32, gas_level: f32) -> SensorReading {
        SensorReading {
            temperature: Some(temperature),
            humidity: None,
            gas_level: Some(gas_level),
        }
    }

    #[test]
    fn starts_closed_with_default_target() {
        let controller = controller();
        assert_eq!(controller.valve_position(), ValvePosition::Closed);
        assert_eq!(
            controller.current_target(),
            TargetSnapshot {
                target: 24,
                enabled: true
            }
        );
    }

    #[test]
    fn cold_hot_then_overheat_scenario() {
        let mut controller = controller();

        assert!(controller.report_reading(reading(20.0, 10.0)).is_empty());
        assert_eq!(controller.adjust_valve(), ValvePosition::Open);

        assert!(controller.report_reading(reading(28.0, 10.0)).is_empty());
        assert_eq!(controller.adjust_valve(), ValvePosition::Closed);

        let notifications = controller.report_fault(FaultKind::Overheat, at(100));
        assert!(!controller.is_enabled());
        assert_eq!(controller.valve_position(), ValvePosition::Closed);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].severity, Severity::Critical);
        assert_eq!(controller.error_log().len(), 1);
    }

    #[test]
    fn equal_temperature_half_opens_valve() {
        let mut controller = controller();
        controller.report_reading(reading(24.0, 0.0));
        assert_eq!(controller.adjust_valve(), ValvePosition::Half);
    }

    #[test]
    fn no_reading_keeps_valve() {
        let mut controller = controller();
        assert_eq!(controller.adjust_valve(), ValvePosition::Closed);
    }

    #[test]
    fn disabled_controller_does_not_actuate() {
        let mut controller = controller();
        controller.set_enabled(false);
        controller.report_reading(reading(10.0, 0.0));

        assert_eq!(controller.adjust_valve(), ValvePosition::Closed);
    }

    #[test]
    fn missing_fields_leave_previous_values() {
        let mut controller = controller();
        controller.report_reading(SensorReading {
            temperature: Some(21.5),
            humidity: Some(40.0),
            gas_level: Some(5.0),
        });
        controller.report_reading(SensorReading {
            temperature: None,
            humidity: Some(45.0),
            gas_level: None,
        });

        let state = controller.state();
        assert_eq!(state.current_temp_c, Some(21.5));
        assert_eq!(state.humidity, Some(45.0));
        assert_eq!(state.gas_level, Some(5.0));
    }

    #[test]
    fn non_finite_temperature_is_ignored() {
        let mut controller = controller();
        controller.report_reading(reading(f32::NAN, 0.0));
        controller.report_reading(reading(f32::INFINITY, 0.0));
        assert_eq!(controller.state().current_temp_c, None);
    }

    #[test]
    fn overheating_reading_closes_open_valve() {
        let mut controller = controller();
        controller.report_reading(reading(20.0, 0.0));
        assert_eq!(controller.adjust_valve(), ValvePosition::Open);

        controller.report_reading(reading(90.0, 0.0));
        assert_eq!(controller.state().current_temp_c, Some(90.0));
        assert_eq!(controller.adjust_valve(), ValvePosition::Closed);
    }

    #[test]
    fn recorded_values_are_not_forwarded() {
        let mut controller =
            ValveController::new(ControllerConfig::default(), PersistedSettings::default());

        let notifications = controller.record_reading(SensorReading {
            temperature: Some(21.0),
            ..SensorReading::default()
        });
        assert!(notifications.is_empty());
        assert_eq!(controller.state().current_temp_c, Some(21.0));

        let notifications = controller.record_reading(SensorReading {
            gas_level: Some(80.0),
            ..SensorReading::default()
        });
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::GasLeak);

        let notifications = controller.report_reading(reading(21.0, 5.0));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Reading);
    }

    #[test]
    fn gas_above_threshold_raises_single_alert() {
        let mut controller = controller();

        let notifications = controller.report_reading(reading(22.0, 71.0));
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::GasLeak);
        assert_eq!(notifications[0].severity, Severity::Critical);

        assert!(controller.report_reading(reading(22.0, 70.0)).is_empty());
    }

    #[test]
    fn forwarded_readings_come_before_gas_alert() {
        let mut controller = ValveController::new(ControllerConfig::default(), PersistedSettings::default());

        let kinds: Vec<_> = controller
            .report_reading(reading(22.0, 90.0))
            .into_iter()
            .map(|notification| notification.kind)
            .collect();
        assert_eq!(kinds, vec![NotificationKind::Reading, NotificationKind::GasLeak]);
    }

    #[test]
    fn reading_summary_marks_missing_fields() {
        let text = reading_summary(&SensorReading {
            temperature: Some(21.0),
            humidity: None,
            gas_level: Some(3.5),
        });
        assert_eq!(text, "Temperature: 21.0°C\nHumidity: n/a\nGas: 3.5%");
    }

    #[test]
    fn enabling_and_disabling_close_valve() {
        let mut controller = controller();
        controller.report_reading(reading(18.0, 0.0));
        assert_eq!(controller.adjust_valve(), ValvePosition::Open);

        let notifications = controller.set_enabled(false);
        assert_eq!(controller.valve_position(), ValvePosition::Closed);
        assert_eq!(notifications[0].kind, NotificationKind::Disabled);

        let notifications = controller.set_enabled(true);
        assert!(controller.is_enabled());
        assert_eq!(controller.valve_position(), ValvePosition::Closed);
        assert_eq!(notifications[0].kind, NotificationKind::Enabled);
    }

    #[test]
    fn fault_table() {
        let cases = [
            (FaultKind::TemperatureSensorFail, ValvePosition::Half, true, Some(Severity::Warning)),
            (FaultKind::GasSensorFail, ValvePosition::Closed, false, Some(Severity::Critical)),
            (FaultKind::MotorFail, ValvePosition::Open, true, Some(Severity::Warning)),
            (FaultKind::Overheat, ValvePosition::Closed, false, Some(Severity::Critical)),
            (FaultKind::VoltageSpike, ValvePosition::Closed, false, Some(Severity::Critical)),
            (FaultKind::Unknown("door_open".into()), ValvePosition::Open, true, None),
        ];

        for (kind, valve, enabled, severity) in cases {
            let mut controller = controller();
            controller.report_reading(reading(18.0, 0.0));
            assert_eq!(controller.adjust_valve(), ValvePosition::Open);

            let notifications = controller.report_fault(kind.clone(), at(0));

            assert_eq!(controller.valve_position(), valve, "{kind}");
            assert_eq!(controller.is_enabled(), enabled, "{kind}");
            assert_eq!(notifications.first().map(|n| n.severity), severity, "{kind}");
            assert_eq!(controller.error_log().len(), 1, "{kind}");
        }
    }

    #[test]
    fn error_log_is_append_only_and_ordered() {
        let mut controller = controller();
        controller.report_fault(FaultKind::MotorFail, at(1));
        controller.report_fault(FaultKind::Unknown("x".into()), at(2));
        controller.report_fault(FaultKind::Overheat, at(3));

        let kinds: Vec<_> = controller.error_log().iter().map(|r| r.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![FaultKind::MotorFail, FaultKind::Unknown("x".into()), FaultKind::Overheat]
        );
        assert_eq!(controller.error_log()[2].timestamp, at(3));
        assert_eq!(controller.status().fault_count, 3);
    }

    #[test]
    fn fault_notification_describes_resulting_state() {
        let mut controller = controller();
        let notifications = controller.report_fault(FaultKind::VoltageSpike, at(0));
        assert_eq!(
            notifications[0].text,
            "CRITICAL: voltage spike detected. Valve: CLOSED, control: disabled."
        );
    }

    #[test]
    fn desired_temperature_saturates() {
        let mut controller = controller();
        for _ in 0..30 {
            controller.adjust_desired_temperature(1);
        }
        assert_eq!(controller.desired_temp_c(), 36);

        for _ in 0..30 {
            controller.adjust_desired_temperature(-1);
        }
        assert_eq!(controller.desired_temp_c(), 16);
        assert_eq!(controller.adjust_desired_temperature(1), 17);
    }

    #[test]
    fn set_desired_reports_change() {
        let mut controller = controller();
        assert!(!controller.set_desired_temperature(24));
        assert!(controller.set_desired_temperature(100));
        assert_eq!(controller.desired_temp_c(), 36);
    }

    #[test]
    fn restored_target_is_clamped() {
        let controller =
            ValveController::new(quiet_config(), PersistedSettings { desired_temp_c: 5 });
        assert_eq!(controller.current_target().target, 16);
    }

    #[test]
    fn persist_writes_current_target() {
        use std::cell::Cell;

        struct MemoryStore(Cell<Option<i32>>);

        impl TargetStore for MemoryStore {
            fn load(&self) -> Result<Option<i32>, StoreError> {
                Ok(self.0.get())
            }

            fn save(&self, desired_temp_c: i32) -> Result<(), StoreError> {
                self.0.set(Some(desired_temp_c));
                Ok(())
            }
        }

        let store = MemoryStore(Cell::new(None));
        let mut controller = controller();
        controller.adjust_desired_temperature(2);
        controller.persist_desired_temperature(&store).unwrap();

        assert_eq!(store.load().unwrap(), Some(26));
    }

    #[test]
    fn status_reflects_gas_alarm() {
        let mut controller = controller();
        controller.report_reading(reading(22.0, 80.0));
        let status = controller.status();
        assert!(status.gas_alarm);
        assert_eq!(status.gas_level, Some(80.0));
        assert_eq!(status.valve_position, "CLOSED");
    }
}
