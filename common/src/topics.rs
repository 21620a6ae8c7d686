pub const TOPIC_SENSOR_TEMP: &str = "heatbot/sensor/temperature";
pub const TOPIC_SENSOR_HUMIDITY: &str = "heatbot/sensor/humidity";
pub const TOPIC_SENSOR_GAS: &str = "heatbot/sensor/gas";
pub const TOPIC_SENSOR_FAULT: &str = "heatbot/sensor/fault";
pub const TOPIC_SENSOR_STATUS: &str = "heatbot/sensor/status";

pub const TOPIC_CONTROLLER_STATE: &str = "heatbot/controller/state";
