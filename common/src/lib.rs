pub mod config;
pub mod controller;
pub mod forecast;
pub mod pager;
pub mod store;
pub mod topics;
pub mod types;

pub use config::{
    ControllerConfig, PersistedSettings, RuntimeConfig, TelegramConfig, ThingSpeakConfig,
    WeatherConfig,
};
pub use controller::{SystemState, ValveController};
pub use forecast::{ForecastModel, ModelError, Sample};
pub use pager::{ForecastPager, PageStep};
pub use store::{FileTargetStore, StoreError, TargetStore};
pub use topics::*;
pub use types::{
    ControllerStatePayload, ControllerStatus, FaultKind, FaultRecord, Notification,
    NotificationKind, SensorReading, Severity, TargetSnapshot, ValvePosition,
};
