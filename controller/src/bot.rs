use chrono_tz::Tz;

use heatbot_common::{ControllerStatus, FaultRecord, ForecastPager, PageStep};

use crate::{
    telegram::{InlineButton, ReplyMarkup},
    weather::DailyForecast,
};

pub const CALLBACK_TEMP_UP: &str = "temp:up";
pub const CALLBACK_TEMP_DOWN: &str = "temp:down";
pub const CALLBACK_TEMP_SAVE: &str = "temp:save";

const LABEL_STATUS: &str = "Status";
const LABEL_WEATHER: &str = "Weather";
const LABEL_TARGET: &str = "Target temperature";
const LABEL_ON: &str = "Enable heating";
const LABEL_OFF: &str = "Disable heating";
const LABEL_ERRORS: &str = "Errors";

const MAX_LISTED_FAULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Status,
    Weather,
    Target,
    On,
    Off,
    Errors,
    Unknown,
}

impl BotCommand {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let word = text.split_whitespace().next().unwrap_or_default();
        // Group chats address commands as /status@bot_name.
        let command = word.split('@').next().unwrap_or_default().to_ascii_lowercase();

        match command.as_str() {
            "/start" => return Self::Start,
            "/help" => return Self::Help,
            "/status" => return Self::Status,
            "/weather" | "/forecast" => return Self::Weather,
            "/target" | "/temp" => return Self::Target,
            "/on" | "/enable" => return Self::On,
            "/off" | "/disable" => return Self::Off,
            "/errors" => return Self::Errors,
            _ => {}
        }

        match text {
            LABEL_STATUS => Self::Status,
            LABEL_WEATHER => Self::Weather,
            LABEL_TARGET => Self::Target,
            LABEL_ON => Self::On,
            LABEL_OFF => Self::Off,
            LABEL_ERRORS => Self::Errors,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    TempUp,
    TempDown,
    TempSave,
    Day(usize),
    Unknown,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data {
            CALLBACK_TEMP_UP => Self::TempUp,
            CALLBACK_TEMP_DOWN => Self::TempDown,
            CALLBACK_TEMP_SAVE => Self::TempSave,
            other => ForecastPager::parse_callback(other)
                .map(Self::Day)
                .unwrap_or(Self::Unknown),
        }
    }
}

pub fn main_keyboard() -> ReplyMarkup {
    ReplyMarkup::keyboard(&[
        &[LABEL_STATUS, LABEL_WEATHER],
        &[LABEL_TARGET, LABEL_ERRORS],
        &[LABEL_ON, LABEL_OFF],
    ])
}

pub fn help_text() -> &'static str {
    "Commands:\n\
     /status - sensor readings and valve state\n\
     /weather - forecast for the next days\n\
     /target - view and change the target temperature\n\
     /on, /off - enable or disable heating control\n\
     /errors - recent hardware faults"
}

pub fn render_status(status: &ControllerStatus) -> String {
    fn value(value: Option<f32>, unit: &str) -> String {
        value
            .map(|v| format!("{v:.1}{unit}"))
            .unwrap_or_else(|| "no data".to_string())
    }

    let mut text = format!(
        "Temperature: {}\nHumidity: {}\nGas: {}\nTarget: {}°C\nValve: {}\nControl: {}",
        value(status.current_temp, "°C"),
        value(status.current_humidity, "%"),
        value(status.gas_level, "%"),
        status.desired_temp,
        status.valve_position,
        if status.enabled { "enabled" } else { "disabled" },
    );
    if status.gas_alarm {
        text.push_str("\nGAS LEVEL ABOVE ALARM THRESHOLD");
    }
    if status.fault_count > 0 {
        text.push_str(&format!("\nFaults logged: {}", status.fault_count));
    }
    text
}

pub fn render_target(desired_temp_c: i32) -> (String, ReplyMarkup) {
    let text = format!("Target temperature: {desired_temp_c}°C");
    let markup = ReplyMarkup::inline(vec![
        vec![
            InlineButton::new("−", CALLBACK_TEMP_DOWN),
            InlineButton::new("+", CALLBACK_TEMP_UP),
        ],
        vec![InlineButton::new("Save", CALLBACK_TEMP_SAVE)],
    ]);
    (text, markup)
}

pub fn render_forecast_page(days: &[DailyForecast], pager: ForecastPager) -> (String, ReplyMarkup) {
    let Some(day) = days.get(pager.day()) else {
        return (
            "No forecast available.".to_string(),
            ReplyMarkup::inline(Vec::new()),
        );
    };

    let mut text = format!(
        "{} ({}/{})\n{}\nTemperature: {:.1}..{:.1}°C\nHumidity: {:.0}%\nClouds: {:.0}%",
        day.date.format("%a %d %b"),
        pager.day() + 1,
        pager.days(),
        day.description,
        day.temp_min,
        day.temp_max,
        day.humidity,
        day.clouds,
    );
    if let Some(predicted) = day.predicted_temp {
        text.push_str(&format!("\nModel estimate: {predicted:.1}°C"));
    }

    let nav = [(PageStep::Prev, "◀ Prev"), (PageStep::Next, "Next ▶")]
        .into_iter()
        .filter_map(|(step, label)| {
            pager
                .callback_for(step)
                .map(|data| InlineButton::new(label, data))
        })
        .collect();
    (text, ReplyMarkup::inline(vec![nav]))
}

pub fn render_errors(log: &[FaultRecord], timezone: Tz) -> String {
    if log.is_empty() {
        return "No faults recorded.".to_string();
    }

    let skipped = log.len().saturating_sub(MAX_LISTED_FAULTS);
    let mut lines: Vec<String> = log
        .iter()
        .skip(skipped)
        .map(|record| {
            format!(
                "{} {}",
                record
                    .timestamp
                    .with_timezone(&timezone)
                    .format("%Y-%m-%d %H:%M"),
                record.kind
            )
        })
        .collect();
    if skipped > 0 {
        lines.insert(0, format!("({skipped} older entries omitted)"));
    }
    lines.join("\n")
}
