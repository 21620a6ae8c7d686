use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use chrono_tz::Tz;
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use heatbot_common::{
    FaultKind, FileTargetStore, ForecastModel, ForecastPager, Notification, PersistedSettings,
    RuntimeConfig, SensorReading, TargetStore, ValveController, ValvePosition,
    TOPIC_CONTROLLER_STATE, TOPIC_SENSOR_FAULT, TOPIC_SENSOR_GAS, TOPIC_SENSOR_HUMIDITY,
    TOPIC_SENSOR_STATUS, TOPIC_SENSOR_TEMP,
};

use crate::{
    bot::{self, BotCommand, CallbackAction},
    config,
    telegram::{CallbackQuery, Notifier, ReplyMarkup, TelegramClient, Update},
    thingspeak::{lenient_number, ThingSpeakClient},
    weather::{DailyForecast, WeatherClient},
};

const MAX_MQTT_PAYLOAD_BYTES: usize = 512;
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct AppState {
    controller: Arc<Mutex<ValveController>>,
    store: Arc<FileTargetStore>,
    notifier: Notifier,
    telegram: Option<TelegramClient>,
    weather: Option<WeatherClient>,
    timezone: Tz,
    webhook_secret: Option<String>,
    mqtt: AsyncClient,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data_dir = config::data_dir();
    let mut runtime = config::load_runtime_config(&data_dir.join("runtime.json"))
        .await
        .unwrap_or_else(|err| {
            warn!("failed to load runtime config: {err:#}");
            RuntimeConfig::default()
        });
    config::apply_env_overrides(&mut runtime, |key| std::env::var(key).ok());

    let timezone = config::resolve_timezone(&runtime.timezone);

    let store = FileTargetStore::in_dir(&data_dir);
    let desired_temp_c = match store.load() {
        Ok(Some(value)) => value,
        Ok(None) => PersistedSettings::default().desired_temp_c,
        Err(err) => {
            warn!("failed to restore target temperature: {err}");
            PersistedSettings::default().desired_temp_c
        }
    };
    let controller =
        ValveController::new(runtime.controller.clone(), PersistedSettings { desired_temp_c });
    info!("restored target temperature {}°C", controller.desired_temp_c());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(runtime.http_timeout_ms))
        .build()
        .context("failed to build http client")?;

    let telegram = TelegramClient::new(http.clone(), &runtime.telegram);
    if !runtime.telegram.is_configured() {
        warn!("TELEGRAM_API_KEY or TELEGRAM_CHAT_ID is not set; notifications are only logged");
    }
    let notifier = Notifier::new(telegram.clone(), runtime.telegram.chat_id.clone());

    let model_path = runtime
        .weather
        .model_path
        .clone()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| data_dir.join("forecast_model.json"));
    let model = match ForecastModel::load(&model_path) {
        Ok(model) => Some(model),
        Err(err) => {
            debug!("no forecast model at {}: {err}", model_path.display());
            None
        }
    };

    let weather = if runtime.weather.api_key.is_empty() {
        warn!("OPENWEATHER_API_KEY is not set; /weather is disabled");
        None
    } else {
        Some(WeatherClient::new(
            http.clone(),
            runtime.weather.clone(),
            timezone,
            model,
        ))
    };

    let mut mqtt_options = MqttOptions::new(
        "heatbot-controller",
        runtime.network.mqtt_host.clone(),
        runtime.network.mqtt_port,
    );
    if !runtime.network.mqtt_user.is_empty() {
        mqtt_options.set_credentials(
            runtime.network.mqtt_user.clone(),
            runtime.network.mqtt_pass.clone(),
        );
    }
    let (mqtt, eventloop) = AsyncClient::new(mqtt_options, 64);

    let app_state = AppState {
        controller: Arc::new(Mutex::new(controller)),
        store: Arc::new(store),
        notifier,
        telegram,
        weather,
        timezone,
        webhook_secret: runtime.telegram.webhook_secret.clone(),
        mqtt,
    };

    subscribe_topics(&app_state.mqtt).await?;
    spawn_mqtt_loop(app_state.clone(), eventloop);
    spawn_state_publish_loop(
        app_state.clone(),
        Duration::from_millis(runtime.controller.state_publish_interval_ms),
    );
    if let Some(thingspeak) = runtime.thingspeak.clone() {
        spawn_thingspeak_loop(app_state.clone(), ThingSpeakClient::new(http, thingspeak));
    }

    let app = Router::new()
        .route("/", get(handle_home))
        .route("/update_data", post(handle_update_data))
        .route("/fault", post(handle_fault))
        .route("/webhook", post(handle_webhook))
        .route("/api/status", get(handle_get_status))
        .route("/api/target", get(handle_get_target).post(handle_set_target))
        .route("/api/enabled", post(handle_set_enabled))
        .route("/api/errors", get(handle_get_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], runtime.network.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind controller server at {addr}"))?;

    info!("controller listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn subscribe_topics(mqtt: &AsyncClient) -> anyhow::Result<()> {
    let topics = [
        TOPIC_SENSOR_TEMP,
        TOPIC_SENSOR_HUMIDITY,
        TOPIC_SENSOR_GAS,
        TOPIC_SENSOR_FAULT,
        TOPIC_SENSOR_STATUS,
    ];

    for topic in topics {
        mqtt.subscribe(topic, QoS::AtMostOnce).await?;
    }
    Ok(())
}

fn spawn_mqtt_loop(app_state: AppState, mut eventloop: rumqttc::EventLoop) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::Publish(message))) => {
                    if let Err(err) =
                        handle_mqtt_message(&app_state, &message.topic, &message.payload).await
                    {
                        warn!("mqtt message handling error: {err:#}");
                    }
                }
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    info!("mqtt connected");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("mqtt poll error: {err}");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    });
}

fn spawn_state_publish_loop(app_state: AppState, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;

            let payload = {
                let controller = app_state.controller.lock().await;
                serde_json::to_vec(&controller.state_payload())
            };

            match payload {
                Ok(body) => {
                    if let Err(err) = app_state
                        .mqtt
                        .publish(TOPIC_CONTROLLER_STATE, QoS::AtLeastOnce, true, body)
                        .await
                    {
                        warn!("controller state publish failed: {err}");
                    }
                }
                Err(err) => warn!("controller state serialization failed: {err}"),
            }
        }
    });
}

fn spawn_thingspeak_loop(app_state: AppState, client: ThingSpeakClient) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(client.poll_interval_ms()));
        let mut last_entry_id = None;

        loop {
            interval.tick().await;

            let entry = match client.last_entry().await {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("thingspeak poll failed: {err}");
                    continue;
                }
            };
            if entry.entry_id.is_some() && entry.entry_id == last_entry_id {
                continue;
            }
            last_entry_id = entry.entry_id;

            apply_reading(&app_state, entry.to_reading(), Ingest::Report).await;
        }
    });
}

async fn handle_mqtt_message(
    app_state: &AppState,
    topic: &str,
    payload: &[u8],
) -> anyhow::Result<()> {
    if payload.len() > MAX_MQTT_PAYLOAD_BYTES {
        warn!(
            "dropping oversized MQTT payload on topic {} ({} bytes)",
            topic,
            payload.len()
        );
        return Ok(());
    }

    let message = std::str::from_utf8(payload).context("non utf8 mqtt payload")?;
    let value = message.trim().parse::<f32>().ok().filter(|v| v.is_finite());

    if let Some(reading) = value.and_then(|value| mqtt_reading(topic, value)) {
        apply_reading(app_state, reading, Ingest::Field).await;
        return Ok(());
    }

    match topic {
        TOPIC_SENSOR_FAULT => {
            if !message.trim().is_empty() {
                apply_fault(app_state, FaultKind::parse(message)).await;
            }
        }
        TOPIC_SENSOR_STATUS => info!("sensor status: {}", message.trim()),
        _ => {}
    }

    Ok(())
}

/// How a reading reached the controller. Full reports are forwarded to the chat,
/// single MQTT fields are only recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ingest {
    Report,
    Field,
}

fn ingest(
    controller: &mut ValveController,
    reading: SensorReading,
    source: Ingest,
) -> (Vec<Notification>, ValvePosition) {
    let notifications = match source {
        Ingest::Report => controller.report_reading(reading),
        Ingest::Field => controller.record_reading(reading),
    };
    (notifications, controller.adjust_valve())
}

fn mqtt_reading(topic: &str, value: f32) -> Option<SensorReading> {
    let mut reading = SensorReading::default();
    match topic {
        TOPIC_SENSOR_TEMP => reading.temperature = Some(value),
        TOPIC_SENSOR_HUMIDITY => reading.humidity = Some(value),
        TOPIC_SENSOR_GAS => reading.gas_level = Some(value),
        _ => return None,
    }
    Some(reading)
}

async fn apply_reading(state: &AppState, reading: SensorReading, source: Ingest) {
    let (notifications, previous, valve) = {
        let mut controller = state.controller.lock().await;
        let previous = controller.valve_position();
        let (notifications, valve) = ingest(&mut controller, reading, source);
        (notifications, previous, valve)
    };

    if previous != valve {
        info!("valve {previous} -> {valve}");
    }
    state.notifier.deliver(notifications).await;
}

async fn apply_fault(state: &AppState, kind: FaultKind) {
    if !kind.is_known() {
        warn!("unrecognized fault '{kind}' logged without state change");
    }
    let notifications = {
        let mut controller = state.controller.lock().await;
        controller.report_fault(kind, Utc::now())
    };
    state.notifier.deliver(notifications).await;
}

/// Parses a sensor report body; non-numeric or missing fields stay `None`.
fn reading_from_json(body: &Value) -> SensorReading {
    let field = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| body.get(*key).and_then(lenient_number))
    };
    SensorReading {
        temperature: field(&["temperature", "temp"]),
        humidity: field(&["humidity"]),
        gas_level: field(&["gas_level", "gasLevel", "gas"]),
    }
}

fn fault_from_json(body: &Value) -> Option<FaultKind> {
    ["fault", "faultKind", "fault_kind"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|raw| !raw.trim().is_empty())
        .map(FaultKind::parse)
}

async fn handle_home() -> &'static str {
    "heatbot controller is running"
}

async fn handle_update_data(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "Body must be JSON");
    };

    apply_reading(&state, reading_from_json(&value), Ingest::Report).await;
    Json(json!({"status": "ok"})).into_response()
}

async fn handle_fault(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let Some(kind) = serde_json::from_slice::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(fault_from_json)
    else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'fault' field");
    };

    let fault = kind.as_str().to_string();
    apply_fault(&state, kind).await;
    Json(json!({"status": "ok", "fault": fault})).into_response()
}

async fn handle_get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.controller.lock().await.status();
    Json(status)
}

async fn handle_get_target(State(state): State<AppState>) -> impl IntoResponse {
    let target = state.controller.lock().await.current_target();
    Json(target)
}

async fn handle_set_target(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(value) = params.get("value") else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'value' parameter");
    };
    let Ok(target) = value.trim().parse::<i32>() else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid temperature value");
    };

    let persisted = {
        let mut controller = state.controller.lock().await;
        let changed = controller.set_desired_temperature(target);
        controller.adjust_valve();
        if changed {
            controller.persist_desired_temperature(state.store.as_ref())
        } else {
            Ok(())
        }
    };

    if let Err(err) = persisted {
        warn!("failed to persist target update: {err}");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to persist target temperature",
        );
    }

    handle_get_status(State(state)).await.into_response()
}

async fn handle_set_enabled(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let Some(value) = params.get("value") else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'value' parameter");
    };
    let enabled = match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => true,
        "false" | "off" | "0" => false,
        _ => return error_response(StatusCode::BAD_REQUEST, "Invalid value. Use 'true' or 'false'"),
    };

    let notifications = {
        let mut controller = state.controller.lock().await;
        controller.set_enabled(enabled)
    };
    state.notifier.deliver(notifications).await;

    handle_get_status(State(state)).await.into_response()
}

async fn handle_get_errors(State(state): State<AppState>) -> impl IntoResponse {
    let log = state.controller.lock().await.error_log().to_vec();
    Json(log)
}

fn webhook_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|provided| constant_time_eq(provided, secret))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if !webhook_authorized(&headers, state.webhook_secret.as_deref()) {
        warn!("rejected webhook call with missing or wrong secret token");
        return StatusCode::UNAUTHORIZED;
    }

    // Telegram retries non-2xx responses, so malformed updates are acknowledged.
    let update = match serde_json::from_slice::<Update>(&body) {
        Ok(update) => update,
        Err(err) => {
            warn!("ignoring malformed telegram update: {err}");
            return StatusCode::OK;
        }
    };
    debug!(update_id = update.update_id, "telegram update");

    if let Some(query) = update.callback_query {
        handle_callback(&state, query).await;
    } else if let Some(message) = update.message {
        let chat_id = message.chat.id.to_string();
        let command = BotCommand::parse(message.text.as_deref().unwrap_or_default());
        handle_command(&state, &chat_id, command).await;
    }

    StatusCode::OK
}

async fn handle_command(state: &AppState, chat_id: &str, command: BotCommand) {
    match command {
        BotCommand::Start | BotCommand::Help => {
            reply(state, chat_id, bot::help_text(), Some(&bot::main_keyboard())).await;
        }
        BotCommand::Status => {
            let status = state.controller.lock().await.status();
            reply(state, chat_id, &bot::render_status(&status), None).await;
        }
        BotCommand::Weather => {
            let Some(days) = fetch_forecast(state).await else {
                reply(state, chat_id, "Weather is unavailable right now.", None).await;
                return;
            };
            let (text, markup) = bot::render_forecast_page(&days, ForecastPager::new(days.len()));
            reply(state, chat_id, &text, Some(&markup)).await;
        }
        BotCommand::Target => {
            let desired = state.controller.lock().await.desired_temp_c();
            let (text, markup) = bot::render_target(desired);
            reply(state, chat_id, &text, Some(&markup)).await;
        }
        BotCommand::On | BotCommand::Off => {
            let notifications = {
                let mut controller = state.controller.lock().await;
                controller.set_enabled(command == BotCommand::On)
            };
            reply_notifications(state, chat_id, notifications).await;
        }
        BotCommand::Errors => {
            let text = {
                let controller = state.controller.lock().await;
                bot::render_errors(controller.error_log(), state.timezone)
            };
            reply(state, chat_id, &text, None).await;
        }
        BotCommand::Unknown => {
            reply(state, chat_id, "Unknown command. Send /help for the list.", None).await;
        }
    }
}

async fn handle_callback(state: &AppState, query: CallbackQuery) {
    if let Some(telegram) = state.telegram.as_ref() {
        if let Err(err) = telegram.answer_callback_query(&query.id, None).await {
            warn!("failed to answer callback query: {err}");
        }
    }

    let Some(message) = query.message else {
        return;
    };
    let chat_id = message.chat.id.to_string();
    let action = CallbackAction::parse(query.data.as_deref().unwrap_or_default());

    match action {
        CallbackAction::TempUp | CallbackAction::TempDown => {
            let delta = if action == CallbackAction::TempUp { 1 } else { -1 };
            let desired = {
                let mut controller = state.controller.lock().await;
                let desired = controller.adjust_desired_temperature(delta);
                controller.adjust_valve();
                desired
            };
            let (text, markup) = bot::render_target(desired);
            edit(state, &chat_id, message.message_id, &text, Some(&markup)).await;
        }
        CallbackAction::TempSave => {
            let (desired, persisted) = {
                let controller = state.controller.lock().await;
                (
                    controller.desired_temp_c(),
                    controller.persist_desired_temperature(state.store.as_ref()),
                )
            };
            match persisted {
                Ok(()) => {
                    let text = format!("Target temperature saved: {desired}°C");
                    edit(state, &chat_id, message.message_id, &text, None).await;
                }
                Err(err) => {
                    warn!("failed to persist target temperature: {err}");
                    reply(state, &chat_id, "Failed to save the target temperature.", None).await;
                }
            }
        }
        CallbackAction::Day(day) => {
            let Some(days) = fetch_forecast(state).await else {
                reply(state, &chat_id, "Weather is unavailable right now.", None).await;
                return;
            };
            let (text, markup) = bot::render_forecast_page(&days, ForecastPager::at(days.len(), day));
            edit(state, &chat_id, message.message_id, &text, Some(&markup)).await;
        }
        CallbackAction::Unknown => {
            debug!("ignoring unknown callback data {:?}", query.data);
        }
    }
}

async fn fetch_forecast(state: &AppState) -> Option<Vec<DailyForecast>> {
    let weather = state.weather.as_ref()?;
    match weather.daily_forecast().await {
        Ok(days) => Some(days),
        Err(err) => {
            warn!("forecast fetch failed: {err}");
            None
        }
    }
}

async fn reply(state: &AppState, chat_id: &str, text: &str, markup: Option<&ReplyMarkup>) {
    let Some(telegram) = state.telegram.as_ref() else {
        debug!("telegram disabled, dropping reply: {text}");
        return;
    };
    if let Err(err) = telegram.send_message(chat_id, text, markup).await {
        warn!("telegram reply failed: {err}");
    }
}

async fn reply_notifications(state: &AppState, chat_id: &str, notifications: Vec<Notification>) {
    for notification in notifications {
        info!(kind = ?notification.kind, "{}", notification.text);
        reply(state, chat_id, &notification.text, None).await;
    }
}

async fn edit(
    state: &AppState,
    chat_id: &str,
    message_id: i64,
    text: &str,
    markup: Option<&ReplyMarkup>,
) {
    let Some(telegram) = state.telegram.as_ref() else {
        return;
    };
    if let Err(err) = telegram
        .edit_message_text(chat_id, message_id, text, markup)
        .await
    {
        warn!("telegram edit failed: {err}");
    }
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use heatbot_common::{ControllerConfig, NotificationKind};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sensor_body_tolerates_strings_and_garbage() {
        let reading = reading_from_json(&json!({
            "temperature": "22.5",
            "humidity": 41,
            "gas_level": "unknown"
        }));
        assert_eq!(
            reading,
            SensorReading {
                temperature: Some(22.5),
                humidity: Some(41.0),
                gas_level: None,
            }
        );
    }

    #[test]
    fn sensor_body_accepts_alternate_keys() {
        let reading = reading_from_json(&json!({"temp": 19, "gasLevel": 80.5}));
        assert_eq!(reading.temperature, Some(19.0));
        assert_eq!(reading.gas_level, Some(80.5));
        assert_eq!(reading.humidity, None);
    }

    #[test]
    fn mqtt_fields_map_to_single_value_readings() {
        assert_eq!(
            mqtt_reading(TOPIC_SENSOR_HUMIDITY, 44.0),
            Some(SensorReading {
                humidity: Some(44.0),
                ..SensorReading::default()
            })
        );
        assert_eq!(mqtt_reading(TOPIC_SENSOR_FAULT, 1.0), None);
        assert_eq!(mqtt_reading(TOPIC_SENSOR_STATUS, 1.0), None);
    }

    #[test]
    fn mqtt_fields_do_not_flood_the_chat() {
        let mut controller =
            ValveController::new(ControllerConfig::default(), PersistedSettings::default());

        let mut forwarded = Vec::new();
        for (topic, value) in [
            (TOPIC_SENSOR_TEMP, 20.0),
            (TOPIC_SENSOR_HUMIDITY, 41.0),
            (TOPIC_SENSOR_GAS, 6.0),
        ] {
            let reading = mqtt_reading(topic, value).unwrap();
            let (notifications, valve) = ingest(&mut controller, reading, Ingest::Field);
            forwarded.extend(notifications);
            assert_eq!(valve, ValvePosition::Open);
        }
        assert!(forwarded.is_empty());

        let (notifications, _) = ingest(
            &mut controller,
            reading_from_json(&json!({"temperature": 20, "humidity": 41, "gas_level": 6})),
            Ingest::Report,
        );
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Reading);
    }

    #[test]
    fn webhook_secret_must_match_exactly() {
        let mut headers = HeaderMap::new();
        assert!(webhook_authorized(&headers, None));
        assert!(!webhook_authorized(&headers, Some("s3cret")));

        headers.insert(SECRET_HEADER, "s3cret".parse().unwrap());
        assert!(webhook_authorized(&headers, Some("s3cret")));
        assert!(!webhook_authorized(&headers, Some("s3cre")));
        assert!(!webhook_authorized(&headers, Some("s3creT")));
    }

    #[test]
    fn fault_body_variants() {
        assert_eq!(
            fault_from_json(&json!({"fault": "overheat"})),
            Some(FaultKind::Overheat)
        );
        assert_eq!(
            fault_from_json(&json!({"faultKind": "motor_fail"})),
            Some(FaultKind::MotorFail)
        );
        assert_eq!(
            fault_from_json(&json!({"fault_kind": "smoke"})),
            Some(FaultKind::Unknown("smoke".to_string()))
        );
        assert_eq!(fault_from_json(&json!({"fault": "  "})), None);
        assert_eq!(fault_from_json(&json!({"fault": 3})), None);
    }
}
