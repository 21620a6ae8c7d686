use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use heatbot_common::{ForecastModel, WeatherConfig};

use crate::error::WeatherError;

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainBlock,
    #[serde(default)]
    pub clouds: Option<CloudBlock>,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct CloudBlock {
    pub all: f64,
}

#[derive(Debug, Deserialize)]
pub struct ConditionBlock {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
    pub clouds: f64,
    pub description: String,
    pub predicted_temp: Option<f64>,
}

#[derive(Default)]
struct DayAccumulator {
    temp_min: f64,
    temp_max: f64,
    humidity_sum: f64,
    clouds_sum: f64,
    samples: usize,
    descriptions: HashMap<String, usize>,
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
    timezone: Tz,
    model: Option<ForecastModel>,
}

impl WeatherClient {
    pub fn new(
        http: reqwest::Client,
        config: WeatherConfig,
        timezone: Tz,
        model: Option<ForecastModel>,
    ) -> Self {
        Self {
            http,
            config,
            timezone,
            model,
        }
    }

    pub fn days(&self) -> usize {
        usize::from(self.config.forecast_days)
    }

    pub async fn daily_forecast(&self) -> Result<Vec<DailyForecast>, WeatherError> {
        let response: ForecastResponse = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("q", self.config.city.as_str()),
                ("appid", self.config.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let days = group_by_day(&response.list, self.timezone, self.days(), self.model.as_ref());
        if days.is_empty() {
            return Err(WeatherError::Empty);
        }
        Ok(days)
    }
}

/// Folds 3-hourly entries into per-day summaries in local time.
pub fn group_by_day(
    entries: &[ForecastEntry],
    timezone: Tz,
    max_days: usize,
    model: Option<&ForecastModel>,
) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for entry in entries {
        let Some(at) = DateTime::<Utc>::from_timestamp(entry.dt, 0) else {
            continue;
        };
        let date = at.with_timezone(&timezone).date_naive();
        let low = entry.main.temp_min.unwrap_or(entry.main.temp);
        let high = entry.main.temp_max.unwrap_or(entry.main.temp);

        let day = days.entry(date).or_insert_with(|| DayAccumulator {
            temp_min: f64::INFINITY,
            temp_max: f64::NEG_INFINITY,
            ..DayAccumulator::default()
        });
        day.temp_min = day.temp_min.min(low);
        day.temp_max = day.temp_max.max(high);
        day.humidity_sum += entry.main.humidity;
        day.clouds_sum += entry.clouds.as_ref().map_or(0.0, |c| c.all);
        day.samples += 1;
        if let Some(condition) = entry.weather.first() {
            *day.descriptions.entry(condition.description.clone()).or_default() += 1;
        }
    }

    days.into_iter()
        .take(max_days)
        .map(|(date, day)| {
            let samples = day.samples.max(1) as f64;
            let humidity = day.humidity_sum / samples;
            let clouds = day.clouds_sum / samples;
            let description = day
                .descriptions
                .into_iter()
                .max_by(|(a_text, a_count), (b_text, b_count)| {
                    a_count.cmp(b_count).then_with(|| b_text.cmp(a_text))
                })
                .map(|(text, _)| text)
                .unwrap_or_default();

            DailyForecast {
                date,
                temp_min: day.temp_min,
                temp_max: day.temp_max,
                humidity,
                clouds,
                description,
                predicted_temp: model.map(|model| model.predict(humidity, clouds)),
            }
        })
        .collect()
}
