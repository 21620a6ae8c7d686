use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("telegram is not configured")]
    NotConfigured,
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram rejected {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather service returned no forecast entries")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ThingSpeakError {
    #[error("thingspeak request failed: {0}")]
    Http(#[from] reqwest::Error),
}
