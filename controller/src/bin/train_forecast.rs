use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, warn};

use heatbot_common::forecast::{parse_weather_csv, train_test_split, ForecastModel};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next().map(PathBuf::from) else {
        bail!("usage: train-forecast <weather_data.csv> [model.json]");
    };
    let model_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("forecast_model.json"));

    let raw = std::fs::read_to_string(&csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;
    let samples = parse_weather_csv(&raw).context("failed to parse weather csv")?;
    info!("loaded {} usable rows from {}", samples.len(), csv_path.display());

    let (train, test) = train_test_split(&samples);
    let model = ForecastModel::fit(&train).context("failed to fit forecast model")?;

    match model.r_squared(&test) {
        Some(score) => info!("held-out R² = {score:.3} over {} rows", test.len()),
        None => warn!("test split too small or constant; no score reported"),
    }

    model
        .save(&model_path)
        .with_context(|| format!("failed to write {}", model_path.display()))?;
    info!("model saved to {}", model_path.display());
    Ok(())
}
