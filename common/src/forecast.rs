//! Degree-2 polynomial regression from humidity and cloud cover to temperature.
//!
//! Six coefficients over the features `[1, h, c, h², h·c, c²]`, where `h` and
//! `c` are humidity and cloud cover as fractions (percent / 100), fitted with
//! ordinary least squares.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FEATURE_COUNT: usize = 6;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("need at least {needed} samples to fit, got {got}")]
    NotEnoughSamples { needed: usize, got: usize },
    #[error("samples do not determine a unique fit")]
    Singular,
    #[error("model file is invalid: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv is missing the '{0}' column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub humidity: f64,
    pub clouds: f64,
    pub temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastModel {
    pub coefficients: [f64; FEATURE_COUNT],
}

fn features(humidity: f64, clouds: f64) -> [f64; FEATURE_COUNT] {
    let humidity = humidity / 100.0;
    let clouds = clouds / 100.0;
    [
        1.0,
        humidity,
        clouds,
        humidity * humidity,
        humidity * clouds,
        clouds * clouds,
    ]
}

impl ForecastModel {
    pub fn fit(samples: &[Sample]) -> Result<Self, ModelError> {
        if samples.len() < FEATURE_COUNT {
            return Err(ModelError::NotEnoughSamples {
                needed: FEATURE_COUNT,
                got: samples.len(),
            });
        }

        // Normal equations: (XᵀX) β = Xᵀy
        let mut xtx = [[0.0_f64; FEATURE_COUNT]; FEATURE_COUNT];
        let mut xty = [0.0_f64; FEATURE_COUNT];
        for sample in samples {
            let row = features(sample.humidity, sample.clouds);
            for i in 0..FEATURE_COUNT {
                xty[i] += row[i] * sample.temp;
                for j in 0..FEATURE_COUNT {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }

        let coefficients = solve(xtx, xty).ok_or(ModelError::Singular)?;
        Ok(Self { coefficients })
    }

    pub fn predict(&self, humidity: f64, clouds: f64) -> f64 {
        features(humidity, clouds)
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, b)| x * b)
            .sum()
    }

    /// Coefficient of determination over `samples`; 1.0 is a perfect fit.
    pub fn r_squared(&self, samples: &[Sample]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mean = samples.iter().map(|s| s.temp).sum::<f64>() / samples.len() as f64;
        let total: f64 = samples.iter().map(|s| (s.temp - mean).powi(2)).sum();
        let residual: f64 = samples
            .iter()
            .map(|s| (s.temp - self.predict(s.humidity, s.clouds)).powi(2))
            .sum();
        if total == 0.0 {
            return None;
        }
        Some(1.0 - residual / total)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = fs::read(path)?;
        let model: Self = serde_json::from_slice(&raw)?;
        if model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Singular);
        }
        Ok(model)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(
    mut a: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut b: [f64; FEATURE_COUNT],
) -> Option<[f64; FEATURE_COUNT]> {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let epsilon = scale.max(1.0) * 1e-12;

    for col in 0..FEATURE_COUNT {
        let pivot = (col..FEATURE_COUNT)
            .max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot][col].abs() < epsilon {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..FEATURE_COUNT {
            let factor = a[row][col] / a[col][col];
            for k in col..FEATURE_COUNT {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0_f64; FEATURE_COUNT];
    for row in (0..FEATURE_COUNT).rev() {
        let tail: f64 = ((row + 1)..FEATURE_COUNT).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Parses weather history with at least `temp`, `humidity` and `clouds` columns.
///
/// Rows with a missing or non-numeric value in any of them are dropped.
pub fn parse_weather_csv(raw: &str) -> Result<Vec<Sample>, ModelError> {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .map(|line| line.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let column = |name: &'static str| {
        header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or(ModelError::MissingColumn(name))
    };
    let temp_idx = column("temp")?;
    let humidity_idx = column("humidity")?;
    let clouds_idx = column("clouds")?;

    let samples = lines
        .filter_map(|line| {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            let value = |idx: usize| {
                cells
                    .get(idx)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
            };
            Some(Sample {
                temp: value(temp_idx)?,
                humidity: value(humidity_idx)?,
                clouds: value(clouds_idx)?,
            })
        })
        .collect();
    Ok(samples)
}

/// Deterministic 80/20 split: every fifth sample goes to the test set.
pub fn train_test_split(samples: &[Sample]) -> (Vec<Sample>, Vec<Sample>) {
    let mut train = Vec::with_capacity(samples.len());
    let mut test = Vec::with_capacity(samples.len() / 5 + 1);
    for (idx, sample) in samples.iter().enumerate() {
        if idx % 5 == 4 {
            test.push(*sample);
        } else {
            train.push(*sample);
        }
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let humidity = 20.0 + (i % 13) as f64 * 5.0;
                let clouds = (i * 7 % 100) as f64;
                let temp = 30.0 - 0.2 * humidity - 0.05 * clouds + 0.001 * humidity * clouds;
                Sample {
                    humidity,
                    clouds,
                    temp,
                }
            })
            .collect()
    }

    #[test]
    fn recovers_exact_quadratic() {
        let samples = synthetic(60);
        let model = ForecastModel::fit(&samples).unwrap();

        for sample in &samples {
            let predicted = model.predict(sample.humidity, sample.clouds);
            assert!((predicted - sample.temp).abs() < 1e-6, "{predicted} vs {}", sample.temp);
        }
        let r2 = model.r_squared(&samples).unwrap();
        assert!(r2 > 0.999_999);
    }

    #[test]
    fn too_few_samples_is_rejected() {
        let err = ForecastModel::fit(&synthetic(3)).unwrap_err();
        assert!(matches!(err, ModelError::NotEnoughSamples { needed: 6, got: 3 }));
    }

    #[test]
    fn constant_inputs_are_singular() {
        let samples = vec![
            Sample {
                humidity: 50.0,
                clouds: 10.0,
                temp: 20.0,
            };
            10
        ];
        assert!(matches!(ForecastModel::fit(&samples), Err(ModelError::Singular)));
    }

    #[test]
    fn csv_parsing_skips_bad_rows() {
        let raw = "dt,temp,humidity,clouds\n1,20.5,40,10\n2,,50,20\n3,19,abc,30\n\n4,18.0,60,75\n";
        let samples = parse_weather_csv(raw).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample {
                    humidity: 40.0,
                    clouds: 10.0,
                    temp: 20.5
                },
                Sample {
                    humidity: 60.0,
                    clouds: 75.0,
                    temp: 18.0
                },
            ]
        );
    }

    #[test]
    fn csv_without_required_column_fails() {
        let err = parse_weather_csv("temp,humidity\n1,2\n").unwrap_err();
        assert!(matches!(err, ModelError::MissingColumn("clouds")));
    }

    #[test]
    fn split_is_eighty_twenty() {
        let (train, test) = train_test_split(&synthetic(50));
        assert_eq!(train.len(), 40);
        assert_eq!(test.len(), 10);
    }

    #[test]
    fn model_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("heatbot-model-{}.json", std::process::id()));
        let model = ForecastModel::fit(&synthetic(30)).unwrap();
        model.save(&path).unwrap();

        let loaded = ForecastModel::load(&path).unwrap();
        assert_eq!(loaded, model);
        let _ = fs::remove_file(path);
    }
}
