//! Batch range tracking and affine normalization.
//!
//! Bounds come from the completed batch, so the normalized value of an early
//! row depends on extremes seen later. There is no streaming variant.

use crate::error::{FeatureError, Result};
use crate::indicators::IndicatorSet;
use crate::kline::KlineColumns;
use serde::Serialize;
use strum::Display;
use tracing::debug;

/// Observed `[min, max]` of a field group. Empty groups stay degenerate at `0..0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

impl Bounds {
    /// Bounds over the finite values of `values`.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Bounds>, v| {
                Some(match acc {
                    None => Bounds { min: v, max: v },
                    Some(b) => Bounds {
                        min: b.min.min(v),
                        max: b.max.max(v),
                    },
                })
            })
            .unwrap_or_default()
    }

    /// Bounds over the defined, finite entries of an indicator series.
    pub fn from_series(series: &[Option<f64>]) -> Self {
        Self::from_values(series.iter().flatten().copied())
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn normalize(&self, value: f64) -> f64 {
        normalize(value, self.min, self.max)
    }

    pub fn unnormalize(&self, value: f64) -> f64 {
        unnormalize(value, self.min, self.max)
    }
}

/// Map `value` from `[min, max]` into `[-1, 1]`. A degenerate range maps to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        return 0.0;
    }
    ((value - min) / (max - min)) * 2.0 - 1.0
}

/// Inverse of [`normalize`] for `min < max`.
pub fn unnormalize(value: f64, min: f64, max: f64) -> f64 {
    ((value + 1.0) / 2.0) * (max - min) + min
}

/// Scale a `[0, 100]` oscillator (RSI, MFI) into `[0, 1]`.
pub fn scale_oscillator(value: f64) -> f64 {
    value / 100.0
}

/// Check every value of an already-normalized series lies within `[from, to]`.
pub fn validate_range(field: &str, values: &[f64], from: f64, to: f64) -> Result<()> {
    match values
        .iter()
        .enumerate()
        .find(|(_, v)| !(from..=to).contains(*v))
    {
        Some((index, &value)) => Err(FeatureError::OutOfRange {
            field: field.to_string(),
            index,
            value,
            from,
            to,
        }),
        None => Ok(()),
    }
}

/// Field groups that share a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FieldGroup {
    Price,
    Volume,
    Macd,
    Signal,
    Histogram,
    Atr,
}

/// Bounds for every field group of one batch.
///
/// The price group is folded over open, high, low, close and the four EMAs,
/// so every price-like field lands in `[-1, 1]` even for bars whose open or
/// close sits outside their own high/low.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RangeTracker {
    pub price: Bounds,
    pub volume: Bounds,
    pub macd: Bounds,
    pub signal: Bounds,
    pub histogram: Bounds,
    pub atr: Bounds,
}

impl RangeTracker {
    pub fn scan(cols: &KlineColumns, indicators: &IndicatorSet) -> Self {
        let candle_prices = [&cols.open, &cols.high, &cols.low, &cols.close]
            .into_iter()
            .flat_map(|series| series.iter().copied());
        let ema_prices = [
            &indicators.fast_ema,
            &indicators.slow_ema,
            &indicators.super_slow_ema,
            &indicators.ultra_slow_ema,
        ]
        .into_iter()
        .flat_map(|series| series.iter().flatten().copied());
        let price = Bounds::from_values(candle_prices.chain(ema_prices));
        let tracker = Self {
            price,
            volume: Bounds::from_values(cols.volume.iter().copied()),
            macd: Bounds::from_series(&indicators.macd),
            signal: Bounds::from_series(&indicators.signal),
            histogram: Bounds::from_series(&indicators.histogram),
            atr: Bounds::from_series(&indicators.atr),
        };
        debug!(
            price_min = tracker.price.min,
            price_max = tracker.price.max,
            volume_max = tracker.volume.max,
            "range tracked"
        );
        tracker
    }

    pub fn get(&self, group: FieldGroup) -> Bounds {
        match group {
            FieldGroup::Price => self.price,
            FieldGroup::Volume => self.volume,
            FieldGroup::Macd => self.macd,
            FieldGroup::Signal => self.signal,
            FieldGroup::Histogram => self.histogram,
            FieldGroup::Atr => self.atr,
        }
    }
}
