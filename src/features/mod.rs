//! Feature assembly: projects candles and indicators into normalized,
//! fixed-width rows, one per candle, following a configurable schema.

mod schema;

pub use schema::{FeatureSchema, SchemaPreset};

use crate::config::IndicatorConfig;
use crate::error::Result;
use crate::indicators::{IndicatorKind, IndicatorSet};
use crate::kline::{Kline, KlineColumns};
use crate::normalize::{scale_oscillator, validate_range, FieldGroup, RangeTracker};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

/// Every field a feature row can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FeatureField {
    Open,
    High,
    Low,
    Close,
    Volume,
    FastEma,
    SlowEma,
    SuperSlowEma,
    UltraSlowEma,
    FastRsi,
    SlowRsi,
    Macd,
    Signal,
    Histogram,
    Mfi,
    Atr,
}

/// How a field is brought into a bounded range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormRule {
    /// Affine map of the group's batch bounds onto `[-1, 1]`.
    Affine(FieldGroup),
    /// `[0, 100]` oscillator divided into `[0, 1]`.
    Oscillator,
}

impl NormRule {
    /// Range every normalized value of this rule must fall in.
    pub fn range(&self) -> (f64, f64) {
        match self {
            NormRule::Affine(_) => (-1.0, 1.0),
            NormRule::Oscillator => (0.0, 1.0),
        }
    }
}

impl FeatureField {
    pub fn rule(&self) -> NormRule {
        use FeatureField::*;
        match self {
            Open | High | Low | Close | FastEma | SlowEma | SuperSlowEma | UltraSlowEma => {
                NormRule::Affine(FieldGroup::Price)
            }
            Volume => NormRule::Affine(FieldGroup::Volume),
            Macd => NormRule::Affine(FieldGroup::Macd),
            Signal => NormRule::Affine(FieldGroup::Signal),
            Histogram => NormRule::Affine(FieldGroup::Histogram),
            Atr => NormRule::Affine(FieldGroup::Atr),
            FastRsi | SlowRsi | Mfi => NormRule::Oscillator,
        }
    }

    fn indicator(&self) -> Option<IndicatorKind> {
        use FeatureField::*;
        Some(match self {
            Open | High | Low | Close | Volume => return None,
            FastEma => IndicatorKind::FastEma,
            SlowEma => IndicatorKind::SlowEma,
            SuperSlowEma => IndicatorKind::SuperSlowEma,
            UltraSlowEma => IndicatorKind::UltraSlowEma,
            FastRsi => IndicatorKind::FastRsi,
            SlowRsi => IndicatorKind::SlowRsi,
            Macd => IndicatorKind::Macd,
            Signal => IndicatorKind::Signal,
            Histogram => IndicatorKind::Histogram,
            Mfi => IndicatorKind::Mfi,
            Atr => IndicatorKind::Atr,
        })
    }

    fn raw(&self, cols: &KlineColumns, indicators: &IndicatorSet, i: usize) -> Option<f64> {
        match self.indicator() {
            Some(kind) => indicators.get(kind)[i],
            None => Some(match self {
                FeatureField::Open => cols.open[i],
                FeatureField::High => cols.high[i],
                FeatureField::Low => cols.low[i],
                FeatureField::Close => cols.close[i],
                _ => cols.volume[i],
            }),
        }
    }
}

/// Normalized feature rows aligned with the input candles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    pub fields: Vec<FeatureField>,
    pub open_time: Vec<i64>,
    pub rows: Vec<Vec<Option<f64>>>,
    pub bounds: RangeTracker,
}

impl FeatureMatrix {
    /// Project `cols` and `indicators` through `schema`.
    pub fn assemble(cols: &KlineColumns, indicators: &IndicatorSet, schema: &FeatureSchema) -> Self {
        let bounds = RangeTracker::scan(cols, indicators);
        let rows = (0..cols.len())
            .map(|i| {
                schema
                    .fields()
                    .iter()
                    .map(|field| {
                        field
                            .raw(cols, indicators, i)
                            .map(|v| normalize_field(&bounds, *field, v))
                    })
                    .collect()
            })
            .collect();

        Self {
            fields: schema.fields().to_vec(),
            open_time: cols.open_time.clone(),
            rows,
            bounds,
        }
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, field: FeatureField) -> Option<Vec<Option<f64>>> {
        let idx = self.fields.iter().position(|f| *f == field)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Rows where every field is defined, with their candle index.
    pub fn complete_rows(&self) -> impl Iterator<Item = (usize, Vec<f64>)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.iter().copied().collect::<Option<Vec<f64>>>().map(|r| (i, r)))
    }

    /// Map a normalized value of `field` back to its raw scale.
    pub fn denormalize(&self, field: FeatureField, value: f64) -> f64 {
        match field.rule() {
            NormRule::Affine(group) => self.bounds.get(group).unnormalize(value),
            NormRule::Oscillator => value * 100.0,
        }
    }

    /// Check every defined value lies in the range its rule guarantees.
    pub fn validate(&self) -> Result<()> {
        for field in &self.fields {
            let (from, to) = field.rule().range();
            let values: Vec<f64> = self
                .column(*field)
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .collect();
            validate_range(field.as_ref(), &values, from, to)?;
        }
        Ok(())
    }

    /// Tabular view with a millisecond `datetime` column followed by the fields.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let datetime = Series::new("open_time", self.open_time.clone())
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .with_name("datetime");
        let mut columns = vec![datetime];
        for field in &self.fields {
            columns.push(Series::new(field.as_ref(), self.column(*field).unwrap_or_default()));
        }
        Ok(DataFrame::new(columns)?)
    }
}

fn normalize_field(bounds: &RangeTracker, field: FeatureField, value: f64) -> f64 {
    match field.rule() {
        NormRule::Affine(group) => bounds.get(group).normalize(value),
        NormRule::Oscillator => scale_oscillator(value),
    }
}

/// Compute indicators and assemble the feature matrix for a kline slice.
pub fn compute_features(klines: &[Kline], cfg: &IndicatorConfig, schema: &FeatureSchema) -> Result<FeatureMatrix> {
    let indicators = IndicatorSet::compute(klines, cfg)?;
    let cols = KlineColumns::from_klines(klines);
    let matrix = FeatureMatrix::assemble(&cols, &indicators, schema);
    debug!(rows = matrix.len(), width = matrix.width(), "features assembled");
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn klines(n: usize) -> Vec<Kline> {
        (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.35).sin() * 8.0 + i as f64 * 0.1;
                let t = i as i64 * 900_000;
                Kline::from_ohlcv(t, t + 899_999, c - 0.5, c + 1.5, c - 1.5, c, 1_000.0 + (i % 7) as f64 * 50.0)
            })
            .collect()
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            ultra_slow_ema_period: 30,
            super_slow_ema_period: 20,
            slow_ema_period: 10,
            fast_ema_period: 5,
            slow_rsi_period: 14,
            fast_rsi_period: 7,
            mfi_period: 10,
            atr_period: 10,
            macd_fast_period: 6,
            macd_slow_period: 13,
            macd_signal_period: 4,
        }
    }

    #[test]
    fn field_names_round_trip_through_strum() {
        for field in FeatureField::iter() {
            assert_eq!(FeatureField::from_str(field.as_ref()).unwrap(), field);
        }
        assert_eq!(FeatureField::UltraSlowEma.to_string(), "ultra_slow_ema");
    }

    #[test]
    fn rows_match_candles_and_schema_width() {
        let input = klines(80);
        for schema in [FeatureSchema::compact(), FeatureSchema::full()] {
            let m = compute_features(&input, &small_config(), &schema).unwrap();
            assert_eq!(m.len(), 80);
            assert!(m.rows.iter().all(|r| r.len() == schema.width()));
        }
    }

    #[test]
    fn assembled_values_stay_in_their_ranges() {
        let m = compute_features(&klines(120), &small_config(), &FeatureSchema::full()).unwrap();
        m.validate().unwrap();
    }

    #[test]
    fn complete_rows_start_after_warmup() {
        let cfg = small_config();
        let input = klines(60);
        let m = compute_features(&input, &cfg, &FeatureSchema::full()).unwrap();
        let first = m.complete_rows().next().map(|(i, _)| i);
        // slow RSI is the longest undefined prefix
        assert_eq!(first, Some(14));
        assert_eq!(m.complete_rows().count(), 60 - 14);
    }

    #[test]
    fn oscillators_are_scaled_not_bounded() {
        let input = klines(60);
        let cfg = small_config();
        let set = IndicatorSet::compute(&input, &cfg).unwrap();
        let m = FeatureMatrix::assemble(&KlineColumns::from_klines(&input), &set, &FeatureSchema::full());
        let rsi = m.column(FeatureField::FastRsi).unwrap();
        assert_eq!(rsi[30], set.fast_rsi[30].map(|v| v / 100.0));
    }

    #[test]
    fn denormalize_recovers_close() {
        let input = klines(60);
        let m = compute_features(&input, &small_config(), &FeatureSchema::compact()).unwrap();
        let close = m.column(FeatureField::Close).unwrap();
        let back = m.denormalize(FeatureField::Close, close[42].unwrap());
        assert!((back - input[42].close).abs() < 1e-9);
        assert!((m.denormalize(FeatureField::Mfi, 0.5) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn missing_column_is_none() {
        let m = compute_features(&klines(60), &small_config(), &FeatureSchema::compact()).unwrap();
        assert!(m.column(FeatureField::Atr).is_none());
    }

    #[test]
    fn dataframe_has_datetime_and_field_columns() {
        let m = compute_features(&klines(50), &small_config(), &FeatureSchema::compact()).unwrap();
        let df = m.to_dataframe().unwrap();
        assert_eq!(df.shape(), (50, 12));
        assert_eq!(df.get_column_names()[0], "datetime");
        assert_eq!(df.get_column_names()[1], "close");
    }
}
