//! Pipeline configuration: lookback periods, feature projection and output shape.
//!
//! Every struct deserializes with `#[serde(default)]`, so a JSON file only
//! needs the keys it overrides.

use crate::error::{FeatureError, Result};
use crate::features::FeatureSchema;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ultra_slow_ema_period: usize,
    pub super_slow_ema_period: usize,
    pub slow_ema_period: usize,
    pub fast_ema_period: usize,
    pub slow_rsi_period: usize,
    pub fast_rsi_period: usize,
    pub mfi_period: usize,
    pub atr_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ultra_slow_ema_period: 200,
            super_slow_ema_period: 50,
            slow_ema_period: 21,
            fast_ema_period: 9,
            slow_rsi_period: 14,
            fast_rsi_period: 7,
            mfi_period: 14,
            atr_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
        }
    }
}

impl IndicatorConfig {
    fn periods(&self) -> [(&'static str, usize); 11] {
        [
            ("ultra_slow_ema_period", self.ultra_slow_ema_period),
            ("super_slow_ema_period", self.super_slow_ema_period),
            ("slow_ema_period", self.slow_ema_period),
            ("fast_ema_period", self.fast_ema_period),
            ("slow_rsi_period", self.slow_rsi_period),
            ("fast_rsi_period", self.fast_rsi_period),
            ("mfi_period", self.mfi_period),
            ("atr_period", self.atr_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
        ]
    }

    /// Largest lookback any indicator needs; a batch must be strictly longer.
    pub fn max_period(&self) -> usize {
        self.periods().iter().map(|(_, p)| *p).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((name, _)) = self.periods().iter().find(|(_, p)| *p == 0) {
            return Err(FeatureError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return Err(FeatureError::InvalidConfig(format!(
                "macd_fast_period ({}) must be below macd_slow_period ({})",
                self.macd_fast_period, self.macd_slow_period
            )));
        }
        Ok(())
    }
}

/// Which representation the pipeline returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// One structured record per candle with raw indicator values.
    Records,
    /// One normalized feature row per candle.
    #[default]
    Matrix,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub indicators: IndicatorConfig,
    pub schema: FeatureSchema,
    pub output: OutputShape,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.schema.validate()
    }
}
