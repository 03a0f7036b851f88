//! End-to-end batch transform: klines → indicators → bounds → feature rows.

use crate::config::{OutputShape, PipelineConfig};
use crate::error::Result;
use crate::features::FeatureMatrix;
use crate::indicators::{IndicatorRecord, IndicatorSet};
use crate::kline::{format_time, Kline, KlineColumns};
use crate::utils::measure_time;
use serde::Serialize;
use tracing::info;

/// Output of one pipeline run, shaped by [`OutputShape`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PipelineOutput {
    Records(Vec<IndicatorRecord>),
    Matrix(FeatureMatrix),
}

impl PipelineOutput {
    pub fn len(&self) -> usize {
        match self {
            PipelineOutput::Records(r) => r.len(),
            PipelineOutput::Matrix(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn indicators(&self, klines: &[Kline]) -> Result<IndicatorSet> {
        measure_time("Indicator computation", || {
            IndicatorSet::compute(klines, &self.config.indicators)
        })
    }

    pub fn features(&self, klines: &[Kline]) -> Result<FeatureMatrix> {
        let indicators = self.indicators(klines)?;
        Ok(self.assemble(klines, &indicators))
    }

    pub fn run(&self, klines: &[Kline]) -> Result<PipelineOutput> {
        if let (Some(first), Some(last)) = (klines.first(), klines.last()) {
            info!(
                candles = klines.len(),
                from = %format_time(first.open_time),
                to = %format_time(last.close_time),
                output = ?self.config.output,
                "running feature pipeline"
            );
        }
        let indicators = self.indicators(klines)?;
        Ok(match self.config.output {
            OutputShape::Records => PipelineOutput::Records(indicators.records(klines)),
            OutputShape::Matrix => PipelineOutput::Matrix(self.assemble(klines, &indicators)),
        })
    }

    fn assemble(&self, klines: &[Kline], indicators: &IndicatorSet) -> FeatureMatrix {
        measure_time("Feature assembly", || {
            let cols = KlineColumns::from_klines(klines);
            FeatureMatrix::assemble(&cols, indicators, &self.config.schema)
        })
    }
}
