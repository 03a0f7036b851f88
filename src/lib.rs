//! Turns exchange kline batches into technical indicators and bounded,
//! model-ready feature rows.

pub mod augment;
pub mod config;
pub mod error;
pub mod features;
pub mod indicators;
pub mod kline;
pub mod normalize;
pub mod pipeline;
pub mod stats;
pub mod utils;

pub use config::{IndicatorConfig, OutputShape, PipelineConfig};
pub use error::{FeatureError, Result};
pub use features::{FeatureField, FeatureMatrix, FeatureSchema};
pub use indicators::{IndicatorKind, IndicatorRecord, IndicatorSet};
pub use kline::{Kline, KlineColumns};
pub use normalize::{normalize, unnormalize, Bounds, RangeTracker};
pub use pipeline::{FeaturePipeline, PipelineOutput};
