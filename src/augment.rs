//! Synthetic augmentation: noise-perturbed copies of a kline batch.

use crate::error::{FeatureError, Result};
use crate::kline::Kline;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RNG for reproducible augmentation runs.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Copy of `klines` with each OHLCV field multiplied by its own
/// `1 + u`, `u ~ U[-percent/100, +percent/100]`. Timestamps and the trailing
/// exchange fields are kept as-is.
pub fn perturb_klines<R: Rng + ?Sized>(klines: &[Kline], percent: f64, rng: &mut R) -> Result<Vec<Kline>> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(FeatureError::InvalidConfig(format!(
            "noise percent must be a non-negative number, got {percent}"
        )));
    }
    let spread = percent / 100.0;
    let mut jitter = |v: f64| v * (1.0 + rng.gen_range(-spread..=spread));

    Ok(klines
        .iter()
        .map(|k| Kline {
            open: jitter(k.open),
            high: jitter(k.high),
            low: jitter(k.low),
            close: jitter(k.close),
            volume: jitter(k.volume),
            ..k.clone()
        })
        .collect())
}
