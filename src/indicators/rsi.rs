use crate::error::{FeatureError, Result};

/// RSI (Relative Strength Index) with Wilder smoothing of avg gain/loss.
///
/// Needs at least `period + 1` prices. The first value is built from simple
/// averages over the first `period` deltas and corresponds to price index
/// `period`, so the output holds `prices.len() - period` values with no
/// leading padding. A zero average loss yields 100.
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<f64>> {
    let required = period + 1;
    if period == 0 || prices.len() < required {
        return Err(FeatureError::InsufficientDataForIndicator {
            indicator: "rsi",
            len: prices.len(),
            required,
        });
    }

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let w = period as f64;

    let (gain_sum, loss_sum) = deltas[..period]
        .iter()
        .fold((0.0, 0.0), |(g, l), &d| (g + d.max(0.0), l + (-d).max(0.0)));
    let (mut avg_gain, mut avg_loss) = (gain_sum / w, loss_sum / w);

    let mut out = Vec::with_capacity(prices.len() - period);
    out.push(rsi_value(avg_gain, avg_loss));
    for &d in &deltas[period..] {
        avg_gain = (avg_gain * (w - 1.0) + d.max(0.0)) / w;
        avg_loss = (avg_loss * (w - 1.0) + d.min(0.0).abs()) / w;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    Ok(out)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}
