//! Trailing-window statistics over a raw series.

fn trailing_deltas(series: &[f64], window: usize) -> impl Iterator<Item = f64> + '_ {
    let transitions = window.max(1).min(series.len().saturating_sub(1));
    series[series.len() - transitions - 1..]
        .windows(2)
        .map(|w| w[1] - w[0])
}

/// Mean signed change over the last `window` transitions.
/// Returns 1.0 when the series has fewer than two points.
pub fn series_trend(series: &[f64], window: usize) -> f64 {
    if series.len() < 2 {
        return 1.0;
    }
    mean(trailing_deltas(series, window))
}

/// Mean absolute change over the last `window` transitions.
/// Returns 1.0 when the series has fewer than two points.
pub fn series_volatility(series: &[f64], window: usize) -> f64 {
    if series.len() < 2 {
        return 1.0;
    }
    mean(trailing_deltas(series, window).map(f64::abs))
}

/// Mean divided by sample standard deviation (n−1 divisor).
/// Returns 0.0 for fewer than two points or zero deviation.
pub fn sharpe_ratio(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let m = mean(series.iter().copied());
    let var = series.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (series.len() - 1) as f64;
    let std = var.sqrt();
    if std == 0.0 {
        return 0.0;
    }
    m / std
}

/// Largest value among the last `window` points.
pub fn series_ceiling(series: &[f64], window: usize) -> Option<f64> {
    trailing(series, window)?.iter().copied().reduce(f64::max)
}

/// Steps since the window's maximum first occurred; 0 when it is the latest point.
pub fn index_since_ceiling(series: &[f64], window: usize) -> Option<usize> {
    let tail = trailing(series, window)?;
    let (pos, _) = tail
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) });
    Some(tail.len() - 1 - pos)
}

fn trailing(series: &[f64], window: usize) -> Option<&[f64]> {
    if series.is_empty() || window == 0 {
        return None;
    }
    Some(&series[series.len().saturating_sub(window)..])
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_averages_recent_deltas() {
        assert_eq!(series_trend(&[1.0, 2.0, 3.0, 4.0], 2), 1.0);
        assert_eq!(series_trend(&[10.0, 1.0, 2.0, 4.0], 2), 1.5);
        // window larger than the series uses every transition
        assert_eq!(series_trend(&[4.0, 2.0, 0.0], 10), -2.0);
    }

    #[test]
    fn volatility_averages_absolute_deltas() {
        assert_eq!(series_volatility(&[1.0, 3.0, 2.0, 5.0], 3), 2.0);
        assert_eq!(series_volatility(&[1.0, 3.0, 2.0, 5.0], 1), 3.0);
    }

    #[test]
    fn short_series_default_to_one() {
        assert_eq!(series_trend(&[5.0], 3), 1.0);
        assert_eq!(series_volatility(&[], 3), 1.0);
    }

    #[test]
    fn zero_window_uses_last_transition() {
        assert_eq!(series_trend(&[1.0, 2.0, 5.0], 0), 3.0);
    }

    #[test]
    fn sharpe_uses_sample_deviation() {
        // mean 2, sample variance 1
        assert!((sharpe_ratio(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert_eq!(sharpe_ratio(&[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(sharpe_ratio(&[4.0]), 0.0);
    }

    #[test]
    fn ceiling_over_trailing_window() {
        let s = [9.0, 1.0, 5.0, 3.0, 2.0];
        assert_eq!(series_ceiling(&s, 3), Some(5.0));
        assert_eq!(series_ceiling(&s, 50), Some(9.0));
        assert_eq!(series_ceiling(&[], 3), None);
        assert_eq!(series_ceiling(&s, 0), None);
    }

    #[test]
    fn steps_since_ceiling() {
        let s = [9.0, 1.0, 5.0, 3.0, 2.0];
        assert_eq!(index_since_ceiling(&s, 3), Some(2));
        assert_eq!(index_since_ceiling(&s, 5), Some(4));
        assert_eq!(index_since_ceiling(&[1.0, 2.0, 3.0], 3), Some(0));
        // ties resolve to the first occurrence
        assert_eq!(index_since_ceiling(&[3.0, 1.0, 3.0], 3), Some(2));
    }
}
