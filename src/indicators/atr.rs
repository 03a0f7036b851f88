/// True range per bar. Bar 0 has no previous close, so `high[0]` stands in
/// for it, which reduces to `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..high.len())
        .map(|i| {
            let prev_close = if i == 0 { high[0] } else { close[i - 1] };
            (high[i] - low[i])
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs())
        })
        .collect()
}

/// Average True Range with Wilder smoothing.
///
/// Indices below `period` are `None`. Index `period` is the simple mean of
/// the true ranges at indices `0..=period`; later bars use
/// `ATR = (prev_ATR * (N-1) + TR) / N`.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    let tr = true_range(high, low, close);
    let mut out = vec![None; tr.len()];
    if period == 0 || tr.len() <= period {
        return out;
    }

    let seed = tr[..=period].iter().sum::<f64>() / (period + 1) as f64;
    out[period] = Some(seed);

    let n = period as f64;
    let mut prev = seed;
    for (i, &range) in tr.iter().enumerate().skip(period + 1) {
        prev = (prev * (n - 1.0) + range) / n;
        out[i] = Some(prev);
    }
    out
}
