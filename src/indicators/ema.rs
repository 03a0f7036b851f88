/// Exponential Moving Average over a whole price series.
///
/// Behaviour:
///   bar 0  → value = price (first observation, no SMA warm-up)
///   bar 1+ → value = k·price + (1−k)·prev   where k = 2/(period+1)
///
/// The output has the same length as the input and no undefined values.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    let k = smoothing(period);
    prices
        .iter()
        .scan(None::<f64>, |prev, &price| {
            let value = match *prev {
                None => price,
                Some(p) => price * k + p * (1.0 - k),
            };
            *prev = Some(value);
            Some(value)
        })
        .collect()
}

/// Smoothing constant `2 / (period + 1)`.
pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeds_with_first_price() {
        // period 3 → k = 0.5
        let out = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 10.0).abs() < 1e-10);
        assert!((out[1] - 10.5).abs() < 1e-10);
        assert!((out[2] - 11.25).abs() < 1e-10);
        assert!((out[3] - 12.125).abs() < 1e-10);
    }

    #[test]
    fn test_ema_length_matches_input_for_all_periods() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin()).collect();
        for period in 1..30 {
            let out = ema(&prices, period);
            assert_eq!(out.len(), prices.len());
            assert_eq!(out[0], prices[0]);
        }
    }

    #[test]
    fn test_ema_period_one_tracks_price() {
        let prices = [3.0, 7.0, 1.0];
        assert_eq!(ema(&prices, 1), prices.to_vec());
    }

    #[test]
    fn test_ema_empty_input() {
        assert!(ema(&[], 10).is_empty());
    }
}
