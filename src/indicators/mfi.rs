use super::RingBuf;

/// Money Flow Index over a rolling window of classified money flows.
///
/// Each bar after the first contributes `typical_price * volume` to the
/// positive window if its typical price rose, to the negative window if it
/// fell, and to neither on a tie. Both windows hold at most `period` flows
/// and evict oldest-first, so they count flow events rather than bars.
/// Indices below `period` are `None`; a series shorter than `period` is
/// entirely `None`. A zero negative sum yields 100.
pub fn mfi(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = close.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let typical: Vec<f64> = (0..n).map(|i| (high[i] + low[i] + close[i]) / 3.0).collect();
    let mut window = FlowWindow::new(period);

    for i in 1..n {
        window.record(typical[i], typical[i - 1], volume[i]);
        if i >= period {
            out[i] = Some(window.index());
        }
    }
    out
}

/// Positive/negative flow windows with shared capacity.
#[derive(Debug, Clone)]
pub(crate) struct FlowWindow {
    positive: RingBuf,
    negative: RingBuf,
}

impl FlowWindow {
    pub(crate) fn new(period: usize) -> Self {
        Self {
            positive: RingBuf::new(period),
            negative: RingBuf::new(period),
        }
    }

    pub(crate) fn record(&mut self, typical: f64, prev_typical: f64, volume: f64) {
        let flow = typical * volume;
        if typical > prev_typical {
            self.positive.push(flow);
        } else if typical < prev_typical {
            self.negative.push(flow);
        }
    }

    pub(crate) fn index(&self) -> f64 {
        let negative = self.negative.sum();
        if negative == 0.0 {
            return 100.0;
        }
        100.0 - 100.0 / (1.0 + self.positive.sum() / negative)
    }

    #[cfg(test)]
    fn lens(&self) -> (usize, usize) {
        (self.positive.len(), self.negative.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let high = closes.iter().map(|c| c + 1.0).collect();
        let low = closes.iter().map(|c| c - 1.0).collect();
        let volume = vec![10.0; closes.len()];
        (high, low, closes.to_vec(), volume)
    }

    #[test]
    fn short_series_is_all_undefined() {
        let (h, l, c, v) = bars(&[1.0, 2.0, 3.0]);
        assert_eq!(mfi(&h, &l, &c, &v, 5), vec![None; 3]);
    }

    #[test]
    fn defined_from_period_onwards() {
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + ((i * 3) % 7) as f64).collect();
        let (h, l, c, v) = bars(&closes);
        let out = mfi(&h, &l, &c, &v, 5);
        assert!(out[..5].iter().all(Option::is_none));
        assert!(out[5..].iter().all(|x| matches!(x, Some(v) if (0.0..=100.0).contains(v))));
    }

    #[test]
    fn rising_prices_give_100() {
        let closes: Vec<f64> = (1..=15).map(f64::from).collect();
        let (h, l, c, v) = bars(&closes);
        let out = mfi(&h, &l, &c, &v, 4);
        assert!(out[4..].iter().all(|x| *x == Some(100.0)));
    }

    #[test]
    fn flat_prices_give_100() {
        let (h, l, c, v) = bars(&[7.0; 10]);
        let out = mfi(&h, &l, &c, &v, 3);
        assert!(out[3..].iter().all(|x| *x == Some(100.0)));
    }

    #[test]
    fn mixed_flows_match_hand_computation() {
        // typical prices follow closes: up, down, up ; period 3
        let (h, l, c, v) = bars(&[10.0, 11.0, 10.0, 12.0]);
        let out = mfi(&h, &l, &c, &v, 3);
        let pos = 11.0 * 10.0 + 12.0 * 10.0;
        let neg = 10.0 * 10.0;
        let expected = 100.0 - 100.0 / (1.0 + pos / neg);
        assert!((out[3].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn ties_do_not_append_flows() {
        let mut window = FlowWindow::new(3);
        window.record(10.0, 9.0, 1.0);
        window.record(10.0, 10.0, 1.0);
        assert_eq!(window.lens(), (1, 0));
    }

    #[test]
    fn windows_never_exceed_period() {
        let mut window = FlowWindow::new(4);
        let mut prev = 100.0;
        for i in 0..500 {
            let typical = 100.0 + ((i * 13) % 11) as f64;
            window.record(typical, prev, 1.0 + i as f64);
            prev = typical;
            let (p, n) = window.lens();
            assert!(p <= 4 && n <= 4);
        }
    }
}
