use super::ema::ema;

/// MACD line, signal line and histogram, each as long as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD from two full-length EMAs; there is no warm-up gap because the EMAs
/// are defined from the first bar.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let macd_line: Vec<f64> = ema(prices, fast)
        .iter()
        .zip(ema(prices, slow))
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();
    Macd {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}
