//! Recurrence indicator engine: EMA family, Wilder ATR/RSI, MACD and MFI,
//! aggregated into index-aligned series for a whole kline batch.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod mfi;
pub mod rsi;

use crate::config::IndicatorConfig;
use crate::error::{FeatureError, Result};
use crate::kline::{Kline, KlineColumns};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use tracing::debug;

/// Fixed-capacity ring buffer; pushing into a full buffer evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RingBuf {
    buf: Vec<f64>,
    pos: usize,
    len: usize,
    cap: usize,
}

impl RingBuf {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity],
            pos: 0,
            len: 0,
            cap: capacity,
        }
    }

    pub fn push(&mut self, val: f64) {
        if self.cap == 0 {
            return;
        }
        self.buf[self.pos] = val;
        self.pos = (self.pos + 1) % self.cap;
        if self.len < self.cap {
            self.len += 1;
        }
    }

    pub fn full(&self) -> bool {
        self.len == self.cap
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over values in insertion order (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.len < self.cap { 0 } else { self.pos };
        (0..self.len).map(move |i| self.buf[(start + i) % self.cap])
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }
}

/// Every series the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum IndicatorKind {
    FastEma,
    SlowEma,
    SuperSlowEma,
    UltraSlowEma,
    FastRsi,
    SlowRsi,
    Macd,
    Signal,
    Histogram,
    Mfi,
    Atr,
}

/// Index-aligned indicator series for one kline batch.
///
/// Every series has one entry per candle and `None` marks an index without
/// enough lookback. RSI is stored aligned to candles: its first `period`
/// entries are `None` even though [`rsi::rsi`] itself returns an unpadded
/// series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub fast_ema: Vec<Option<f64>>,
    pub slow_ema: Vec<Option<f64>>,
    pub super_slow_ema: Vec<Option<f64>>,
    pub ultra_slow_ema: Vec<Option<f64>>,
    pub fast_rsi: Vec<Option<f64>>,
    pub slow_rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
    pub mfi: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

impl IndicatorSet {
    /// Compute every indicator for `klines`.
    ///
    /// Fails with [`FeatureError::InsufficientData`] before doing any work when
    /// the batch is not longer than the largest configured period.
    pub fn compute(klines: &[Kline], cfg: &IndicatorConfig) -> Result<Self> {
        cfg.validate()?;
        let required = cfg.max_period();
        if klines.len() <= required {
            return Err(FeatureError::InsufficientData {
                candles: klines.len(),
                required,
            });
        }

        let cols = KlineColumns::from_klines(klines);
        let macd = macd::macd(
            &cols.close,
            cfg.macd_fast_period,
            cfg.macd_slow_period,
            cfg.macd_signal_period,
        );

        let set = Self {
            fast_ema: defined(ema::ema(&cols.close, cfg.fast_ema_period)),
            slow_ema: defined(ema::ema(&cols.close, cfg.slow_ema_period)),
            super_slow_ema: defined(ema::ema(&cols.close, cfg.super_slow_ema_period)),
            ultra_slow_ema: defined(ema::ema(&cols.close, cfg.ultra_slow_ema_period)),
            fast_rsi: aligned_rsi(&cols.close, cfg.fast_rsi_period)?,
            slow_rsi: aligned_rsi(&cols.close, cfg.slow_rsi_period)?,
            macd: defined(macd.macd),
            signal: defined(macd.signal),
            histogram: defined(macd.histogram),
            mfi: mfi::mfi(&cols.high, &cols.low, &cols.close, &cols.volume, cfg.mfi_period),
            atr: atr::atr(&cols.high, &cols.low, &cols.close, cfg.atr_period),
        };
        debug!(candles = klines.len(), warmup = set.warmup(), "indicators computed");
        Ok(set)
    }

    pub fn get(&self, kind: IndicatorKind) -> &[Option<f64>] {
        match kind {
            IndicatorKind::FastEma => &self.fast_ema,
            IndicatorKind::SlowEma => &self.slow_ema,
            IndicatorKind::SuperSlowEma => &self.super_slow_ema,
            IndicatorKind::UltraSlowEma => &self.ultra_slow_ema,
            IndicatorKind::FastRsi => &self.fast_rsi,
            IndicatorKind::SlowRsi => &self.slow_rsi,
            IndicatorKind::Macd => &self.macd,
            IndicatorKind::Signal => &self.signal,
            IndicatorKind::Histogram => &self.histogram,
            IndicatorKind::Mfi => &self.mfi,
            IndicatorKind::Atr => &self.atr,
        }
    }

    /// `(name, series)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKind, &[Option<f64>])> + '_ {
        IndicatorKind::iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn len(&self) -> usize {
        self.fast_ema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast_ema.is_empty()
    }

    /// First index at which every series is defined.
    pub fn warmup(&self) -> usize {
        self.iter()
            .map(|(_, s)| s.iter().position(Option::is_some).unwrap_or(s.len()))
            .max()
            .unwrap_or(0)
    }

    /// Per-candle structured view of the batch.
    pub fn records(&self, klines: &[Kline]) -> Vec<IndicatorRecord> {
        klines
            .iter()
            .enumerate()
            .map(|(i, k)| IndicatorRecord {
                open_time: k.open_time,
                close_time: k.close_time,
                open: k.open,
                high: k.high,
                low: k.low,
                close: k.close,
                volume: k.volume,
                fast_ema: self.fast_ema[i],
                slow_ema: self.slow_ema[i],
                super_slow_ema: self.super_slow_ema[i],
                ultra_slow_ema: self.ultra_slow_ema[i],
                fast_rsi: self.fast_rsi[i],
                slow_rsi: self.slow_rsi[i],
                macd: self.macd[i],
                signal: self.signal[i],
                histogram: self.histogram[i],
                mfi: self.mfi[i],
                atr: self.atr[i],
            })
            .collect()
    }
}

/// One candle with its raw indicator values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub open_time: i64,
    pub close_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub super_slow_ema: Option<f64>,
    pub ultra_slow_ema: Option<f64>,
    pub fast_rsi: Option<f64>,
    pub slow_rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub mfi: Option<f64>,
    pub atr: Option<f64>,
}

fn defined(values: Vec<f64>) -> Vec<Option<f64>> {
    values.into_iter().map(Some).collect()
}

fn aligned_rsi(close: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let values = rsi::rsi(close, period)?;
    Ok(std::iter::repeat(None)
        .take(period)
        .chain(values.into_iter().map(Some))
        .collect())
}
