use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exchange candle, matching the 12-field Binance kline layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kline {
    pub open_time: i64, // milliseconds
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64, // milliseconds
    pub quote_volume: f64,
    pub trade_count: u64,
    pub taker_buy_base_volume: f64,
    pub taker_buy_quote_volume: f64,
}

impl Kline {
    /// Candle with only the OHLCV part populated. Trailing exchange fields are zero.
    pub fn from_ohlcv(
        open_time: i64,
        close_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
            quote_volume: 0.0,
            trade_count: 0,
            taker_buy_base_volume: 0.0,
            taker_buy_quote_volume: 0.0,
        }
    }
}

/// Convert milliseconds to human-readable UTC time.
pub fn format_time(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| format!("Invalid timestamp {}", ms))
}

/// Exchanges send most numeric kline fields as strings; accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

impl NumOrText {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        let value = match self {
            NumOrText::Num(v) => v,
            NumOrText::Text(s) => s.trim().parse().map_err(E::custom)?,
        };
        if !value.is_finite() {
            return Err(E::custom(format!("non-finite kline value {}", value)));
        }
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for Kline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct KlineVisitor;

        impl<'de> serde::de::Visitor<'de> for KlineVisitor {
            type Value = Kline;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an array of 12 values")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Kline, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut number = |idx: usize| -> Result<f64, A::Error> {
                    seq.next_element::<NumOrText>()?
                        .ok_or_else(|| serde::de::Error::invalid_length(idx, &self))?
                        .into_f64()
                };

                let open_time = number(0)? as i64;
                let open = number(1)?;
                let high = number(2)?;
                let low = number(3)?;
                let close = number(4)?;
                let volume = number(5)?;
                let close_time = number(6)? as i64;
                let quote_volume = number(7)?;
                let trade_count = number(8)? as u64;
                let taker_buy_base_volume = number(9)?;
                let taker_buy_quote_volume = number(10)?;
                // Field 11 is unused by the exchange, but must be present.
                let _ignored: serde_json::Value = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(11, &self))?;

                Ok(Kline {
                    open_time,
                    open,
                    high,
                    low,
                    close,
                    volume,
                    close_time,
                    quote_volume,
                    trade_count,
                    taker_buy_base_volume,
                    taker_buy_quote_volume,
                })
            }
        }

        deserializer.deserialize_seq(KlineVisitor)
    }
}

/// Typed numeric columns pulled out of a kline slice, index-aligned with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KlineColumns {
    pub open_time: Vec<i64>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
    pub close_time: Vec<i64>,
}

impl KlineColumns {
    pub fn from_klines(klines: &[Kline]) -> Self {
        Self {
            open_time: klines.iter().map(|k| k.open_time).collect(),
            open: klines.iter().map(|k| k.open).collect(),
            high: klines.iter().map(|k| k.high).collect(),
            low: klines.iter().map(|k| k.low).collect(),
            close: klines.iter().map(|k| k.close).collect(),
            volume: klines.iter().map(|k| k.volume).collect(),
            close_time: klines.iter().map(|k| k.close_time).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINANCE_ROW: &str = r#"[
        1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
        "148976.11427815", 1499644799999, "2434.19055334", 308,
        "1756.87402397", "28.46694368", "17928899.62484339"
    ]"#;

    #[test]
    fn parses_text_encoded_binance_row() {
        let k: Kline = serde_json::from_str(BINANCE_ROW).unwrap();
        assert_eq!(k.open_time, 1499040000000);
        assert_eq!(k.close_time, 1499644799999);
        assert!((k.open - 0.0163479).abs() < 1e-12);
        assert!((k.high - 0.8).abs() < 1e-12);
        assert!((k.volume - 148976.11427815).abs() < 1e-9);
        assert_eq!(k.trade_count, 308);
        assert!((k.taker_buy_quote_volume - 28.46694368).abs() < 1e-9);
    }

    #[test]
    fn accepts_plain_numbers() {
        let row = "[0, 1, 2, 0.5, 1.5, 10, 59999, 15, 3, 5, 7.5, 0]";
        let k: Kline = serde_json::from_str(row).unwrap();
        assert_eq!(k.close, 1.5);
        assert_eq!(k.trade_count, 3);
    }

    #[test]
    fn rejects_short_rows() {
        let row = r#"[0, "1", "2", "0.5", "1.5", "10", 59999]"#;
        assert!(serde_json::from_str::<Kline>(row).is_err());
    }

    #[test]
    fn rejects_non_numeric_text() {
        let row = r#"[0, "abc", "2", "0.5", "1.5", "10", 59999, "1", 1, "1", "1", "0"]"#;
        assert!(serde_json::from_str::<Kline>(row).is_err());
    }

    #[test]
    fn rejects_non_finite_text() {
        for bad in ["NaN", "inf", "-inf"] {
            let row = format!(
                r#"[0, "1", "2", "0.5", "{bad}", "10", 59999, "1", 1, "1", "1", "0"]"#
            );
            let err = serde_json::from_str::<Kline>(&row).unwrap_err();
            assert!(err.to_string().contains("non-finite"), "{bad}: {err}");
        }
    }

    #[test]
    fn columns_are_index_aligned() {
        let klines = vec![
            Kline::from_ohlcv(0, 59_999, 1.0, 2.0, 0.5, 1.5, 10.0),
            Kline::from_ohlcv(60_000, 119_999, 1.5, 2.5, 1.0, 2.0, 20.0),
        ];
        let cols = KlineColumns::from_klines(&klines);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols.close, vec![1.5, 2.0]);
        assert_eq!(cols.volume, vec![10.0, 20.0]);
        assert_eq!(cols.open_time, vec![0, 60_000]);
    }

    #[test]
    fn formats_millisecond_timestamps() {
        assert_eq!(format_time(0), "1970-01-01 00:00:00.000 UTC");
    }
}
