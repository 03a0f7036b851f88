use super::FeatureField;
use crate::error::{FeatureError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Named projections shipped with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPreset {
    /// 11 fields: close, volume, the four EMAs, both RSIs and the MACD triple.
    Compact,
    /// All 16 fields.
    Full,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaRepr {
    Preset(SchemaPreset),
    Fields(Vec<FeatureField>),
}

/// Ordered, non-empty, duplicate-free list of fields making up a feature row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SchemaRepr")]
pub struct FeatureSchema {
    fields: Vec<FeatureField>,
}

impl FeatureSchema {
    pub fn new(fields: Vec<FeatureField>) -> Result<Self> {
        let schema = Self { fields };
        schema.validate()?;
        Ok(schema)
    }

    pub fn preset(preset: SchemaPreset) -> Self {
        match preset {
            SchemaPreset::Compact => Self::compact(),
            SchemaPreset::Full => Self::full(),
        }
    }

    pub fn compact() -> Self {
        use FeatureField::*;
        Self {
            fields: vec![
                Close,
                Volume,
                FastEma,
                SlowEma,
                SuperSlowEma,
                UltraSlowEma,
                FastRsi,
                SlowRsi,
                Macd,
                Signal,
                Histogram,
            ],
        }
    }

    pub fn full() -> Self {
        Self {
            fields: FeatureField::iter().collect(),
        }
    }

    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(FeatureError::InvalidConfig("feature schema is empty".into()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.fields.iter().find(|f| !seen.insert(**f)) {
            return Err(FeatureError::InvalidConfig(format!(
                "feature `{dup}` appears more than once"
            )));
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::full()
    }
}

impl TryFrom<SchemaRepr> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(repr: SchemaRepr) -> Result<Self> {
        match repr {
            SchemaRepr::Preset(preset) => Ok(Self::preset(preset)),
            SchemaRepr::Fields(fields) => Self::new(fields),
        }
    }
}

/// Accepts `compact`, `full`, or a comma-separated list of field names.
impl FromStr for FeatureSchema {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "compact" => Ok(Self::compact()),
            "full" => Ok(Self::full()),
            list => {
                let fields = list
                    .split(',')
                    .map(|name| {
                        FeatureField::from_str(name.trim()).map_err(|_| {
                            FeatureError::InvalidConfig(format!("unknown feature `{}`", name.trim()))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::new(fields)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_expected_widths() {
        assert_eq!(FeatureSchema::compact().width(), 11);
        assert_eq!(FeatureSchema::full().width(), 16);
        assert_eq!(FeatureSchema::full().fields()[0], FeatureField::Open);
        assert_eq!(FeatureSchema::full().fields()[15], FeatureField::Atr);
    }

    #[test]
    fn parses_presets_and_lists() {
        assert_eq!("compact".parse::<FeatureSchema>().unwrap(), FeatureSchema::compact());
        let s: FeatureSchema = "close, mfi,atr".parse().unwrap();
        assert_eq!(
            s.fields(),
            &[FeatureField::Close, FeatureField::Mfi, FeatureField::Atr]
        );
    }

    #[test]
    fn rejects_unknown_duplicate_and_empty() {
        assert!("close,vwap".parse::<FeatureSchema>().is_err());
        assert!("close,close".parse::<FeatureSchema>().is_err());
        assert!(FeatureSchema::new(vec![]).is_err());
    }

    #[test]
    fn deserializes_preset_name_or_field_list() {
        let preset: FeatureSchema = serde_json::from_str(r#""compact""#).unwrap();
        assert_eq!(preset, FeatureSchema::compact());
        let list: FeatureSchema = serde_json::from_str(r#"["open", "macd"]"#).unwrap();
        assert_eq!(list.width(), 2);
        assert!(serde_json::from_str::<FeatureSchema>(r#"["open", "open"]"#).is_err());
    }
}
