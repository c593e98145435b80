use serde::{Deserialize, Serialize};

use crate::FormatError;

ooxml_token_enum! {
    /// `cfvo/@type` token.
    pub enum ThresholdType {
        Min => "min",
        Max => "max",
        Number => "num" | "number",
        Percent => "percent",
        Percentile => "percentile",
        Formula => "formula",
    }
}

/// A conditional-format value object: where a color-scale stop, data-bar end or icon boundary
/// sits.
///
/// `Min` and `Max` carry no value; the numeric kinds always do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Threshold {
    Min,
    Max,
    Number(f64),
    /// Percent of the range between the lowest and highest value (`0..=100`).
    Percent(f64),
    /// Percentile of the values in the range (`0..=100`).
    Percentile(f64),
    Formula(String),
}

impl Threshold {
    /// Build a threshold from its type token and optional value text.
    ///
    /// An empty or whitespace-only value counts as absent.
    pub fn parse(kind: &str, value: Option<&str>) -> Result<Self, FormatError> {
        let ty: ThresholdType = kind.parse()?;
        let value = value.map(str::trim).filter(|v| !v.is_empty());

        let numeric = |value: Option<&str>| -> Result<f64, FormatError> {
            let raw = value.ok_or_else(|| {
                FormatError::invalid_parameters(format!("threshold type {ty} needs a value"))
            })?;
            raw.parse::<f64>().map_err(|_| {
                FormatError::invalid_parameters(format!(
                    "threshold value {raw:?} is not a number"
                ))
            })
        };

        let threshold = match ty {
            ThresholdType::Min | ThresholdType::Max => {
                if let Some(v) = value {
                    return Err(FormatError::invalid_parameters(format!(
                        "threshold type {ty} does not take a value (got {v:?})"
                    )));
                }
                if ty == ThresholdType::Min {
                    Threshold::Min
                } else {
                    Threshold::Max
                }
            }
            ThresholdType::Number => Threshold::Number(numeric(value)?),
            ThresholdType::Percent => Threshold::Percent(numeric(value)?),
            ThresholdType::Percentile => Threshold::Percentile(numeric(value)?),
            ThresholdType::Formula => Threshold::Formula(
                value
                    .ok_or_else(|| {
                        FormatError::invalid_parameters("formula threshold needs a formula")
                    })?
                    .to_string(),
            ),
        };
        threshold.validate()?;
        Ok(threshold)
    }

    pub fn threshold_type(&self) -> ThresholdType {
        match self {
            Threshold::Min => ThresholdType::Min,
            Threshold::Max => ThresholdType::Max,
            Threshold::Number(_) => ThresholdType::Number,
            Threshold::Percent(_) => ThresholdType::Percent,
            Threshold::Percentile(_) => ThresholdType::Percentile,
            Threshold::Formula(_) => ThresholdType::Formula,
        }
    }

    /// The `cfvo/@val` text, if any.
    pub fn value_string(&self) -> Option<String> {
        match self {
            Threshold::Min | Threshold::Max => None,
            Threshold::Number(v) | Threshold::Percent(v) | Threshold::Percentile(v) => {
                Some(v.to_string())
            }
            Threshold::Formula(f) => Some(f.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            Threshold::Min | Threshold::Max => Ok(()),
            Threshold::Number(v) if !v.is_finite() => Err(FormatError::invalid_parameters(
                "threshold value must be finite",
            )),
            Threshold::Percent(v) | Threshold::Percentile(v) if !(0.0..=100.0).contains(v) => {
                Err(FormatError::invalid_parameters(format!(
                    "{} threshold must be in 0..=100, got {v}",
                    self.threshold_type()
                )))
            }
            Threshold::Formula(f) if f.trim().is_empty() => Err(
                FormatError::invalid_parameters("formula threshold needs a formula"),
            ),
            _ => Ok(()),
        }
    }
}

/// Check a threshold list where `Min` may only open the list and `Max` may only close it.
pub(crate) fn validate_threshold_sequence(
    thresholds: &[&Threshold],
    what: &str,
) -> Result<(), FormatError> {
    let last = thresholds.len().saturating_sub(1);
    for (i, threshold) in thresholds.iter().enumerate() {
        threshold.validate()?;
        match threshold {
            Threshold::Min if i != 0 => {
                return Err(FormatError::invalid_parameters(format!(
                    "{what}: `min` is only allowed as the first threshold"
                )))
            }
            Threshold::Max if i != last => {
                return Err(FormatError::invalid_parameters(format!(
                    "{what}: `max` is only allowed as the last threshold"
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_thresholds() {
        assert_eq!(Threshold::parse("min", None).unwrap(), Threshold::Min);
        assert_eq!(Threshold::parse("MAX", Some("")).unwrap(), Threshold::Max);
        assert_eq!(
            Threshold::parse("percentile", Some("50")).unwrap(),
            Threshold::Percentile(50.0)
        );
        assert_eq!(
            Threshold::parse("num", Some("-3.5")).unwrap(),
            Threshold::Number(-3.5)
        );
        assert_eq!(
            Threshold::parse("formula", Some("$B$1")).unwrap(),
            Threshold::Formula("$B$1".to_string())
        );
    }

    #[test]
    fn min_and_max_reject_values() {
        assert!(matches!(
            Threshold::parse("min", Some("0")),
            Err(FormatError::InvalidParameters(_))
        ));
        assert!(Threshold::parse("max", Some("10")).is_err());
    }

    #[test]
    fn numeric_thresholds_need_valid_values() {
        assert!(Threshold::parse("number", None).is_err());
        assert!(Threshold::parse("percent", Some("abc")).is_err());
        assert!(Threshold::parse("percent", Some("101")).is_err());
        assert!(Threshold::parse("percentile", Some("-1")).is_err());
        assert!(Threshold::parse("median", Some("1")).is_err());
    }

    #[test]
    fn sequence_positions() {
        let ok = [&Threshold::Min, &Threshold::Percent(50.0), &Threshold::Max];
        assert!(validate_threshold_sequence(&ok, "scale").is_ok());
        let bad = [&Threshold::Percent(50.0), &Threshold::Min];
        assert!(validate_threshold_sequence(&bad, "scale").is_err());
        let bad = [&Threshold::Max, &Threshold::Number(1.0)];
        assert!(validate_threshold_sequence(&bad, "scale").is_err());
    }
}
