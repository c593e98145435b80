use serde::{Deserialize, Serialize};

use super::dxf::DifferentialFormat;
use super::icon_set::IconSetRule;
use super::threshold::{validate_threshold_sequence, Threshold};
use crate::{Color, FormatError};

/// Largest `rank` for a count-based top/bottom rule.
pub const MAX_TOP_BOTTOM_RANK: u32 = 1000;
/// Largest `rank` for a percent-based top/bottom rule.
pub const MAX_TOP_BOTTOM_PERCENT: u32 = 100;

ooxml_token_enum! {
    /// `cfRule/@operator` for `cellIs` rules.
    pub enum CellValueOperator {
        Between => "between",
        NotBetween => "notBetween" | "not_between",
        Equal => "equal" | "=" | "==",
        NotEqual => "notEqual" | "not_equal" | "!=" | "<>",
        GreaterThan => "greaterThan" | "greater_than" | ">",
        LessThan => "lessThan" | "less_than" | "<",
        GreaterThanOrEqual => "greaterThanOrEqual" | "greater_than_or_equal" | ">=",
        LessThanOrEqual => "lessThanOrEqual" | "less_than_or_equal" | "<=",
    }
}

impl CellValueOperator {
    /// True for the two operators that compare against a pair of operands.
    pub fn is_range(self) -> bool {
        matches!(self, CellValueOperator::Between | CellValueOperator::NotBetween)
    }
}

ooxml_token_enum! {
    pub enum TextOperator {
        Contains => "containsText" | "contains",
        NotContains => "notContains" | "notContainsText" | "not_contains",
        BeginsWith => "beginsWith" | "begins_with",
        EndsWith => "endsWith" | "ends_with",
    }
}

ooxml_token_enum! {
    pub enum TopBottomDirection {
        Top => "top",
        Bottom => "bottom",
    }
}

ooxml_token_enum! {
    pub enum AverageDirection {
        Above => "above",
        Below => "below",
        EqualOrAbove => "equalOrAbove" | "equal_or_above",
        EqualOrBelow => "equalOrBelow" | "equal_or_below",
    }
}

ooxml_token_enum! {
    /// Rule kind without its parameters, for filtering and lookup.
    pub enum RuleKindTag {
        CellValue => "cellIs" | "cell_value",
        ColorScale => "colorScale" | "color_scale",
        DataBar => "dataBar" | "data_bar",
        IconSet => "iconSet" | "icon_set",
        TopBottom => "top10" | "top_bottom",
        AboveBelowAverage => "aboveAverage" | "above_below_average" | "average",
        Text => "text" | "containsText",
        Expression => "expression",
        UniqueDuplicate => "uniqueDuplicate" | "unique_duplicate",
    }
}

/// Compare each cell against one operand, or two for `between`/`notBetween`.
///
/// Operands are formula text (`"10"`, `"$B$1"`, `"\"abc\""`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellValueRule {
    pub operator: CellValueOperator,
    pub operand1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand2: Option<String>,
    #[serde(default)]
    pub style: DifferentialFormat,
}

impl CellValueRule {
    pub fn new(
        operator: CellValueOperator,
        operand1: impl Into<String>,
        style: DifferentialFormat,
    ) -> Self {
        Self {
            operator,
            operand1: operand1.into(),
            operand2: None,
            style,
        }
    }

    pub fn between(
        low: impl Into<String>,
        high: impl Into<String>,
        style: DifferentialFormat,
    ) -> Self {
        Self {
            operator: CellValueOperator::Between,
            operand1: low.into(),
            operand2: Some(high.into()),
            style,
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.operand1.trim().is_empty() {
            return Err(FormatError::invalid_parameters(
                "cell value rule needs an operand",
            ));
        }
        let has_second = self
            .operand2
            .as_deref()
            .is_some_and(|op| !op.trim().is_empty());
        match (self.operator.is_range(), has_second) {
            (true, false) => Err(FormatError::invalid_parameters(format!(
                "operator {} needs two operands",
                self.operator
            ))),
            (false, true) => Err(FormatError::invalid_parameters(format!(
                "operator {} takes a single operand",
                self.operator
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScaleStop {
    pub threshold: Threshold,
    pub color: Color,
}

impl ColorScaleStop {
    pub fn new(threshold: Threshold, color: Color) -> Self {
        Self { threshold, color }
    }
}

/// Two- or three-stop color scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScaleRule {
    pub stops: Vec<ColorScaleStop>,
}

impl ColorScaleRule {
    /// `min` → `max` scale.
    pub fn two_color(min: Color, max: Color) -> Self {
        Self {
            stops: vec![
                ColorScaleStop::new(Threshold::Min, min),
                ColorScaleStop::new(Threshold::Max, max),
            ],
        }
    }

    /// `min` → 50th percentile → `max` scale.
    pub fn three_color(min: Color, mid: Color, max: Color) -> Self {
        Self {
            stops: vec![
                ColorScaleStop::new(Threshold::Min, min),
                ColorScaleStop::new(Threshold::Percentile(50.0), mid),
                ColorScaleStop::new(Threshold::Max, max),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if !(2..=3).contains(&self.stops.len()) {
            return Err(FormatError::invalid_parameters(format!(
                "color scale needs 2 or 3 stops, got {}",
                self.stops.len()
            )));
        }
        let thresholds: Vec<&Threshold> = self.stops.iter().map(|s| &s.threshold).collect();
        validate_threshold_sequence(&thresholds, "color scale")
    }
}

/// Data bar; missing ends default to the range minimum and maximum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataBarRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Threshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Threshold>,
    pub color: Color,
    #[serde(default = "crate::serde_defaults::default_true")]
    pub show_value: bool,
}

impl DataBarRule {
    pub fn new(color: Color) -> Self {
        Self {
            min: None,
            max: None,
            color,
            show_value: true,
        }
    }

    pub fn effective_min(&self) -> Threshold {
        self.min.clone().unwrap_or(Threshold::Min)
    }

    pub fn effective_max(&self) -> Threshold {
        self.max.clone().unwrap_or(Threshold::Max)
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        let (min, max) = (self.effective_min(), self.effective_max());
        validate_threshold_sequence(&[&min, &max], "data bar")
    }
}

/// Highlight the top or bottom `rank` values (or percent of values).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopBottomRule {
    pub direction: TopBottomDirection,
    pub rank: u32,
    #[serde(default)]
    pub percent: bool,
    #[serde(default)]
    pub style: DifferentialFormat,
}

impl TopBottomRule {
    pub fn validate(&self) -> Result<(), FormatError> {
        let max = if self.percent {
            MAX_TOP_BOTTOM_PERCENT
        } else {
            MAX_TOP_BOTTOM_RANK
        };
        if !(1..=max).contains(&self.rank) {
            return Err(FormatError::invalid_parameters(format!(
                "{} rank must be in 1..={max}, got {}",
                if self.percent { "percent" } else { "count" },
                self.rank
            )));
        }
        Ok(())
    }
}

/// Highlight values above or below the range average, optionally by standard deviations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageRule {
    pub direction: AverageDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<u8>,
    #[serde(default)]
    pub style: DifferentialFormat,
}

impl AverageRule {
    pub fn validate(&self) -> Result<(), FormatError> {
        if let Some(n) = self.std_dev {
            if !(1..=3).contains(&n) {
                return Err(FormatError::invalid_parameters(format!(
                    "std_dev must be in 1..=3, got {n}"
                )));
            }
            if matches!(
                self.direction,
                AverageDirection::EqualOrAbove | AverageDirection::EqualOrBelow
            ) {
                return Err(FormatError::invalid_parameters(
                    "std_dev cannot be combined with an equal-or direction",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextRule {
    pub operator: TextOperator,
    pub text: String,
    #[serde(default)]
    pub style: DifferentialFormat,
}

impl TextRule {
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.text.is_empty() {
            return Err(FormatError::invalid_parameters("text rule needs text"));
        }
        Ok(())
    }
}

/// Highlight cells for which a formula (relative to the top-left cell) is true.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRule {
    pub formula: String,
    #[serde(default)]
    pub style: DifferentialFormat,
}

impl ExpressionRule {
    pub fn new(formula: impl Into<String>, style: DifferentialFormat) -> Self {
        let formula = formula.into();
        let formula = formula.strip_prefix('=').unwrap_or(&formula).to_string();
        Self { formula, style }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        if self.formula.trim().is_empty() {
            return Err(FormatError::invalid_parameters(
                "expression rule needs a formula",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniqueDuplicateRule {
    /// `true` highlights unique values, `false` duplicates.
    pub unique: bool,
    #[serde(default)]
    pub style: DifferentialFormat,
}

/// The closed set of rule kinds with their parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    CellValue(CellValueRule),
    ColorScale(ColorScaleRule),
    DataBar(DataBarRule),
    IconSet(IconSetRule),
    TopBottom(TopBottomRule),
    AboveBelowAverage(AverageRule),
    Text(TextRule),
    Expression(ExpressionRule),
    UniqueDuplicate(UniqueDuplicateRule),
}

impl RuleKind {
    pub fn tag(&self) -> RuleKindTag {
        match self {
            RuleKind::CellValue(_) => RuleKindTag::CellValue,
            RuleKind::ColorScale(_) => RuleKindTag::ColorScale,
            RuleKind::DataBar(_) => RuleKindTag::DataBar,
            RuleKind::IconSet(_) => RuleKindTag::IconSet,
            RuleKind::TopBottom(_) => RuleKindTag::TopBottom,
            RuleKind::AboveBelowAverage(_) => RuleKindTag::AboveBelowAverage,
            RuleKind::Text(_) => RuleKindTag::Text,
            RuleKind::Expression(_) => RuleKindTag::Expression,
            RuleKind::UniqueDuplicate(_) => RuleKindTag::UniqueDuplicate,
        }
    }

    /// The `cfRule/@type` a serializer writes.
    pub fn ooxml_type(&self) -> &'static str {
        match self {
            RuleKind::CellValue(_) => "cellIs",
            RuleKind::ColorScale(_) => "colorScale",
            RuleKind::DataBar(_) => "dataBar",
            RuleKind::IconSet(_) => "iconSet",
            RuleKind::TopBottom(_) => "top10",
            RuleKind::AboveBelowAverage(_) => "aboveAverage",
            RuleKind::Text(rule) => match rule.operator {
                TextOperator::Contains => "containsText",
                TextOperator::NotContains => "notContainsText",
                TextOperator::BeginsWith => "beginsWith",
                TextOperator::EndsWith => "endsWith",
            },
            RuleKind::Expression(_) => "expression",
            RuleKind::UniqueDuplicate(rule) if rule.unique => "uniqueValues",
            RuleKind::UniqueDuplicate(_) => "duplicateValues",
        }
    }

    /// The differential format applied on match, for kinds that have one.
    pub fn style(&self) -> Option<&DifferentialFormat> {
        match self {
            RuleKind::CellValue(r) => Some(&r.style),
            RuleKind::TopBottom(r) => Some(&r.style),
            RuleKind::AboveBelowAverage(r) => Some(&r.style),
            RuleKind::Text(r) => Some(&r.style),
            RuleKind::Expression(r) => Some(&r.style),
            RuleKind::UniqueDuplicate(r) => Some(&r.style),
            RuleKind::ColorScale(_) | RuleKind::DataBar(_) | RuleKind::IconSet(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        match self {
            RuleKind::CellValue(r) => r.validate(),
            RuleKind::ColorScale(r) => r.validate(),
            RuleKind::DataBar(r) => r.validate(),
            RuleKind::IconSet(r) => r.validate(),
            RuleKind::TopBottom(r) => r.validate(),
            RuleKind::AboveBelowAverage(r) => r.validate(),
            RuleKind::Text(r) => r.validate(),
            RuleKind::Expression(r) => r.validate(),
            RuleKind::UniqueDuplicate(_) => Ok(()),
        }
    }
}
