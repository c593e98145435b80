//! Conditional formatting rules, stored per worksheet in priority order.
//!
//! Rules are validated when they are added and are never evaluated here; consumers receive the
//! typed rule list (and, for serialization, the shared differential format table).

use core::fmt;
use std::collections::HashSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

mod dxf;
mod icon_set;
mod rule;
mod threshold;

pub use dxf::{DifferentialFormat, DifferentialFormatTable};
pub use icon_set::{IconSetKind, IconSetRule};
pub use rule::{
    AverageDirection, AverageRule, CellValueOperator, CellValueRule, ColorScaleRule,
    ColorScaleStop, DataBarRule, ExpressionRule, RuleKind, RuleKindTag, TextOperator, TextRule,
    TopBottomDirection, TopBottomRule, UniqueDuplicateRule, MAX_TOP_BOTTOM_PERCENT,
    MAX_TOP_BOTTOM_RANK,
};
pub use threshold::{Threshold, ThresholdType};

use crate::{format_sqref, parse_sqref_for_sheet, CellRef, FormatError, Range, Workbook};

/// Stable identifier of a rule, independent of its priority.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleHandle(uuid::Uuid);

impl RuleHandle {
    fn new() -> Self {
        Self(crate::new_uuid())
    }
}

impl fmt::Display for RuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFormatRule {
    pub id: RuleHandle,
    /// Lower values are evaluated (and serialized) first. Starts at 1.
    pub priority: u32,
    pub ranges: Vec<Range>,
    #[serde(default)]
    pub stop_if_true: bool,
    pub kind: RuleKind,
}

impl ConditionalFormatRule {
    pub fn applies_to_cell(&self, cell: CellRef) -> bool {
        self.ranges.iter().any(|r| r.contains(cell))
    }

    pub fn intersects(&self, range: &Range) -> bool {
        self.ranges.iter().any(|r| r.intersects(range))
    }

    /// The space-separated `sqref` of the rule's ranges.
    pub fn sqref(&self) -> String {
        format_sqref(&self.ranges)
    }
}

/// A worksheet's conditional formatting rules, kept sorted by priority.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConditionalFormatting {
    rules: Vec<ConditionalFormatRule>,
}

impl ConditionalFormatting {
    /// Validate and append a rule after every existing one.
    pub fn add(&mut self, ranges: Vec<Range>, kind: RuleKind) -> Result<RuleHandle, FormatError> {
        if ranges.is_empty() {
            return Err(FormatError::invalid_range("", "a rule needs at least one range"));
        }
        kind.validate()?;
        let rule = ConditionalFormatRule {
            id: RuleHandle::new(),
            priority: self.next_priority(),
            ranges,
            stop_if_true: false,
            kind,
        };
        let handle = rule.id;
        log::debug!(
            "added {} rule {handle} on {} at priority {}",
            rule.kind.ooxml_type(),
            rule.sqref(),
            rule.priority
        );
        self.rules.push(rule);
        Ok(handle)
    }

    fn next_priority(&self) -> u32 {
        self.rules
            .iter()
            .map(|r| r.priority)
            .max()
            .map_or(1, |p| p.saturating_add(1))
    }

    /// Every rule in priority order.
    pub fn rules(&self) -> &[ConditionalFormatRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rules in priority order, optionally only those touching `filter`.
    pub fn list(&self, filter: Option<&Range>) -> Vec<&ConditionalFormatRule> {
        self.rules
            .iter()
            .filter(|r| filter.map_or(true, |f| r.intersects(f)))
            .collect()
    }

    pub fn of_kind(&self, tag: RuleKindTag) -> Vec<&ConditionalFormatRule> {
        self.rules.iter().filter(|r| r.kind.tag() == tag).collect()
    }

    pub fn get(&self, handle: RuleHandle) -> Option<&ConditionalFormatRule> {
        self.rules.iter().find(|r| r.id == handle)
    }

    pub fn set_stop_if_true(&mut self, handle: RuleHandle, stop: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == handle) {
            Some(rule) => {
                rule.stop_if_true = stop;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, handle: RuleHandle) -> Option<ConditionalFormatRule> {
        let pos = self.rules.iter().position(|r| r.id == handle)?;
        let rule = self.rules.remove(pos);
        log::debug!("removed rule {handle}");
        Some(rule)
    }

    /// Remove every rule of kind `tag` that covers exactly `range` (as one of its ranges).
    pub fn remove_matching(
        &mut self,
        range: &Range,
        tag: RuleKindTag,
    ) -> Vec<ConditionalFormatRule> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.rules)
            .into_iter()
            .partition(|r| r.kind.tag() == tag && r.ranges.contains(range));
        self.rules = kept;
        if !removed.is_empty() {
            log::debug!("removed {} {tag} rule(s) on {range}", removed.len());
        }
        removed
    }

    /// Replace the rules of `kind`'s tag on `range` with `kind`.
    ///
    /// The new rule takes the priority of the first rule it replaces; with nothing to replace it
    /// is appended like [`ConditionalFormatting::add`].
    pub fn replace(&mut self, range: Range, kind: RuleKind) -> Result<RuleHandle, FormatError> {
        kind.validate()?;
        let tag = kind.tag();
        let removed = self.remove_matching(&range, tag);
        let Some(first) = removed.first() else {
            return self.add(vec![range], kind);
        };

        let rule = ConditionalFormatRule {
            id: first.id,
            priority: first.priority,
            ranges: first.ranges.clone(),
            stop_if_true: first.stop_if_true,
            kind,
        };
        let handle = rule.id;
        let pos = self
            .rules
            .iter()
            .position(|r| r.priority > rule.priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(pos, rule);
        Ok(handle)
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Renumber priorities to `1..=n`, preserving order.
    pub fn compact_priorities(&mut self) {
        for (i, rule) in self.rules.iter_mut().enumerate() {
            rule.priority = i as u32 + 1;
        }
    }
}

impl<'de> Deserialize<'de> for ConditionalFormatting {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            rules: Vec<ConditionalFormatRule>,
        }

        let mut helper = Helper::deserialize(deserializer)?;

        let mut ids = HashSet::new();
        let mut priorities = HashSet::new();
        for rule in &helper.rules {
            if rule.ranges.is_empty() {
                return Err(D::Error::custom(format!("rule {} has no ranges", rule.id)));
            }
            if !ids.insert(rule.id) {
                return Err(D::Error::custom(format!("duplicate rule id {}", rule.id)));
            }
            if !priorities.insert(rule.priority) {
                return Err(D::Error::custom(format!(
                    "duplicate rule priority {}",
                    rule.priority
                )));
            }
            rule.kind
                .validate()
                .map_err(|err| D::Error::custom(format!("rule {}: {err}", rule.id)))?;
        }

        helper.rules.sort_by_key(|r| r.priority);
        Ok(Self {
            rules: helper.rules,
        })
    }
}

impl Workbook {
    /// Add a rule covering `sqref` (`"A1:A10"`, `"A1:B2 D4"`) on `sheet`.
    ///
    /// Checks, in order: the range text (`InvalidRange`), the sheet (`SheetNotFound`), then the
    /// rule parameters (`InvalidParameters`).
    pub fn add_conditional_format(
        &mut self,
        sheet: &str,
        sqref: &str,
        kind: RuleKind,
    ) -> Result<RuleHandle, FormatError> {
        let ranges = parse_rule_ranges(sqref, sheet)?;
        self.sheet_mut(sheet)?.conditional_formatting.add(ranges, kind)
    }

    /// Rules on `sheet` in priority order, optionally only those intersecting `filter`.
    pub fn conditional_formats(
        &self,
        sheet: &str,
        filter: Option<&str>,
    ) -> Result<Vec<&ConditionalFormatRule>, FormatError> {
        let filter = filter
            .map(|f| Range::from_a1(f).map_err(|err| FormatError::invalid_range(f, err)))
            .transpose()?;
        Ok(self
            .sheet(sheet)?
            .conditional_formatting
            .list(filter.as_ref()))
    }

    pub fn conditional_formats_of_kind(
        &self,
        sheet: &str,
        tag: RuleKindTag,
    ) -> Result<Vec<&ConditionalFormatRule>, FormatError> {
        Ok(self.sheet(sheet)?.conditional_formatting.of_kind(tag))
    }

    pub fn cell_value_rules(&self, sheet: &str) -> Result<Vec<&CellValueRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::CellValue)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::CellValue(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn color_scales(&self, sheet: &str) -> Result<Vec<&ColorScaleRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::ColorScale)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::ColorScale(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn data_bars(&self, sheet: &str) -> Result<Vec<&DataBarRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::DataBar)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::DataBar(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn icon_sets(&self, sheet: &str) -> Result<Vec<&IconSetRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::IconSet)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::IconSet(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn top_bottom_rules(&self, sheet: &str) -> Result<Vec<&TopBottomRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::TopBottom)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::TopBottom(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn average_rules(&self, sheet: &str) -> Result<Vec<&AverageRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::AboveBelowAverage)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::AboveBelowAverage(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn text_rules(&self, sheet: &str) -> Result<Vec<&TextRule>, FormatError> {
        Ok(self
            .conditional_formats_of_kind(sheet, RuleKindTag::Text)?
            .into_iter()
            .filter_map(|r| match &r.kind {
                RuleKind::Text(rule) => Some(rule),
                _ => None,
            })
            .collect())
    }

    pub fn set_conditional_format_stop_if_true(
        &mut self,
        sheet: &str,
        handle: RuleHandle,
        stop: bool,
    ) -> Result<(), FormatError> {
        if self
            .sheet_mut(sheet)?
            .conditional_formatting
            .set_stop_if_true(handle, stop)
        {
            Ok(())
        } else {
            Err(FormatError::invalid_parameters(format!(
                "no conditional format {handle} on sheet {sheet:?}"
            )))
        }
    }

    /// Remove one rule by handle. Returns `None` if the sheet has no such rule.
    pub fn remove_conditional_format(
        &mut self,
        sheet: &str,
        handle: RuleHandle,
    ) -> Result<Option<ConditionalFormatRule>, FormatError> {
        Ok(self.sheet_mut(sheet)?.conditional_formatting.remove(handle))
    }

    /// Remove the rules of kind `tag` covering exactly `range`; returns how many went.
    pub fn remove_conditional_formats_matching(
        &mut self,
        sheet: &str,
        range: &str,
        tag: RuleKindTag,
    ) -> Result<usize, FormatError> {
        let range = parse_single_range(range, sheet)?;
        Ok(self
            .sheet_mut(sheet)?
            .conditional_formatting
            .remove_matching(&range, tag)
            .len())
    }

    pub fn replace_conditional_format(
        &mut self,
        sheet: &str,
        range: &str,
        kind: RuleKind,
    ) -> Result<RuleHandle, FormatError> {
        let range = parse_single_range(range, sheet)?;
        self.sheet_mut(sheet)?
            .conditional_formatting
            .replace(range, kind)
    }

    pub fn clear_conditional_formats(&mut self, sheet: &str) -> Result<(), FormatError> {
        self.sheet_mut(sheet)?.conditional_formatting.clear();
        Ok(())
    }

    /// The workbook-wide differential format table, built sheet by sheet in priority order.
    pub fn differential_formats(&self) -> DifferentialFormatTable {
        let mut table = DifferentialFormatTable::default();
        for sheet in self.sheets() {
            for rule in sheet.conditional_formatting.rules() {
                if let Some(style) = rule.kind.style() {
                    table.insert(rule.id, style);
                }
            }
        }
        table
    }
}

fn parse_rule_ranges(sqref: &str, sheet: &str) -> Result<Vec<Range>, FormatError> {
    parse_sqref_for_sheet(sqref, sheet).map_err(|err| FormatError::invalid_range(sqref, err))
}

fn parse_single_range(range: &str, sheet: &str) -> Result<Range, FormatError> {
    let mut ranges = parse_rule_ranges(range, sheet)?;
    if ranges.len() != 1 {
        return Err(FormatError::invalid_range(range, "expected a single range"));
    }
    Ok(ranges.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn range(a1: &str) -> Range {
        Range::from_a1(a1).unwrap()
    }

    fn scale() -> RuleKind {
        RuleKind::ColorScale(ColorScaleRule::two_color(
            Color::white(),
            Color::new_rgb(0xFF0000),
        ))
    }

    fn bar() -> RuleKind {
        RuleKind::DataBar(DataBarRule::new(Color::new_rgb(0x638EC6)))
    }

    #[test]
    fn priorities_increase_and_list_filters() {
        let mut cf = ConditionalFormatting::default();
        let a = cf.add(vec![range("A1:A10")], scale()).unwrap();
        let b = cf.add(vec![range("C1:C10")], bar()).unwrap();
        assert_eq!(cf.get(a).unwrap().priority, 1);
        assert_eq!(cf.get(b).unwrap().priority, 2);

        let hits = cf.list(Some(&range("C5")));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, b);
        assert_eq!(cf.list(None).len(), 2);
        assert!(cf.add(Vec::new(), scale()).is_err());
    }

    #[test]
    fn replace_keeps_priority_and_handle() {
        let mut cf = ConditionalFormatting::default();
        let first = cf.add(vec![range("A1:A10")], scale()).unwrap();
        cf.add(vec![range("B1:B10")], bar()).unwrap();

        let replaced = cf
            .replace(
                range("A1:A10"),
                RuleKind::ColorScale(ColorScaleRule::three_color(
                    Color::white(),
                    Color::black(),
                    Color::new_rgb(0x00FF00),
                )),
            )
            .unwrap();
        assert_eq!(replaced, first);
        assert_eq!(cf.rules()[0].id, first);
        assert_eq!(cf.rules()[0].priority, 1);
        match &cf.rules()[0].kind {
            RuleKind::ColorScale(s) => assert_eq!(s.stops.len(), 3),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn remove_matching_is_kind_specific() {
        let mut cf = ConditionalFormatting::default();
        cf.add(vec![range("A1:A10")], scale()).unwrap();
        cf.add(vec![range("A1:A10")], bar()).unwrap();
        let removed = cf.remove_matching(&range("A1:A10"), RuleKindTag::DataBar);
        assert_eq!(removed.len(), 1);
        assert_eq!(cf.len(), 1);
        assert_eq!(cf.rules()[0].kind.tag(), RuleKindTag::ColorScale);
    }

    #[test]
    fn compact_priorities_closes_gaps() {
        let mut cf = ConditionalFormatting::default();
        let a = cf.add(vec![range("A1")], scale()).unwrap();
        cf.add(vec![range("B1")], bar()).unwrap();
        let c = cf.add(vec![range("C1")], scale()).unwrap();
        cf.remove(a);
        cf.compact_priorities();
        let priorities: Vec<u32> = cf.rules().iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2]);
        assert_eq!(cf.rules()[1].id, c);
    }

    #[test]
    fn deserialize_sorts_by_priority() {
        let mut cf = ConditionalFormatting::default();
        cf.add(vec![range("A1")], scale()).unwrap();
        cf.add(vec![range("A1")], bar()).unwrap();
        let mut json = serde_json::to_value(&cf).unwrap();
        json["rules"].as_array_mut().unwrap().reverse();
        let restored: ConditionalFormatting = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cf);
    }
}
