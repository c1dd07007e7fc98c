//! Rule contract and result data model.
//!
//! A rule is configured from one YAML document, checks a model through the
//! extractors and geometry utilities, and reports a [`RuleResult`]. Whether a
//! result passes is defined per rule: some rules fail on any violation,
//! others only on `error` violations.

pub mod accessibility;
pub mod building_control;
pub mod config;
pub mod fire_safety;
pub mod registry;

pub use accessibility::{CorridorWidthRule, DoorClearanceRule};
pub use building_control::SetbackRule;
pub use config::{ParamDefault, ParamValue, Parameters, RuleConfig};
pub use fire_safety::{EgressWidthRule, TravelDistanceRule};
pub use registry::RuleRegistry;

use crate::extract::{DoorRecord, SpaceRecord};
use crate::geometry::bbox::property_width;
use crate::geometry::Point3;
use crate::model::ModelQuery;
use crate::resolve::first_resolved;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FireSafety,
    Accessibility,
    BuildingControl,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::FireSafety,
        Category::Accessibility,
        Category::BuildingControl,
    ];

    /// Directory and report key for the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FireSafety => "fire_safety",
            Self::Accessibility => "accessibility",
            Self::BuildingControl => "building_control",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured or required value attached to a violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measure {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl Measure {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

/// Integers print bare, whole numbers keep one decimal (`3.0`).
impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

impl From<i64> for Measure {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Measure {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single finding against one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub element_id: u64,
    pub element_type: String,
    pub element_name: Option<String>,
    pub message: String,
    pub location: Option<Point3>,
    pub severity: Severity,
    pub actual_value: Option<Measure>,
    pub expected_value: Option<Measure>,
}

impl Violation {
    #[must_use]
    pub fn new(
        severity: Severity,
        element_id: u64,
        element_type: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            element_id,
            element_type: element_type.to_string(),
            element_name: None,
            message: message.into(),
            location: None,
            severity,
            actual_value: None,
            expected_value: None,
        }
    }

    #[must_use]
    pub fn error(element_id: u64, element_type: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, element_id, element_type, message)
    }

    #[must_use]
    pub fn warning(element_id: u64, element_type: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, element_id, element_type, message)
    }

    #[must_use]
    pub fn named(mut self, name: Option<&str>) -> Self {
        self.element_name = name.map(str::to_string);
        self
    }

    #[must_use]
    pub fn at(mut self, location: Option<Point3>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn values(mut self, actual: impl Into<Measure>, expected: impl Into<Measure>) -> Self {
        self.actual_value = Some(actual.into());
        self.expected_value = Some(expected.into());
        self
    }
}

/// Outcome of one rule over one model. Violations keep detection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub name: String,
    pub category: Category,
    pub reference: String,
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub metadata: BTreeMap<String, String>,
}

impl RuleResult {
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Attaches an explanatory note, e.g. why the check was skipped.
    #[must_use]
    pub fn with_note(mut self, note: &str) -> Self {
        self.metadata.insert("note".to_string(), note.to_string());
        self
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.metadata.get("note").map(String::as_str)
    }
}

/// A configured compliance check.
pub trait Rule {
    /// Stable identifier, e.g. `ACC-001`.
    fn id(&self) -> &'static str;

    fn category(&self) -> Category;

    fn name(&self) -> &str;

    /// Regulatory clause the rule implements.
    fn reference(&self) -> &str;

    /// Documented parameter baseline used when the config omits a key.
    fn defaults(&self) -> &'static [ParamDefault];

    fn check(&self, model: &dyn ModelQuery) -> RuleResult;

    fn result(&self, passed: bool, violations: Vec<Violation>) -> RuleResult {
        RuleResult {
            rule_id: self.id().to_string(),
            name: self.name().to_string(),
            category: self.category(),
            reference: self.reference().to_string(),
            passed,
            violations,
            metadata: BTreeMap::new(),
        }
    }
}

/// Pass criterion for rules where warnings are advisory.
#[must_use]
pub fn no_errors(violations: &[Violation]) -> bool {
    violations.iter().all(|v| v.severity != Severity::Error)
}

/// Model values that look too small to be millimetres are taken as metres.
/// The cut-off is rule specific; these are heuristics, not unit metadata.
#[must_use]
pub fn assume_metres_below(value: f64, threshold: f64) -> f64 {
    if value < threshold {
        value * 1000.0
    } else {
        value
    }
}

/// Door-scale width in millimetres: declared width, else a width property,
/// else the plan bounding box. Only the box is subject to the `< 10` metre
/// heuristic; declared values are used as written.
pub(crate) fn door_width_mm(door: &DoorRecord) -> Option<f64> {
    first_resolved(&[
        &|| door.overall_width.filter(|w| *w != 0.0),
        &|| property_width(&door.properties),
        &|| {
            door.bounding_box
                .as_ref()
                .map(|b| assume_metres_below(b.plan_min(), 10.0))
        },
    ])
}

/// Corridor-scale width in millimetres from the plan bounding box.
pub(crate) fn corridor_width_mm(space: &SpaceRecord) -> Option<f64> {
    space
        .bounding_box
        .as_ref()
        .map(|b| assume_metres_below(b.plan_min(), 100.0))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{DoorExtractor, SpaceExtractor};
    use crate::model::{Element, InMemoryModel};

    #[test]
    fn warnings_do_not_fail() {
        let warning = Violation::warning(1, "IfcSpace", "narrow");
        let error = Violation::error(1, "IfcSpace", "too narrow");
        assert!(no_errors(&[]));
        assert!(no_errors(&[warning.clone()]));
        assert!(!no_errors(&[warning, error]));
    }

    #[test]
    fn unit_heuristic_scales_small_values_only() {
        assert!((assume_metres_below(0.9, 100.0) - 900.0).abs() < 1e-9);
        assert!((assume_metres_below(99.0, 10.0) - 99.0).abs() < 1e-9);
        assert!((assume_metres_below(850.0, 10.0) - 850.0).abs() < 1e-9);
    }

    #[test]
    fn unit_heuristic_cut_offs_are_strict() {
        assert_eq!(assume_metres_below(10.0, 10.0), 10.0);
        assert_eq!(assume_metres_below(9.5, 10.0), 9500.0);
        assert_eq!(assume_metres_below(100.0, 100.0), 100.0);
        assert_eq!(assume_metres_below(99.5, 100.0), 99500.0);
    }

    fn door(id: u64, width: Option<f64>, plan: f64) -> DoorRecord {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(id, "IfcDoor").with_overall_size(width, None));
        model.set_box(id, [0.0, 0.0, 0.0], [plan, plan, 2.1]);
        DoorExtractor::new(&model).all()[0].clone()
    }

    fn space(id: u64, plan: f64) -> SpaceRecord {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(id, "IfcSpace"));
        model.set_box(id, [0.0, 0.0, 0.0], [plan, plan, 3.0]);
        SpaceExtractor::new(&model).all()[0].clone()
    }

    #[test]
    fn door_widths_scale_only_from_geometry() {
        assert_eq!(door_width_mm(&door(1, Some(0.8), 0.9)), Some(0.8));
        assert_eq!(door_width_mm(&door(1, Some(900.0), 0.9)), Some(900.0));
        assert_eq!(door_width_mm(&door(1, None, 0.9)), Some(900.0));
        assert_eq!(door_width_mm(&door(1, None, 10.0)), Some(10.0));
    }

    #[test]
    fn corridor_cut_off_differs_from_door_cut_off() {
        assert_eq!(corridor_width_mm(&space(1, 50.0)), Some(50_000.0));
        assert_eq!(corridor_width_mm(&space(1, 100.0)), Some(100.0));
        assert_eq!(door_width_mm(&door(1, None, 50.0)), Some(50.0));
    }

    #[test]
    fn measures_display_like_report_values() {
        assert_eq!(Measure::Integer(850).to_string(), "850");
        assert_eq!(Measure::Number(3.0).to_string(), "3.0");
        assert_eq!(Measure::Number(7.5).to_string(), "7.5");
    }

    #[test]
    fn violation_builder() {
        let v = Violation::error(4, "IfcDoor", "narrow")
            .named(Some("D1"))
            .at(Some(Point3::new(1.0, 2.0, 3.0)))
            .values(800_i64, 850.0);
        assert_eq!(v.element_name.as_deref(), Some("D1"));
        assert_eq!(v.actual_value, Some(Measure::Integer(800)));
        assert_eq!(v.expected_value.and_then(|m| m.as_f64()), Some(850.0));
    }

    #[test]
    fn serializes_lowercase_enums() {
        let json = serde_json::to_value(Violation::warning(1, "IfcSpace", "m")).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(
            serde_json::to_value(Category::BuildingControl).unwrap(),
            "building_control"
        );
    }
}
