//! Door Clearance Rule - BCA Accessibility Code.
//!
//! Minimum clear opening width for wheelchair access, with a wider minimum
//! for main entrance doors.

use crate::extract::{DoorExtractor, DoorRecord};
use crate::model::ModelQuery;
use crate::rules::config::{ParamDefault, Parameters, RuleConfig};
use crate::rules::{door_width_mm, Category, Rule, RuleResult, Violation};

const DEFAULT_EXCLUDED_TYPES: &[&str] = &["TRAPDOOR", "GATE"];
const DEFAULT_ENTRANCE_KEYWORDS: &[&str] = &["main", "entrance", "entry", "lobby"];

pub struct DoorClearanceRule {
    config: RuleConfig,
    exclude_types: Vec<String>,
    entrance_keywords: Vec<String>,
}

impl DoorClearanceRule {
    pub const ID: &'static str = "ACC-002";

    pub const DEFAULTS: &'static [ParamDefault] = &[
        ParamDefault::integer("min_clear_width_mm", 850, "Minimum door clear width"),
        ParamDefault::integer(
            "min_main_entrance_width_mm",
            900,
            "Minimum clear width for main entrance doors",
        ),
    ];

    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        let exclude_types = config
            .string_list(&["exclude_door_types"], DEFAULT_EXCLUDED_TYPES)
            .into_iter()
            .map(|t| t.to_uppercase())
            .collect();
        let entrance_keywords = config
            .string_list(&["entrance_keywords"], DEFAULT_ENTRANCE_KEYWORDS)
            .into_iter()
            .map(|k| k.to_lowercase())
            .collect();
        Self {
            config,
            exclude_types,
            entrance_keywords,
        }
    }

    fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, Self::DEFAULTS)
    }

    fn is_excluded(&self, door: &DoorRecord) -> bool {
        door.door_type
            .as_deref()
            .is_some_and(|t| self.exclude_types.contains(&t.to_uppercase()))
    }

    /// Name contains one of the entrance keywords.
    #[must_use]
    pub fn is_main_entrance(&self, door: &DoorRecord) -> bool {
        door.name.as_deref().is_some_and(|name| {
            let name = name.to_lowercase();
            self.entrance_keywords.iter().any(|k| name.contains(k.as_str()))
        })
    }
}

impl Default for DoorClearanceRule {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Rule for DoorClearanceRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> Category {
        Category::Accessibility
    }

    fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("Door Clearance")
    }

    fn reference(&self) -> &str {
        &self.config.reference
    }

    fn defaults(&self) -> &'static [ParamDefault] {
        Self::DEFAULTS
    }

    fn check(&self, model: &dyn ModelQuery) -> RuleResult {
        let params = self.params();
        let min_clear = params.number("min_clear_width_mm");
        let min_entrance = params.number("min_main_entrance_width_mm");
        let clear_measure = params.measure("min_clear_width_mm");
        let entrance_measure = params.measure("min_main_entrance_width_mm");

        let mut doors = DoorExtractor::new(model);
        let mut violations = Vec::new();

        for door in doors.all() {
            if self.is_excluded(door) {
                continue;
            }
            let Some(width) = door_width_mm(door) else {
                continue;
            };

            let main_entrance = self.is_main_entrance(door);
            let (required, expected, description) = if main_entrance {
                (min_entrance, &entrance_measure, "Main entrance door")
            } else {
                (min_clear, &clear_measure, "Door")
            };

            if width < required {
                violations.push(
                    Violation::error(
                        door.id,
                        "IfcDoor",
                        format!(
                            "{description} clear width ({width:.0}mm) is less than minimum required for accessibility ({expected}mm)"
                        ),
                    )
                    .named(door.name.as_deref())
                    .at(door.centroid)
                    .values(width.round() as i64, expected.clone()),
                );
            }
        }

        self.result(violations.is_empty(), violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, InMemoryModel};
    use crate::rules::Measure;
    use pretty_assertions::assert_eq;

    #[test]
    fn main_entrance_needs_wider_opening() {
        let mut model = InMemoryModel::new();
        model.insert(
            Element::new(1, "IfcDoor")
                .with_name("Main Entrance Door")
                .with_overall_size(Some(800.0), Some(2100.0)),
        );
        model.insert(
            Element::new(2, "IfcDoor")
                .with_name("Store")
                .with_overall_size(Some(870.0), Some(2100.0)),
        );
        model.insert(
            Element::new(3, "IfcDoor")
                .with_name("Lobby")
                .with_overall_size(Some(870.0), Some(2100.0)),
        );

        let result = DoorClearanceRule::default().check(&model);
        assert!(!result.passed);

        let ids: Vec<u64> = result.violations.iter().map(|v| v.element_id).collect();
        assert_eq!(ids, vec![1, 3]);
        let v = &result.violations[0];
        assert_eq!(v.expected_value, Some(Measure::Integer(900)));
        assert_eq!(v.actual_value, Some(Measure::Integer(800)));
        assert_eq!(
            v.message,
            "Main entrance door clear width (800mm) is less than minimum required for accessibility (900mm)"
        );
    }

    #[test]
    fn excluded_types_are_skipped() {
        let mut model = InMemoryModel::new();
        model.insert(
            Element::new(1, "IfcDoor")
                .with_predefined_type("trapdoor")
                .with_overall_size(Some(600.0), None),
        );
        model.insert(
            Element::new(2, "IfcDoor")
                .with_predefined_type("GATE")
                .with_overall_size(Some(600.0), None),
        );
        let result = DoorClearanceRule::default().check(&model);
        assert!(result.passed);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn metre_geometry_is_scaled() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_name("Office"));
        model.set_box(1, [0.0, 0.0, 0.0], [0.82, 0.82, 2.1]);

        let result = DoorClearanceRule::default().check(&model);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].actual_value, Some(Measure::Integer(820)));
        assert_eq!(
            result.violations[0].message,
            "Door clear width (820mm) is less than minimum required for accessibility (850mm)"
        );
    }

    #[test]
    fn configured_vocabularies() {
        let config = RuleConfig::from_yaml(
            "exclude_door_types: [SLIDING_TO_LEFT]\nentrance_keywords: [foyer]\n",
        )
        .unwrap();
        let rule = DoorClearanceRule::new(config);

        let mut model = InMemoryModel::new();
        model.insert(
            Element::new(1, "IfcDoor")
                .with_name("Foyer")
                .with_overall_size(Some(880.0), None),
        );
        model.insert(
            Element::new(2, "IfcDoor")
                .with_name("Main")
                .with_overall_size(Some(880.0), None),
        );
        model.insert(
            Element::new(3, "IfcDoor")
                .with_predefined_type("SLIDING_TO_LEFT")
                .with_overall_size(Some(500.0), None),
        );

        let ids: Vec<u64> = rule
            .check(&model)
            .violations
            .iter()
            .map(|v| v.element_id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn doors_without_width_are_skipped() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_name("Ghost"));
        assert!(DoorClearanceRule::default().check(&model).passed);
    }
}
