//! Egress Width Rule - Singapore Fire Code.
//!
//! Exit doors and corridors are checked against separate minimum widths.

use crate::extract::{DoorExtractor, SpaceExtractor};
use crate::model::ModelQuery;
use crate::rules::config::{ParamDefault, Parameters, RuleConfig};
use crate::rules::{corridor_width_mm, door_width_mm, Category, Rule, RuleResult, Violation};

pub struct EgressWidthRule {
    config: RuleConfig,
}

impl EgressWidthRule {
    pub const ID: &'static str = "FS-002";

    pub const DEFAULTS: &'static [ParamDefault] = &[
        ParamDefault::integer("min_door_width_mm", 850, "Minimum exit door width"),
        ParamDefault::integer("min_corridor_width_mm", 1200, "Minimum exit corridor width"),
    ];

    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, Self::DEFAULTS)
    }

    fn check_doors(&self, model: &dyn ModelQuery, violations: &mut Vec<Violation>) {
        let params = self.params();
        let min_width = params.number("min_door_width_mm");
        let required = params.measure("min_door_width_mm");
        let mut doors = DoorExtractor::new(model);

        for door in doors.all() {
            let Some(width) = door_width_mm(door) else {
                continue;
            };
            if width < min_width {
                violations.push(
                    Violation::error(
                        door.id,
                        "IfcDoor",
                        format!(
                            "Door width ({width:.0}mm) is less than minimum required ({required}mm)"
                        ),
                    )
                    .named(door.name.as_deref())
                    .at(door.centroid)
                    .values(width.round() as i64, required.clone()),
                );
            }
        }
    }

    fn check_corridors(&self, model: &dyn ModelQuery, violations: &mut Vec<Violation>) {
        let params = self.params();
        let min_width = params.number("min_corridor_width_mm");
        let required = params.measure("min_corridor_width_mm");
        let mut spaces = SpaceExtractor::new(model);

        for corridor in spaces.corridors() {
            let Some(width) = corridor_width_mm(corridor) else {
                continue;
            };
            if width < min_width {
                violations.push(
                    Violation::error(
                        corridor.id,
                        "IfcSpace",
                        format!(
                            "Corridor width ({width:.0}mm) is less than minimum required ({required}mm)"
                        ),
                    )
                    .named(corridor.display_name())
                    .at(corridor.centroid)
                    .values(width.round() as i64, required.clone()),
                );
            }
        }
    }
}

impl Default for EgressWidthRule {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Rule for EgressWidthRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> Category {
        Category::FireSafety
    }

    fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("Egress Width")
    }

    fn reference(&self) -> &str {
        &self.config.reference
    }

    fn defaults(&self) -> &'static [ParamDefault] {
        Self::DEFAULTS
    }

    fn check(&self, model: &dyn ModelQuery) -> RuleResult {
        let mut violations = Vec::new();
        self.check_doors(model, &mut violations);
        self.check_corridors(model, &mut violations);
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
    fn doors_then_corridors() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_overall_size(Some(800.0), Some(2100.0)));
        model.insert(Element::new(2, "IfcDoor").with_name("Box only"));
        model.insert(Element::new(3, "IfcDoor").with_name("No width"));
        model.insert(Element::new(10, "IfcSpace").with_long_name("East Corridor"));
        model.insert(Element::new(11, "IfcSpace").with_name("Corridor B"));
        model.insert(Element::new(12, "IfcSpace").with_name("Office"));
        model.set_box(2, [0.0, 0.0, 0.0], [0.9, 0.9, 2.1]);
        model.set_box(10, [0.0, 0.0, 0.0], [20.0, 1.1, 3.0]);
        model.set_box(11, [0.0, 0.0, 0.0], [20.0, 1.5, 3.0]);
        model.set_box(12, [0.0, 0.0, 0.0], [1.0, 1.0, 3.0]);

        let result = EgressWidthRule::default().check(&model);
        assert!(!result.passed);

        let ids: Vec<u64> = result.violations.iter().map(|v| v.element_id).collect();
        assert_eq!(ids, vec![1, 10]);

        let door = &result.violations[0];
        assert_eq!(door.element_type, "IfcDoor");
        assert_eq!(
            door.message,
            "Door width (800mm) is less than minimum required (850mm)"
        );
        assert_eq!(door.actual_value, Some(Measure::Integer(800)));

        let corridor = &result.violations[1];
        assert_eq!(corridor.element_type, "IfcSpace");
        assert_eq!(corridor.element_name.as_deref(), Some("East Corridor"));
        assert_eq!(corridor.actual_value, Some(Measure::Integer(1100)));
        assert_eq!(corridor.expected_value, Some(Measure::Integer(1200)));
    }

    #[test]
    fn configured_minimums() {
        let config = RuleConfig::from_yaml(
            "name: Exit Widths\nreference: Fire Code 2018\nparameters:\n  min_door_width_mm: 750\n",
        )
        .unwrap();
        let rule = EgressWidthRule::new(config);
        assert_eq!(rule.name(), "Exit Widths");
        assert_eq!(rule.reference(), "Fire Code 2018");

        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_overall_size(Some(800.0), None));
        let result = rule.check(&model);
        assert!(result.passed);
        assert_eq!(result.rule_id, "FS-002");
    }

    #[test]
    fn door_and_corridor_scale_thresholds_differ() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_name("Hatch"));
        model.insert(Element::new(2, "IfcSpace").with_name("Service Corridor"));
        model.set_box(1, [0.0, 0.0, 0.0], [50.0, 50.0, 2100.0]);
        model.set_box(2, [0.0, 0.0, 0.0], [50.0, 50.0, 3.0]);

        let result = EgressWidthRule::default().check(&model);
        // 50 is metres for a corridor but already millimetres for a door
        let ids: Vec<u64> = result.violations.iter().map(|v| v.element_id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(
            result.violations[0].message,
            "Door width (50mm) is less than minimum required (850mm)"
        );
        assert_eq!(result.violations[0].actual_value, Some(Measure::Integer(50)));
    }

    #[test]
    fn declared_door_width_is_taken_as_is() {
        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_overall_size(Some(0.8), Some(2.1)));
        model.set_box(1, [0.0, 0.0, 0.0], [0.9, 0.9, 2.1]);

        let result = EgressWidthRule::default().check(&model);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].message,
            "Door width (1mm) is less than minimum required (850mm)"
        );
        assert_eq!(result.violations[0].actual_value, Some(Measure::Integer(1)));
    }
}
