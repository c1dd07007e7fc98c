//! Corridor Width Rule - BCA Accessibility Code.
//!
//! Two-tier check: below the hard minimum is an error, below the wheelchair
//! turning width is a warning. Only errors fail the rule.

use crate::extract::{SpaceExtractor, SpaceRecord};
use crate::model::ModelQuery;
use crate::rules::config::{ParamDefault, Parameters, RuleConfig};
use crate::rules::{corridor_width_mm, no_errors, Category, Rule, RuleResult, Violation};

const DEFAULT_SPACE_TYPES: &[&str] = &["CORRIDOR", "HALLWAY", "PASSAGE"];
const DEFAULT_NAME_PATTERNS: &[&str] = &["corridor", "hallway", "passage"];

pub struct CorridorWidthRule {
    config: RuleConfig,
    space_types: Vec<String>,
    name_patterns: Vec<String>,
}

impl CorridorWidthRule {
    pub const ID: &'static str = "ACC-001";

    pub const DEFAULTS: &'static [ParamDefault] = &[
        ParamDefault::integer("min_width_mm", 1200, "Minimum accessible corridor width"),
        ParamDefault::integer(
            "min_width_turning_mm",
            1500,
            "Recommended width for wheelchair turning",
        ),
    ];

    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        let space_types = config.string_list(
            &["corridor_identification", "space_types"],
            DEFAULT_SPACE_TYPES,
        );
        let name_patterns = config.string_list(
            &["corridor_identification", "name_patterns"],
            DEFAULT_NAME_PATTERNS,
        );
        Self {
            config,
            space_types: lowercase(space_types),
            name_patterns: lowercase(name_patterns),
        }
    }

    fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, Self::DEFAULTS)
    }

    /// Type matches a space-type token, or the name or long name matches a
    /// name pattern.
    #[must_use]
    pub fn is_corridor(&self, space: &SpaceRecord) -> bool {
        let matches = |field: Option<&str>, tokens: &[String]| {
            field.is_some_and(|f| {
                let f = f.to_lowercase();
                tokens.iter().any(|t| f.contains(t.as_str()))
            })
        };
        matches(space.space_type.as_deref(), &self.space_types)
            || matches(space.name.as_deref(), &self.name_patterns)
            || matches(space.long_name.as_deref(), &self.name_patterns)
    }
}

fn lowercase(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.to_lowercase()).collect()
}

impl Default for CorridorWidthRule {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Rule for CorridorWidthRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> Category {
        Category::Accessibility
    }

    fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("Corridor Width")
    }

    fn reference(&self) -> &str {
        &self.config.reference
    }

    fn defaults(&self) -> &'static [ParamDefault] {
        Self::DEFAULTS
    }

    fn check(&self, model: &dyn ModelQuery) -> RuleResult {
        let params = self.params();
        let min_width = params.number("min_width_mm");
        let min_turning = params.number("min_width_turning_mm");
        let required = params.measure("min_width_mm");
        let recommended = params.measure("min_width_turning_mm");

        let mut spaces = SpaceExtractor::new(model);
        let mut violations = Vec::new();

        for corridor in spaces.all().into_iter().filter(|s| self.is_corridor(s)) {
            let Some(width) = corridor_width_mm(corridor) else {
                continue;
            };

            let violation = if width < min_width {
                Violation::error(
                    corridor.id,
                    "IfcSpace",
                    format!(
                        "Corridor width ({width:.0}mm) is less than minimum required for accessibility ({required}mm)"
                    ),
                )
                .values(width.round() as i64, required.clone())
            } else if width < min_turning {
                Violation::warning(
                    corridor.id,
                    "IfcSpace",
                    format!(
                        "Corridor width ({width:.0}mm) is below recommended width for wheelchair turning ({recommended}mm)"
                    ),
                )
                .values(width.round() as i64, recommended.clone())
            } else {
                continue;
            };

            violations.push(
                violation
                    .named(corridor.display_name())
                    .at(corridor.centroid),
            );
        }

        self.result(no_errors(&violations), violations)
    }
}
