//! Travel Distance Rule - Singapore Fire Code.
//!
//! Maximum straight-line distance from each space to its nearest exit door.

use crate::extract::{DoorExtractor, SpaceExtractor};
use crate::geometry::nearest;
use crate::model::ModelQuery;
use crate::rules::config::{ParamDefault, Parameters, RuleConfig};
use crate::rules::{round_to, Category, Measure, Rule, RuleResult, Violation};
use tracing::debug;

pub struct TravelDistanceRule {
    config: RuleConfig,
}

impl TravelDistanceRule {
    pub const ID: &'static str = "FS-001";

    pub const DEFAULTS: &'static [ParamDefault] = &[
        ParamDefault::integer(
            "max_distance_sprinklered_m",
            60,
            "Maximum travel distance in a sprinkler-protected building",
        ),
        ParamDefault::integer(
            "max_distance_unsprinklered_m",
            45,
            "Maximum travel distance without sprinklers",
        ),
        ParamDefault::flag(
            "default_sprinklered",
            true,
            "Assume the building is sprinklered",
        ),
    ];

    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, Self::DEFAULTS)
    }

    /// Applicable ceiling; chosen by configuration, not by sprinkler data in
    /// the model.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.ceiling().as_f64().unwrap_or(0.0)
    }

    fn ceiling(&self) -> Measure {
        let params = self.params();
        if params.flag("default_sprinklered") {
            params.measure("max_distance_sprinklered_m")
        } else {
            params.measure("max_distance_unsprinklered_m")
        }
    }
}

impl Default for TravelDistanceRule {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Rule for TravelDistanceRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> Category {
        Category::FireSafety
    }

    fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("Travel Distance")
    }

    fn reference(&self) -> &str {
        &self.config.reference
    }

    fn defaults(&self) -> &'static [ParamDefault] {
        Self::DEFAULTS
    }

    fn check(&self, model: &dyn ModelQuery) -> RuleResult {
        let ceiling = self.ceiling();
        let max_distance = self.max_distance();

        let mut doors = DoorExtractor::new(model);
        let has_external = !doors.external().is_empty();
        let exits = if has_external {
            doors.external()
        } else {
            doors.all()
        };
        if exits.is_empty() {
            return self.result(true, Vec::new());
        }

        let exit_points: Vec<_> = exits
            .iter()
            .filter_map(|door| door.centroid.map(|c| (door.id, c)))
            .collect();
        if exit_points.is_empty() {
            return self
                .result(true, Vec::new())
                .with_note("No exit door geometry - travel distance check skipped");
        }

        let mut spaces = SpaceExtractor::new(model);
        let mut violations = Vec::new();

        for space in spaces.all() {
            let Some(from) = space.centroid else {
                debug!(space = space.id, "no centroid, skipping");
                continue;
            };
            let Some((distance, exit_id)) = nearest(from, exit_points.iter().copied()) else {
                continue;
            };
            debug!(space = space.id, exit = exit_id, distance, "nearest exit");

            if distance > max_distance {
                violations.push(
                    Violation::error(
                        space.id,
                        "IfcSpace",
                        format!(
                            "Travel distance to nearest exit ({distance:.1}m) exceeds maximum allowed ({ceiling}m)"
                        ),
                    )
                    .named(space.display_name())
                    .at(Some(from))
                    .values(round_to(distance, 2), ceiling.clone()),
                );
            }
        }

        self.result(violations.is_empty(), violations)
    }
}
