//! Setback Rule - URA Development Control Guidelines.
//!
//! Compares the plan extents of the building's walls with the site extents.
//! Front is the minimum-Y side, rear the maximum-Y side.

use crate::extract::WallExtractor;
use crate::geometry::{bounding_box, BoundingBox};
use crate::model::{Element, ModelQuery};
use crate::rules::config::{ParamDefault, Parameters, RuleConfig};
use crate::rules::{round_to, Category, Measure, Rule, RuleResult, Violation};

const IFC_SITE: &str = "IFCSITE";
const IFC_BUILDING: &str = "IFCBUILDING";

pub struct SetbackRule {
    config: RuleConfig,
}

impl SetbackRule {
    pub const ID: &'static str = "BC-001";

    pub const DEFAULTS: &'static [ParamDefault] = &[
        ParamDefault::number("front_setback_m", 7.5, "Minimum front setback"),
        ParamDefault::number("side_setback_m", 3.0, "Minimum side setback"),
        ParamDefault::number("rear_setback_m", 3.0, "Minimum rear setback"),
    ];

    #[must_use]
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    fn params(&self) -> Parameters<'_> {
        Parameters::new(&self.config, Self::DEFAULTS)
    }

    fn skipped(&self, note: &str) -> RuleResult {
        self.result(true, Vec::new()).with_note(note)
    }
}

impl Default for SetbackRule {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

/// Combined extents of the external walls, or of all walls when none is
/// marked external. `Err` carries the reason the bounds are unavailable.
fn building_bounds(model: &dyn ModelQuery) -> Result<BoundingBox, &'static str> {
    let mut walls = WallExtractor::new(model);
    let has_external = !walls.external().is_empty();
    let footprint = if has_external {
        walls.external()
    } else {
        walls.all()
    };
    if footprint.is_empty() {
        return Err("No walls found - setback check skipped");
    }

    footprint
        .iter()
        .filter_map(|wall| wall.bounding_box)
        .reduce(|a, b| a.union(&b))
        .ok_or("Could not compute building bounds")
}

impl Rule for SetbackRule {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> Category {
        Category::BuildingControl
    }

    fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("Setback")
    }

    fn reference(&self) -> &str {
        &self.config.reference
    }

    fn defaults(&self) -> &'static [ParamDefault] {
        Self::DEFAULTS
    }

    fn check(&self, model: &dyn ModelQuery) -> RuleResult {
        let params = self.params();
        let front_required = params.measure("front_setback_m");
        let side_required = params.measure("side_setback_m");
        let rear_required = params.measure("rear_setback_m");

        let sites = model.elements_of_type(IFC_SITE);
        let Some(site) = sites.first() else {
            return self.skipped("No IfcSite found - setback check skipped");
        };
        let Some(site_bounds) = bounding_box(model, site) else {
            return self.skipped("Site boundary not defined - setback check skipped");
        };

        let buildings = model.elements_of_type(IFC_BUILDING);
        let Some(building) = buildings.first() else {
            return self.skipped("No IfcBuilding found - setback check skipped");
        };

        let bounds = match building_bounds(model) {
            Ok(bounds) => bounds,
            Err(note) => return self.skipped(note),
        };

        let sides = [
            ("Front", bounds.min_y - site_bounds.min_y, &front_required),
            ("Rear", site_bounds.max_y - bounds.max_y, &rear_required),
            ("Left side", bounds.min_x - site_bounds.min_x, &side_required),
            ("Right side", site_bounds.max_x - bounds.max_x, &side_required),
        ];

        let violations: Vec<Violation> = sides
            .into_iter()
            .filter(|(_, actual, required)| required.as_f64().is_some_and(|r| *actual < r))
            .map(|(side, actual, required)| setback_violation(building, side, actual, required))
            .collect();

        self.result(violations.is_empty(), violations)
    }
}

fn setback_violation(building: &Element, side: &str, actual: f64, required: &Measure) -> Violation {
    Violation::error(
        building.id,
        "IfcBuilding",
        format!("{side} setback ({actual:.2}m) is less than required ({required}m)"),
    )
    .named(building.name.as_deref())
    .values(round_to(actual, 2), required.clone())
}
