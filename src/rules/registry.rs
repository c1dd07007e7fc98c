//! Rule registry.
//!
//! Scans `<config_dir>/<category>/` for recognised config file names and
//! instantiates the bound rule with that file as its configuration.
//! Unrecognised files are ignored. Files within a category are taken in
//! lexicographic order so rule order does not depend on the platform.

use super::{
    Category, CorridorWidthRule, DoorClearanceRule, EgressWidthRule, Rule, RuleConfig,
    RuleResult, SetbackRule, TravelDistanceRule,
};
use crate::model::ModelQuery;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

type RuleFactory = fn(RuleConfig) -> Box<dyn Rule>;

/// Config file name to rule constructor.
const CONFIG_TO_RULE: &[(&str, RuleFactory)] = &[
    ("travel_distance.yaml", travel_distance),
    ("egress.yaml", egress),
    ("corridors.yaml", corridors),
    ("doors.yaml", doors),
    ("setbacks.yaml", setbacks),
];

fn travel_distance(config: RuleConfig) -> Box<dyn Rule> {
    Box::new(TravelDistanceRule::new(config))
}

fn egress(config: RuleConfig) -> Box<dyn Rule> {
    Box::new(EgressWidthRule::new(config))
}

fn corridors(config: RuleConfig) -> Box<dyn Rule> {
    Box::new(CorridorWidthRule::new(config))
}

fn doors(config: RuleConfig) -> Box<dyn Rule> {
    Box::new(DoorClearanceRule::new(config))
}

fn setbacks(config: RuleConfig) -> Box<dyn Rule> {
    Box::new(SetbackRule::new(config))
}

fn factory_for(file_name: &str) -> Option<RuleFactory> {
    CONFIG_TO_RULE
        .iter()
        .find(|(name, _)| *name == file_name)
        .map(|(_, factory)| *factory)
}

/// Rules grouped by the category directory they were loaded from.
#[derive(Default)]
pub struct RuleRegistry {
    rules: BTreeMap<Category, Vec<Box<dyn Rule>>>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every recognised rule config under `config_dir`.
    ///
    /// Missing category directories are skipped. Configs that cannot be read
    /// or parsed are logged and skipped.
    pub fn load(config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref();
        let mut registry = Self::new();

        for category in Category::ALL {
            let dir = config_dir.join(category.as_str());
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "category directory missing");
                continue;
            }

            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), "cannot read category directory: {e}");
                    continue;
                }
            };

            let mut files: Vec<(String, RuleFactory)> = entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let name = entry.file_name().to_str()?.to_string();
                    let factory = factory_for(&name)?;
                    Some((name, factory))
                })
                .collect();
            files.sort_by(|a, b| a.0.cmp(&b.0));

            for (name, factory) in files {
                let path = dir.join(&name);
                match RuleConfig::from_file(&path) {
                    Ok(config) => {
                        let rule = factory(config);
                        debug!(rule = rule.id(), path = %path.display(), "loaded rule");
                        registry.register(category, rule);
                    }
                    Err(e) => warn!("skipping rule config: {e}"),
                }
            }
        }

        info!(
            "Loaded {} rules from {}",
            registry.all_rules().len(),
            config_dir.display()
        );
        registry
    }

    /// Adds a rule to the end of `category`.
    pub fn register(&mut self, category: Category, rule: Box<dyn Rule>) {
        self.rules.entry(category).or_default().push(rule);
    }

    #[must_use]
    pub fn rules_by_category(&self, category: Category) -> Vec<&dyn Rule> {
        self.rules
            .get(&category)
            .map(|rules| rules.iter().map(|rule| &**rule).collect())
            .unwrap_or_default()
    }

    /// Every rule, category by category.
    #[must_use]
    pub fn all_rules(&self) -> Vec<&dyn Rule> {
        self.rules
            .values()
            .flat_map(|rules| rules.iter().map(|rule| &**rule))
            .collect()
    }

    #[must_use]
    pub fn rule_by_id(&self, rule_id: &str) -> Option<&dyn Rule> {
        self.all_rules().into_iter().find(|rule| rule.id() == rule_id)
    }

    /// Categories that have at least one rule.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.rules
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(category, _)| *category)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the model against the rules of `categories`, in registry
    /// order. Each rule builds its own extractors.
    pub fn run(&self, model: &dyn ModelQuery, categories: &[Category]) -> Vec<RuleResult> {
        let mut results = Vec::new();
        for (category, rules) in &self.rules {
            if !categories.contains(category) {
                continue;
            }
            for rule in rules {
                let started = Instant::now();
                let result = rule.check(model);
                info!(
                    rule = rule.id(),
                    passed = result.passed,
                    violations = result.violation_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "checked {}",
                    rule.name()
                );
                results.push(result);
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, InMemoryModel};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, category: &str, file: &str, content: &str) {
        let category_dir = dir.join(category);
        fs::create_dir_all(&category_dir).unwrap();
        fs::write(category_dir.join(file), content).unwrap();
    }

    fn config_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        write(dir, "fire_safety", "travel_distance.yaml", "name: Travel Distance\nreference: Fire Code 2.2\n");
        write(dir, "fire_safety", "egress.yaml", "name: Egress\nparameters:\n  min_door_width_mm: 900\n");
        write(dir, "fire_safety", "notes.yaml", "name: ignored\n");
        write(dir, "accessibility", "doors.yaml", "reference: BCA 2019\n");
        write(dir, "accessibility", "corridors.yaml", "");
        write(dir, "accessibility", "README.md", "not a rule");
        tmp
    }

    #[test]
    fn loads_recognised_files_in_name_order() {
        let tmp = config_tree();
        let registry = RuleRegistry::load(tmp.path());

        let ids: Vec<&str> = registry.all_rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["FS-002", "FS-001", "ACC-001", "ACC-002"]);
        assert_eq!(
            registry.categories(),
            vec![Category::FireSafety, Category::Accessibility]
        );
        assert!(registry
            .rules_by_category(Category::BuildingControl)
            .is_empty());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn rule_lookup_by_id() {
        let tmp = config_tree();
        let registry = RuleRegistry::load(tmp.path());

        let doors = registry.rule_by_id("ACC-002").unwrap();
        assert_eq!(doors.reference(), "BCA 2019");
        assert_eq!(doors.name(), "Door Clearance");
        assert_eq!(registry.rule_by_id("ACC-001").unwrap().name(), "Corridor Width");
        assert!(registry.rule_by_id("BC-001").is_none());
    }

    #[test]
    fn invalid_configs_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "building_control", "setbacks.yaml", "parameters: [unclosed");
        write(tmp.path(), "accessibility", "doors.yaml", "name: Doors\n");

        let registry = RuleRegistry::load(tmp.path());
        let ids: Vec<&str> = registry.all_rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["ACC-002"]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let registry = RuleRegistry::load(tmp.path().join("absent"));
        assert!(registry.is_empty());
        assert!(registry.categories().is_empty());
    }

    #[test]
    fn runs_selected_categories_only() {
        let tmp = config_tree();
        let registry = RuleRegistry::load(tmp.path());

        let mut model = InMemoryModel::new();
        model.insert(Element::new(1, "IfcDoor").with_overall_size(Some(870.0), None));

        let results = registry.run(&model, &[Category::FireSafety]);
        let ids: Vec<&str> = results.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["FS-002", "FS-001"]);
        // configured 900mm minimum
        assert!(!results[0].passed);
        assert!(results[1].passed);

        let all = registry.run(&model, &Category::ALL);
        assert_eq!(all.len(), 4);
    }
}
