//! Compliance report aggregation.

use crate::rules::{Category, RuleResult, Severity, Violation};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;

pub const GENERATOR: &str = "IFC Rule Engine - Singapore Code of Practice";
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub report_metadata: ReportMetadata,
    pub summary: Summary,
    pub results_by_category: BTreeMap<Category, Vec<ResultEntry>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub generator: String,
    pub generator_version: String,
    pub model_path: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_rules_checked: usize,
    pub rules_passed: usize,
    pub rules_failed: usize,
    pub compliance_rate: f64,
    pub total_violations: usize,
    pub violations_by_severity: SeverityCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeverityCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeverityCounts {
    fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// One rule's result as it appears in the report.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub rule_id: String,
    pub name: String,
    pub category: Category,
    pub reference: String,
    pub passed: bool,
    pub violation_count: usize,
    pub violations: Vec<Violation>,
    pub metadata: BTreeMap<String, String>,
}

impl From<&RuleResult> for ResultEntry {
    fn from(result: &RuleResult) -> Self {
        Self {
            rule_id: result.rule_id.clone(),
            name: result.name.clone(),
            category: result.category,
            reference: result.reference.clone(),
            passed: result.passed,
            violation_count: result.violation_count(),
            violations: result.violations.clone(),
            metadata: result.metadata.clone(),
        }
    }
}

/// Minimal pass/fail view of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    pub compliance_rate: f64,
    pub failed_rules: Vec<FailedRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRule {
    pub rule_id: String,
    pub name: String,
    pub violations: usize,
}

/// Percentage of passed rules, one decimal; zero when nothing was checked.
#[must_use]
pub fn compliance_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub include_passed_rules: bool,
    pub include_metadata: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            include_passed_rules: true,
            include_metadata: true,
        }
    }
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_passed_rules(mut self, include: bool) -> Self {
        self.include_passed_rules = include;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Builds the full report. Every category with a result gets an entry,
    /// even when all of its passed results are left out.
    #[must_use]
    pub fn generate(
        &self,
        model_path: &str,
        results: &[RuleResult],
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Report {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();

        let mut severities = SeverityCounts::default();
        for violation in results.iter().flat_map(|r| &r.violations) {
            severities.count(violation.severity);
        }

        let mut results_by_category: BTreeMap<Category, Vec<ResultEntry>> = BTreeMap::new();
        for result in results {
            let entries = results_by_category.entry(result.category).or_default();
            if self.include_passed_rules || !result.passed {
                entries.push(ResultEntry::from(result));
            }
        }

        Report {
            report_metadata: ReportMetadata {
                generated_at: Local::now().to_rfc3339(),
                generator: GENERATOR.to_string(),
                generator_version: GENERATOR_VERSION.to_string(),
                model_path: model_path.to_string(),
                extra: if self.include_metadata {
                    metadata
                } else {
                    BTreeMap::new()
                },
            },
            summary: Summary {
                total_rules_checked: total,
                rules_passed: passed,
                rules_failed: total - passed,
                compliance_rate: compliance_rate(passed, total),
                total_violations: results.iter().map(RuleResult::violation_count).sum(),
                violations_by_severity: severities,
            },
            results_by_category,
        }
    }

    #[must_use]
    pub fn summary(&self, results: &[RuleResult]) -> SummaryView {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed_rules = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| FailedRule {
                rule_id: r.rule_id.clone(),
                name: r.name.clone(),
                violations: r.violation_count(),
            })
            .collect();

        SummaryView {
            total_rules: total,
            passed,
            failed: total - passed,
            compliance_rate: compliance_rate(passed, total),
            failed_rules,
        }
    }

    /// One line per violation:
    /// `[ERROR] ACC-001: message (Element: name) @ (x, y, z)`.
    #[must_use]
    pub fn format_violations(&self, result: &RuleResult, include_location: bool) -> Vec<String> {
        result
            .violations
            .iter()
            .map(|v| {
                let mut line = format!(
                    "[{}] {}: {}",
                    v.severity.as_str().to_uppercase(),
                    result.rule_id,
                    v.message
                );
                if let Some(name) = &v.element_name {
                    line.push_str(&format!(" (Element: {name})"));
                }
                if include_location {
                    if let Some(at) = v.location {
                        line.push_str(&format!(" @ ({:.2}, {:.2}, {:.2})", at.x, at.y, at.z));
                    }
                }
                line
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use pretty_assertions::assert_eq;

    fn result(rule_id: &str, category: Category, violations: Vec<Violation>) -> RuleResult {
        let passed = violations.is_empty();
        RuleResult {
            rule_id: rule_id.to_string(),
            name: format!("{rule_id} name"),
            category,
            reference: String::new(),
            passed,
            violations,
            metadata: BTreeMap::new(),
        }
    }

    fn mixed_results() -> Vec<RuleResult> {
        vec![
            result("FS-001", Category::FireSafety, vec![]),
            result("FS-002", Category::FireSafety, vec![]),
            result(
                "ACC-001",
                Category::Accessibility,
                vec![
                    Violation::error(3, "IfcSpace", "narrow"),
                    Violation::warning(4, "IfcSpace", "tight"),
                ],
            ),
            result("BC-001", Category::BuildingControl, vec![]),
        ]
    }

    #[test]
    fn compliance_rate_rounds_to_one_decimal() {
        assert_eq!(compliance_rate(0, 0), 0.0);
        assert_eq!(compliance_rate(3, 4), 75.0);
        assert_eq!(compliance_rate(2, 3), 66.7);
        assert_eq!(compliance_rate(5, 5), 100.0);
    }

    #[test]
    fn summarizes_results() {
        let report = Reporter::new().generate("model.ifc", &mixed_results(), BTreeMap::new());

        assert_eq!(
            report.summary,
            Summary {
                total_rules_checked: 4,
                rules_passed: 3,
                rules_failed: 1,
                compliance_rate: 75.0,
                total_violations: 2,
                violations_by_severity: SeverityCounts {
                    error: 1,
                    warning: 1,
                    info: 0,
                },
            }
        );
        assert_eq!(report.results_by_category.len(), 3);
        assert_eq!(report.results_by_category[&Category::FireSafety].len(), 2);
        assert_eq!(
            report.results_by_category[&Category::Accessibility][0].violation_count,
            2
        );
        assert_eq!(report.report_metadata.generator, GENERATOR);
    }

    #[test]
    fn empty_run_reports_zero() {
        let report = Reporter::new().generate("empty.ifc", &[], BTreeMap::new());
        assert_eq!(report.summary.compliance_rate, 0.0);
        assert!(report.results_by_category.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["summary"]["violations_by_severity"],
            serde_json::json!({"error": 0, "warning": 0, "info": 0})
        );
    }

    #[test]
    fn failed_only_keeps_category_keys() {
        let reporter = Reporter::new().with_passed_rules(false);
        let report = reporter.generate("model.ifc", &mixed_results(), BTreeMap::new());

        assert!(report.results_by_category[&Category::FireSafety].is_empty());
        assert!(report.results_by_category[&Category::BuildingControl].is_empty());
        assert_eq!(report.results_by_category[&Category::Accessibility].len(), 1);
        assert_eq!(report.summary.total_rules_checked, 4);
    }

    #[test]
    fn extra_metadata_is_flattened() {
        let mut extra = BTreeMap::new();
        extra.insert("project".to_string(), serde_json::json!("Tower B"));

        let report = Reporter::new().generate("model.ifc", &[], extra.clone());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["report_metadata"]["project"], "Tower B");
        assert_eq!(json["report_metadata"]["model_path"], "model.ifc");

        let report = Reporter::new()
            .with_metadata(false)
            .generate("model.ifc", &[], extra);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["report_metadata"].get("project").is_none());
    }

    #[test]
    fn result_entries_serialize_with_count() {
        let report = Reporter::new().generate("model.ifc", &mixed_results(), BTreeMap::new());
        let json = serde_json::to_value(&report).unwrap();
        let entry = &json["results_by_category"]["accessibility"][0];
        assert_eq!(entry["rule_id"], "ACC-001");
        assert_eq!(entry["violation_count"], 2);
        assert_eq!(entry["violations"][0]["severity"], "error");
        assert_eq!(entry["violations"][0]["location"], serde_json::Value::Null);
    }

    #[test]
    fn summary_view_lists_failed_rules() {
        let view = Reporter::new().summary(&mixed_results());
        assert_eq!(view.total_rules, 4);
        assert_eq!(view.failed, 1);
        assert_eq!(
            view.failed_rules,
            vec![FailedRule {
                rule_id: "ACC-001".to_string(),
                name: "ACC-001 name".to_string(),
                violations: 2,
            }]
        );
    }

    #[test]
    fn formats_violation_lines() {
        let result = result(
            "ACC-002",
            Category::Accessibility,
            vec![
                Violation::error(7, "IfcDoor", "Door too narrow")
                    .named(Some("D-07"))
                    .at(Some(Point3::new(1.0, 2.5, 0.126))),
                Violation::warning(8, "IfcDoor", "Check swing"),
            ],
        );
        let reporter = Reporter::new();

        assert_eq!(
            reporter.format_violations(&result, true),
            vec![
                "[ERROR] ACC-002: Door too narrow (Element: D-07) @ (1.00, 2.50, 0.13)",
                "[WARNING] ACC-002: Check swing",
            ]
        );
        assert_eq!(
            reporter.format_violations(&result, false)[0],
            "[ERROR] ACC-002: Door too narrow (Element: D-07)"
        );
    }
}
