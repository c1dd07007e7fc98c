use crate::error::ExportError;
use crate::rules::{Measure, RuleResult};
use std::fs::File;
use std::path::Path;

/// Writes one row per violation across all results.
pub fn export_violations_csv<P: AsRef<Path>>(
    results: &[RuleResult],
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "rule_id",
        "severity",
        "element_id",
        "element_type",
        "element_name",
        "message",
        "actual",
        "expected",
    ])?;

    for result in results {
        for violation in &result.violations {
            let element_id = violation.element_id.to_string();
            let actual = measure_text(violation.actual_value.as_ref());
            let expected = measure_text(violation.expected_value.as_ref());
            writer.write_record([
                result.rule_id.as_str(),
                violation.severity.as_str(),
                element_id.as_str(),
                violation.element_type.as_str(),
                violation.element_name.as_deref().unwrap_or(""),
                violation.message.as_str(),
                actual.as_str(),
                expected.as_str(),
            ])?;
        }
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}

fn measure_text(measure: Option<&Measure>) -> String {
    match measure {
        Some(Measure::Integer(i)) => i.to_string(),
        Some(Measure::Number(n)) => n.to_string(),
        Some(Measure::Text(t)) => t.clone(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, Violation};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn writes_one_row_per_violation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("violations.csv");
        let results = vec![RuleResult {
            rule_id: "BC-001".to_string(),
            name: "Setback".to_string(),
            category: Category::BuildingControl,
            reference: String::new(),
            passed: false,
            violations: vec![
                Violation::error(2, "IfcBuilding", "Front setback (5.25m) is less than required (7.5m)")
                    .named(Some("Block A"))
                    .values(5.25, 7.5),
                Violation::warning(9, "IfcSpace", "tight, but usable"),
            ],
            metadata: BTreeMap::new(),
        }];

        export_violations_csv(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "rule_id,severity,element_id,element_type,element_name,message,actual,expected",
                "BC-001,error,2,IfcBuilding,Block A,Front setback (5.25m) is less than required (7.5m),5.25,7.5",
                "BC-001,warning,9,IfcSpace,,\"tight, but usable\",,",
            ]
        );
    }
}
