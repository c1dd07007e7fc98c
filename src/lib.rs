//! # IFC Compliance
//!
//! A rule engine that checks IFC building models against building-code
//! thresholds: fire egress, accessibility and site setbacks.
//!
//! ## Features
//!
//! - Parse IFC files (IFC2x3 and IFC4 schemas) into a queryable model
//! - Extract doors, spaces, walls and stairs with resolved dimensions
//! - Run YAML-configured rules grouped by regulatory category
//! - Export a JSON compliance report and a CSV list of violations
//!
//! ## Example
//!
//! ```no_run
//! use ifc_compliance::parser::parse_ifc_file;
//! use ifc_compliance::report::Reporter;
//! use ifc_compliance::rules::{Category, RuleRegistry};
//! use std::collections::BTreeMap;
//!
//! let model = parse_ifc_file("model.ifc")?;
//! let registry = RuleRegistry::load("config");
//! let results = registry.run(&model, &Category::ALL);
//! let report = Reporter::new().generate("model.ifc", &results, BTreeMap::new());
//! println!("Compliance: {}%", report.summary.compliance_rate);
//! # Ok::<(), ifc_compliance::error::ParseError>(())
//! ```

pub mod error;
pub mod export;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod rules;
