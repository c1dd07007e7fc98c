//! Rule configuration documents.
//!
//! One YAML document per rule:
//!
//! ```yaml
//! name: Corridor Width
//! reference: BCA Accessibility Code 2019, Clause 4.2
//! parameters:
//!   min_width_mm: 1200
//!   min_width_turning_mm: 1500
//! corridor_identification:
//!   space_types: [CORRIDOR, HALLWAY]
//!   name_patterns: [corridor]
//! ```
//!
//! Absent parameters are never errors: every lookup goes through the rule's
//! defaults table.

use crate::error::ConfigError;
use crate::rules::Measure;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A flat parameter value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub name: Option<String>,
    pub reference: String,
    pub parameters: BTreeMap<String, ParamValue>,
    /// Rule-specific keys such as identification vocabularies.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, serde_yaml::Value>,
}

impl RuleConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Numeric parameter, or `default` when absent or not a number.
    #[must_use]
    pub fn param_f64(&self, key: &str, default: f64) -> f64 {
        match self.parameters.get(key) {
            Some(ParamValue::Integer(i)) => *i as f64,
            Some(ParamValue::Number(n)) => *n,
            _ => default,
        }
    }

    #[must_use]
    pub fn param_bool(&self, key: &str, default: bool) -> bool {
        match self.parameters.get(key) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }

    #[must_use]
    pub fn param_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.parameters.get(key) {
            Some(ParamValue::Text(s)) => s,
            _ => default,
        }
    }

    /// String list under a nested extension path, e.g.
    /// `["corridor_identification", "space_types"]`. Non-string entries are
    /// skipped; a missing path yields `default`.
    #[must_use]
    pub fn string_list(&self, path: &[&str], default: &[&str]) -> Vec<String> {
        let Some((first, rest)) = path.split_first() else {
            return to_owned(default);
        };
        let mut node = match self.extensions.get(*first) {
            Some(node) => node,
            None => return to_owned(default),
        };
        for key in rest {
            node = match node.get(*key) {
                Some(next) => next,
                None => return to_owned(default),
            };
        }
        match node.as_sequence() {
            Some(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            None => to_owned(default),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Documented baseline value for one rule parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDefault {
    pub key: &'static str,
    pub value: DefaultValue,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl ParamDefault {
    #[must_use]
    pub const fn number(key: &'static str, value: f64, description: &'static str) -> Self {
        Self {
            key,
            value: DefaultValue::Number(value),
            description,
        }
    }

    #[must_use]
    pub const fn integer(key: &'static str, value: i64, description: &'static str) -> Self {
        Self {
            key,
            value: DefaultValue::Integer(value),
            description,
        }
    }

    #[must_use]
    pub const fn flag(key: &'static str, value: bool, description: &'static str) -> Self {
        Self {
            key,
            value: DefaultValue::Bool(value),
            description,
        }
    }
}

/// Parameter lookup backed by a rule's defaults table.
#[derive(Debug, Clone, Copy)]
pub struct Parameters<'a> {
    config: &'a RuleConfig,
    defaults: &'static [ParamDefault],
}

impl<'a> Parameters<'a> {
    #[must_use]
    pub fn new(config: &'a RuleConfig, defaults: &'static [ParamDefault]) -> Self {
        Self { config, defaults }
    }

    fn default_of(&self, key: &str) -> Option<DefaultValue> {
        self.defaults.iter().find(|d| d.key == key).map(|d| d.value)
    }

    /// Configured number, else the table default (0 for undeclared keys).
    #[must_use]
    pub fn number(&self, key: &str) -> f64 {
        self.measure(key).as_f64().unwrap_or(0.0)
    }

    /// Configured or default number as a report value. Integers written as
    /// integers stay integers.
    #[must_use]
    pub fn measure(&self, key: &str) -> Measure {
        match self.config.parameters.get(key) {
            Some(ParamValue::Integer(i)) => return Measure::Integer(*i),
            Some(ParamValue::Number(n)) => return Measure::Number(*n),
            _ => {}
        }
        match self.default_of(key) {
            Some(DefaultValue::Integer(i)) => Measure::Integer(i),
            Some(DefaultValue::Number(n)) => Measure::Number(n),
            _ => Measure::Number(0.0),
        }
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        let default = matches!(self.default_of(key), Some(DefaultValue::Bool(true)));
        self.config.param_bool(key, default)
    }
}
