//! Error types for the IFC compliance checker.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing IFC files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the IFC file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Geometry or placement data that could not be resolved for an element.
///
/// Never escapes the geometry layer: callers turn it into an absent value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The element has no representation this crate can turn into vertices.
    #[error("element #{id} has no supported shape representation")]
    NoRepresentation { id: u64 },

    /// The representation resolved but produced no vertices.
    #[error("element #{id} produced no mesh vertices")]
    NoVertices { id: u64 },

    /// A referenced entity is missing or has an unexpected shape.
    #[error("element #{id}: {message}")]
    Malformed { id: u64, message: String },
}

/// Errors that can occur when loading a rule configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The YAML document could not be parsed.
    #[error("failed to parse config '{path}': {source}")]
    ParseConfig {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output directory.
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
