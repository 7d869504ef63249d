//! The `v1beta2` YAML dialect
//!
//! - [`model`]: serde structs mirroring the file layout
//! - [`convert`]: document to descriptors, collecting every error
//! - [`generate`]: descriptors back to a document (used by `export`)

pub mod convert;
pub mod duration;
pub mod generate;
pub mod model;

use anyhow::{Result, bail};
use std::fmt;

pub use convert::convert;
pub use generate::{generate, to_yaml};
pub use model::Document;

/// The only dialect version understood
pub const VERSION: &str = "v1beta2";

/// Parse and version-check a YAML document
pub fn parse_document(content: &str) -> Result<Document> {
    let doc: Document = serde_yaml::from_str(content)?;
    match doc.version.as_deref() {
        Some(VERSION) => Ok(doc),
        Some(other) => bail!("unsupported version '{other}', expected '{VERSION}'"),
        None => bail!("missing 'version' field, expected 'version: {VERSION}'"),
    }
}

/// A single problem found while converting a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionError {
    pub field: String,
    pub message: String,
    pub entity: Option<String>,
    pub monitor: Option<String>,
    pub test: Option<String>,
}

impl ConversionError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn in_entity(mut self, entity: &str) -> Self {
        self.entity = Some(entity.to_string());
        self
    }

    pub fn in_monitor(mut self, monitor: &str) -> Self {
        self.monitor = Some(monitor.to_string());
        self
    }

    pub fn in_test(mut self, test: &str) -> Self {
        self.test = Some(test.to_string());
        self
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = format!("{} - {}", self.field, self.message);
        match (&self.entity, &self.monitor, &self.test) {
            (Some(e), Some(m), _) => write!(f, "Entity '{e}', Monitor '{m}': {detail}"),
            (Some(e), None, Some(t)) => write!(f, "Entity '{e}', Test '{t}': {detail}"),
            (Some(e), None, None) => write!(f, "Entity '{e}': {detail}"),
            (None, Some(m), _) => write!(f, "Monitor '{m}': {detail}"),
            (None, None, Some(t)) => write!(f, "Test '{t}': {detail}"),
            (None, None, None) => f.write_str(&detail),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Every problem found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionErrors(pub Vec<ConversionError>);

impl ConversionErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, error: ConversionError) {
        self.0.push(error);
    }
}

impl fmt::Display for ConversionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("no conversion errors"),
            [single] => write!(f, "{single}"),
            many => {
                f.write_str("Multiple conversion errors:")?;
                for error in many {
                    write!(f, "\n  - {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConversionErrors {}
