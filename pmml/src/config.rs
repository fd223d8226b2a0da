//! Document configuration
//!
//! Constants used when a document is initialised empty or when scaffolding
//! (Header, Application descriptor) is inserted on export.

use crate::error::{PmmlError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespace declared by freshly created documents
pub const DEFAULT_NAMESPACE: &str = "http://www.dmg.org/PMML-3_0";

/// Configuration for created and exported documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PmmlConfig {
    /// Value of the root `version` attribute
    pub format_version: String,

    /// Default namespace declared on the root element
    pub namespace: String,

    /// `name` of the Header's Application descriptor
    pub application_name: String,

    /// `version` of the Header's Application descriptor
    pub application_version: String,

    /// Placeholder copyright written into new headers
    pub copyright: String,

    /// Placeholder description written into new headers
    pub description: String,

    /// Spaces per nesting level in serialized output
    pub indent: usize,
}

impl Default for PmmlConfig {
    fn default() -> Self {
        Self {
            format_version: "3.0".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            application_name: env!("CARGO_PKG_NAME").to_string(),
            application_version: "1.0".to_string(),
            copyright: "copyright text".to_string(),
            description: "description text".to_string(),
            indent: 2,
        }
    }
}

impl PmmlConfig {
    /// Load a configuration from a JSON string; missing keys take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PmmlConfig =
            serde_json::from_str(json).map_err(|e| PmmlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PmmlError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(PmmlError::Config("namespace must not be empty".to_string()));
        }
        if self.format_version.trim().is_empty() {
            return Err(PmmlError::Config(
                "format_version must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
