//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, SlipError};
use crate::export::DEFAULT_FILE_PREFIX;

/// Main configuration for the slip pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipConfig {
    /// PDF page text configuration.
    pub pdf: PdfConfig,

    /// Tabular export configuration.
    pub export: ExportConfig,

    /// Order extraction reporting.
    pub extraction: ExtractionConfig,
}

/// PDF page text configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Try to open encrypted documents with an empty password.
    pub try_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            try_empty_password: true,
        }
    }
}

/// Tabular export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix of the suggested export file name.
    pub file_prefix: String,

    /// Directory exports are written into.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Order extraction reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Log a warning for every field that could not be matched.
    pub report_warnings: bool,

    /// Compare item sums against the declared totals.
    pub validate_totals: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            report_warnings: true,
            validate_totals: false,
        }
    }
}

impl SlipConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SlipError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
