use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::width::WidthRule;

/// Viewer configuration. Every field has a default, so an empty file (or no
/// file at all) is valid.
///
/// ```toml
/// [remote]
/// base_url = "http://localhost:5000"
/// endpoint = "/api/csv-data"
///
/// [view]
/// default_page_size = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub remote: RemoteConfig,
    pub view: ViewConfig,
    pub columns: WidthRule,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            endpoint: "/api/csv-data".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// `0` shows every row.
    pub default_page_size: usize,
    /// Choices in the page-size selector; "All" is always appended.
    pub page_size_options: Vec<usize>,
    /// Columns with at most this many distinct values get a drop-down filter.
    pub dropdown_threshold: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 100, 500, 1000, 5000, 10000],
            dropdown_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "Filtered_Data.xlsx".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Load from a TOML file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Parse TOML. A `[columns]` section that is not a usable width rule is
    /// replaced by the defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        if !config.columns.is_valid() {
            log::warn!(
                "ignoring invalid [columns] settings {:?}, using defaults",
                config.columns
            );
            config.columns = WidthRule::default();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(ViewerConfig::from_toml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ViewerConfig::from_toml(
            r#"
            [remote]
            base_url = "https://data.example.test"

            [columns]
            max_width = 420.0
            "#,
        )
        .unwrap();
        assert_eq!(config.remote.base_url, "https://data.example.test");
        assert_eq!(config.remote.endpoint, "/api/csv-data");
        assert_eq!(config.columns.max_width, 420.0);
        assert_eq!(config.columns.min_width, 100.0);
        assert_eq!(config.view.default_page_size, 10);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[view]\ndefault_page_size = 0").unwrap();
        let config = ViewerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.view.default_page_size, 0);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading config file"));
    }

    #[test]
    fn non_finite_widths_fall_back_to_defaults() {
        let config = ViewerConfig::from_toml("[columns]\nmin_width = nan").unwrap();
        assert_eq!(config.columns, WidthRule::default());

        let inverted = "[columns]\nmin_width = 200.0\nmax_width = 150.0\n";
        let config = ViewerConfig::from_toml(inverted).unwrap();
        assert_eq!(config.columns, WidthRule::default());

        let config = ViewerConfig::from_toml("[columns]\nscale = 8.0").unwrap();
        assert_eq!(config.columns.scale, 8.0);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(ViewerConfig::from_toml("[view]\ndefault_page_size = \"ten\"").is_err());
    }
}
