use crate::field::OptionsFilter;
use crate::range::{Comparator, RangeKind};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub panes: Vec<PaneSchema>,
    pub tables: ConfigTables,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            panes: Vec::new(),
            tables: ConfigTables::default(),
        }
    }
}

impl ReportConfig {
    pub fn pane(&self, id: &str) -> Option<&PaneSchema> {
        self.panes.iter().find(|p| p.id == id)
    }

    pub fn pane_ids(&self) -> Vec<&str> {
        self.panes.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Layout of one filter pane
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneSchema {
    pub id: String,
    pub ranges: Vec<RangeFieldSchema>,
    pub selections: Vec<SelectionFieldSchema>,
}

/// A comparison field and the state it resets to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFieldSchema {
    pub id: String,
    /// Key used in saved filter sets; defaults to the field id
    pub saved_key: Option<String>,
    pub kind: RangeKind,
    /// Whether the field's checkbox is ticked by default
    pub enabled: bool,
    pub comparator: Comparator,
    /// Default first operand; `{year}` and `{last_year}` are expanded
    pub operand1: String,
    pub operand2: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionFieldSchema {
    pub id: String,
    pub title: String,
    pub saved_key: Option<String>,
    pub source: SelectionSource,
}

/// Where a multi-select field gets its options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SelectionSource {
    DataSource {
        /// Value type sent to the data source; defaults to the field id
        #[serde(default)]
        value_type: Option<String>,
        #[serde(default)]
        options_filter: OptionsFilterSpec,
    },
    ConfigTable {
        table: String,
        #[serde(default)]
        with_codes: bool,
        #[serde(default)]
        active_by_seq: bool,
    },
    Hardcoded {
        options: Vec<String>,
    },
    Personnel {
        #[serde(default = "default_sales_area_field")]
        sales_area_field: String,
        #[serde(default = "default_region_field")]
        region_field: String,
    },
}

impl Default for SelectionSource {
    fn default() -> Self {
        SelectionSource::DataSource {
            value_type: None,
            options_filter: OptionsFilterSpec::None,
        }
    }
}

fn default_sales_area_field() -> String {
    "salesArea".to_string()
}

fn default_region_field() -> String {
    "regions".to_string()
}

/// Configured form of an [`OptionsFilter`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptionsFilterSpec {
    #[default]
    None,
    Static {
        params: Map<String, Value>,
    },
    PaneFilters,
    RoleGate {
        role: String,
    },
}

impl OptionsFilterSpec {
    pub fn build(&self) -> OptionsFilter {
        match self {
            OptionsFilterSpec::None => OptionsFilter::default(),
            OptionsFilterSpec::Static { params } => OptionsFilter::Static(params.clone()),
            OptionsFilterSpec::PaneFilters => OptionsFilter::pane_filters(),
            OptionsFilterSpec::RoleGate { role } => OptionsFilter::role_gate(role.clone()),
        }
    }
}

/// One entry of a configuration table (sector, product category, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigEntry {
    pub label: String,
    pub status: Option<String>,
    pub seq: Option<i64>,
}

impl ConfigEntry {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }
}

pub type ConfigTable = BTreeMap<String, ConfigEntry>;

/// Named configuration tables, keyed by table name then entry code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTables(BTreeMap<String, ConfigTable>);

impl ConfigTables {
    pub fn get(&self, name: &str) -> Option<&ConfigTable> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: ConfigTable) {
        self.0.insert(name.into(), table);
    }
}

/// Expand `{year}` / `{last_year}` in a default operand
pub fn expand_operand(template: &str, today: NaiveDate) -> String {
    template
        .replace("{last_year}", &(today.year() - 1).to_string())
        .replace("{year}", &today.year().to_string())
}

const BUILTIN_TEMPLATES: &[(&str, &str)] =
    &[("mgmt", include_str!("../config/templates/mgmt.toml"))];

pub fn builtin_template_names() -> Vec<&'static str> {
    BUILTIN_TEMPLATES.iter().map(|(name, _)| *name).collect()
}

/// Load a built-in template by name, file name or repository path
pub fn load_builtin_template(name: &str) -> Option<ReportConfig> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let (_, raw) = BUILTIN_TEMPLATES.iter().find(|(n, _)| *n == stem)?;
    match toml::from_str::<ReportConfig>(raw) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(template = stem, error = %e, "built-in template does not parse");
            None
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ReportConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ReportConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<ReportConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

/// The built-in management report configuration
pub fn default_config() -> &'static ReportConfig {
    static DEFAULT_CONFIG: LazyLock<ReportConfig> =
        LazyLock::new(|| load_builtin_template("mgmt").unwrap_or_default());
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_operand() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(expand_operand("{last_year}-12-31", today), "2024-12-31");
        assert_eq!(expand_operand("{year}-01-01", today), "2025-01-01");
        assert_eq!(expand_operand("", today), "");
    }

    #[test]
    fn test_builtin_mgmt_template_has_both_panes() {
        let config = load_builtin_template("mgmt").unwrap();
        assert!(config.pane("mgmt-report-filters").is_some());
        assert!(config.pane("bst-mgmt-report-filters").is_some());
        assert!(config.tables.get("FORECAST_PROBABILITY").is_some());
    }

    #[test]
    fn test_selection_source_kinds_parse() {
        let raw = r#"
            [[panes]]
            id = "p"

            [[panes.selections]]
            id = "country"
            source = { kind = "hardcoded", options = ["Canada", "US"] }

            [[panes.selections]]
            id = "territories"
            source = { kind = "data-source", options_filter = { kind = "role-gate", role = "HEAD OFFICE" } }

            [[panes.selections]]
            id = "oppOwner"
            source = { kind = "personnel" }
        "#;
        let config: ReportConfig = toml::from_str(raw).unwrap();
        let pane = config.pane("p").unwrap();
        assert!(matches!(
            pane.selections[0].source,
            SelectionSource::Hardcoded { .. }
        ));
        assert!(matches!(
            &pane.selections[1].source,
            SelectionSource::DataSource {
                options_filter: OptionsFilterSpec::RoleGate { .. },
                ..
            }
        ));
        match &pane.selections[2].source {
            SelectionSource::Personnel {
                sales_area_field,
                region_field,
            } => {
                assert_eq!(sales_area_field, "salesArea");
                assert_eq!(region_field, "regions");
            }
            other => panic!("expected personnel source, got {other:?}"),
        }
    }
}
