use super::options_filter::{FilterParams, OptionsFilter, ResolveContext, ViewContext};
use super::overlay::OverlayOption;
use super::source::{OptionSource, SourceError};
use super::{FieldError, MultiSelectFilterField};
use crate::config::ConfigTables;
use crate::filter_object::FilterObject;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// External collaborators a caller provides when opening a field
#[derive(Clone, Copy)]
pub struct FieldEnv<'a> {
    pub source: &'a dyn OptionSource,
    pub tables: &'a ConfigTables,
    pub view: &'a ViewContext,
}

/// Everything a behavior can consult while loading options
pub struct OpenEnv<'a> {
    pub source: &'a dyn OptionSource,
    pub tables: &'a ConfigTables,
    pub view: &'a ViewContext,
    /// The owning pane's filters at the moment the field was opened
    pub pane_filters: &'a FilterObject,
}

impl<'a> OpenEnv<'a> {
    pub fn new(env: FieldEnv<'a>, pane_filters: &'a FilterObject) -> Self {
        Self {
            source: env.source,
            tables: env.tables,
            view: env.view,
            pane_filters,
        }
    }

    fn resolve(&self, filter: &OptionsFilter) -> FilterParams {
        filter.resolve(&ResolveContext {
            pane_filters: self.pane_filters,
            view: self.view,
        })
    }
}

/// What an overlay shows once options are loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub options: Vec<OverlayOption>,
    pub preselected: Vec<String>,
}

/// How a field gathers its options when opened
pub trait SelectionBehavior {
    fn load(
        &self,
        field: &MultiSelectFilterField,
        env: &OpenEnv<'_>,
    ) -> Result<OverlayContent, FieldError>;
}

fn source_error(field: &MultiSelectFilterField, source: SourceError) -> FieldError {
    FieldError::Source {
        field: field.id().to_string(),
        source,
    }
}

fn to_json(field: &MultiSelectFilterField, params: &FilterParams) -> Result<String, FieldError> {
    serde_json::to_string(params).map_err(|e| source_error(field, e.into()))
}

/// Options fetched from the data source for a value type
#[derive(Debug, Clone)]
pub struct DataSourceBehavior {
    pub value_type: String,
    pub options_filter: OptionsFilter,
}

impl SelectionBehavior for DataSourceBehavior {
    fn load(
        &self,
        field: &MultiSelectFilterField,
        env: &OpenEnv<'_>,
    ) -> Result<OverlayContent, FieldError> {
        let params = env.resolve(&self.options_filter);
        let filters_json = to_json(field, &params)?;
        let items = env
            .source
            .fetch_options(&self.value_type, &filters_json)
            .map_err(|e| source_error(field, e))?;

        let options = items
            .iter()
            .map(|item| match item.id() {
                Some(id) => OverlayOption::with_id(item.label(), id),
                None => OverlayOption::plain(item.label()),
            })
            .collect();

        Ok(OverlayContent {
            options,
            preselected: field.preselected(),
        })
    }
}

/// Options read from a preloaded configuration table
#[derive(Debug, Clone, Default)]
pub struct ConfigTableBehavior {
    pub table: String,
    /// Offer entry keys as option ids, so selections carry `[label, code]`
    pub with_codes: bool,
    /// Only entries with status `active`, ordered by `seq`
    pub active_by_seq: bool,
}

impl SelectionBehavior for ConfigTableBehavior {
    fn load(
        &self,
        field: &MultiSelectFilterField,
        env: &OpenEnv<'_>,
    ) -> Result<OverlayContent, FieldError> {
        let table = env
            .tables
            .get(&self.table)
            .ok_or_else(|| FieldError::UnknownTable(self.table.clone()))?;

        let mut entries: Vec<_> = table.iter().collect();
        if self.active_by_seq {
            entries.retain(|(_, entry)| entry.is_active());
            entries.sort_by_key(|(_, entry)| entry.seq.unwrap_or(i64::MAX));
        }

        let options = entries
            .into_iter()
            .map(|(key, entry)| {
                if self.with_codes {
                    OverlayOption::with_id(&entry.label, key)
                } else {
                    OverlayOption::plain(&entry.label)
                }
            })
            .collect();

        Ok(OverlayContent {
            options,
            preselected: field.preselected(),
        })
    }
}

/// A fixed option list that ignores configuration and the data source
#[derive(Debug, Clone, Default)]
pub struct HardcodedBehavior {
    pub options: Vec<String>,
}

impl SelectionBehavior for HardcodedBehavior {
    fn load(
        &self,
        field: &MultiSelectFilterField,
        _env: &OpenEnv<'_>,
    ) -> Result<OverlayContent, FieldError> {
        Ok(OverlayContent {
            options: self.options.iter().map(OverlayOption::plain).collect(),
            preselected: field.preselected(),
        })
    }
}

/// People picked from the sales organisation tree
///
/// The tree is narrowed by the pane's current sales area and region
/// selections. Only people present in the fetched tree can be saved.
#[derive(Debug, Clone)]
pub struct PersonnelBehavior {
    pub sales_area_field: String,
    pub region_field: String,
}

impl Default for PersonnelBehavior {
    fn default() -> Self {
        Self {
            sales_area_field: "salesArea".to_string(),
            region_field: "regions".to_string(),
        }
    }
}

impl SelectionBehavior for PersonnelBehavior {
    fn load(
        &self,
        field: &MultiSelectFilterField,
        env: &OpenEnv<'_>,
    ) -> Result<OverlayContent, FieldError> {
        let pick = |key: &str| {
            env.pane_filters
                .get(key)
                .and_then(|v| serde_json::to_value(v).ok())
                .unwrap_or(Value::Array(Vec::new()))
        };
        let mut params = FilterParams::new();
        params.insert("salesarea".to_string(), pick(&self.sales_area_field));
        params.insert("region".to_string(), pick(&self.region_field));

        let filters_json = to_json(field, &params)?;
        let tree = env
            .source
            .fetch_personnel(&filters_json)
            .map_err(|e| source_error(field, e))?;

        let options = tree
            .iter()
            .flat_map(|node| node.people())
            .filter_map(|person| {
                person
                    .employee_id
                    .as_ref()
                    .map(|id| OverlayOption::with_id(&person.label, id))
            })
            .collect();

        Ok(OverlayContent {
            options,
            preselected: field.preselected(),
        })
    }
}

/// Field id to selection behavior, built once when a pane's fields are set up
#[derive(Default)]
pub struct BehaviorRegistry {
    behaviors: HashMap<String, Box<dyn SelectionBehavior>>,
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.behaviors.keys().collect();
        ids.sort();
        f.debug_struct("BehaviorRegistry").field("fields", &ids).finish()
    }
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        field_id: impl Into<String>,
        behavior: impl SelectionBehavior + 'static,
    ) {
        self.behaviors.insert(field_id.into(), Box::new(behavior));
    }

    pub fn get(&self, field_id: &str) -> Option<&dyn SelectionBehavior> {
        self.behaviors.get(field_id).map(|b| b.as_ref())
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.behaviors.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}
