use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors reported by an option source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Options request failed: {0}")]
    Request(String),

    #[error("Options response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read options file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One option returned by a data source
///
/// Some endpoints answer with plain strings, others with
/// `{optionID, optionLabel}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionItem {
    Object {
        #[serde(rename = "optionID")]
        option_id: String,
        #[serde(rename = "optionLabel")]
        option_label: String,
    },
    Plain(String),
}

impl OptionItem {
    pub fn label(&self) -> &str {
        match self {
            OptionItem::Object { option_label, .. } => option_label,
            OptionItem::Plain(label) => label,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            OptionItem::Object { option_id, .. } => Some(option_id),
            OptionItem::Plain(_) => None,
        }
    }
}

/// Envelope of an options response
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Vec<OptionItem>,
}

impl OptionsResponse {
    /// The returned options; a `status` other than `success` is a failure
    pub fn into_items(self) -> Result<Vec<OptionItem>, SourceError> {
        match self.status.as_deref() {
            None | Some("success") => Ok(self.data),
            Some(other) => Err(SourceError::Request(format!("status '{other}'"))),
        }
    }
}

/// A node of the sales organisation tree used by personnel fields
///
/// Depth 0 is a sales area, depth 1 a region, depth 2 a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrgNode {
    pub label: String,
    #[serde(rename = "employeeID", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub is_category: bool,
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    /// Every selectable person below this node, depth first
    pub fn people(&self) -> Vec<&OrgNode> {
        let mut out = Vec::new();
        self.collect_people(&mut out);
        out
    }

    fn collect_people<'a>(&'a self, out: &mut Vec<&'a OrgNode>) {
        if !self.is_category && self.employee_id.is_some() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_people(out);
        }
    }
}

/// Where option lists come from
///
/// `filters_json` is the JSON-serialized options filter for the request.
pub trait OptionSource {
    fn fetch_options(
        &self,
        value_type: &str,
        filters_json: &str,
    ) -> Result<Vec<OptionItem>, SourceError>;

    fn fetch_personnel(&self, filters_json: &str) -> Result<Vec<OrgNode>, SourceError>;
}

/// Option source backed by fixed data, e.g. loaded from a JSON file
///
/// Each value type maps to a bare option list or to a captured
/// `{status, data}` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticOptionSource {
    #[serde(deserialize_with = "option_lists")]
    pub options: BTreeMap<String, Vec<OptionItem>>,
    pub personnel: Vec<OrgNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionList {
    Items(Vec<OptionItem>),
    Response(OptionsResponse),
}

fn option_lists<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<OptionItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, OptionList>::deserialize(deserializer)?
        .into_iter()
        .map(|(value_type, list)| {
            let items = match list {
                OptionList::Items(items) => items,
                OptionList::Response(response) => {
                    response.into_items().map_err(de::Error::custom)?
                }
            };
            Ok((value_type, items))
        })
        .collect()
}

impl StaticOptionSource {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl OptionSource for StaticOptionSource {
    fn fetch_options(
        &self,
        value_type: &str,
        _filters_json: &str,
    ) -> Result<Vec<OptionItem>, SourceError> {
        self.options
            .get(value_type)
            .cloned()
            .ok_or_else(|| SourceError::Request(format!("no options for '{value_type}'")))
    }

    fn fetch_personnel(&self, _filters_json: &str) -> Result<Vec<OrgNode>, SourceError> {
        Ok(self.personnel.clone())
    }
}
