//! Optional human-authored reference descriptions, keyed by image id.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Human reference text and cross-dataset identifiers for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HumanReference {
    /// Short descriptive tag text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Long descriptive tag text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// Every other field, e.g. `coco_id` or `nsd_id`
    #[serde(flatten)]
    pub identifiers: BTreeMap<String, Value>,
}

impl HumanReference {
    /// Identifiers rendered as `key: value` strings, sorted by key.
    pub fn identifier_lines(&self) -> Vec<String> {
        self.identifiers
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect()
    }
}

/// All reference records of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    entries: HashMap<String, HumanReference>,
}

impl ReferenceSet {
    /// Parse a reference file.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, HumanReference> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Reference for an image id.
    pub fn get(&self, id: &str) -> Option<&HumanReference> {
        self.entries.get(id)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
