//! Class id to class name table.

use std::collections::BTreeMap;

use crate::error::Yolo2KittiError;

/// Immutable id -> name table supplied once per run.
///
/// Keys are kept as the strings the user wrote. Lookups use the decimal form
/// of the parsed class id, so a label token `007` finds key `"7"` and a key
/// like `"07"` or `"car"` never matches anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassMapping {
    names: BTreeMap<String, String>,
}

impl ClassMapping {
    /// Parse a JSON object literal such as `{"0": "license_plate"}`.
    pub fn from_json_str(raw: &str) -> Result<Self, Yolo2KittiError> {
        let names: BTreeMap<String, String> = serde_json::from_str(raw)
            .map_err(|source| Yolo2KittiError::ClassMappingParse { source })?;
        Ok(Self { names })
    }

    pub fn name_for(&self, class_id: u64) -> Option<&str> {
        self.names.get(&class_id.to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ClassMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
