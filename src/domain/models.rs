use serde::{Deserialize, Serialize};
use std::fmt;

/// An entry of the static command catalog. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCommand {
    pub id: String,
    pub category: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Definition of one record type of the host environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfo {
    pub logical_name: String,
    pub display_name: String,
    pub primary_id_attribute: String,
    pub primary_name_attribute: String,
    pub logical_collection_name: String,
}

impl EntityInfo {
    /// Best-effort definition for an entity the metadata list does not know.
    #[must_use]
    pub fn guessed(logical_name: &str) -> Self {
        Self {
            logical_name: logical_name.to_string(),
            display_name: logical_name.to_string(),
            primary_id_attribute: format!("{logical_name}id"),
            primary_name_attribute: "name".to_string(),
            logical_collection_name: format!("{logical_name}s"),
        }
    }
}

/// Impersonation candidate returned by a background user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub user_name: String,
    pub full_name: String,
}

/// A record found by text search, GUID lookup or FetchXML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: String,
    pub name: String,
}

impl RecordRef {
    /// A record addressed directly by id, without a lookup.
    #[must_use]
    pub fn direct(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub name: String,
    pub roleid: String,
}

/// A pinned command with optional color overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavCommand {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

impl FavCommand {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            icon_color: None,
            bg_color: None,
        }
    }
}

/// What the user is currently looking at in the host application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    pub entity: Option<String>,
    pub record_id: Option<String>,
    pub app_id: Option<String>,
}

/// One key/value line of an info panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub key: String,
    pub value: String,
}

impl InfoRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Content shown by the info display steps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InfoPanel {
    pub title: String,
    pub rows: Vec<InfoRow>,
    pub empty_message: Option<String>,
}

impl InfoPanel {
    /// Flattens a JSON object into rows. Keys starting with `@` are OData
    /// annotations and are skipped; nested values are pretty-printed.
    #[must_use]
    pub fn from_json_object(title: &str, object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let rows = object
            .iter()
            .filter(|(k, _)| !k.starts_with('@'))
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::to_string_pretty(v).unwrap_or_default()
                    }
                    other => other.to_string(),
                };
                InfoRow::new(k.clone(), value)
            })
            .collect();
        Self {
            title: title.to_string(),
            rows,
            empty_message: None,
        }
    }
}
