use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub mod schema;

/// Run state of a save as reported by the instance manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Offline,
    Loading,
    Online,
    Shutdown,
}

impl SaveStatus {
    /// Lenient parse; anything unknown is treated as offline.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "loading" => SaveStatus::Loading,
            "online" => SaveStatus::Online,
            "shutdown" => SaveStatus::Shutdown,
            _ => SaveStatus::Offline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaveStatus::Offline => "offline",
            SaveStatus::Loading => "loading",
            SaveStatus::Online => "online",
            SaveStatus::Shutdown => "shutdown",
        }
    }

    /// A start or stop is in flight.
    pub fn is_transitional(self) -> bool {
        matches!(self, SaveStatus::Loading | SaveStatus::Shutdown)
    }
}

/// Fleet-wide `name -> status` map from `GET /api/status`.
pub type StatusMap = HashMap<String, SaveStatus>;

pub fn parse_status_map(value: &serde_json::Value) -> StatusMap {
    let mut out = StatusMap::new();
    if let Some(map) = value.as_object() {
        for (name, status) in map {
            let status = status
                .as_str()
                .map(SaveStatus::parse)
                .unwrap_or_default();
            out.insert(name.clone(), status);
        }
    }
    out
}

pub const CREATE_TIME_KEY: &str = "mc-manager-create-time";
pub const ACCESS_TIME_KEY: &str = "mc-manager-access-time";
pub const VERSION_KEY: &str = "mc-manager-server-version";

#[derive(Clone, Debug, PartialEq)]
pub struct SaveRecord {
    pub name: String,
    pub status: SaveStatus,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl SaveRecord {
    pub fn new(name: impl Into<String>, status: SaveStatus) -> Self {
        Self {
            name: name.into(),
            status,
            metadata: BTreeMap::new(),
        }
    }

    /// Builds a record from the flat object the server returns for a save:
    /// `name` and `status` are lifted out, every other key is metadata.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let map = value.as_object()?;
        let name = map.get("name")?.as_str()?.to_string();
        if name.is_empty() {
            return None;
        }
        let status = map
            .get("status")
            .and_then(|s| s.as_str())
            .map(SaveStatus::parse)
            .unwrap_or_default();
        let metadata = map
            .iter()
            .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "status")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            name,
            status,
            metadata,
        })
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn server_version(&self) -> Option<&str> {
        self.meta_str(VERSION_KEY).filter(|s| !s.is_empty())
    }

    /// Creation time trimmed to minutes (`YYYY-MM-DD HH:MM`).
    pub fn created_short(&self) -> Option<String> {
        let raw = self.meta_str(CREATE_TIME_KEY)?;
        Some(raw.chars().take(16).collect())
    }
}

/// Parses the `GET /api/saves` payload; accepts `{"saves":[..]}` or a bare array.
pub fn parse_save_list(value: &serde_json::Value) -> Vec<SaveRecord> {
    let items = match value {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => match map.get("saves") {
            Some(serde_json::Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(name) => Some(SaveRecord::new(name.clone(), SaveStatus::Offline)),
            other => SaveRecord::from_json(other),
        })
        .collect()
}
