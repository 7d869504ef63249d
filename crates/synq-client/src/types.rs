//! Request and response types shared by backends

use serde::{Deserialize, Serialize};

/// Which monitors to list, by management source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    App,
    #[default]
    Api,
    All,
}

/// Scope of a monitor listing. Empty lists do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitor_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integration_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitored_paths: Vec<String>,
    pub source: SourceFilter,
}

impl MonitorQuery {
    /// Everything the service attributes to `namespace`, regardless of source
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            source: SourceFilter::All,
            ..Self::default()
        }
    }

    /// Specific monitors, wherever they live
    pub fn ids(ids: Vec<String>) -> Self {
        Self {
            monitor_ids: ids,
            source: SourceFilter::All,
            ..Self::default()
        }
    }
}

/// Entity types that can carry monitors
pub const MONITORABLE_TYPES: &[&str] = &[
    "table",
    "view",
    "materialized_view",
    "external_table",
    "dbt_model",
    "dbt_source",
    "dbt_snapshot",
];

/// A catalog entity known to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Canonical `::`-separated path
    pub path: String,
    pub entity_type: String,
}

impl EntityInfo {
    pub fn is_monitorable(&self) -> bool {
        MONITORABLE_TYPES.contains(&self.entity_type.as_str())
    }
}

/// Candidate entities behind a database coordinate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateCandidate {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Result of looking up one database coordinate (e.g. `db.schema.table`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateMatch {
    pub coordinate: String,
    #[serde(default)]
    pub candidates: Vec<CoordinateCandidate>,
}

/// Database coordinate of a canonical path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCoordinates {
    pub coordinate: String,
    /// Every canonical path that shares this coordinate
    #[serde(default)]
    pub paths: Vec<String>,
}
