use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS: &str = "New";
pub const DEFAULT_REPORTER: &str = "Anonymous";
pub const DEFECT_ID_PREFIX: &str = "DEF-";

/// A stored defect record, serialized with the camelCase field names the
/// capture client sends and the record file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub defect_id: String,
    pub timestamp: DateTime<Utc>,
    /// Bare image filename while stored; a retrieval reference once rewritten for reads.
    pub image_url: String,
    pub defect_type: String,
    pub severity: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub reported_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl Defect {
    /// Copy of this record with `image_url` pointing at `<route_prefix>/<filename>`.
    pub fn with_image_route(&self, route_prefix: &str) -> Defect {
        let mut view = self.clone();
        view.image_url = format!("{}/{}", route_prefix.trim_end_matches('/'), self.image_url);
        view
    }
}

/// Fields accepted when creating a defect. Everything is optional at the
/// wire level; the create command decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDefect {
    #[serde(default)]
    pub defect_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub defect_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reported_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Partial update. `imageUrl`, `defectId`, `timestamp` and `reportedBy` are
/// not part of the patch and are ignored if a client sends them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectPatch {
    #[serde(default)]
    pub defect_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Always replaces the stored assignee, absent meaning unassigned.
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Returns the value only when it is present and non-empty.
pub fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn generate_defect_id(at: DateTime<Utc>) -> String {
    format!("{}{}", DEFECT_ID_PREFIX, at.timestamp_millis())
}
