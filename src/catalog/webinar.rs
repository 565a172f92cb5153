use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled session published by administrators. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webinar {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "date")]
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, alias = "link")]
    pub join_link: Option<String>,
    #[serde(default)]
    pub package_id: Option<String>,
}

impl Webinar {
    /// Whether a viewer holding `package_id` may see this webinar.
    /// A viewer without a package is unrestricted.
    pub fn is_open_to(&self, package_id: Option<&str>) -> bool {
        package_id.is_none_or(|id| self.package_id.as_deref() == Some(id))
    }
}
