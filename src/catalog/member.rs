use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An end-user account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_banned: bool,
    /// Referral code of the executive that brought this member in.
    #[serde(default)]
    pub referred_by: Option<String>,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Active and not banned. A banned account never counts as active.
    pub fn is_in_good_standing(&self) -> bool {
        self.is_active && !self.is_banned
    }

    pub fn holds_package(&self, package_id: &str) -> bool {
        self.package_id.as_deref() == Some(package_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Executive {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub referral_code: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
