use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product members can redeem with coins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub coin_cost: u64,
    #[serde(default)]
    pub stock: u64,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub total_coins: u64,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_quantity() -> u32 {
    1
}

/// Lifecycle of a fulfillment request. Statuses the backend adds later are
/// kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Pending,
    Approved,
    Processing,
    Shipped,
    Delivered,
    Rejected,
    Cancelled,
    Other(String),
}

impl RequestStatus {
    /// Coins spent on requests in these states are booked as revenue.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(
            self,
            RequestStatus::Approved
                | RequestStatus::Processing
                | RequestStatus::Shipped
                | RequestStatus::Delivered
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Processing => "PROCESSING",
            RequestStatus::Shipped => "SHIPPED",
            RequestStatus::Delivered => "DELIVERED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Cancelled => "CANCELLED",
            RequestStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for RequestStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => RequestStatus::Pending,
            "APPROVED" => RequestStatus::Approved,
            "PROCESSING" => RequestStatus::Processing,
            "SHIPPED" => RequestStatus::Shipped,
            "DELIVERED" => RequestStatus::Delivered,
            "REJECTED" => RequestStatus::Rejected,
            "CANCELLED" | "CANCELED" => RequestStatus::Cancelled,
            _ => RequestStatus::Other(raw),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fulfilled_pipeline_statuses_count_as_revenue() {
        assert!(RequestStatus::Approved.counts_as_revenue());
        assert!(RequestStatus::Processing.counts_as_revenue());
        assert!(RequestStatus::Shipped.counts_as_revenue());
        assert!(RequestStatus::Delivered.counts_as_revenue());

        assert!(!RequestStatus::Pending.counts_as_revenue());
        assert!(!RequestStatus::Rejected.counts_as_revenue());
        assert!(!RequestStatus::Cancelled.counts_as_revenue());
        assert!(!RequestStatus::Other("ON_HOLD".to_string()).counts_as_revenue());
    }

    #[test]
    fn status_parsing_ignores_case() {
        assert_eq!(RequestStatus::from("delivered".to_string()), RequestStatus::Delivered);
        assert_eq!(RequestStatus::from("Canceled".to_string()), RequestStatus::Cancelled);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = RequestStatus::from("ON_HOLD".to_string());

        assert_eq!(status, RequestStatus::Other("ON_HOLD".to_string()));
        assert_eq!(status.to_string(), "ON_HOLD");
    }

    #[test]
    fn deserializes_request_with_defaults() {
        let json = r#"{"_id": "r1", "userId": "u1", "totalCoins": 120, "status": "SHIPPED"}"#;

        let request: FulfillmentRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.status, RequestStatus::Shipped);
        assert_eq!(request.total_coins, 120);
        assert_eq!(request.quantity, 1);
    }
}
