//! Wire DTOs for the Postmates delivery API.
//!
//! # Design
//! These mirror the response bodies the service returns. Unknown fields are
//! ignored so new server-side attributes never break decoding. The
//! mock-server crate defines its own copies; integration tests catch drift.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Delivery status as reported by the service.
///
/// The client only branches on the known values; anything else is kept
/// verbatim in `Other` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeliveryStatus {
    /// Local-only state before the first successful create.
    Unsubmitted,
    Pending,
    Pickup,
    Dropoff,
    Canceled,
    Delivered,
    Other(String),
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Unsubmitted => "unsubmitted",
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Pickup => "pickup",
            DeliveryStatus::Dropoff => "dropoff",
            DeliveryStatus::Canceled => "canceled",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Other(s) => s,
        }
    }

    /// Only deliveries not yet picked up can be canceled.
    pub fn is_cancelable(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Pickup)
    }
}

impl From<String> for DeliveryStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "unsubmitted" => DeliveryStatus::Unsubmitted,
            "pending" => DeliveryStatus::Pending,
            "pickup" => DeliveryStatus::Pickup,
            "dropoff" => DeliveryStatus::Dropoff,
            "canceled" => DeliveryStatus::Canceled,
            "delivered" => DeliveryStatus::Delivered,
            _ => DeliveryStatus::Other(s),
        }
    }
}

impl From<&str> for DeliveryStatus {
    fn from(s: &str) -> Self {
        DeliveryStatus::from(s.to_string())
    }
}

impl From<DeliveryStatus> for String {
    fn from(status: DeliveryStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful `delivery_quotes` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteData {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    pub currency: String,
    #[serde(with = "timestamp")]
    pub dropoff_eta: DateTime<Utc>,
    pub duration: i64,
    #[serde(with = "timestamp")]
    pub expires: DateTime<Utc>,
    pub fee: i64,
}

/// A delivery as returned by create, get and cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryData {
    pub id: String,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub complete: bool,
    #[serde(with = "timestamp::option", default)]
    pub pickup_eta: Option<DateTime<Utc>>,
    #[serde(with = "timestamp::option", default)]
    pub dropoff_eta: Option<DateTime<Utc>>,
    #[serde(with = "timestamp::option", default)]
    pub dropoff_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fee: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Courier details; shape is owned by the service.
    #[serde(default)]
    pub courier: Option<serde_json::Value>,
}

/// Body of a `deliveries` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryList {
    #[serde(default)]
    pub data: Vec<DeliveryData>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next_href: Option<String>,
}
