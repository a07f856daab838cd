//! Delivery lifecycle.
//!
//! # Design
//! A `Delivery` starts `Unsubmitted` and only ever takes on statuses the
//! service reports. `create` and `cancel` check their preconditions locally
//! and fail with `ApiError::Validation` before any request is made. Every
//! successful round-trip replaces the whole server-owned field set from a
//! single decoded response; a failed call leaves the instance untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;

use crate::client::PostmatesClient;
use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::location::{Location, PostFields};
use crate::quote::{format_fee, DeliveryQuote};
use crate::timestamp;
use crate::types::{DeliveryData, DeliveryStatus};

/// One delivery request and its last known server state.
///
/// Not synchronized: share across threads only behind external locking.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    manifest: String,
    pickup: Location,
    dropoff: Location,
    quote: Option<DeliveryQuote>,

    delivery_id: Option<String>,
    status: DeliveryStatus,
    complete: bool,
    pickup_eta: Option<DateTime<Utc>>,
    dropoff_eta: Option<DateTime<Utc>>,
    dropoff_deadline: Option<DateTime<Utc>>,
    fee: Option<i64>,
    currency: Option<String>,
    courier: Option<serde_json::Value>,
}

impl Delivery {
    pub fn new(
        manifest: impl Into<String>,
        pickup: Location,
        dropoff: Location,
        quote: Option<DeliveryQuote>,
    ) -> Self {
        Self {
            manifest: manifest.into(),
            pickup,
            dropoff,
            quote,
            delivery_id: None,
            status: DeliveryStatus::Unsubmitted,
            complete: false,
            pickup_eta: None,
            dropoff_eta: None,
            dropoff_deadline: None,
            fee: None,
            currency: None,
            courier: None,
        }
    }

    /// Submit the delivery.
    ///
    /// Fails without contacting the service if either location is incomplete,
    /// the delivery was already submitted, or the attached quote has expired.
    pub fn create<T: Transport>(&mut self, client: &PostmatesClient<T>) -> Result<()> {
        self.check_creatable(Utc::now())?;
        let data = client.request_delivery(&self.post_data())?;
        self.apply(data);
        Ok(())
    }

    fn check_creatable(&self, now: DateTime<Utc>) -> Result<()> {
        if !self.pickup.is_valid() {
            return Err(ApiError::Validation(format!(
                "Pickup is missing required attributes\n{}",
                self.pickup
            )));
        }
        if !self.dropoff.is_valid() {
            return Err(ApiError::Validation(format!(
                "Dropoff is missing required attributes\n{}",
                self.dropoff
            )));
        }
        if self.status != DeliveryStatus::Unsubmitted {
            return Err(ApiError::Validation(
                "Cannot create a delivery that has already been submitted".to_string(),
            ));
        }
        if self.quote.as_ref().is_some_and(|q| q.expired_at(now)) {
            return Err(ApiError::Validation(
                "Attempting to submit expired delivery quote".to_string(),
            ));
        }
        Ok(())
    }

    /// Refresh from the service. Does nothing until the delivery has an id.
    pub fn update_status<T: Transport>(&mut self, client: &PostmatesClient<T>) -> Result<()> {
        let Some(delivery_id) = self.delivery_id.as_deref() else {
            return Ok(());
        };
        let data = client.get_delivery(delivery_id)?;
        self.apply(data);
        Ok(())
    }

    /// Cancel a delivery that has not been picked up yet.
    pub fn cancel<T: Transport>(&mut self, client: &PostmatesClient<T>) -> Result<()> {
        if !self.status.is_cancelable() {
            return Err(ApiError::Validation(
                "Can only cancel deliveries not yet picked up".to_string(),
            ));
        }
        let Some(delivery_id) = self.delivery_id.as_deref() else {
            return Err(ApiError::Validation(
                "Cannot cancel a delivery without an id".to_string(),
            ));
        };
        let data = client.cancel_delivery(delivery_id)?;
        self.apply(data);
        Ok(())
    }

    /// Form fields for the create call: manifest, both locations and the
    /// quote id when a quote is attached.
    pub fn post_data(&self) -> PostFields {
        let mut fields = PostFields::new();
        fields.insert("manifest".to_string(), Some(self.manifest.clone()));
        fields.extend(self.pickup.to_post_fields("pickup"));
        fields.extend(self.dropoff.to_post_fields("dropoff"));
        if let Some(quote) = &self.quote {
            fields.insert("quote_id".to_string(), Some(quote.quote_id().to_string()));
        }
        fields
    }

    fn apply(&mut self, data: DeliveryData) {
        if self.status != data.status {
            debug!(
                "delivery {} moved from {} to {}",
                data.id, self.status, data.status
            );
        }
        self.delivery_id = Some(data.id);
        self.status = data.status;
        self.complete = data.complete;
        self.pickup_eta = data.pickup_eta;
        self.dropoff_eta = data.dropoff_eta;
        self.dropoff_deadline = data.dropoff_deadline;
        self.fee = data.fee;
        self.currency = data.currency;
        self.courier = data.courier;
    }

    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    pub fn pickup(&self) -> &Location {
        &self.pickup
    }

    pub fn dropoff(&self) -> &Location {
        &self.dropoff
    }

    pub fn quote(&self) -> Option<&DeliveryQuote> {
        self.quote.as_ref()
    }

    pub fn delivery_id(&self) -> Option<&str> {
        self.delivery_id.as_deref()
    }

    pub fn status(&self) -> &DeliveryStatus {
        &self.status
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn pickup_eta(&self) -> Option<DateTime<Utc>> {
        self.pickup_eta
    }

    pub fn dropoff_eta(&self) -> Option<DateTime<Utc>> {
        self.dropoff_eta
    }

    pub fn dropoff_deadline(&self) -> Option<DateTime<Utc>> {
        self.dropoff_deadline
    }

    pub fn fee(&self) -> Option<i64> {
        self.fee
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn courier(&self) -> Option<&serde_json::Value> {
        self.courier.as_ref()
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Postmates Delivery")?;
        writeln!(f, "Manifest (required): {}", self.manifest)?;
        writeln!(f, "Pickup --------------")?;
        writeln!(f, "{}", self.pickup)?;
        writeln!(f, "Dropoff --------------")?;
        write!(f, "{}", self.dropoff)?;

        if self.status == DeliveryStatus::Unsubmitted {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "Status --------------")?;
        writeln!(f, "Delivery ID: {}", self.delivery_id.as_deref().unwrap_or("None"))?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Complete: {}", self.complete)?;
        writeln!(f, "Pickup ETA: {}", timestamp::local_opt(&self.pickup_eta))?;
        writeln!(f, "Dropoff ETA: {}", timestamp::local_opt(&self.dropoff_eta))?;
        writeln!(f, "Dropoff Deadline: {}", timestamp::local_opt(&self.dropoff_deadline))?;
        if let (Some(fee), Some(currency)) = (self.fee, self.currency.as_deref()) {
            writeln!(f, "Fee: {}", format_fee(fee, currency))?;
        }
        match &self.courier {
            Some(courier) => write!(f, "Courier: {courier}"),
            None => write!(f, "Courier: None"),
        }
    }
}
