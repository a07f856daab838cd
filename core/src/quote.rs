//! Time-limited price quotes.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;

use crate::client::PostmatesClient;
use crate::error::Result;
use crate::http::Transport;
use crate::timestamp;
use crate::types::QuoteData;

/// A priced estimate for one pickup/dropoff pair.
///
/// Only obtainable through `DeliveryQuote::request`; fields never change
/// afterwards. Pass it to `Delivery::new` to lock in the quoted fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryQuote {
    quote_id: String,
    pickup_address: String,
    dropoff_address: String,
    created: DateTime<Utc>,
    expires: DateTime<Utc>,
    dropoff_eta: DateTime<Utc>,
    currency: String,
    duration: i64,
    fee: i64,
}

impl DeliveryQuote {
    /// Ask the service for a quote between two addresses.
    pub fn request<T: Transport>(
        client: &PostmatesClient<T>,
        pickup_address: &str,
        dropoff_address: &str,
    ) -> Result<Self> {
        let data = client.request_quote(pickup_address, dropoff_address)?;
        debug!("received quote {} expiring {}", data.id, timestamp::format(&data.expires));
        Ok(Self::from_data(pickup_address, dropoff_address, data))
    }

    pub(crate) fn from_data(pickup_address: &str, dropoff_address: &str, data: QuoteData) -> Self {
        Self {
            quote_id: data.id,
            pickup_address: pickup_address.to_string(),
            dropoff_address: dropoff_address.to_string(),
            created: data.created,
            expires: data.expires,
            dropoff_eta: data.dropoff_eta,
            currency: data.currency,
            duration: data.duration,
            fee: data.fee,
        }
    }

    pub fn quote_id(&self) -> &str {
        &self.quote_id
    }

    pub fn pickup_address(&self) -> &str {
        &self.pickup_address
    }

    pub fn dropoff_address(&self) -> &str {
        &self.dropoff_address
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn expires(&self) -> DateTime<Utc> {
        self.expires
    }

    pub fn dropoff_eta(&self) -> DateTime<Utc> {
        self.dropoff_eta
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Estimated minutes until dropoff.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Fee in minor currency units.
    pub fn fee(&self) -> i64 {
        self.fee
    }

    /// Evaluated against the clock on every call.
    pub fn expired(&self) -> bool {
        self.expired_at(Utc::now())
    }

    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires < now
    }
}

/// `$D.CC currency` from minor units.
pub(crate) fn format_fee(fee: i64, currency: &str) -> String {
    format!("${:.2} {currency}", fee as f64 / 100.0)
}

impl fmt::Display for DeliveryQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Postmates Delivery Quote --------")?;
        writeln!(f, "ID: {}", self.quote_id)?;
        writeln!(f, "Created At: {}", timestamp::local(&self.created))?;
        writeln!(f, "Fee: {}", format_fee(self.fee, &self.currency))?;
        writeln!(f, "Dropoff ETA: {}", timestamp::local(&self.dropoff_eta))?;
        writeln!(f, "Expires: {}", timestamp::local(&self.expires))?;
        write!(f, "Expired: {}", self.expired())
    }
}
