//! Blocking client for the Postmates same-day delivery API.
//!
//! # Overview
//! Request a quote between two addresses, submit a delivery (optionally
//! locking in a quote), poll its status and cancel it before pickup.
//!
//! # Design
//! - `PostmatesClient` splits every endpoint into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); `request_*`
//!   joins them through a pluggable `Transport`.
//! - `Delivery` is the only stateful type. Its status is whatever the
//!   service last reported; local checks guard `create` and `cancel`.
//! - All failures surface as `ApiError`. Nothing is retried.
//!
//! ```no_run
//! use postmates_core::{ClientConfig, Delivery, DeliveryQuote, Location, PostmatesClient};
//!
//! # fn main() -> postmates_core::Result<()> {
//! let client = PostmatesClient::new(ClientConfig::new("api-key", "cus_123"));
//! let pickup = Location::new("Alice", "20 McAllister St, San Francisco, CA", "415-555-0100");
//! let dropoff = Location::new("Bob", "101 Market St, San Francisco, CA", "415-555-0101");
//!
//! let quote = DeliveryQuote::request(&client, "20 McAllister St, San Francisco, CA", "101 Market St, San Francisco, CA")?;
//! let mut delivery = Delivery::new("a box of cookies", pickup, dropoff, Some(quote));
//! delivery.create(&client)?;
//! delivery.update_status(&client)?;
//! println!("{delivery}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod location;
pub mod quote;
pub mod timestamp;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::PostmatesClient;
pub use config::ClientConfig;
pub use delivery::Delivery;
pub use error::{ApiError, ErrorCode, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use location::{Location, PostFields};
pub use quote::DeliveryQuote;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{DeliveryData, DeliveryList, DeliveryStatus, QuoteData};
