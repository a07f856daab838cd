//! Request builder, response parser and executor for the delivery API.
//!
//! # Design
//! Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Neither touches the network, so URL shape, authentication and decoding
//! are testable on their own. The `request_*` methods chain the two through
//! the client's `Transport`. Nothing is retried; the first failure is
//! returned to the caller.

use base64ct::{Base64, Encoding};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::location::PostFields;
use crate::types::{DeliveryData, DeliveryList, QuoteData};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Blocking client for one customer account.
#[derive(Debug, Clone)]
pub struct PostmatesClient<T> {
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "ureq")]
impl PostmatesClient<crate::transport::UreqTransport> {
    /// Client using the default `ureq`-backed transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, crate::transport::UreqTransport::new())
    }

    /// Client configured from `POSTMATES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<T> PostmatesClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn delivery_quotes_url(&self) -> String {
        format!("{}/delivery_quotes", self.config.customer_url())
    }

    pub fn deliveries_url(&self) -> String {
        format!("{}/deliveries", self.config.customer_url())
    }

    pub fn delivery_url(&self, delivery_id: &str) -> String {
        format!("{}/{delivery_id}", self.deliveries_url())
    }

    pub fn cancel_delivery_url(&self, delivery_id: &str) -> String {
        format!("{}/cancel", self.delivery_url(delivery_id))
    }

    /// `Basic base64("{api_key}:")`: the key is the username, the password is
    /// empty.
    fn authorization(&self) -> String {
        let credentials = format!("{}:", self.config.api_key());
        format!("Basic {}", Base64::encode_string(credentials.as_bytes()))
    }

    fn get(&self, url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("authorization".to_string(), self.authorization())],
            body: None,
        }
    }

    fn post(&self, url: String, fields: &PostFields) -> HttpRequest {
        let mut form = form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            if let Some(value) = value {
                form.append_pair(key, value);
            }
        }
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![
                ("authorization".to_string(), self.authorization()),
                ("content-type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body: Some(form.finish()),
        }
    }

    pub fn build_request_quote(&self, pickup_address: &str, dropoff_address: &str) -> HttpRequest {
        let mut fields = PostFields::new();
        fields.insert("pickup_address".to_string(), Some(pickup_address.to_string()));
        fields.insert("dropoff_address".to_string(), Some(dropoff_address.to_string()));
        self.post(self.delivery_quotes_url(), &fields)
    }

    /// `fields` is the flattened create form, see `Delivery::post_data`.
    pub fn build_request_delivery(&self, fields: &PostFields) -> HttpRequest {
        self.post(self.deliveries_url(), fields)
    }

    pub fn build_get_delivery(&self, delivery_id: &str) -> HttpRequest {
        self.get(self.delivery_url(delivery_id))
    }

    pub fn build_cancel_delivery(&self, delivery_id: &str) -> HttpRequest {
        self.post(self.cancel_delivery_url(delivery_id), &PostFields::new())
    }

    /// Build a listing request.
    ///
    /// `ongoing` is accepted but not sent: the service's `filter=ongoing`
    /// parameter did not behave as documented, so the full list is always
    /// requested.
    pub fn build_list_deliveries(&self, _ongoing: bool) -> HttpRequest {
        self.get(self.deliveries_url())
    }

    pub fn parse_request_quote(&self, response: HttpResponse) -> Result<QuoteData> {
        decode(response)
    }

    pub fn parse_request_delivery(&self, response: HttpResponse) -> Result<DeliveryData> {
        decode(response)
    }

    pub fn parse_get_delivery(&self, response: HttpResponse) -> Result<DeliveryData> {
        decode(response)
    }

    pub fn parse_cancel_delivery(&self, response: HttpResponse) -> Result<DeliveryData> {
        decode(response)
    }

    pub fn parse_list_deliveries(&self, response: HttpResponse) -> Result<DeliveryList> {
        decode(response)
    }
}

impl<T: Transport> PostmatesClient<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("{} {}", request.method.as_str(), request.url);
        let response = self.transport.execute(request)?;
        if !response.is_success() {
            warn!("request failed with HTTP {}", response.status);
        }
        Ok(response)
    }

    pub fn request_quote(&self, pickup_address: &str, dropoff_address: &str) -> Result<QuoteData> {
        let response = self.execute(self.build_request_quote(pickup_address, dropoff_address))?;
        self.parse_request_quote(response)
    }

    pub fn request_delivery(&self, fields: &PostFields) -> Result<DeliveryData> {
        let response = self.execute(self.build_request_delivery(fields))?;
        self.parse_request_delivery(response)
    }

    pub fn get_delivery(&self, delivery_id: &str) -> Result<DeliveryData> {
        let response = self.execute(self.build_get_delivery(delivery_id))?;
        self.parse_get_delivery(response)
    }

    pub fn cancel_delivery(&self, delivery_id: &str) -> Result<DeliveryData> {
        let response = self.execute(self.build_cancel_delivery(delivery_id))?;
        self.parse_cancel_delivery(response)
    }

    pub fn list_deliveries(&self, ongoing: bool) -> Result<DeliveryList> {
        let response = self.execute(self.build_list_deliveries(ongoing))?;
        self.parse_list_deliveries(response)
    }
}

/// Map non-success statuses to `ApiError`, otherwise decode the body.
fn decode<D: DeserializeOwned>(response: HttpResponse) -> Result<D> {
    if !response.is_success() {
        return Err(ApiError::from_failure_body(response.status, &response.body));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}
