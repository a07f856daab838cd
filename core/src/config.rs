//! Client configuration: credentials and URL scoping.

use std::env;
use std::fmt;

use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.postmates.com";
pub const DEFAULT_VERSION: &str = "v1";

pub const ENV_API_KEY: &str = "POSTMATES_API_KEY";
pub const ENV_CUSTOMER_ID: &str = "POSTMATES_CUSTOMER_ID";
pub const ENV_API_VERSION: &str = "POSTMATES_API_VERSION";
pub const ENV_BASE_URL: &str = "POSTMATES_BASE_URL";

/// Credentials and addressing for a single customer account.
///
/// `Debug` redacts the API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    customer_id: String,
    version: String,
    base_url: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            customer_id: customer_id.into(),
            version: DEFAULT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Read configuration from `POSTMATES_*` environment variables.
    ///
    /// The API key and customer id are required; version and base URL fall
    /// back to their defaults when unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = required_var(ENV_API_KEY)?;
        let customer_id = required_var(ENV_CUSTOMER_ID)?;
        let mut config = Self::new(api_key, customer_id);
        if let Some(version) = optional_var(ENV_API_VERSION) {
            config = config.with_version(version);
        }
        if let Some(base_url) = optional_var(ENV_BASE_URL) {
            config = config.with_base_url(&base_url);
        }
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/{version}/customers/{customer_id}`, the prefix of every
    /// resource URL.
    pub fn customer_url(&self) -> String {
        format!(
            "{}/{}/customers/{}",
            self.base_url, self.version, self.customer_id
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .field("version", &self.version)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn required_var(name: &str) -> Result<String> {
    optional_var(name).ok_or_else(|| ApiError::Config(format!("{name} is not set")))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
