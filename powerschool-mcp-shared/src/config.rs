//! Configuration for the PowerSchool API client
//!
//! Read once at startup from the `POWERSCHOOL_*` environment variables and
//! validated at construction. A missing base URL, client id or client secret
//! is fatal; username and password are optional and only switch the OAuth
//! grant type.

use crate::{PowerSchoolError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Immutable PowerSchool connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSchoolConfig {
    /// Base URL of the PowerSchool instance, without trailing slash
    pub base_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Optional end-user username (enables the password grant)
    pub username: Option<String>,
    /// Optional end-user password (enables the password grant)
    pub password: Option<String>,
}

impl PowerSchoolConfig {
    /// Create a validated configuration
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let base_url: String = base_url.into();
        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.filter(|s| !s.is_empty()),
            password: password.filter(|s| !s.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `POWERSCHOOL_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(
            env_var("POWERSCHOOL_URL"),
            env_var("POWERSCHOOL_CLIENT_ID"),
            env_var("POWERSCHOOL_CLIENT_SECRET"),
            Some(env_var("POWERSCHOOL_USERNAME")),
            Some(env_var("POWERSCHOOL_PASSWORD")),
        )
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() || self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(PowerSchoolError::Config(
                "PowerSchool configuration incomplete. Set POWERSCHOOL_URL, \
                 POWERSCHOOL_CLIENT_ID and POWERSCHOOL_CLIENT_SECRET."
                    .to_string(),
            ));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| PowerSchoolError::Config(format!("Invalid PowerSchool URL: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PowerSchoolError::Config(format!(
                "Invalid PowerSchool URL scheme: {scheme}"
            ))),
        }
    }

    /// Whether end-user credentials are configured (selects the password grant)
    pub fn has_user_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Report which configuration fields are set, without exposing values
    pub fn status(&self) -> serde_json::Value {
        serde_json::json!({
            "powerschool_url_set": !self.base_url.is_empty(),
            "client_id_set": !self.client_id.is_empty(),
            "client_secret_set": !self.client_secret.is_empty(),
            "username_set": self.username.is_some(),
            "password_set": self.password.is_some(),
        })
    }
}

fn env_var(name: &str) -> String {
    env::var(name).unwrap_or_default()
}
