//! Authenticated client for the PowerSchool REST API
//!
//! Owns the connection configuration and the token cache, and funnels every
//! outbound call through a single dispatcher that attaches the bearer token
//! and classifies failures. Response payloads are passed through as untyped
//! JSON; their shape is defined entirely by PowerSchool.

use crate::auth::{CachedToken, TokenCache, TokenResponse, DEFAULT_EXPIRES_IN_SECS};
use crate::{PowerSchoolConfig, PowerSchoolError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed timeout applied to every network call, auth included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for PowerSchool API interactions
#[derive(Debug, Clone)]
pub struct PowerSchoolClient {
    config: PowerSchoolConfig,
    http: Client,
    tokens: TokenCache,
}

impl PowerSchoolClient {
    /// Create a client from a validated configuration
    pub fn new(config: PowerSchoolConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PowerSchoolError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            tokens: TokenCache::new(),
        })
    }

    pub fn config(&self) -> &PowerSchoolConfig {
        &self.config
    }

    /// Return a valid bearer token, refreshing it when the cached one is
    /// absent or within its safety margin of expiry.
    ///
    /// The cache lock is held across the refresh, so concurrent callers never
    /// trigger duplicate token requests.
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut slot = self.tokens.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *slot = Some(fresh);
        Ok(access_token)
    }

    /// Request a new token from `{base_url}/oauth/access_token`.
    ///
    /// PowerSchool supports both the client-credentials and the
    /// resource-owner password grant; the password grant is used whenever
    /// end-user credentials are configured.
    async fn fetch_token(&self) -> Result<CachedToken> {
        let token_url = format!("{}/oauth/access_token", self.config.base_url);

        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];
        if let (true, Some(username), Some(password)) = (
            self.config.has_user_credentials(),
            self.config.username.as_deref(),
            self.config.password.as_deref(),
        ) {
            form.insert(0, ("grant_type", "password"));
            form.push(("username", username));
            form.push(("password", password));
        } else {
            form.insert(0, ("grant_type", "client_credentials"));
        }

        info!("Requesting new PowerSchool access token");
        let response = self
            .http
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                PowerSchoolError::Auth(format!("Failed to authenticate with PowerSchool: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PowerSchoolError::Auth(format!(
                "PowerSchool rejected the token request: HTTP {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            PowerSchoolError::Auth(format!("Failed to read PowerSchool token response: {e}"))
        })?;
        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            PowerSchoolError::Auth(format!(
                "Invalid JSON response from PowerSchool authentication: {e}"
            ))
        })?;

        let expires_in = token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        if expires_in <= crate::auth::TOKEN_SAFETY_MARGIN_SECS {
            warn!(expires_in, "Token lifetime is within the safety margin");
        }
        debug!(expires_in, "Obtained new PowerSchool access token");

        Ok(CachedToken::new(token.access_token, expires_in))
    }

    /// Make an authenticated request to the PowerSchool API and return the
    /// decoded JSON body.
    ///
    /// GET and DELETE carry no body; POST and PUT serialize `body` as JSON.
    /// Any other method is rejected before a token is acquired, so no network
    /// call is made.
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value> {
        if method != Method::GET
            && method != Method::POST
            && method != Method::PUT
            && method != Method::DELETE
        {
            return Err(PowerSchoolError::UnsupportedMethod(method.to_string()));
        }

        let token = self.get_valid_token().await?;
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!(%method, endpoint, "Dispatching PowerSchool request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if method == Method::POST || method == Method::PUT {
            if let Some(body) = body {
                request = request.json(body);
            }
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(PowerSchoolError::Connection(format!(
                "PowerSchool returned HTTP {status} for {endpoint}: {}",
                text.trim()
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            PowerSchoolError::Decode(format!("Invalid JSON response from PowerSchool: {e}"))
        })
    }

    /// Get current student information
    pub async fn get_student_info(&self) -> Result<Value> {
        self.request("/ws/v1/student", Method::GET, None).await
    }

    /// Get current grades for the student
    pub async fn get_grades(&self) -> Result<Value> {
        self.request("/ws/v1/student/grades", Method::GET, None)
            .await
    }

    /// Get assignments, optionally filtered by course section
    pub async fn get_assignments(&self, section_id: Option<i64>) -> Result<Value> {
        let endpoint = match section_id {
            Some(id) => format!("/ws/v1/student/assignments/section/{id}"),
            None => "/ws/v1/student/assignments".to_string(),
        };
        self.request(&endpoint, Method::GET, None).await
    }

    /// Get historical grades, optionally bounded by a date range
    pub async fn get_grade_history(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Value> {
        let query = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            if let Some(start) = start_date {
                query.append_pair("startDate", start);
            }
            if let Some(end) = end_date {
                query.append_pair("endDate", end);
            }
            query.finish()
        };

        let mut endpoint = String::from("/ws/v1/student/grades/history");
        if !query.is_empty() {
            endpoint.push('?');
            endpoint.push_str(&query);
        }
        self.request(&endpoint, Method::GET, None).await
    }

    /// Get the student's current courses/sections
    pub async fn get_courses(&self) -> Result<Value> {
        self.request("/ws/v1/student/sections", Method::GET, None)
            .await
    }

    /// Get student attendance records
    pub async fn get_attendance(&self) -> Result<Value> {
        self.request("/ws/v1/student/attendance", Method::GET, None)
            .await
    }
}

fn classify_transport_error(e: reqwest::Error) -> PowerSchoolError {
    if e.is_timeout() {
        PowerSchoolError::Timeout(format!(
            "Request to PowerSchool timed out after {} seconds",
            REQUEST_TIMEOUT.as_secs()
        ))
    } else {
        PowerSchoolError::Connection(format!("Failed to connect to PowerSchool: {e}"))
    }
}
