//! In-flight authorization attempt state.
//!
//! A [`ProviderSession`] is created by `begin_auth`, marshaled into the
//! browser session before the redirect, and unmarshaled again on the
//! callback. Before the token exchange it only carries the authorization
//! URL (with the CSRF state embedded); after `authorize` it also carries
//! the token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Serializable state of one authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    auth_url: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl ProviderSession {
    /// Creates the pre-exchange state for a fresh attempt.
    #[must_use]
    pub fn new(auth_url: String) -> Self {
        Self {
            auth_url,
            access_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Attaches the access token obtained from the exchange.
    #[must_use]
    pub fn with_access_token(mut self, token: String) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Attaches the refresh token, when the provider issued one.
    #[must_use]
    pub fn with_refresh_token(mut self, token: Option<String>) -> Self {
        self.refresh_token = token;
        self
    }

    /// Attaches the token expiry.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Returns the URL the user must be redirected to.
    #[must_use]
    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Returns the access token, if the exchange has happened.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the refresh token, if the provider issued one.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns true if the token has an expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|t| t <= Utc::now())
    }

    /// Extracts the CSRF state token embedded in the authorization URL.
    /// Returns an empty string when the URL carries no `state` parameter.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidAuthUrl`] when the stored URL does not
    /// parse; an unmarshaled session may contain arbitrary strings.
    pub fn state(&self) -> Result<String, ProviderError> {
        let url = url::Url::parse(&self.auth_url).map_err(|e| ProviderError::InvalidAuthUrl {
            details: e.to_string(),
        })?;
        Ok(url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default())
    }
}
