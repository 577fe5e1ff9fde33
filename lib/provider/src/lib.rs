//! Identity provider adapters for the gatehouse auth gateway.
//!
//! This crate provides:
//! - The [`Provider`] capability: begin-auth, marshal/unmarshal,
//!   authorize (code-for-token exchange), and fetch-user
//! - [`ProviderSession`], the serializable in-flight state of one
//!   authorization attempt
//! - [`GoogleProvider`], an OAuth2 adapter for Google accounts
//! - [`ProviderRegistry`], the name → adapter map built once at startup
//!
//! The auth flow never inspects provider internals: it round-trips the
//! provider session as an opaque marshaled string between the login and
//! callback requests, because the adapter instance itself does not persist
//! across those independent request cycles.

pub mod error;
pub mod google;
pub mod identity;
pub mod registry;
pub mod session;

use std::collections::HashMap;

use async_trait::async_trait;

pub use error::ProviderError;
pub use google::GoogleProvider;
pub use identity::Identity;
pub use registry::ProviderRegistry;
pub use session::ProviderSession;

/// Request parameters handed to [`Provider::authorize`]: the callback's
/// query string (or form body) as a flat key/value map.
pub type AuthParams = HashMap<String, String>;

/// A pluggable OAuth2 identity provider.
///
/// Implementations must be stateless with respect to individual
/// authorization attempts: everything an attempt needs later lives in the
/// [`ProviderSession`] it returns.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Stable provider name, also used as the session key the marshaled
    /// provider session is stored under.
    fn name(&self) -> &'static str;

    /// Starts an authorization attempt bound to the given CSRF state
    /// token. The returned session carries the authorization URL the user
    /// must be redirected to, with the state embedded as a query
    /// parameter the provider echoes back.
    fn begin_auth(&self, state: &str) -> Result<ProviderSession, ProviderError>;

    /// Serializes a provider session for storage between requests.
    fn marshal(&self, session: &ProviderSession) -> Result<String, ProviderError> {
        serde_json::to_string(session).map_err(|e| ProviderError::Marshal {
            details: e.to_string(),
        })
    }

    /// Restores a provider session stored by [`marshal`](Self::marshal).
    fn unmarshal(&self, raw: &str) -> Result<ProviderSession, ProviderError> {
        serde_json::from_str(raw).map_err(|e| ProviderError::Marshal {
            details: e.to_string(),
        })
    }

    /// Exchanges the callback parameters (authorization code) for an
    /// access token, producing an updated session.
    async fn authorize(
        &self,
        session: &ProviderSession,
        params: &AuthParams,
    ) -> Result<ProviderSession, ProviderError>;

    /// Returns the identity behind an authorized session.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Unauthorized`] when the session holds no valid
    /// token yet.
    async fn fetch_user(&self, session: &ProviderSession) -> Result<Identity, ProviderError>;
}
