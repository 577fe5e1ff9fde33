//! Error types for identity provider adapters.

use std::fmt;

/// Errors from provider lookup and the OAuth2 flow.
#[derive(Debug)]
pub enum ProviderError {
    /// No provider is registered under the requested name.
    UnknownProvider { name: String },
    /// Invalid endpoint or redirect URL at construction time.
    Configuration { details: String },
    /// The callback parameters carried no authorization code.
    MissingCode,
    /// The code-for-token exchange failed.
    TokenExchange { details: String },
    /// The session holds no valid token yet.
    Unauthorized,
    /// The userinfo endpoint rejected the request or returned garbage.
    Userinfo { details: String },
    /// The provider returned no email address for the user.
    MissingEmail,
    /// A provider session could not be (de)serialized.
    Marshal { details: String },
    /// The stored authorization URL could not be parsed.
    InvalidAuthUrl { details: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProvider { name } => {
                write!(f, "no identity provider registered as '{}'", name)
            }
            Self::Configuration { details } => {
                write!(f, "provider configuration error: {}", details)
            }
            Self::MissingCode => write!(f, "callback carried no authorization code"),
            Self::TokenExchange { details } => {
                write!(f, "token exchange failed: {}", details)
            }
            Self::Unauthorized => write!(f, "provider session holds no valid token"),
            Self::Userinfo { details } => {
                write!(f, "failed to fetch user info: {}", details)
            }
            Self::MissingEmail => write!(f, "provider returned no email address"),
            Self::Marshal { details } => {
                write!(f, "provider session could not be serialized: {}", details)
            }
            Self::InvalidAuthUrl { details } => {
                write!(f, "stored authorization URL is invalid: {}", details)
            }
        }
    }
}

impl std::error::Error for ProviderError {}
