//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables: `APP_SECRET`, `APP_ENV`, `BASE_URL`,
//! `CONTENT_ROOT`, `PORT`, `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`,
//! `HTML5`, `INDEX_FILE`.

use serde::Deserialize;

use crate::auth::CALLBACK_PATH;

/// Server configuration, fixed at process start.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Secret used to derive the session cookie key. Required, at least
    /// 32 bytes.
    pub app_secret: String,

    /// Deployment environment. `production` turns on Secure cookies.
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Canonical base URL; builds the OAuth2 redirect URI and serves as
    /// the post-login/logout landing page.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root directory the static site is served from.
    #[serde(default = "default_content_root")]
    pub content_root: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Google OAuth2 client credentials.
    pub google_client_id: String,
    pub google_client_secret: String,

    /// Enable SPA routing: serve the index file for unmatched paths.
    #[serde(default)]
    pub html5: bool,

    /// Index file used for directories and SPA fallback.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_content_root() -> String {
    "./_site".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_index_file() -> String {
    "index.html".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns true when running in production.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// The OAuth2 redirect URI registered with the provider.
    #[must_use]
    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.base_url, CALLBACK_PATH)
    }
}
