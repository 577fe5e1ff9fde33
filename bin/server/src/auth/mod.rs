//! Authentication flow for the gatehouse server.
//!
//! This module provides:
//! - The `/_p/login`, `/_p/callback`, and `/_p/logout` handlers
//! - The `is_authenticated` predicate the static gate consults
//!
//! The flow is a cookie-carried state machine. Login and the callback are
//! independent request cycles (possibly on different processes), so all
//! state that must survive between them — the marshaled provider session
//! with the CSRF state embedded in its auth URL — lives exclusively in
//! the sealed session cookie, never in server memory.

pub mod routes;

pub use routes::{callback, is_authenticated, login, logout};

use gatehouse_provider::ProviderRegistry;
use gatehouse_session::SessionStore;

use crate::static_files::StaticConfig;

pub const LOGIN_PATH: &str = "/_p/login";
pub const LOGOUT_PATH: &str = "/_p/logout";
pub const CALLBACK_PATH: &str = "/_p/callback";

/// Requests under this prefix never require authentication, so the
/// login/callback/logout endpoints stay reachable.
pub const AUTH_NAMESPACE: &str = "/_p/";

/// Session key the authenticated identity (email) is stored under. Its
/// presence is the sole authorization predicate.
pub const IDENTITY_KEY: &str = "uid";

/// Shared application state, read-only after startup.
pub struct AppState {
    /// Cookie-backed session store.
    pub sessions: SessionStore,
    /// Identity provider registry, populated once at startup.
    pub providers: ProviderRegistry,
    /// Canonical base URL, landing page after login/logout.
    pub base_url: String,
    /// Static content configuration.
    pub content: StaticConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        sessions: SessionStore,
        providers: ProviderRegistry,
        base_url: String,
        content: StaticConfig,
    ) -> Self {
        Self {
            sessions,
            providers,
            base_url,
            content,
        }
    }
}
