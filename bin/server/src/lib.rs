//! Gatehouse server: an authentication gateway that serves a static site
//! behind an OAuth2 identity provider.
//!
//! The router exposes the three auth endpoints under `/_p/` and layers
//! the access-gated static server over everything else.

pub mod auth;
pub mod config;
pub mod error;
pub mod static_files;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;

use auth::{AppState, CALLBACK_PATH, LOGIN_PATH, LOGOUT_PATH};

/// Builds the full request-handling chain: auth routes first, then the
/// static gate wrapping them (and the 404 fallback, which acts as the
/// gate's "next handler" for unmatched paths).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(auth::login))
        .route(LOGOUT_PATH, get(auth::logout))
        .route(CALLBACK_PATH, get(auth::callback).post(auth::callback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            static_files::serve,
        ))
        .with_state(state)
}
