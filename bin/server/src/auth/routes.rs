//! Login, callback, and logout handlers.

use std::sync::Arc;

use axum::extract::{RawQuery, Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;

use gatehouse_provider::{AuthParams, ProviderSession};
use gatehouse_session::{SESSION_COOKIE, SessionError};

use super::{AppState, IDENTITY_KEY};
use crate::error::AppError;

/// Upper bound for a callback form body. Provider callbacks are tiny.
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// Starts the OAuth2 flow: binds a CSRF state token to a fresh provider
/// session, stores the marshaled session in the cookie, and redirects
/// (307) to the provider's authorization URL.
///
/// Nothing is written to the session if the adapter fails first.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let params = parse_params(query.as_deref().unwrap_or(""));
    let provider = state
        .providers
        .resolve(params.get("provider").map(String::as_str))?;

    let csrf = resolve_state(&params);
    let attempt = provider.begin_auth(&csrf)?;
    let auth_url = attempt.auth_url().to_string();
    let marshaled = provider.marshal(&attempt)?;

    let mut session = state.sessions.open(session_cookie(&jar));
    state
        .sessions
        .put(&mut session, provider.name(), &marshaled)?;
    let jar = jar.add(state.sessions.seal(&session)?);

    tracing::info!(provider = provider.name(), "login initiated");
    Ok((jar, Redirect::temporary(&auth_url)).into_response())
}

/// Completes the OAuth2 flow: validates the CSRF state against the stored
/// auth URL, exchanges the code for a token when needed, stores the
/// authenticated identity, and redirects (307) to the base URL.
///
/// A callback whose stored provider session already holds a valid token
/// is satisfied without a second exchange, so retries are idempotent.
/// Any failing step aborts without touching the client's cookie.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    req: Request,
) -> Result<Response, AppError> {
    let params = callback_params(req).await?;
    let provider = state
        .providers
        .resolve(params.get("provider").map(String::as_str))?;

    let mut session = state.sessions.open(session_cookie(&jar));
    let stored = state
        .sessions
        .get(&session, provider.name())
        .map_err(|err| match err {
            SessionError::NotFound => AppError::NoLoginInProgress,
            other => AppError::Session(other),
        })?;
    let mut attempt = provider.unmarshal(&stored)?;

    validate_state(&attempt, params.get("state").map(String::as_str))?;

    let identity = match provider.fetch_user(&attempt).await {
        // the attempt already carries a valid token: a retried callback
        // yields the identity without another exchange
        Ok(identity) => identity,
        Err(_) => {
            attempt = provider.authorize(&attempt, &params).await?;
            let marshaled = provider.marshal(&attempt)?;
            state
                .sessions
                .put(&mut session, provider.name(), &marshaled)?;
            provider.fetch_user(&attempt).await?
        }
    };

    state
        .sessions
        .put(&mut session, IDENTITY_KEY, identity.email())?;
    let jar = jar.add(state.sessions.seal(&session)?);

    tracing::info!(provider = provider.name(), "callback completed");
    Ok((jar, Redirect::temporary(&state.base_url)).into_response())
}

/// Destroys the session and redirects (307) to the base URL. Succeeds
/// even when no session existed.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Response, AppError> {
    let mut session = state.sessions.open(session_cookie(&jar));
    state.sessions.destroy(&mut session);
    let jar = jar.add(state.sessions.seal(&session)?);

    tracing::info!("session destroyed");
    Ok((jar, Redirect::temporary(&state.base_url)).into_response())
}

/// True iff the request's session carries a decodable identity.
#[must_use]
pub fn is_authenticated(state: &AppState, jar: &CookieJar) -> bool {
    let session = state.sessions.open(session_cookie(jar));
    state.sessions.get(&session, IDENTITY_KEY).is_ok()
}

fn session_cookie<'a>(jar: &'a CookieJar) -> Option<&'a str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}

fn parse_params(query: &str) -> AuthParams {
    serde_urlencoded::from_str(query).unwrap_or_default()
}

/// Request parameters for the callback: the query string, or the
/// urlencoded form body when a POST arrives without query parameters.
async fn callback_params(req: Request) -> Result<AuthParams, AppError> {
    let query = req.uri().query().unwrap_or("");
    if !query.is_empty() {
        return Ok(parse_params(query));
    }

    if req.method() == Method::POST {
        let bytes = axum::body::to_bytes(req.into_body(), FORM_BODY_LIMIT)
            .await
            .map_err(|err| AppError::InvalidRequest {
                details: format!("unreadable form body: {}", err),
            })?;
        return Ok(serde_urlencoded::from_bytes(&bytes).unwrap_or_default());
    }

    Ok(AuthParams::new())
}

/// The state token the caller supplied, or a fresh unguessable nonce.
fn resolve_state(params: &AuthParams) -> String {
    if let Some(state) = params.get("state") {
        if !state.is_empty() {
            return state.clone();
        }
    }

    let mut nonce = [0u8; 64];
    rand::rng().fill_bytes(&mut nonce);
    URL_SAFE.encode(nonce)
}

/// Ensures the `state` embedded in the stored auth URL matches the one
/// the provider echoed back on this request.
fn validate_state(attempt: &ProviderSession, request_state: Option<&str>) -> Result<(), AppError> {
    let original = attempt.state()?;
    if !original.is_empty() && original != request_state.unwrap_or("") {
        return Err(AppError::StateMismatch);
    }
    Ok(())
}
