//! Shared helpers for handler and middleware tests: a fake identity
//! provider, a router factory, and request/cookie plumbing.

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use tower::ServiceExt;

use gatehouse_provider::{
    AuthParams, Identity, Provider, ProviderError, ProviderRegistry, ProviderSession,
};
use gatehouse_session::{SESSION_COOKIE, SessionConfig, SessionStore};

use crate::auth::AppState;
use crate::static_files::StaticConfig;

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub(crate) const TEST_BASE_URL: &str = "http://gate.example";

/// Provider double: `code=good-code` authorizes, anything else fails the
/// exchange. Counts `authorize` calls so tests can assert idempotency.
#[derive(Debug)]
pub(crate) struct FakeProvider {
    authorize_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn begin_auth(&self, state: &str) -> Result<ProviderSession, ProviderError> {
        Ok(ProviderSession::new(format!(
            "https://idp.example/auth?client_id=test&state={}",
            state
        )))
    }

    async fn authorize(
        &self,
        session: &ProviderSession,
        params: &AuthParams,
    ) -> Result<ProviderSession, ProviderError> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        match params.get("code").map(String::as_str) {
            Some("good-code") => Ok(session.clone().with_access_token("tok-1".to_string())),
            Some(_) => Err(ProviderError::TokenExchange {
                details: "exchange rejected".to_string(),
            }),
            None => Err(ProviderError::MissingCode),
        }
    }

    async fn fetch_user(&self, session: &ProviderSession) -> Result<Identity, ProviderError> {
        match session.access_token() {
            Some("tok-1") => Ok(Identity::new("alice@example.com".to_string())),
            _ => Err(ProviderError::Unauthorized),
        }
    }
}

/// Application state plus the test-only handles around it.
pub(crate) struct TestCtx {
    state: Arc<AppState>,
    authorize_calls: Arc<AtomicUsize>,
    root: tempfile::TempDir,
}

impl TestCtx {
    /// The static content root; tests write fixture files here.
    pub(crate) fn root(&self) -> &Path {
        self.root.path()
    }
}

impl Deref for TestCtx {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

/// Builds the full router with a fake provider and a temp content root.
pub(crate) fn test_router(html5: bool) -> (TestCtx, Router) {
    let authorize_calls = Arc::new(AtomicUsize::new(0));
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(FakeProvider {
        authorize_calls: authorize_calls.clone(),
    }));

    let root = tempfile::tempdir().expect("create temp content root");
    let content = StaticConfig::new(root.path().to_path_buf()).with_html5(html5);
    let sessions = SessionStore::new(TEST_SECRET, SessionConfig::default()).expect("valid secret");

    let state = Arc::new(AppState::new(
        sessions,
        providers,
        TEST_BASE_URL.to_string(),
        content,
    ));
    let router = crate::router(state.clone());

    (
        TestCtx {
            state,
            authorize_calls,
            root,
        },
        router,
    )
}

pub(crate) fn authorize_count(ctx: &TestCtx) -> usize {
    ctx.authorize_calls.load(Ordering::SeqCst)
}

pub(crate) fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(crate) fn request_with_cookie(method: &str, uri: &str, cookie_value: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE, cookie_value),
        )
        .body(Body::empty())
        .expect("request builds")
}

pub(crate) async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("router is infallible")
}

/// Extracts the session cookie value from a response's `Set-Cookie`.
pub(crate) fn set_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets the session cookie")
        .to_str()
        .expect("set-cookie is ascii");
    let parsed = cookie::Cookie::parse_encoded(raw.to_string()).expect("set-cookie parses");
    assert_eq!(parsed.name(), SESSION_COOKIE);
    parsed.value().to_string()
}

/// Opens a sealed cookie value with the app's store and reads one key.
pub(crate) fn session_value(state: &AppState, cookie_value: &str, key: &str) -> Option<String> {
    let session = state.sessions.open(Some(cookie_value));
    state.sessions.get(&session, key).ok()
}
