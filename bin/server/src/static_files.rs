//! Access-gated static file serving.
//!
//! A middleware layered over the whole router: it gates every request on
//! the session's identity (with the `/_p/` auth namespace whitelisted),
//! then serves files from the content root. Paths that resolve to nothing
//! on disk fall through to the inner router — the "next handler" — so the
//! auth routes and any future API routes coexist with static content.
//! With HTML5 mode on, a downstream 404 is answered with the index file
//! instead, so client-side routing can take over.

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::auth::{self, AUTH_NAMESPACE, AppState, LOGIN_PATH};
use crate::error::AppError;

const DEFAULT_INDEX: &str = "index.html";

/// Static content configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    /// Root directory the content is served from.
    pub root: PathBuf,
    /// Index file for directories (and the SPA fallback).
    pub index: String,
    /// Serve the index file for unmatched routes (SPA mode).
    pub html5: bool,
}

impl StaticConfig {
    /// Creates a config serving `root` with the default index file.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            index: DEFAULT_INDEX.to_string(),
            html5: false,
        }
    }

    /// Overrides the index file name.
    #[must_use]
    pub fn with_index(mut self, index: String) -> Self {
        self.index = index;
        self
    }

    /// Enables or disables SPA fallback.
    #[must_use]
    pub fn with_html5(mut self, html5: bool) -> Self {
        self.html5 = html5;
        self
    }
}

/// The gate-and-serve middleware.
///
/// Every filesystem miss is recoverable by falling through to `next`;
/// any other IO error is fatal and propagates.
pub async fn serve(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();
    if !is_allowed(path) && !auth::is_authenticated(&state, &jar) {
        let login_url = format!("{}{}", state.base_url, LOGIN_PATH);
        return Ok(Redirect::temporary(&login_url).into_response());
    }

    let decoded = percent_decode_str(req.uri().path())
        .decode_utf8()
        .map_err(|_| AppError::InvalidRequest {
            details: "request path is not valid UTF-8".to_string(),
        })?
        .into_owned();
    // anchored clean keeps the resolved path inside the content root
    let cleaned = clean_path(&decoded);
    let resolved = state.content.root.join(cleaned.trim_start_matches('/'));

    // the request is consumed by `next`, keep what file serving needs
    let method = req.method().clone();
    let headers = req.headers().clone();

    match tokio::fs::metadata(&resolved).await {
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // no such file: hand over to the route handlers
            let response = next.run(req).await;
            if !(state.content.html5 && response.status() == StatusCode::NOT_FOUND) {
                return Ok(response);
            }

            tracing::debug!(path = %cleaned, "serving SPA index for unmatched route");
            let index = state.content.root.join(&state.content.index);
            let meta = tokio::fs::metadata(&index).await.map_err(AppError::Io)?;
            serve_file(&method, &headers, &index, &meta).await
        }
        Err(err) => Err(AppError::Io(err)),
        Ok(meta) if meta.is_dir() => {
            let index = resolved.join(&state.content.index);
            match tokio::fs::metadata(&index).await {
                Ok(meta) => serve_file(&method, &headers, &index, &meta).await,
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(next.run(req).await),
                Err(err) => Err(AppError::Io(err)),
            }
        }
        Ok(meta) => serve_file(&method, &headers, &resolved, &meta).await,
    }
}

fn is_allowed(path: &str) -> bool {
    path.starts_with(AUTH_NAMESPACE)
}

/// Serves one file, delegating byte transfer and the remaining
/// conditional-GET/range handling to `ServeFile`.
async fn serve_file(
    method: &Method,
    headers: &HeaderMap,
    path: &Path,
    meta: &Metadata,
) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::MethodNotAllowed);
    }

    let etag = compute_etag(meta);

    if let Some(etag) = etag.as_deref() {
        let matches = headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == etag);
        if matches {
            let mut response = StatusCode::NOT_MODIFIED.into_response();
            if let Ok(value) = HeaderValue::from_str(etag) {
                response.headers_mut().insert(header::ETAG, value);
            }
            return Ok(response);
        }
    }

    let mut file_req = Request::new(Body::empty());
    *file_req.method_mut() = method.clone();
    *file_req.headers_mut() = headers.clone();

    let mut response = match ServeFile::new(path).oneshot(file_req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    if let Some(etag) = etag {
        if !response.headers().contains_key(header::ETAG) {
            if let Ok(value) = HeaderValue::from_str(&etag) {
                response.headers_mut().insert(header::ETAG, value);
            }
        }
    }

    Ok(response)
}

/// Strong ETag from modification time and size. A zero (or epoch+1)
/// mtime carries no information, so no ETag is produced for it.
fn compute_etag(meta: &Metadata) -> Option<String> {
    let mtime = meta
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_secs();
    if mtime <= 1 {
        return None;
    }
    Some(format!("\"{}{}\"", base36(mtime), base36(meta.len())))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Lexically cleans a request path, always anchored at `/`, so `..`
/// segments can never climb above the root.
fn clean_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            segment => stack.push(segment),
        }
    }

    let mut cleaned = String::from("/");
    cleaned.push_str(&stack.join("/"));
    cleaned
}
