//! Cookie-resident sessions for the gatehouse auth gateway.
//!
//! This crate provides:
//! - A value codec (`codec`) that gzip-compresses individual session values
//!   so larger provider blobs do not blow up the cookie size
//! - A `SessionStore` that seals the whole key/value mapping into a single
//!   authenticated-encrypted cookie, and opens it again on the next request
//!
//! Sessions are stateless: nothing is persisted server-side. Every request
//! carries its own session snapshot in the cookie, and every response that
//! mutates the session writes an updated cookie. A cookie that fails
//! authentication (tampered, truncated, wrong key) opens as an empty
//! session, indistinguishable from "no cookie at all".
//!
//! # Example
//!
//! ```
//! use gatehouse_session::{Session, SessionConfig, SessionStore};
//!
//! let store = SessionStore::new("0123456789abcdef0123456789abcdef", SessionConfig::default())
//!     .expect("secret is long enough");
//!
//! let mut session = store.open(None);
//! store.put(&mut session, "uid", "alice@example.com").unwrap();
//!
//! let cookie = store.seal(&session).unwrap();
//! let reopened = store.open(Some(cookie.value()));
//! assert_eq!(store.get(&reopened, "uid").unwrap(), "alice@example.com");
//! ```

pub mod codec;
pub mod error;
pub mod store;

pub use error::{CodecError, SessionError};
pub use store::{DEFAULT_MAX_AGE, SESSION_COOKIE, Session, SessionConfig, SessionStore};
