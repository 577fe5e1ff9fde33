//! Session lifecycle over an authenticated-encrypted cookie.
//!
//! A [`Session`] is a key/value mapping scoped to one browser. The
//! [`SessionStore`] opens it from the request's cookie value, mutates it,
//! and seals it back into a `Set-Cookie` payload. The whole mapping is
//! encrypted and authenticated with a key derived from the server secret,
//! so clients can neither read nor forge session contents.

use std::collections::BTreeMap;

use cookie::{Cookie, CookieJar, Key, SameSite};
use time::Duration;

use crate::codec;
use crate::error::SessionError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "_psession";

/// Default session lifetime.
pub const DEFAULT_MAX_AGE: Duration = Duration::days(7);

/// Cookie path scope. Sessions always cover the whole site.
const COOKIE_PATH: &str = "/";

/// Fixed session cookie policy, decided at process start.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the cookie stays valid on the client.
    pub max_age: Duration,
    /// Whether to set the Secure flag. True in production only, so local
    /// development over plaintext HTTP keeps working.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            secure: false,
        }
    }
}

/// One browser's session: the decoded key/value mapping plus its
/// destruction flag. Obtained from [`SessionStore::open`], written back
/// via [`SessionStore::seal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    values: BTreeMap<String, String>,
    destroyed: bool,
}

impl Session {
    /// Returns true if the session holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the session has been destroyed and will expire the
    /// client cookie when sealed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Encodes sessions into cookies and back.
///
/// Read-only after construction; safe to share across request handlers.
pub struct SessionStore {
    key: Key,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store from the server secret.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WeakSecret`] when the secret is shorter than
    /// the 32 bytes required for key derivation.
    pub fn new(secret: &str, config: SessionConfig) -> Result<Self, SessionError> {
        if secret.len() < 32 {
            return Err(SessionError::WeakSecret {
                length: secret.len(),
            });
        }

        Ok(Self {
            key: Key::derive_from(secret.as_bytes()),
            config,
        })
    }

    /// Opens the session carried by the given cookie value.
    ///
    /// Absent, tampered, or otherwise undecodable cookies all open as an
    /// empty session. A forged cookie must not be distinguishable from a
    /// missing one.
    #[must_use]
    pub fn open(&self, raw: Option<&str>) -> Session {
        let Some(raw) = raw else {
            return Session::default();
        };

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(SESSION_COOKIE, raw.to_string()));

        match jar.private(&self.key).get(SESSION_COOKIE) {
            Some(sealed) => match serde_json::from_str(sealed.value()) {
                Ok(values) => Session {
                    values,
                    destroyed: false,
                },
                Err(_) => Session::default(),
            },
            None => Session::default(),
        }
    }

    /// Retrieves a previously stored value.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] when no value exists at `key`,
    /// [`SessionError::Decode`] when the stored value is corrupt.
    pub fn get(&self, session: &Session, key: &str) -> Result<String, SessionError> {
        let stored = session.values.get(key).ok_or(SessionError::NotFound)?;
        codec::decompress(stored).map_err(|e| SessionError::Decode {
            details: e.to_string(),
        })
    }

    /// Stores a key/value pair, compressing the value.
    ///
    /// # Errors
    ///
    /// [`SessionError::Write`] when the value cannot be compressed.
    pub fn put(&self, session: &mut Session, key: &str, value: &str) -> Result<(), SessionError> {
        let token = codec::compress(value).map_err(|e| SessionError::Write {
            details: e.to_string(),
        })?;
        session.values.insert(key.to_string(), token);
        session.destroyed = false;
        Ok(())
    }

    /// Removes a single value. Removing an absent key is a no-op.
    pub fn remove(&self, session: &mut Session, key: &str) {
        session.values.remove(key);
    }

    /// Destroys the session: clears all values and marks it so that
    /// [`seal`](Self::seal) emits an immediately expiring cookie. Never
    /// fails, even when no session existed.
    pub fn destroy(&self, session: &mut Session) {
        session.values.clear();
        session.destroyed = true;
    }

    /// Seals the session into its cookie.
    ///
    /// # Errors
    ///
    /// [`SessionError::Seal`] when the mapping cannot be serialized.
    pub fn seal(&self, session: &Session) -> Result<Cookie<'static>, SessionError> {
        let payload = serde_json::to_string(&session.values).map_err(|e| SessionError::Seal {
            details: e.to_string(),
        })?;

        let mut jar = CookieJar::new();
        jar.private_mut(&self.key)
            .add(Cookie::new(SESSION_COOKIE, payload));
        let sealed = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| SessionError::Seal {
                details: "sealed cookie missing from jar".to_string(),
            })?
            .value()
            .to_string();

        let mut cookie = Cookie::new(SESSION_COOKIE, sealed);
        cookie.set_path(COOKIE_PATH);
        cookie.set_http_only(true);
        cookie.set_secure(self.config.secure);
        cookie.set_same_site(SameSite::Lax);
        // a negative max-age tells the client to drop the cookie now
        cookie.set_max_age(if session.destroyed {
            Duration::seconds(-1)
        } else {
            self.config.max_age
        });

        Ok(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn test_store() -> SessionStore {
        SessionStore::new(SECRET, SessionConfig::default()).expect("valid secret")
    }

    #[test]
    fn weak_secret_is_rejected() {
        let err = SessionStore::new("short", SessionConfig::default()).expect_err("must fail");
        assert!(matches!(err, SessionError::WeakSecret { length: 5 }));
    }

    #[test]
    fn seal_open_round_trip() {
        let store = test_store();
        let mut session = store.open(None);
        store.put(&mut session, "uid", "alice@example.com").unwrap();
        store.put(&mut session, "google", "{\"auth_url\":\"x\"}").unwrap();

        let cookie = store.seal(&session).expect("seal");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.path(), Some("/"));

        let reopened = store.open(Some(cookie.value()));
        assert_eq!(store.get(&reopened, "uid").unwrap(), "alice@example.com");
        assert_eq!(
            store.get(&reopened, "google").unwrap(),
            "{\"auth_url\":\"x\"}"
        );
    }

    #[test]
    fn remove_drops_a_single_value() {
        let store = test_store();
        let mut session = store.open(None);
        store.put(&mut session, "uid", "alice@example.com").unwrap();
        store.put(&mut session, "google", "attempt").unwrap();

        store.remove(&mut session, "google");
        assert!(matches!(
            store.get(&session, "google"),
            Err(SessionError::NotFound)
        ));
        assert!(store.get(&session, "uid").is_ok());

        // removing an absent key is a no-op
        store.remove(&mut session, "google");
        assert!(!session.is_empty());
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = test_store();
        let session = store.open(None);
        let err = store.get(&session, "uid").expect_err("must fail");
        assert!(matches!(err, SessionError::NotFound));
    }

    #[test]
    fn tampered_cookie_opens_empty() {
        let store = test_store();
        let mut session = store.open(None);
        store.put(&mut session, "uid", "alice@example.com").unwrap();
        let cookie = store.seal(&session).expect("seal");

        let bytes = cookie.value().to_string().into_bytes();
        for i in 0..bytes.len() {
            let mut flipped = bytes.clone();
            flipped[i] ^= 0x01;
            let raw = String::from_utf8_lossy(&flipped).into_owned();
            let reopened = store.open(Some(&raw));
            assert!(
                matches!(store.get(&reopened, "uid"), Err(SessionError::NotFound)),
                "tampering byte {} must not yield a readable session",
                i
            );
        }
        // untouched value still opens fine
        let reopened = store.open(Some(cookie.value()));
        assert!(store.get(&reopened, "uid").is_ok());
    }

    #[test]
    fn wrong_key_opens_empty() {
        let store = test_store();
        let mut session = store.open(None);
        store.put(&mut session, "uid", "alice@example.com").unwrap();
        let cookie = store.seal(&session).expect("seal");

        let other =
            SessionStore::new("ffffffffffffffffffffffffffffffff", SessionConfig::default())
                .expect("valid secret");
        let reopened = other.open(Some(cookie.value()));
        assert!(reopened.is_empty());
    }

    #[test]
    fn destroy_expires_the_cookie() {
        let store = test_store();
        let mut session = store.open(None);
        store.put(&mut session, "uid", "alice@example.com").unwrap();

        store.destroy(&mut session);
        assert!(session.is_destroyed());
        assert!(session.is_empty());

        let cookie = store.seal(&session).expect("seal");
        let max_age = cookie.max_age().expect("max-age set");
        assert!(max_age.is_negative());

        // a fresh request with no cookie sees nothing
        let reopened = store.open(None);
        assert!(matches!(
            store.get(&reopened, "uid"),
            Err(SessionError::NotFound)
        ));
    }

    #[test]
    fn destroying_a_fresh_session_never_errors() {
        let store = test_store();
        let mut session = store.open(None);
        store.destroy(&mut session);
        assert!(store.seal(&session).is_ok());
    }

    #[test]
    fn put_after_destroy_revives_the_session() {
        let store = test_store();
        let mut session = store.open(None);
        store.destroy(&mut session);
        store.put(&mut session, "uid", "bob@example.com").unwrap();
        assert!(!session.is_destroyed());

        let cookie = store.seal(&session).expect("seal");
        assert_eq!(cookie.max_age(), Some(DEFAULT_MAX_AGE));
    }

    #[test]
    fn secure_flag_follows_config() {
        let store = SessionStore::new(
            SECRET,
            SessionConfig {
                secure: true,
                ..SessionConfig::default()
            },
        )
        .expect("valid secret");
        let cookie = store.seal(&store.open(None)).expect("seal");
        assert_eq!(cookie.secure(), Some(true));
    }
}
