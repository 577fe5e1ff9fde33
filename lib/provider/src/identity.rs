//! The authenticated identity a provider hands back.

/// Minimal identity of an authenticated user.
///
/// The email address is mandatory: downstream, its presence in the
/// session is the sole authorization predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: String,
    name: Option<String>,
    user_id: Option<String>,
}

impl Identity {
    /// Creates an identity from the provider's email claim.
    #[must_use]
    pub fn new(email: String) -> Self {
        Self {
            email,
            name: None,
            user_id: None,
        }
    }

    /// Attaches the user's display name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Attaches the provider's user identifier.
    #[must_use]
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Returns the user's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the user's display name, if the provider supplied one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the provider-scoped user identifier, if supplied.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
