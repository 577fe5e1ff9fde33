//! Provider registry and per-request name resolution.
//!
//! The registry is populated once at startup and handed to the auth flow
//! as explicit configuration. Only one provider is wired up in this
//! deployment, but the resolution seam stays: a request may name a
//! provider explicitly, and the first registered provider acts as the
//! default.

use std::collections::HashMap;
use std::sync::Arc;

use crate::Provider;
use crate::error::ProviderError;

/// Name → adapter map, immutable after startup.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_name: Option<String>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own name. The first registration
    /// becomes the default.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        let name = provider.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.providers.insert(name, provider);
    }

    /// Resolves the provider for a request: an explicitly requested name
    /// wins, otherwise the default.
    ///
    /// # Errors
    ///
    /// [`ProviderError::UnknownProvider`] when the name is not registered
    /// or the registry is empty.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Arc<dyn Provider>, ProviderError> {
        let name = requested
            .filter(|n| !n.is_empty())
            .or(self.default_name.as_deref())
            .ok_or_else(|| ProviderError::UnknownProvider {
                name: String::new(),
            })?;

        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::GoogleProvider;

    fn registry_with_google() -> ProviderRegistry {
        let provider = GoogleProvider::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:8080/_p/callback".to_string(),
        )
        .expect("valid configuration");

        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(provider));
        registry
    }

    #[test]
    fn resolves_default_provider() {
        let registry = registry_with_google();
        let provider = registry.resolve(None).expect("default resolves");
        assert_eq!(provider.name(), "google");
    }

    #[test]
    fn resolves_explicit_name() {
        let registry = registry_with_google();
        let provider = registry.resolve(Some("google")).expect("name resolves");
        assert_eq!(provider.name(), "google");
    }

    #[test]
    fn empty_requested_name_falls_back_to_default() {
        let registry = registry_with_google();
        assert!(registry.resolve(Some("")).is_ok());
    }

    #[test]
    fn unknown_name_is_rejected() {
        let registry = registry_with_google();
        let err = registry.resolve(Some("github")).expect_err("must fail");
        assert!(matches!(err, ProviderError::UnknownProvider { name } if name == "github"));
    }

    #[test]
    fn empty_registry_cannot_resolve() {
        let registry = ProviderRegistry::new();
        assert!(registry.resolve(None).is_err());
    }
}
