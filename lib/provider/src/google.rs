//! Google OAuth2 provider adapter.

use chrono::Utc;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::error::ProviderError;
use crate::identity::Identity;
use crate::session::ProviderSession;
use crate::{AuthParams, Provider};

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPE_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";
const SCOPE_PROFILE: &str = "https://www.googleapis.com/auth/userinfo.profile";

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth2 adapter for Google accounts.
#[derive(Debug)]
pub struct GoogleProvider {
    oauth: ConfiguredClient,
    http: reqwest::Client,
}

/// Subset of Google's userinfo response we care about.
#[derive(Debug, serde::Deserialize)]
struct Userinfo {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

impl GoogleProvider {
    /// Creates the adapter with fixed Google endpoints.
    ///
    /// The redirect URL is the gateway's own callback endpoint,
    /// `{base_url}/_p/callback`.
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Result<Self, ProviderError> {
        let oauth = BasicClient::new(ClientId::new(client_id))
            .set_client_secret(ClientSecret::new(client_secret))
            .set_auth_uri(AuthUrl::new(AUTH_ENDPOINT.to_string()).map_err(configuration)?)
            .set_token_uri(TokenUrl::new(TOKEN_ENDPOINT.to_string()).map_err(configuration)?)
            .set_redirect_uri(RedirectUrl::new(redirect_url).map_err(configuration)?);

        // no redirects: the token endpoint must answer directly
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::Configuration {
                details: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { oauth, http })
    }
}

fn configuration(err: url::ParseError) -> ProviderError {
    ProviderError::Configuration {
        details: err.to_string(),
    }
}

#[async_trait::async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn begin_auth(&self, state: &str) -> Result<ProviderSession, ProviderError> {
        let state = state.to_string();
        let (auth_url, _csrf) = self
            .oauth
            .authorize_url(move || CsrfToken::new(state))
            .add_scope(Scope::new(SCOPE_EMAIL.to_string()))
            .add_scope(Scope::new(SCOPE_PROFILE.to_string()))
            .url();

        Ok(ProviderSession::new(auth_url.to_string()))
    }

    async fn authorize(
        &self,
        session: &ProviderSession,
        params: &AuthParams,
    ) -> Result<ProviderSession, ProviderError> {
        let code = params.get("code").ok_or(ProviderError::MissingCode)?;

        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.clone()))
            .request_async(&self.http)
            .await
            .map_err(|e| ProviderError::TokenExchange {
                details: e.to_string(),
            })?;

        tracing::debug!(provider = self.name(), "authorization code exchanged");

        let expires_at = token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        Ok(session
            .clone()
            .with_access_token(token.access_token().secret().clone())
            .with_refresh_token(token.refresh_token().map(|t| t.secret().clone()))
            .with_expiry(expires_at))
    }

    async fn fetch_user(&self, session: &ProviderSession) -> Result<Identity, ProviderError> {
        let token = session.access_token().ok_or(ProviderError::Unauthorized)?;
        if session.is_expired() {
            return Err(ProviderError::Unauthorized);
        }

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Userinfo {
                details: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::Userinfo {
                details: format!("userinfo endpoint returned {}", response.status()),
            });
        }

        let profile: Userinfo = response.json().await.map_err(|e| ProviderError::Userinfo {
            details: e.to_string(),
        })?;

        let email = profile.email.ok_or(ProviderError::MissingEmail)?;
        Ok(Identity::new(email)
            .with_name(profile.name)
            .with_user_id(profile.id))
    }
}
