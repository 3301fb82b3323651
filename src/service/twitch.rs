//! Twitch API client.
//!
//! Authenticates with the authorization code grant flow: the one-time code from the
//! config is exchanged for a token on first start, and the token is refreshed
//! whenever it expires. Every new token is merged into the token file in the cache
//! directory, so restarts reuse it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    AccessToken, AuthType, AuthorizationCode, Client, ClientId, ClientSecret,
    EmptyExtraTokenFields, EndpointNotSet, EndpointSet, RedirectUrl, RefreshToken,
    RequestTokenError, RevocationErrorResponseType, Scope, StandardErrorResponse,
    StandardRevocableToken, StandardTokenIntrospectionResponse, TokenResponse, TokenUrl,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serenity::async_trait;
use tokio::sync::Mutex;

use crate::{
    config::{TwitchAppCredentials, TwitchConfig},
    data::token::{StoredToken, TokenRepository},
    error::{twitch::TwitchError, AppError},
};

pub const DEFAULT_AUTH_URL: &str = "https://id.twitch.tv/oauth2";
pub const DEFAULT_API_URL: &str = "https://api.twitch.tv/helix";

/// Name of the token file used for Helix API access (`token_api.json`).
pub const API_TOKEN_NAME: &str = "api";

/// A live stream as reported by Helix `GET /streams`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamInfo {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A Twitch account as reported by Helix `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TwitchUser {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct HelixResponse<T> {
    data: Vec<T>,
}

/// Token endpoint response.
///
/// Twitch returns `scope` as a JSON array rather than the space-delimited string of
/// the standard response, and omits `token_type` on some grants.
#[derive(Debug, Serialize, Deserialize)]
pub struct TwitchTokenResponse {
    access_token: AccessToken,
    #[serde(default = "bearer")]
    token_type: BasicTokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Vec<Scope>>,
}

fn bearer() -> BasicTokenType {
    BasicTokenType::Bearer
}

impl TokenResponse for TwitchTokenResponse {
    type TokenType = BasicTokenType;

    fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    fn token_type(&self) -> &BasicTokenType {
        &self.token_type
    }

    fn expires_in(&self) -> Option<std::time::Duration> {
        self.expires_in.map(std::time::Duration::from_secs)
    }

    fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    fn scopes(&self) -> Option<&Vec<Scope>> {
        self.scope.as_ref()
    }
}

impl TwitchTokenResponse {
    fn into_stored(self, obtained_at_ms: i64) -> StoredToken {
        StoredToken {
            access_token: Some(self.access_token.secret().clone()),
            refresh_token: self.refresh_token.map(|token| token.secret().clone()),
            scope: self
                .scope
                .unwrap_or_default()
                .iter()
                .map(|scope| scope.as_str().to_string())
                .collect(),
            expires_in: self.expires_in,
            obtainment_timestamp: Some(obtained_at_ms),
        }
    }
}

/// OAuth2 client for the Twitch token endpoint.
pub(crate) type TwitchOAuthClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    TwitchTokenResponse,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

type TokenRequestError<RE> = RequestTokenError<RE, StandardErrorResponse<BasicErrorResponseType>>;

/// Source of live stream status.
#[async_trait]
pub trait StreamStatusProvider: Send + Sync {
    /// Returns the user's current stream, or `None` if they are offline.
    ///
    /// # Arguments
    /// - `login` - Twitch login name
    async fn stream_status(&self, login: &str) -> Result<Option<StreamInfo>, AppError>;
}

/// Base URLs of the Twitch services.
#[derive(Debug, Clone)]
pub struct TwitchEndpoints {
    pub auth_url: String,
    pub api_url: String,
}

impl Default for TwitchEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Authenticated Helix API client.
pub struct TwitchClient {
    http_client: reqwest::Client,
    oauth_client: TwitchOAuthClient,
    endpoints: TwitchEndpoints,
    client_id: String,
    cache_dir: PathBuf,
    token: Mutex<StoredToken>,
    user: TwitchUser,
}

impl TwitchClient {
    /// Authenticates with Twitch and looks up the configured API user.
    ///
    /// Uses the cached token if there is one; otherwise exchanges the authorization
    /// code from the config and caches the result.
    ///
    /// # Arguments
    /// - `config` - Twitch section of the config
    /// - `cache_dir` - Directory holding the token file
    /// - `http_client` - Shared HTTP client
    /// - `endpoints` - Twitch base URLs
    ///
    /// # Returns
    /// - `Ok(TwitchClient)` - Authenticated client
    /// - `Err(AppError::TwitchErr)` - Code exchange failed or the API user does not exist
    /// - `Err(AppError::CacheErr)` - Token file could not be read or written
    pub async fn connect(
        config: &TwitchConfig,
        cache_dir: &Path,
        http_client: reqwest::Client,
        endpoints: TwitchEndpoints,
    ) -> Result<Self, AppError> {
        let app = &config.app_credentials;
        let oauth_client = oauth_client(app, &endpoints)?;
        let repo = TokenRepository::new(cache_dir);

        let mut token = repo.read(Some(API_TOKEN_NAME)).await?;
        if token.access_token.is_none() {
            tracing::info!("No cached Twitch token, exchanging authorization code");
            let exchanged = oauth_client
                .exchange_code(AuthorizationCode::new(
                    config.api_credentials.auth_code.clone(),
                ))
                .request_async(&http_client)
                .await
                .map_err(token_error)?
                .into_stored(Utc::now().timestamp_millis());
            repo.store(Some(API_TOKEN_NAME), &exchanged).await?;
            token = repo.read(Some(API_TOKEN_NAME)).await?;
        }

        let mut client = Self {
            http_client,
            oauth_client,
            endpoints,
            client_id: app.client_id.clone(),
            cache_dir: cache_dir.to_path_buf(),
            token: Mutex::new(token),
            user: TwitchUser {
                id: String::new(),
                login: String::new(),
                display_name: String::new(),
            },
        };

        let user_name = &config.api_credentials.user_name;
        client.user = client
            .user_by_name(user_name)
            .await?
            .ok_or_else(|| TwitchError::UserNotFound(user_name.clone()))?;

        tracing::info!(
            "Logged in to Twitch as {}#{}",
            client.user.display_name,
            client.user.id
        );

        Ok(client)
    }

    /// The account the client is authenticated as.
    pub fn user(&self) -> &TwitchUser {
        &self.user
    }

    /// Looks up a user by login name.
    pub async fn user_by_name(&self, login: &str) -> Result<Option<TwitchUser>, AppError> {
        let users = self.helix_get::<TwitchUser>("users", &[("login", login)]).await?;
        Ok(users.into_iter().next())
    }

    /// Looks up the live stream of a user by login name.
    pub async fn stream_by_user_name(&self, login: &str) -> Result<Option<StreamInfo>, AppError> {
        let streams = self
            .helix_get::<StreamInfo>("streams", &[("user_login", login)])
            .await?;
        Ok(streams.into_iter().next())
    }

    async fn helix_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, AppError> {
        let url = format!("{}/{}", self.endpoints.api_url, endpoint);

        let mut access_token = self.access_token().await?;
        let mut response = self.send_helix(&url, query, &access_token).await?;

        // Tokens can be revoked before they expire.
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::debug!("Twitch rejected the access token, refreshing");
            access_token = self.force_refresh().await?;
            response = self.send_helix(&url, query, &access_token).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TwitchError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response.json::<HelixResponse<T>>().await?;
        Ok(body.data)
    }

    async fn send_helix(
        &self,
        url: &str,
        query: &[(&str, &str)],
        access_token: &str,
    ) -> Result<reqwest::Response, AppError> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .header("Client-Id", &self.client_id)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;
        Ok(response)
    }

    /// Returns a valid access token, refreshing it first if it has expired.
    async fn access_token(&self) -> Result<String, AppError> {
        let mut token = self.token.lock().await;

        if let Some(access_token) = token
            .access_token
            .as_ref()
            .filter(|_| !token.is_expired(Utc::now().timestamp_millis()))
        {
            return Ok(access_token.clone());
        }

        self.refresh(&mut token).await
    }

    async fn force_refresh(&self) -> Result<String, AppError> {
        let mut token = self.token.lock().await;
        self.refresh(&mut token).await
    }

    /// Refreshes the token in place and persists it.
    async fn refresh(&self, token: &mut StoredToken) -> Result<String, AppError> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or(TwitchError::MissingRefreshToken)?;

        let refreshed = self
            .oauth_client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.clone()))
            .request_async(&self.http_client)
            .await
            .map_err(token_error)?
            .into_stored(Utc::now().timestamp_millis());

        let repo = TokenRepository::new(&self.cache_dir);
        repo.store(Some(API_TOKEN_NAME), &refreshed).await?;

        if refreshed.refresh_token.is_none() {
            *token = StoredToken {
                refresh_token: Some(refresh_token),
                ..refreshed
            };
        } else {
            *token = refreshed;
        }

        tracing::debug!("Refreshed Twitch access token");

        token
            .access_token
            .clone()
            .ok_or_else(|| AppError::InternalError("Refreshed token has no access token".into()))
    }
}

#[async_trait]
impl StreamStatusProvider for TwitchClient {
    async fn stream_status(&self, login: &str) -> Result<Option<StreamInfo>, AppError> {
        self.stream_by_user_name(login).await
    }
}

/// Builds the OAuth2 client for the token endpoint at `{auth_url}/token`.
///
/// Twitch expects the client credentials in the request body.
fn oauth_client(
    app: &TwitchAppCredentials,
    endpoints: &TwitchEndpoints,
) -> Result<TwitchOAuthClient, TwitchError> {
    let token_url = TokenUrl::new(format!("{}/token", endpoints.auth_url))
        .map_err(|e| TwitchError::InvalidUrl(e.to_string()))?;
    let redirect_url = RedirectUrl::new(app.redirect_uri.clone())
        .map_err(|e| TwitchError::InvalidUrl(e.to_string()))?;

    Ok(Client::new(ClientId::new(app.client_id.clone()))
        .set_client_secret(ClientSecret::new(app.client_secret.clone()))
        .set_auth_type(AuthType::RequestBody)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

fn token_error<RE>(error: TokenRequestError<RE>) -> TwitchError
where
    RE: std::error::Error + 'static,
{
    let message = match error {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Parse(_, body) => String::from_utf8_lossy(&body).into_owned(),
        other => other.to_string(),
    };
    TwitchError::Token(message)
}
