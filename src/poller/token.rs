use crate::config::SecretRef;
use crate::secrets::{SecretError, SecretStore};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Lifetime given to every freshly refreshed bearer token. Any TTL the token
/// server reports is ignored.
pub const TOKEN_LIFETIME_MINUTES: i64 = 10;

const GRANT_TYPE: &str = "refresh_token";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token data: {0}")]
    DataInvalid(String),

    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("unable to read token secret: {0}")]
    Secret(#[from] SecretError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Refresh credential stored in the token secret under the cluster id key.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    pub refresh_token: String,
    pub url: String,
    pub token_url: String,
    pub client_id: String,
    pub access_token: String,
}

impl TokenData {
    pub fn parse(bytes: Option<&[u8]>) -> Result<Self, TokenError> {
        let bytes = match bytes {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(TokenError::DataInvalid("missing token data".to_string())),
        };

        serde_json::from_slice(bytes)
            .map_err(|e| TokenError::DataInvalid(format!("unable to parse token data: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    #[serde(default)]
    access_token: String,
}

/// Bearer credential used to call the service log API.
#[derive(Debug, Clone, Default)]
pub struct Token {
    bearer_token: String,
    expires_at: Option<DateTime<Utc>>,
    endpoint: String,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Base URL of the OCM API this token was issued for
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Valid only with a non-empty token and an expiry strictly after `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.bearer_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now,
            None => false,
        }
    }

    /// Exchanges the refresh credential for a new bearer token.
    ///
    /// On error the token is left exactly as it was.
    pub async fn refresh(
        &mut self,
        secrets: &dyn SecretStore,
        secret: &SecretRef,
        cluster_id: &str,
        http: &reqwest::Client,
    ) -> Result<(), TokenError> {
        let expires_at = Utc::now() + Duration::minutes(TOKEN_LIFETIME_MINUTES);

        info!(cluster = %cluster_id, secret = %secret, "Retrieving cluster secret");
        let data = match secrets.get_secret(&secret.name, &secret.namespace).await {
            Ok(data) => data,
            Err(SecretError::NotFound { .. }) => {
                return Err(TokenError::DataInvalid(format!(
                    "secret [{}] not found",
                    secret
                )));
            }
            Err(e) => return Err(e.into()),
        };
        let token_data = TokenData::parse(data.get(cluster_id).map(Vec::as_slice))?;

        info!(cluster = %cluster_id, "Retrieving bearer token");
        let bearer_token = request_bearer_token(http, &token_data).await?;

        *self = Token {
            bearer_token,
            expires_at: Some(expires_at),
            endpoint: token_data.url.trim_end_matches('/').to_string(),
        };

        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_values(
        bearer_token: &str,
        expires_at: Option<DateTime<Utc>>,
        endpoint: &str,
    ) -> Self {
        Self {
            bearer_token: bearer_token.to_string(),
            expires_at,
            endpoint: endpoint.to_string(),
        }
    }
}

async fn request_bearer_token(
    http: &reqwest::Client,
    token_data: &TokenData,
) -> Result<String, TokenError> {
    let response = http
        .post(&token_data.token_url)
        .basic_auth(&token_data.client_id, Some(&token_data.access_token))
        .form(&[
            ("grant_type", GRANT_TYPE),
            ("refresh_token", token_data.refresh_token.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(TokenError::RefreshFailed(format!(
            "invalid response code [{}]; message [{}]",
            status.as_u16(),
            response.text().await.unwrap_or_default()
        )));
    }

    let body = response.bytes().await?;
    let refreshed: TokenRefreshResponse = serde_json::from_slice(&body)
        .map_err(|e| TokenError::RefreshFailed(format!("unable to read response data: {}", e)))?;

    if refreshed.access_token.is_empty() {
        return Err(TokenError::RefreshFailed(
            "unable to find bearer token in http response".to_string(),
        ));
    }

    Ok(refreshed.access_token)
}
