//! Auth provider contract.
//!
//! The reconciler only needs an acting user identifier; session lifecycle
//! (sign-in, refresh, sign-out) belongs to the embedding shell. A missing
//! or failing session never blocks an operation — callers fall back to
//! [`PLACEHOLDER_USER`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::errors::AppError;

/// Identity used when no session can be resolved.
pub const PLACEHOLDER_USER: &str = "anonymous";

/// Supplies the current user's identifier, or `None` without a session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<String>, AppError>;
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
}

/// Auth provider backed by the hosted service's user endpoint.
/// The access token is minted by the shell's session layer.
#[derive(Clone)]
pub struct RestAuthProvider {
    client: Client,
    base_url: String,
    service_key: String,
    access_token: Option<String>,
}

impl RestAuthProvider {
    pub fn new(config: &Config, access_token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.http_timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.service_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            access_token,
        }
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn current_user(&self) -> Result<Option<String>, AppError> {
        let Some(token) = &self.access_token else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            // Expired or revoked session reads as "no user", not an error.
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let user: UserPayload = response.json().await?;
        Ok(Some(user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_resolves_to_no_session() {
        let config = Config {
            service_url: "https://example.test".to_string(),
            service_key: "key".to_string(),
            http_timeout: std::time::Duration::from_secs(5),
            cache_path: std::path::PathBuf::from("hints.json"),
            rust_log: "info".to_string(),
        };
        let provider = RestAuthProvider::new(&config, None);
        let user = provider.current_user().await.unwrap();
        assert_eq!(user, None);
    }
}
