use async_trait::async_trait;
use dairy_cms_core::auth::{AuthError, AuthProvider, AuthUser};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::client::{RemoteClient, RemoteFailure};

/// Email/password sign-in against the hosted auth service.
#[derive(Debug, Clone)]
pub struct RemoteAuth {
    client: RemoteClient,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RemoteAuth {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for RemoteAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let token: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Rejected(e.to_string()))?;
                Ok(AuthUser {
                    id: token.user.id,
                    email: token.user.email.unwrap_or_else(|| email.to_string()),
                    access_token: Some(token.access_token),
                })
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                tracing::warn!(email, "sign-in rejected");
                Err(AuthError::InvalidCredentials)
            }
            _ => {
                let failure = RemoteFailure::from_response(response).await;
                Err(AuthError::Rejected(failure.message))
            }
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .request_as(Method::POST, "/auth/v1/logout", access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            let failure = RemoteFailure::from_response(response).await;
            Err(AuthError::Rejected(failure.message))
        }
    }
}
