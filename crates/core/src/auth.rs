//! Admin sign-in against the authentication service.
use std::collections::HashMap;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    /// Token issued by the authentication service, needed to sign out there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("authentication service rejected the request: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

struct Account {
    id: String,
    password_hash: String,
}

/// Fixed set of accounts with argon2-hashed passwords, for the `memory`
/// backend and tests.
#[derive(Default)]
pub struct StaticAuth {
    accounts: HashMap<String, Account>,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str) -> Result<Self, AuthError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Rejected(e.to_string()))?
            .to_string();
        self.accounts.insert(
            email.trim().to_ascii_lowercase(),
            Account {
                id: Uuid::new_v4().to_string(),
                password_hash,
            },
        );
        Ok(self)
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim().to_ascii_lowercase();
        let account = self
            .accounts
            .get(&email)
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AuthError::InvalidCredentials)?;
        Ok(AuthUser {
            id: account.id.clone(),
            email,
            access_token: None,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
