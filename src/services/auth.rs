//! Sign-in, sign-out and password flows.
//!
//! Remote mode talks to the backend's `/auth/*` endpoints; mock mode accepts
//! the two demo accounts. Either way a successful login lands in the
//! [`TokenStore`] so the remote tier picks up the bearer token.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::{DataAccessError, StoreError};
use crate::models::auth::{AuthUser, LoginRequest, RegisterRequest, Role, Session};
use crate::services::remote::RemoteClient;
use crate::services::token_store::TokenStore;
use crate::services::validation;

pub const MOCK_PASSWORD: &str = "password";

/// Demo accounts accepted in mock mode: (email, id, name, role)
const MOCK_ACCOUNTS: [(&str, &str, &str, Role); 2] = [
    ("admin@example.com", "1", "Admin User", Role::Admin),
    ("trader@example.com", "2", "Trader User", Role::Trader),
];

fn mock_token(role: Role) -> String {
    match role {
        Role::Admin => "mock-jwt-token-admin".to_string(),
        Role::Trader => "mock-jwt-token-trader".to_string(),
    }
}

/// Session for a demo account, `None` on bad credentials
pub fn mock_login(email: &str, password: &str) -> Option<Session> {
    if password != MOCK_PASSWORD {
        return None;
    }
    let email = email.trim();
    MOCK_ACCOUNTS
        .iter()
        .find(|(account, ..)| account.eq_ignore_ascii_case(email))
        .map(|&(account, id, name, role)| Session {
            token: mock_token(role),
            user: AuthUser {
                id: id.to_string(),
                name: name.to_string(),
                email: account.to_string(),
                role,
            },
        })
}

/// User owning a demo token
pub fn mock_user_for_token(token: &str) -> Option<AuthUser> {
    MOCK_ACCOUNTS
        .iter()
        .find(|(.., role)| mock_token(*role) == token)
        .map(|&(email, id, name, role)| AuthUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        })
}

enum Backend {
    Remote(RemoteClient),
    Mock,
}

pub struct AuthService {
    backend: Backend,
    tokens: Arc<TokenStore>,
}

fn store_failure(err: StoreError) -> DataAccessError {
    DataAccessError::Transport(err.to_string())
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DataAccessError> {
    serde_json::from_value(value)
        .map_err(|e| DataAccessError::Transport(format!("unexpected auth response: {}", e)))
}

impl AuthService {
    /// Authenticates against the backend behind `client`
    pub fn remote(client: RemoteClient) -> Self {
        let tokens = client.tokens().clone();
        Self {
            backend: Backend::Remote(client),
            tokens,
        }
    }

    pub fn mock(tokens: Arc<TokenStore>) -> Self {
        Self {
            backend: Backend::Mock,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, DataAccessError> {
        validation::email("email", &request.email)
            .and_then(|_| validation::min_chars("password", &request.password, 6))
            .map_err(DataAccessError::Validation)?;

        let session = match &self.backend {
            Backend::Remote(client) => {
                let body = json!(request);
                decode::<Session>(client.call(Method::POST, &["auth", "login"], Some(&body)).await?)?
            }
            Backend::Mock => mock_login(&request.email, &request.password)
                .ok_or(DataAccessError::Unauthorized)?,
        };

        self.tokens.set_session(&session).await.map_err(store_failure)?;
        info!(user_id = %session.user.id, role = ?session.user.role, "Logged in");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), DataAccessError> {
        self.tokens.clear().await.map_err(store_failure)?;
        info!("Logged out");
        Ok(())
    }

    /// Profile of the signed-in user
    pub async fn profile(&self) -> Result<AuthUser, DataAccessError> {
        match &self.backend {
            Backend::Remote(client) => decode(client.call(Method::GET, &["auth", "me"], None).await?),
            Backend::Mock => {
                let token = self.tokens.token().await.ok_or(DataAccessError::Unauthorized)?;
                match self.tokens.user().await {
                    Some(user) => Ok(user),
                    None => mock_user_for_token(&token).ok_or(DataAccessError::Unauthorized),
                }
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), DataAccessError> {
        validation::min_chars("name", &request.name, 2)
            .and_then(|_| validation::email("email", &request.email))
            .and_then(|_| validation::min_chars("password", &request.password, 6))
            .map_err(DataAccessError::Validation)?;

        if let Backend::Remote(client) = &self.backend {
            let body = json!(request);
            client.call(Method::POST, &["auth", "register"], Some(&body)).await?;
        }
        info!(email = %request.email, "Registration submitted");
        Ok(())
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), DataAccessError> {
        validation::email("email", email).map_err(DataAccessError::Validation)?;

        if let Backend::Remote(client) = &self.backend {
            let body = json!({ "email": email });
            client
                .call(Method::POST, &["auth", "forgot-password"], Some(&body))
                .await?;
        }
        Ok(())
    }

    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<(), DataAccessError> {
        validation::required("reset token", reset_token)
            .and_then(|_| validation::strong_password(new_password))
            .map_err(DataAccessError::Validation)?;

        if let Backend::Remote(client) = &self.backend {
            let body = json!({ "newPassword": new_password });
            client
                .call(Method::POST, &["auth", "reset-password", reset_token], Some(&body))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::local_store::MemoryStore;

    fn service() -> AuthService {
        AuthService::mock(Arc::new(TokenStore::new(Arc::new(MemoryStore::new()))))
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_login_stores_session() {
        let auth = service();
        let session = auth.login(&login("trader@example.com", "password")).await.unwrap();
        assert_eq!(session.token, "mock-jwt-token-trader");
        assert_eq!(session.user.role, Role::Trader);
        assert!(auth.tokens().is_authenticated().await);
        assert_eq!(auth.profile().await.unwrap().email, "trader@example.com");

        auth.logout().await.unwrap();
        assert!(!auth.tokens().is_authenticated().await);
        assert_eq!(auth.profile().await.unwrap_err(), DataAccessError::Unauthorized);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let auth = service();
        let err = auth.login(&login("admin@example.com", "letmein")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!auth.tokens().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_validation() {
        let auth = service();
        let err = auth.login(&login("not-an-email", "password")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        let err = auth.login(&login("admin@example.com", "123")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[tokio::test]
    async fn test_reset_password_requires_strong_password() {
        let auth = service();
        let err = auth.reset_password("abc123", "password").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        auth.reset_password("abc123", "Sup3r$ecret").await.unwrap();
    }

    #[test]
    fn test_mock_accounts() {
        assert!(mock_login("ADMIN@example.com", "password").is_some());
        assert!(mock_login("nobody@example.com", "password").is_none());
        assert_eq!(
            mock_user_for_token("mock-jwt-token-admin").unwrap().role,
            Role::Admin
        );
        assert!(mock_user_for_token("forged").is_none());
    }
}
