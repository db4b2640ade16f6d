//! Process-wide authentication token store.
//!
//! The token and the signed-in user are persisted in the same key-value
//! store as the local tier. Expiry (a 401 from the remote backend) is
//! announced on a broadcast channel so a view layer can send the user back
//! to the login screen.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::auth::{AuthUser, Session};
use crate::services::local_store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    SignedIn { user_id: String },
    SignedOut,
    /// The backend rejected the token; credentials were cleared
    LoginRequired { redirect_to: String },
}

pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { store, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current bearer token. Storage failures read as "no token".
    pub async fn token(&self) -> Option<String> {
        match self.store.read(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read auth token");
                None
            }
        }
    }

    pub async fn user(&self) -> Option<AuthUser> {
        let raw = self.store.read(USER_KEY).await.ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token().await.is_some()
    }

    pub async fn set_session(&self, session: &Session) -> Result<(), StoreError> {
        let user = serde_json::to_string(&session.user).map_err(|source| StoreError::Corrupt {
            key: USER_KEY.to_string(),
            source,
        })?;
        self.store.write(TOKEN_KEY, &session.token).await?;
        self.store.write(USER_KEY, &user).await?;
        info!(user_id = %session.user.id, "Session stored");
        let _ = self.events.send(SessionEvent::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(())
    }

    async fn remove_credentials(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await?;
        Ok(())
    }

    /// Explicit sign-out
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.remove_credentials().await?;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    /// Called when the backend answers 401: drop credentials and ask for a
    /// fresh login
    pub async fn expire(&self) {
        if let Err(e) = self.remove_credentials().await {
            warn!(error = %e, "Failed to clear expired credentials");
        }
        warn!("Session expired, login required");
        let _ = self.events.send(SessionEvent::LoginRequired {
            redirect_to: LOGIN_PATH.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::services::local_store::MemoryStore;

    fn session() -> Session {
        Session {
            token: "mock-jwt-token-admin".to_string(),
            user: AuthUser {
                id: "1".to_string(),
                name: "Admin User".to_string(),
                email: "admin@example.com".to_string(),
                role: Role::Admin,
            },
        }
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        assert!(!tokens.is_authenticated().await);

        tokens.set_session(&session()).await.unwrap();
        assert_eq!(tokens.token().await.as_deref(), Some("mock-jwt-token-admin"));
        assert_eq!(tokens.user().await.unwrap().role, Role::Admin);

        tokens.clear().await.unwrap();
        assert!(tokens.token().await.is_none());
        assert!(tokens.user().await.is_none());
    }

    #[tokio::test]
    async fn test_expire_clears_and_announces_login() {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.set_session(&session()).await.unwrap();
        let mut events = tokens.subscribe();

        tokens.expire().await;

        assert!(tokens.token().await.is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoginRequired {
                redirect_to: "/login".to_string()
            }
        );
    }
}
