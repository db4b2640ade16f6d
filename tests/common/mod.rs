#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use admin_data_access::handlers;
use admin_data_access::services::facade::DataAccessFacade;
use admin_data_access::services::local_store::{KeyValueStore, LocalTier, MemoryStore};
use admin_data_access::services::mock_backend::MockTier;
use admin_data_access::services::remote::{RemoteClient, RemoteTier};
use admin_data_access::services::token_store::TokenStore;
use admin_data_access::AppState;
use axum::Router;

/// Nothing is expected to listen on the discard port
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

pub fn test_app(require_auth: bool) -> (Router, Arc<MockTier>) {
    let backend = Arc::new(MockTier::new(Duration::ZERO));
    let state = AppState {
        tier: backend.clone(),
        require_auth,
    };
    (handlers::router(state), backend)
}

/// Run the reference backend on an ephemeral port and return its `/api` base URL
pub async fn spawn_backend(require_auth: bool) -> (String, Arc<MockTier>) {
    let (app, backend) = test_app(require_auth);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test backend crashed");
    });

    (format!("http://{}/api", addr), backend)
}

pub struct Chain {
    pub facade: DataAccessFacade,
    pub mock: Arc<MockTier>,
    pub local: Arc<LocalTier>,
    pub tokens: Arc<TokenStore>,
}

/// remote -> mock -> local over in-memory storage
pub fn chain(remote_url: &str) -> Chain {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    chain_with_store(remote_url, store)
}

pub fn chain_with_store(remote_url: &str, store: Arc<dyn KeyValueStore>) -> Chain {
    build_chain(remote_url, Duration::from_secs(2), store)
}

pub fn chain_with_timeout(remote_url: &str, timeout: Duration) -> Chain {
    build_chain(remote_url, timeout, Arc::new(MemoryStore::new()))
}

/// Accepts connections and never answers; returns its `/api` base URL
pub async fn spawn_silent_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}/api", addr)
}

fn build_chain(remote_url: &str, timeout: Duration, store: Arc<dyn KeyValueStore>) -> Chain {
    let tokens = Arc::new(TokenStore::new(store.clone()));
    let client = RemoteClient::new(remote_url, timeout, tokens.clone())
        .expect("Invalid test base URL");
    let mock = Arc::new(MockTier::new(Duration::ZERO));
    let local = Arc::new(LocalTier::new(store));

    let facade = DataAccessFacade::new(vec![
        Arc::new(RemoteTier::new(client)),
        mock.clone(),
        local.clone(),
    ]);

    Chain {
        facade,
        mock,
        local,
        tokens,
    }
}
