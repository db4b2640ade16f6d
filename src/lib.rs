// src/lib.rs

use std::sync::Arc;

use services::tier::Tier;

/// Shared state of the reference backend
#[derive(Clone)]
pub struct AppState {
    pub tier: Arc<dyn Tier>,
    pub require_auth: bool,
}

pub mod services {
    pub mod auth;
    pub mod facade;
    pub mod local_store;
    pub mod mock_backend;
    pub mod query;
    pub mod remote;
    pub mod seed;
    pub mod tier;
    pub mod token_store;
    pub mod validation;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

pub use error::{DataAccessError, ErrorKind};
pub use services::facade::DataAccessFacade;
