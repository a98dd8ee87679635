use std::sync::Arc;

// --- Module Structure ---

// Core client services.
pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod session;
pub mod storage;

// Route table (public, admin) and the pages rendered for each route.
pub mod routes;
pub mod views;

// --- Public Re-exports ---

pub use api::{ApiState, CatalogApi, HttpCatalogApi};
pub use config::AppConfig;
pub use error::{ApiError, StoreError};
pub use gate::{AccessGate, GateDecision};
pub use session::{Session, SessionPhase, SessionState, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenState, TokenStore};

/// Console
///
/// Everything a page needs, assembled once at startup and handed to the views explicitly.
/// The API client and the session store share the same token store: the session store
/// writes it, the client reads it before every request.
#[derive(Clone)]
pub struct Console {
    pub config: AppConfig,
    pub tokens: TokenState,
    pub api: ApiState,
    pub session: SessionState,
}

impl Console {
    /// new
    ///
    /// Production wiring: file-backed token store at `config.token_file` and the HTTP client
    /// for `config.api_url`.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let tokens = Arc::new(FileTokenStore::new(config.token_file.clone())) as TokenState;
        let api = Arc::new(HttpCatalogApi::new(&config, tokens.clone())?) as ApiState;
        Ok(Self::from_parts(config, tokens, api))
    }

    /// Wires a console from already-built parts (tests, alternative stores).
    pub fn from_parts(config: AppConfig, tokens: TokenState, api: ApiState) -> Self {
        let session = Arc::new(SessionStore::new(api.clone(), tokens.clone()));
        Self {
            config,
            tokens,
            api,
            session,
        }
    }
}
