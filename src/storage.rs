use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::error::StoreError;

/// Key under which the bearer token is kept in the store document.
pub const TOKEN_KEY: &str = "token";

// 1. TokenStore Contract
/// TokenStore
///
/// The durable slot holding the bearer token. At most one token is tracked.
/// The API client reads it before every request and the session store is the only writer,
/// so swapping the file-backed store for the in-memory one changes nothing else.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the persisted token, `None` when the slot is empty.
    async fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the persisted token.
    async fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Empties the slot. Clearing an empty slot is not an error.
    async fn clear(&self) -> Result<(), StoreError>;
}

// 2. The Real Implementation (JSON file)
/// FileTokenStore
///
/// Keeps the token in a small JSON document (`{"token": "..."}`) so it survives restarts.
/// Other keys found in the document are preserved on write.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// read_document
    ///
    /// A missing file reads as an empty document.
    async fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// writable_document
    ///
    /// The document to update on `save`/`clear`. An unparseable file is replaced by an empty
    /// document; the flag reports that the file must be rewritten.
    async fn writable_document(&self) -> Result<(Map<String, Value>, bool), StoreError> {
        match self.read_document().await {
            Ok(document) => Ok((document, false)),
            Err(StoreError::Corrupt(err)) => {
                tracing::warn!(
                    error = %err,
                    path = %self.path.display(),
                    "token file unreadable, resetting it"
                );
                Ok((Map::new(), true))
            }
            Err(err) => Err(err),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        let document = self.read_document().await?;
        Ok(document
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string))
    }

    async fn save(&self, token: &str) -> Result<(), StoreError> {
        let (mut document, _) = self.writable_document().await?;
        document.insert(TOKEN_KEY.to_string(), Value::String(token.to_string()));
        self.write_document(&document).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let (mut document, reset) = self.writable_document().await?;
        if document.remove(TOKEN_KEY).is_none() && !reset {
            return Ok(());
        }
        self.write_document(&document).await
    }
}

// 3. The Mock Implementation (For Tests)
/// MemoryTokenStore
///
/// Process-local store used by tests. When built with `new_failing()` every operation
/// reports `StoreError::Unavailable`.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            token: RwLock::new(None),
            should_fail: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable(
                "Mock Store Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &str) -> Result<(), StoreError> {
        self.check()?;
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check()?;
        *self.token.write().await = None;
        Ok(())
    }
}

/// TokenState
///
/// Shared handle to the token store, held by both the API client and the session store.
pub type TokenState = Arc<dyn TokenStore>;
