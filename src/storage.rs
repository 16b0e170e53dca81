use parking_lot::RwLock;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// Key under which the session token is persisted.
pub const TOKEN_KEY: &str = "v3-admin-vite-token-key";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

// 1. CredentialStore Contract
/// CredentialStore
///
/// Defines the contract for persisting the opaque bearer token of the current session.
/// Reads are synchronous and cheap: the request pipeline calls `get()` on every
/// outgoing request so a rotated token is picked up immediately.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored token, `None` when signed out.
    fn get(&self) -> Option<String>;

    /// Persists a new token, replacing any previous one.
    fn set(&self, token: &str) -> Result<(), StorageError>;

    /// Removes the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StorageError>;
}

// 2. The Durable Implementation
/// FileCredentialStore
///
/// Keeps the token in a single file so it survives a full reload of the shell.
/// The file is read once at construction; afterwards the in-memory copy is
/// authoritative and every mutation writes through.
pub struct FileCredentialStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileCredentialStore {
    /// Opens the store, loading an existing token if the file is present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let cached = match fs::read_to_string(&path) {
            Ok(raw) => Some(raw.trim().to_string()).filter(|token| !token.is_empty()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), restored = cached.is_some(), "Credential store opened");

        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        self.cached.read().clone()
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        *self.cached.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        // Drop the in-memory copy first so a failed unlink still signs the session out.
        *self.cached.write() = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MemoryCredentialStore
///
/// Process-local store used by tests and by shells that do not need persistence.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
    /// When true, `set` and `clear` report a simulated failure (after clearing memory).
    pub should_fail: bool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self::new().failing()
    }

    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable("Mock Storage Error: Simulation requested".into()));
        }
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.write() = None;
        if self.should_fail {
            return Err(StorageError::Unavailable("Mock Storage Error: Simulation requested".into()));
        }
        Ok(())
    }
}

/// CredentialState
///
/// The shared handle to the credential store used across the client's services.
pub type CredentialState = Arc<dyn CredentialStore>;
