//! Storage for the single bearer credential
//!
//! The client never reaches for ambient storage: a [`TokenStore`] is handed
//! to the builder and shared by every request the client sends.

use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Token storage errors
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistent slot for one credential
///
/// Reads are synchronous so the request interceptor never waits on storage.
pub trait TokenStore: Send + Sync {
    /// Current credential, `None` when absent
    fn get(&self) -> Option<String>;

    /// Replace the stored credential
    fn set(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Remove the stored credential; removing nothing succeeds
    fn clear(&self) -> Result<(), TokenStoreError>;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// Token held in process memory
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a credential
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.is_empty())
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTokenStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::{TokenStore, TokenStoreError};
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};
    use tracing::warn;

    /// Token kept in a single file, surviving process restarts
    #[derive(Debug, Clone)]
    pub struct FileTokenStore {
        path: PathBuf,
    }

    impl FileTokenStore {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl TokenStore for FileTokenStore {
        fn get(&self) -> Option<String> {
            match std::fs::read_to_string(&self.path) {
                Ok(contents) => {
                    let token = contents.trim();
                    if token.is_empty() {
                        None
                    } else {
                        Some(token.to_string())
                    }
                }
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => {
                    warn!(path = %self.path.display(), "Failed to read token file: {e}");
                    None
                }
            }
        }

        fn set(&self, token: &str) -> Result<(), TokenStoreError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.path, token)?;

            // Owner-only; the file is a bearer credential
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
            }

            Ok(())
        }

        fn clear(&self) -> Result<(), TokenStoreError> {
            match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        }
    }
}
