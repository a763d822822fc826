//! Authenticated HTTP client for the member portal API
//!
//! Used by both the web frontend (compiled to WASM) and the command line
//! client.

pub mod client;
pub mod types;
pub mod validation;

pub use client::error::ClientError;
pub use client::token_store::{MemoryTokenStore, TokenStore, TokenStoreError};
#[cfg(not(target_arch = "wasm32"))]
pub use client::token_store::FileTokenStore;
pub use client::{PortalClient, PortalClientBuilder};
pub use types::{AuthSession, FieldErrors, ProfileChanges, UserProfile, UserSummary};
