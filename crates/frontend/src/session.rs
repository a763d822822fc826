//! Browser session: token storage and the API client built on it

use portal_http::{ClientError, PortalClient, TokenStore, TokenStoreError};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;
use web_sys::{Storage, window};

/// Local storage key holding the session token
pub const TOKEN_KEY: &str = "authToken";

/// Token kept in the browser's local storage
///
/// Survives reloads within the same browser profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageTokenStore;

fn local_storage() -> Option<Storage> {
    window().and_then(|w| w.local_storage().ok().flatten())
}

fn unavailable() -> TokenStoreError {
    TokenStoreError::Unavailable("local storage is not accessible".to_string())
}

impl TokenStore for LocalStorageTokenStore {
    fn get(&self) -> Option<String> {
        let storage = local_storage()?;
        match storage.get_item(TOKEN_KEY) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(_) => {
                warn!("Failed to read session token from local storage");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        local_storage()
            .ok_or_else(unavailable)?
            .set_item(TOKEN_KEY, token)
            .map_err(|_| TokenStoreError::Unavailable("local storage rejected the token".into()))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        local_storage()
            .ok_or_else(unavailable)?
            .remove_item(TOKEN_KEY)
            .map_err(|_| unavailable())
    }
}

/// Get the base URL for API calls
fn get_base_url() -> String {
    // Try to get from window location
    if let Some(window) = window() {
        if let Ok(origin) = window.location().origin() {
            return origin;
        }
    }

    // Default to relative URLs
    String::new()
}

/// Build the client every view shares
pub fn create_client() -> Result<PortalClient, ClientError> {
    PortalClient::builder()
        .base_url(get_base_url())
        .token_store(std::sync::Arc::new(LocalStorageTokenStore))
        .on_unauthorized(trigger_unauthorized)
        .build()
}

thread_local! {
    /// Callback run when the API rejects the stored token
    static UNAUTHORIZED_CALLBACK: RefCell<Option<Rc<dyn Fn()>>> = RefCell::new(None);
}

/// Set the callback run after a 401 cleared the token
pub fn set_unauthorized_callback(callback: Rc<dyn Fn()>) {
    UNAUTHORIZED_CALLBACK.with(|cb| {
        *cb.borrow_mut() = Some(callback);
    });
}

/// Clear the unauthorized callback
pub fn clear_unauthorized_callback() {
    UNAUTHORIZED_CALLBACK.with(|cb| {
        *cb.borrow_mut() = None;
    });
}

fn trigger_unauthorized() {
    let callback = UNAUTHORIZED_CALLBACK.with(|cb| cb.borrow().clone());
    if let Some(callback) = callback {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn unauthorized_callback_runs_until_cleared() {
        let calls = Rc::new(Cell::new(0));
        {
            let calls = calls.clone();
            set_unauthorized_callback(Rc::new(move || calls.set(calls.get() + 1)));
        }

        trigger_unauthorized();
        assert_eq!(calls.get(), 1);

        clear_unauthorized_callback();
        trigger_unauthorized();
        assert_eq!(calls.get(), 1);
    }
}
