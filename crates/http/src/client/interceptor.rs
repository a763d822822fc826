//! Request middleware applied to every outgoing request

use super::token_store::TokenStore;
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::warn;

/// Authorization scheme the API expects
pub const TOKEN_SCHEME: &str = "Token";

/// Attach `Authorization: Token <value>` when a credential is stored
///
/// Requests pass through untouched when the store is empty.
pub fn authorize(mut request: Request, tokens: &dyn TokenStore) -> Request {
    let Some(token) = tokens.get() else {
        return request;
    };

    match HeaderValue::from_str(&format!("{TOKEN_SCHEME} {token}")) {
        Ok(mut value) => {
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Err(_) => {
            warn!(
                url = %request.url(),
                "Stored token is not a valid header value, sending request without it"
            );
        }
    }

    request
}
