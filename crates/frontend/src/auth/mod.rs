//! Session state shared across views

pub mod context;

// Re-export commonly used items
pub use context::{SessionAction, SessionProvider, use_is_authenticated, use_session};
