//! Views and the widgets they share

pub mod credentials;
pub mod home;
pub mod profile;
pub mod spinner;
pub mod text_field;

pub use credentials::{Login, Register};
pub use home::Home;
pub use profile::Profile;
pub use spinner::LoadingSpinner;
pub use text_field::TextField;
