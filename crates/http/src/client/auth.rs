//! Authentication API client methods

use super::{ClientError, PortalClient, paths};
use crate::types::{AuthSession, Credentials};
use crate::validation;
use reqwest::Method;
use tracing::{debug, info};

impl PortalClient {
    /// Create an account and store the returned token
    ///
    /// Input is checked locally first; a failing check returns
    /// [`ClientError::Validation`] without contacting the API.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let credentials = Credentials::new(username, password);
        validation::validate_registration(&credentials)?;

        let request = self
            .request(Method::POST, paths::REGISTER)
            .json(&credentials);
        let session: AuthSession = self.execute(request).await?;
        self.tokens.set(&session.token)?;

        info!(user_id = session.user.id, username = %session.user.username, "Registered account");
        Ok(session)
    }

    /// Exchange username and password for a token and store it
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, ClientError> {
        let credentials = Credentials::new(username, password);
        validation::validate_login(&credentials)?;

        let request = self.request(Method::POST, paths::LOGIN).json(&credentials);
        let session: AuthSession = self.execute(request).await?;
        self.tokens.set(&session.token)?;

        info!(user_id = session.user.id, username = %session.user.username, "Logged in");
        Ok(session)
    }

    /// Forget the stored credential; the API is not contacted
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// True when a credential is stored
    pub fn is_authenticated(&self) -> bool {
        let authenticated = self.tokens.is_present();
        debug!(authenticated, "Checked session");
        authenticated
    }

    /// The stored credential, if any
    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }
}
