//! Profile API client methods

use super::{ClientError, PortalClient, paths};
use crate::types::{ProfileChanges, UserProfile};
use crate::validation;
use reqwest::Method;

impl PortalClient {
    /// Fetch the signed-in member's profile
    ///
    /// A 401 clears the stored credential before
    /// [`ClientError::Unauthorized`] is returned.
    pub async fn get_profile(&self) -> Result<UserProfile, ClientError> {
        let request = self.request(Method::GET, paths::PROFILE);
        self.execute(request).await
    }

    /// Partially update the profile (PATCH); unset fields keep their value
    ///
    /// Set fields are trimmed before they are checked and sent.
    pub async fn update_profile(
        &self,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, ClientError> {
        let changes = changes.clone().trimmed();
        validation::validate_profile_changes(&changes)?;
        let request = self
            .request(Method::PATCH, paths::PROFILE_UPDATE)
            .json(&changes);
        self.execute(request).await
    }

    /// Replace the editable profile fields (PUT)
    pub async fn replace_profile(
        &self,
        changes: &ProfileChanges,
    ) -> Result<UserProfile, ClientError> {
        let changes = changes.clone().trimmed();
        validation::validate_profile_changes(&changes)?;
        let request = self
            .request(Method::PUT, paths::PROFILE_UPDATE)
            .json(&changes);
        self.execute(request).await
    }
}
