use anyhow::Context;
use perch_api::client::BackendClient;
use tracing::warn;

use crate::{
    config::AppConfig,
    form::UpdateUserProfile,
    profile::{ProfileError, ProfileUpdater, UpdateSummary},
    session::{FileKvs, SessionStore},
};

/// The top-level app state: session storage plus the backend-facing
/// workflows.
pub struct App {
    session_store: SessionStore<FileKvs>,
    profile_updater: ProfileUpdater<BackendClient>,
}

impl App {
    /// Build the app from its config. Creates the session store directory if
    /// this is the first run.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let kvs = FileKvs::create_dir_all(config.session_dir())
            .context("Failed to init session store")?;
        let backend = BackendClient::new(
            config.backend_url.clone(),
            config.user_agent.clone(),
        );
        Ok(Self {
            session_store: SessionStore::new(kvs),
            profile_updater: ProfileUpdater::new(backend),
        })
    }

    /// Resolve the current session identity and run one profile-update
    /// invocation. Fails with [`ProfileError::NotAuthenticated`] before any
    /// remote call is issued if no identity is stored.
    pub async fn update_user_profile(
        &self,
        req: &UpdateUserProfile,
    ) -> Result<UpdateSummary, ProfileError> {
        // An unreadable session store is indistinguishable from a logged-out
        // user as far as this workflow is concerned.
        let maybe_user_id = self.session_store.user_id().unwrap_or_else(|err| {
            warn!("Failed to read session identity: {err:#}");
            None
        });
        self.profile_updater
            .update_user_profile(maybe_user_id.as_ref(), req)
            .await
    }

    /// True only while a profile update is executing.
    pub fn profile_update_in_flight(&self) -> bool {
        self.profile_updater.is_in_flight()
    }

    /// The user-facing message of the most recent profile-update failure.
    pub fn profile_update_last_error(&self) -> Option<String> {
        self.profile_updater.last_error()
    }

    /// Session helpers for the surrounding app shell.
    pub fn session_store(&self) -> &SessionStore<FileKvs> {
        &self.session_store
    }
}

#[cfg(test)]
mod test {
    use perch_api_core::models::UserId;

    use super::*;

    fn test_config(tmpdir: &tempfile::TempDir) -> AppConfig {
        AppConfig {
            // Unroutable; the tests below never reach the network.
            backend_url: "http://127.0.0.1:0".to_owned(),
            user_agent: "app-test".to_owned(),
            app_data_dir: tmpdir.path().to_owned(),
        }
    }

    #[tokio::test]
    async fn test_no_session_fails_not_authenticated() {
        logger::init_for_testing();

        let tmpdir = tempfile::tempdir().unwrap();
        let app = App::new(&test_config(&tmpdir)).unwrap();

        let err = app
            .update_user_profile(&UpdateUserProfile::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::NotAuthenticated));
        assert_eq!(
            app.profile_update_last_error().unwrap(),
            ProfileError::NotAuthenticated.to_string()
        );
        assert!(!app.profile_update_in_flight());
    }

    #[test]
    fn test_session_roundtrip() {
        let tmpdir = tempfile::tempdir().unwrap();
        let app = App::new(&test_config(&tmpdir)).unwrap();

        let user_id = UserId::parse("c3b7e9a0").unwrap();
        app.session_store().store_user_id(&user_id).unwrap();
        assert_eq!(app.session_store().user_id().unwrap().unwrap(), user_id);
        app.session_store().clear_user_id().unwrap();
        assert!(app.session_store().user_id().unwrap().is_none());
    }
}
