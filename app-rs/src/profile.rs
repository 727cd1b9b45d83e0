//! The profile-update workflow.
//!
//! One invocation sequences up to three remote calls: fetch the
//! authentication record, conditionally update its email field, and
//! conditionally apply a partial update to the profile row. There is no
//! transactionality across the two writes and no automatic retry.
//! Overlapping invocations are not deduplicated or locked; they race at the
//! data store and the last write wins.

use std::sync::{Arc, Mutex};

use perch_api_core::{
    def::AppBackendApi,
    error::{BackendApiError, BackendErrorKind},
    models::{
        GetAuthRecord, UpdateEmailRequest, UpdateProfileRequest, UserId,
    },
};
use thiserror::Error;
use tracing::{debug, info};

use crate::form::UpdateUserProfile;

/// Surfaced when a failure carries no message at all.
const FALLBACK_ERROR_MSG: &str = "An unexpected error occurred";

/// A profile-update failure.
#[derive(Clone, Debug, Error)]
pub enum ProfileError {
    /// No session identity available; terminal, not retried.
    #[error("No session identity found in storage (user not logged in)")]
    NotAuthenticated,
    /// No authentication row exists for this identity; terminal, not
    /// retried.
    #[error("No matching authentication record found")]
    RecordNotFound,
    /// A remote read/write failed; propagated verbatim to the caller.
    #[error(transparent)]
    Api(#[from] BackendApiError),
}

/// Why the email write was skipped, or that it happened.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EmailOutcome {
    /// No new email was supplied, or it was empty after trimming.
    NotRequested,
    /// The new email equals the stored one; nothing to write.
    Unchanged,
    /// The email was written remotely.
    Updated,
}

/// What one successful invocation actually wrote.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateSummary {
    pub email: EmailOutcome,
    pub profile_written: bool,
}

/// Caller-visible workflow state, read from the UI thread.
#[derive(Default)]
struct UpdaterState {
    /// True only while an invocation is executing.
    in_flight: bool,
    /// The user-facing message of the most recent failure. Cleared on entry
    /// and on full success.
    last_error: Option<String>,
}

/// Runs the profile-update workflow against a backend.
pub struct ProfileUpdater<B> {
    backend: B,
    state: Arc<Mutex<UpdaterState>>,
}

impl<B: AppBackendApi> ProfileUpdater<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(UpdaterState::default())),
        }
    }

    /// True only while an invocation is executing.
    pub fn is_in_flight(&self) -> bool {
        self.state.lock().unwrap().in_flight
    }

    /// The user-facing message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().last_error.clone()
    }

    /// Run one profile-update invocation.
    ///
    /// The session identity is resolved by the caller and injected; `None`
    /// means no identity was stored, and the invocation fails with
    /// [`ProfileError::NotAuthenticated`] before any remote call is issued.
    pub async fn update_user_profile(
        &self,
        user_id: Option<&UserId>,
        req: &UpdateUserProfile,
    ) -> Result<UpdateSummary, ProfileError> {
        {
            let mut state = self.state.lock().unwrap();
            state.in_flight = true;
            state.last_error = None;
        }

        let result = self.update_inner(user_id, req).await;

        let mut state = self.state.lock().unwrap();
        state.in_flight = false;
        state.last_error = match &result {
            Ok(_) => None,
            Err(err) => Some(user_facing_message(err)),
        };

        result
    }

    async fn update_inner(
        &self,
        user_id: Option<&UserId>,
        req: &UpdateUserProfile,
    ) -> Result<UpdateSummary, ProfileError> {
        let user_id = user_id.ok_or(ProfileError::NotAuthenticated)?;
        debug!(%user_id, "profile update: start");

        let maybe_auth_record = self
            .backend
            .get_auth_record(&GetAuthRecord {
                user_id: user_id.clone(),
            })
            .await?;
        let auth_record = maybe_auth_record
            .auth_record
            .ok_or(ProfileError::RecordNotFound)?;

        let email = match req.normalized_email() {
            None => EmailOutcome::NotRequested,
            Some(new_email) if new_email == auth_record.email => {
                debug!("profile update: email unchanged; skipping");
                EmailOutcome::Unchanged
            }
            Some(new_email) => {
                self.backend
                    .update_email(&UpdateEmailRequest {
                        user_id: user_id.clone(),
                        email: new_email.to_owned(),
                    })
                    .await?;
                info!("profile update: email updated");
                EmailOutcome::Updated
            }
        };

        let updates = req.profile_updates();
        let profile_written = if updates.is_empty() {
            debug!("profile update: no profile fields to apply");
            false
        } else {
            let updated = self
                .backend
                .update_profile(&UpdateProfileRequest {
                    user_id: user_id.clone(),
                    updates,
                })
                .await?;
            info!(
                rows = updated.profile_records.len(),
                "profile update: profile row updated"
            );
            true
        };

        Ok(UpdateSummary {
            email,
            profile_written,
        })
    }
}

/// Maps a failure to the message shown to the user.
///
/// Classification only affects this side channel; the original error is
/// always propagated to the caller unchanged.
fn user_facing_message(err: &ProfileError) -> String {
    match err {
        ProfileError::NotAuthenticated | ProfileError::RecordNotFound =>
            err.to_string(),
        ProfileError::Api(api_error) => match api_error.kind {
            BackendErrorKind::EmailTaken =>
                "This email is already registered to another account"
                    .to_owned(),
            BackendErrorKind::InvalidEmail =>
                "Invalid email format".to_owned(),
            _ if !api_error.msg.is_empty() => api_error.msg.clone(),
            _ => FALLBACK_ERROR_MSG.to_owned(),
        },
    }
}
