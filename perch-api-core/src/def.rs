//! # API Definitions
//!
//! This module, as closely as possible, defines the API that the Perch
//! backend exposes to the app. There are no compile-time guarantees that the
//! deployed service exactly matches the definition below, but it is
//! straightforward to compare the backend's routes with the trait to ensure
//! consistency.
//!
//! ## Guidelines
//!
//! All API requests and responses should be structs for upgradeability, e.g.
//! [`MaybeAuthRecord`] instead of `Option<AuthRecord>`.
//!
//! If an API method takes or returns nothing, make the type [`Empty`] and NOT
//! `()` (unit type). Using `()` makes it impossible to add optional fields in
//! a backwards-compatible way.
//!
//! Each endpoint should be documented with:
//! - 1) HTTP method e.g. `GET`
//! - 2) Endpoint e.g. `/app/v1/profile`
//! - 3) Data used to make the request e.g. [`UpdateProfileRequest`]
//! - 4) The return type e.g. [`VecProfileRecord`]

#![deny(missing_docs)]
// We don't export our traits currently so auto trait stability is not
// relevant.
#![allow(async_fn_in_trait)]

use crate::{
    error::BackendApiError,
    models::{
        Empty, GetAuthRecord, MaybeAuthRecord, UpdateEmailRequest,
        UpdateProfileRequest, VecProfileRecord,
    },
};

/// Defines the api that the backend exposes to the app.
pub trait AppBackendApi {
    /// Fetch the authentication record for one identity. There is exactly
    /// zero or one record per identity.
    ///
    /// GET /app/v1/auth_record [`GetAuthRecord`] -> [`MaybeAuthRecord`]
    async fn get_auth_record(
        &self,
        req: &GetAuthRecord,
    ) -> Result<MaybeAuthRecord, BackendApiError>;

    /// Update the email field of one identity's authentication record.
    ///
    /// PUT /app/v1/auth_record/email [`UpdateEmailRequest`] -> [`Empty`]
    async fn update_email(
        &self,
        req: &UpdateEmailRequest,
    ) -> Result<Empty, BackendApiError>;

    /// Apply a partial update to one identity's profile row, returning the
    /// updated rows.
    ///
    /// PUT /app/v1/profile [`UpdateProfileRequest`] -> [`VecProfileRecord`]
    async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<VecProfileRecord, BackendApiError>;
}
