//! This module contains the code for the [`BackendClient`] that the app uses
//! to connect to the hosted Perch backend.
//!
//! [`BackendClient`]: crate::client::BackendClient

use std::borrow::Cow;

use perch_api_core::{
    def::AppBackendApi,
    error::BackendApiError,
    models::{
        Empty, GetAuthRecord, MaybeAuthRecord, UpdateEmailRequest,
        UpdateProfileRequest, VecProfileRecord,
    },
};

use crate::rest::RestClient;

/// The client to the backend, i.e. requests terminate at the hosted data
/// store's REST gateway. Holds no mutable state and is cheap to clone.
#[derive(Clone)]
pub struct BackendClient {
    rest: RestClient,
    backend_url: String,
}

impl BackendClient {
    pub fn new(
        backend_url: String,
        user_agent: impl Into<Cow<'static, str>>,
    ) -> Self {
        let rest = RestClient::new(user_agent, "backend");
        Self { rest, backend_url }
    }

    #[inline]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }
}

impl AppBackendApi for BackendClient {
    async fn get_auth_record(
        &self,
        req: &GetAuthRecord,
    ) -> Result<MaybeAuthRecord, BackendApiError> {
        let backend_url = &self.backend_url;
        let req = self
            .rest
            .get(format!("{backend_url}/app/v1/auth_record"), req);
        self.rest.send(req).await
    }

    async fn update_email(
        &self,
        req: &UpdateEmailRequest,
    ) -> Result<Empty, BackendApiError> {
        let backend_url = &self.backend_url;
        let req = self
            .rest
            .put(format!("{backend_url}/app/v1/auth_record/email"), req);
        self.rest.send(req).await
    }

    async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<VecProfileRecord, BackendApiError> {
        let backend_url = &self.backend_url;
        let req = self
            .rest
            .put(format!("{backend_url}/app/v1/profile"), req);
        self.rest.send(req).await
    }
}
