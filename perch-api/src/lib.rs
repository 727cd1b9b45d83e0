//! The REST client layer for the Perch app: a generic [`RestClient`] plus
//! the concrete [`BackendClient`] that speaks the backend's API.
//!
//! [`RestClient`]: crate::rest::RestClient
//! [`BackendClient`]: crate::client::BackendClient

/// The `BackendClient` the app uses to reach the hosted backend.
pub mod client;
/// Generic REST client helpers.
pub mod rest;
