//! Core API types shared by the Perch app and its backend clients.

/// API definitions for the backend that the app talks to.
pub mod def;
/// Serializable api error types and error kinds.
pub mod error;
/// Serializable request/response models and records.
pub mod models;
