//! Serializable api error types and error kinds returned by the Perch
//! backend.

use std::{error::Error, fmt};

use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Associated constants can't be imported.
pub const CLIENT_400_BAD_REQUEST: StatusCode = StatusCode::BAD_REQUEST;
pub const CLIENT_401_UNAUTHORIZED: StatusCode = StatusCode::UNAUTHORIZED;
pub const CLIENT_404_NOT_FOUND: StatusCode = StatusCode::NOT_FOUND;
pub const CLIENT_409_CONFLICT: StatusCode = StatusCode::CONFLICT;
pub const CLIENT_422_UNPROCESSABLE_ENTITY: StatusCode =
    StatusCode::UNPROCESSABLE_ENTITY;
pub const SERVER_500_INTERNAL_SERVER_ERROR: StatusCode =
    StatusCode::INTERNAL_SERVER_ERROR;
pub const SERVER_502_BAD_GATEWAY: StatusCode = StatusCode::BAD_GATEWAY;
pub const SERVER_503_SERVICE_UNAVAILABLE: StatusCode =
    StatusCode::SERVICE_UNAVAILABLE;
pub const SERVER_504_GATEWAY_TIMEOUT: StatusCode = StatusCode::GATEWAY_TIMEOUT;

/// `ErrorCode` is the common serialized representation for all error kinds.
pub type ErrorCode = u16;

/// `ErrorResponse` is the common JSON-serialized representation for all
/// [`ApiError`]s. It is the only error struct actually sent across the wire.
/// Everything else is converted to / from it.
///
/// For displaying the full human-readable message to the user, convert
/// `ErrorResponse` to the corresponding API error type first.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub msg: String,
}

/// A 'trait alias' defining all the supertraits an API error type must impl
/// to be accepted for use in the `RestClient`.
pub trait ApiError:
    ToHttpStatus
    + From<CommonApiError>
    + From<ErrorResponse>
    + Into<ErrorResponse>
    + Error
    + Clone
{
}

impl<E> ApiError for E where
    E: ToHttpStatus
        + From<CommonApiError>
        + From<ErrorResponse>
        + Into<ErrorResponse>
        + Error
        + Clone
{
}

/// A trait to get the HTTP status code for a given error.
pub trait ToHttpStatus {
    fn to_http_status(&self) -> StatusCode;
}

// --- Error structs --- //

/// Errors common to all [`ApiError`]s.
///
/// This is an intermediate error type which should only be used in API
/// library code (e.g. `RestClient`) which cannot assume a specific API error
/// type. [`ApiError`]s must impl `From<CommonApiError>` to ensure all cases
/// are covered.
pub struct CommonApiError {
    pub kind: CommonErrorKind,
    pub msg: String,
}

impl CommonApiError {
    pub fn new(kind: CommonErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    #[inline]
    pub fn to_code(&self) -> ErrorCode {
        self.kind.to_code()
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for CommonApiError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            CommonErrorKind::Building
        } else if err.is_connect() {
            CommonErrorKind::Connect
        } else if err.is_timeout() {
            CommonErrorKind::Timeout
        } else if err.is_decode() {
            CommonErrorKind::Decode
        } else {
            CommonErrorKind::UnknownReqwest
        };
        let msg = format!("{err}");
        Self { kind, msg }
    }
}

/// The error type returned by all backend API calls.
#[derive(Clone, Debug, Default, Eq, PartialEq, Error)]
pub struct BackendApiError {
    pub kind: BackendErrorKind,
    pub msg: String,
}

impl BackendApiError {
    pub fn new(kind: BackendErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for BackendApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_msg = self.kind.to_msg();
        let msg = &self.msg;
        write!(f, "{kind_msg}: {msg}")
    }
}

impl From<ErrorResponse> for BackendApiError {
    fn from(err_resp: ErrorResponse) -> Self {
        let ErrorResponse { code, msg } = err_resp;
        let kind = BackendErrorKind::from_code(code);
        Self { kind, msg }
    }
}

impl From<BackendApiError> for ErrorResponse {
    fn from(api_error: BackendApiError) -> Self {
        let BackendApiError { kind, msg } = api_error;
        let code = kind.to_code();
        Self { code, msg }
    }
}

impl From<CommonApiError> for BackendApiError {
    fn from(common_error: CommonApiError) -> Self {
        let CommonApiError { kind, msg } = common_error;
        let kind = BackendErrorKind::from(kind);
        Self { kind, msg }
    }
}

impl ToHttpStatus for BackendApiError {
    fn to_http_status(&self) -> StatusCode {
        self.kind.to_http_status()
    }
}

// --- Error variants --- //

/// Error variants common to all `ApiError`s.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum CommonErrorKind {
    /// Unknown Reqwest client error
    UnknownReqwest = 1,
    /// Error building the HTTP request
    Building = 2,
    /// Error connecting to a remote HTTP service
    Connect = 3,
    /// Request timed out
    Timeout = 4,
    /// Error decoding/deserializing the HTTP response body
    Decode = 5,
    /// General server error
    Server = 6,
    /// Client provided a bad request that the server rejected
    Rejection = 7,
    // NOTE: If adding a variant, be sure to also update Self::KINDS!
}

impl CommonErrorKind {
    /// An array of all common error kind variants.
    pub const KINDS: &'static [Self] = &[
        Self::UnknownReqwest,
        Self::Building,
        Self::Connect,
        Self::Timeout,
        Self::Decode,
        Self::Server,
        Self::Rejection,
    ];

    #[inline]
    pub fn to_code(self) -> ErrorCode {
        self as ErrorCode
    }
}

impl ToHttpStatus for CommonErrorKind {
    fn to_http_status(&self) -> StatusCode {
        use CommonErrorKind::*;
        match self {
            UnknownReqwest => CLIENT_400_BAD_REQUEST,
            Building => CLIENT_400_BAD_REQUEST,
            Connect => SERVER_503_SERVICE_UNAVAILABLE,
            Timeout => SERVER_504_GATEWAY_TIMEOUT,
            Decode => SERVER_502_BAD_GATEWAY,
            Server => SERVER_500_INTERNAL_SERVER_ERROR,
            Rejection => CLIENT_400_BAD_REQUEST,
        }
    }
}

/// All variants of errors that the backend can return.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BackendErrorKind {
    /// Unknown error
    Unknown(ErrorCode),

    // --- Common --- //
    /// Unknown Reqwest client error
    UnknownReqwest,
    /// Error building the HTTP request
    Building,
    /// Error connecting to a remote HTTP service
    Connect,
    /// Request timed out
    Timeout,
    /// Error decoding/deserializing the HTTP response body
    Decode,
    /// General server error
    Server,
    /// Client provided a bad request that the server rejected
    Rejection,

    // --- Backend --- //
    /// Database error
    Database,
    /// Resource not found
    NotFound,
    /// Email already registered to another account
    EmailTaken,
    /// Email failed format validation
    InvalidEmail,
    /// User failed authentication
    Unauthenticated,
}

impl BackendErrorKind {
    /// An array of all known error kind variants, excluding `Unknown(_)`.
    pub const KINDS: &'static [Self] = &[
        Self::UnknownReqwest,
        Self::Building,
        Self::Connect,
        Self::Timeout,
        Self::Decode,
        Self::Server,
        Self::Rejection,
        Self::Database,
        Self::NotFound,
        Self::EmailTaken,
        Self::InvalidEmail,
        Self::Unauthenticated,
    ];

    /// Returns `true` if the error kind is unrecognized (at least by this
    /// version of the software).
    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Returns the human-readable message for this error kind.
    pub fn to_msg(self) -> &'static str {
        match self {
            Self::Unknown(_) => "Unknown error",
            Self::UnknownReqwest => "Unknown Reqwest client error",
            Self::Building => "Error building the HTTP request",
            Self::Connect => "Error connecting to a remote HTTP service",
            Self::Timeout => "Request timed out",
            Self::Decode =>
                "Error decoding/deserializing the HTTP response body",
            Self::Server => "General server error",
            Self::Rejection =>
                "Client provided a bad request that the server rejected",
            Self::Database => "Database error",
            Self::NotFound => "Resource not found",
            Self::EmailTaken => "Email already registered to another account",
            Self::InvalidEmail => "Email failed format validation",
            Self::Unauthenticated => "User failed authentication",
        }
    }

    /// Returns the serializable [`ErrorCode`] for this error kind.
    pub fn to_code(self) -> ErrorCode {
        match self {
            Self::Unknown(code) => code,

            Self::UnknownReqwest => 1,
            Self::Building => 2,
            Self::Connect => 3,
            Self::Timeout => 4,
            Self::Decode => 5,
            Self::Server => 6,
            Self::Rejection => 7,

            Self::Database => 100,
            Self::NotFound => 101,
            Self::EmailTaken => 102,
            Self::InvalidEmail => 103,
            Self::Unauthenticated => 104,
        }
    }

    /// Returns the error kind for this raw [`ErrorCode`].
    ///
    /// This method is infallible: unrecognized codes map to `Unknown(_)` for
    /// backwards compatibility, preserving the code for debugging and
    /// propagation.
    pub fn from_code(code: ErrorCode) -> Self {
        match code {
            1 => Self::UnknownReqwest,
            2 => Self::Building,
            3 => Self::Connect,
            4 => Self::Timeout,
            5 => Self::Decode,
            6 => Self::Server,
            7 => Self::Rejection,

            100 => Self::Database,
            101 => Self::NotFound,
            102 => Self::EmailTaken,
            103 => Self::InvalidEmail,
            104 => Self::Unauthenticated,

            _ => Self::Unknown(code),
        }
    }
}

impl Default for BackendErrorKind {
    fn default() -> Self {
        Self::Unknown(0)
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // No ':' because the BackendApiError Display impl adds it.
        let msg = (*self).to_msg();
        write!(f, "{msg}")
    }
}

impl From<ErrorCode> for BackendErrorKind {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl From<BackendErrorKind> for ErrorCode {
    #[inline]
    fn from(val: BackendErrorKind) -> ErrorCode {
        val.to_code()
    }
}

impl From<CommonErrorKind> for BackendErrorKind {
    #[inline]
    fn from(common: CommonErrorKind) -> Self {
        // `error_kind_invariants` checks that the recovered kind != Unknown
        Self::from_code(common.to_code())
    }
}

impl ToHttpStatus for BackendErrorKind {
    fn to_http_status(&self) -> StatusCode {
        use BackendErrorKind::*;
        match self {
            Unknown(_) => SERVER_500_INTERNAL_SERVER_ERROR,

            UnknownReqwest => CLIENT_400_BAD_REQUEST,
            Building => CLIENT_400_BAD_REQUEST,
            Connect => SERVER_503_SERVICE_UNAVAILABLE,
            Timeout => SERVER_504_GATEWAY_TIMEOUT,
            Decode => SERVER_502_BAD_GATEWAY,
            Server => SERVER_500_INTERNAL_SERVER_ERROR,
            Rejection => CLIENT_400_BAD_REQUEST,

            Database => SERVER_500_INTERNAL_SERVER_ERROR,
            NotFound => CLIENT_404_NOT_FOUND,
            EmailTaken => CLIENT_409_CONFLICT,
            InvalidEmail => CLIENT_422_UNPROCESSABLE_ENTITY,
            Unauthenticated => CLIENT_401_UNAUTHORIZED,
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn error_kind_invariants() {
        for kind in BackendErrorKind::KINDS {
            assert!(!kind.is_unknown());
            assert_ne!(kind.to_code(), 0);
            assert!(!kind.to_msg().is_empty());
            // to_code/from_code must roundtrip for every known kind.
            assert_eq!(*kind, BackendErrorKind::from_code(kind.to_code()));
        }

        // Every common kind must map to a non-Unknown backend kind.
        for kind in CommonErrorKind::KINDS {
            assert!(!BackendErrorKind::from(*kind).is_unknown());
        }
    }

    #[test]
    fn error_code_roundtrip() {
        proptest!(|(code: ErrorCode)| {
            prop_assert_eq!(code, BackendErrorKind::from_code(code).to_code());
        });
    }

    #[test]
    fn error_response_roundtrip() {
        let api_error = BackendApiError::new(
            BackendErrorKind::EmailTaken,
            "email in use",
        );
        let err_resp = ErrorResponse::from(api_error.clone());
        assert_eq!(err_resp.code, 102);

        let json = serde_json::to_string(&err_resp).unwrap();
        let err_resp2: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(err_resp, err_resp2);
        assert_eq!(api_error, BackendApiError::from(err_resp2));
    }

    #[test]
    fn unknown_code_preserved() {
        let err_resp = ErrorResponse {
            code: 4242,
            msg: "renamed variant?".to_owned(),
        };
        let api_error = BackendApiError::from(err_resp.clone());
        assert!(api_error.kind.is_unknown());
        assert_eq!(ErrorResponse::from(api_error), err_resp);
    }
}
