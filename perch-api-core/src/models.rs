//! Serializable request/response models and records for the Perch backend.
//!
//! All API requests and responses should be structs for upgradeability, e.g.
//! [`MaybeAuthRecord`] instead of `Option<AuthRecord>` and [`Empty`] instead
//! of `()`. Using `()` makes it impossible to add optional fields in a
//! backwards-compatible way.

use core::fmt;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// An empty request or response body.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Empty {}

/// An opaque session identity token identifying the authenticated user.
///
/// Wraps a [`String`] to enforce that the token is non-empty.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Validate a session identity string.
    fn validate(s: &str) -> Result<(), ParseError> {
        if s.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(())
    }

    /// Parse and validate a session identity string.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Returns the identity as a string slice.
    pub fn inner(&self) -> &str {
        &self.0
    }

    /// Returns the identity as a string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for UserId {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserId::parse(s)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<String> for UserId {
    type Error = ParseError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

/// Session identity validation error.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Session identity cannot be empty.
    Empty,
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Session identity cannot be empty"),
        }
    }
}

/// The remote authentication row for one identity. There is exactly zero or
/// one such row per identity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub user_id: UserId,
    pub email: String,
}

/// The zero-or-one result of an authentication record fetch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MaybeAuthRecord {
    pub auth_record: Option<AuthRecord>,
}

/// The remote profile row for one identity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: UserId,
    pub username: Option<String>,
    pub image: Option<String>,
}

/// The profile rows returned by a profile update.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VecProfileRecord {
    pub profile_records: Vec<ProfileRecord>,
}

/// Query for fetching the authentication record of one identity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GetAuthRecord {
    pub user_id: UserId,
}

/// Update the email field of one identity's authentication record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UpdateEmailRequest {
    pub user_id: UserId,
    pub email: String,
}

/// The partial profile update set. Only `Some` fields are applied.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdates {
    pub username: Option<String>,
    pub image: Option<String>,
}

impl ProfileUpdates {
    /// Whether this update set would apply no fields at all.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.image.is_none()
    }
}

/// Apply a partial update to one identity's profile row.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub user_id: UserId,
    pub updates: ProfileUpdates,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_user_id_parse() {
        let valid_cases = ["a", "c3b7e9a0", "user-123", "af12 b3"];
        for input in valid_cases {
            assert!(
                UserId::parse(input).is_ok(),
                "Should parse valid user id: {input:?}"
            );
        }

        let invalid_cases = ["", " ", "   ", "\t\n"];
        for input in invalid_cases {
            assert_eq!(
                UserId::parse(input).unwrap_err(),
                ParseError::Empty,
                "Should reject empty user id: {input:?}"
            );
        }
    }

    #[test]
    fn test_user_id_fromstr_display_roundtrip() {
        let valid_cases = ["a", "c3b7e9a0", "user-123"];
        for input in valid_cases {
            let user_id = UserId::from_str(input).unwrap();
            assert_eq!(input, user_id.to_string());
        }
    }

    #[test]
    fn test_user_id_deserialize_rejects_empty() {
        serde_json::from_str::<UserId>("\"u-123\"").unwrap();
        serde_json::from_str::<UserId>("\"\"").unwrap_err();
        serde_json::from_str::<UserId>("\"  \"").unwrap_err();
    }

    #[test]
    fn test_profile_updates_is_empty() {
        assert!(ProfileUpdates::default().is_empty());
        assert!(
            !ProfileUpdates {
                username: Some("alice".to_owned()),
                image: None,
            }
            .is_empty()
        );
        assert!(
            !ProfileUpdates {
                username: None,
                image: Some("http://x/y.png".to_owned()),
            }
            .is_empty()
        );
    }

    #[test]
    fn test_maybe_auth_record_serde_roundtrip() {
        let cases = [
            MaybeAuthRecord { auth_record: None },
            MaybeAuthRecord {
                auth_record: Some(AuthRecord {
                    user_id: UserId::parse("u-123").unwrap(),
                    email: "alice@example.com".to_owned(),
                }),
            },
        ];
        for value in cases {
            let json = serde_json::to_string(&value).unwrap();
            let value2: MaybeAuthRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(value, value2);
        }
    }
}
