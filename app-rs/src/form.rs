//! Helpers for normalizing UI profile form inputs.

use perch_api_core::models::ProfileUpdates;

/// A user-supplied image reference, resolved once at the UI boundary.
///
/// Image pickers hand back either a plain URI string or a structured object
/// exposing a URI field; both normalize to the same trimmed URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageRef {
    RawUri(String),
    StructuredRef { uri: String },
}

impl ImageRef {
    /// The URI string carried by this reference.
    pub fn uri(&self) -> &str {
        match self {
            Self::RawUri(uri) => uri,
            Self::StructuredRef { uri } => uri,
        }
    }
}

/// A transient profile update request. Constructed per invocation from the
/// form inputs and discarded after completion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateUserProfile {
    /// New email address, if the user edited it.
    pub email: Option<String>,
    /// New display name, if the user edited it.
    pub username: Option<String>,
    /// New profile image, if the user picked one.
    pub image: Option<ImageRef>,
}

impl UpdateUserProfile {
    /// The trimmed new email, or `None` if absent or empty after trimming.
    pub(crate) fn normalized_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Build the partial profile update set: trimmed username and resolved
    /// image URI, each dropped if empty after trimming.
    pub(crate) fn profile_updates(&self) -> ProfileUpdates {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let image = self
            .image
            .as_ref()
            .map(|image| image.uri().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        ProfileUpdates { username, image }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalized_email() {
        let req = UpdateUserProfile::default();
        assert_eq!(req.normalized_email(), None);

        let req = UpdateUserProfile {
            email: Some("   ".to_owned()),
            ..Default::default()
        };
        assert_eq!(req.normalized_email(), None);

        let req = UpdateUserProfile {
            email: Some(" alice@example.com ".to_owned()),
            ..Default::default()
        };
        assert_eq!(req.normalized_email(), Some("alice@example.com"));
    }

    #[test]
    fn test_profile_updates_username_trimmed() {
        let req = UpdateUserProfile {
            username: Some("  Alice  ".to_owned()),
            ..Default::default()
        };
        let updates = req.profile_updates();
        assert_eq!(updates.username.as_deref(), Some("Alice"));
        assert_eq!(updates.image, None);

        let req = UpdateUserProfile {
            username: Some("   ".to_owned()),
            ..Default::default()
        };
        assert!(req.profile_updates().is_empty());
    }

    #[test]
    fn test_profile_updates_image_resolution() {
        let structured = UpdateUserProfile {
            image: Some(ImageRef::StructuredRef {
                uri: "http://x/y.png".to_owned(),
            }),
            ..Default::default()
        };
        assert_eq!(
            structured.profile_updates().image.as_deref(),
            Some("http://x/y.png")
        );

        let raw = UpdateUserProfile {
            image: Some(ImageRef::RawUri(" http://x/z.png ".to_owned())),
            ..Default::default()
        };
        assert_eq!(
            raw.profile_updates().image.as_deref(),
            Some("http://x/z.png")
        );

        let empty = UpdateUserProfile {
            image: Some(ImageRef::RawUri("   ".to_owned())),
            ..Default::default()
        };
        assert!(empty.profile_updates().is_empty());
    }
}
