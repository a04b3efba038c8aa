//! Shared-secret API key check
//!
//! An empty configured secret disables authentication entirely. The
//! comparison is plain equality.

use crate::error::ServiceError;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Default)]
pub struct Authenticator {
    secret: String,
}

impl Authenticator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// False when no secret is configured
    pub fn is_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn authenticate(&self, provided_key: Option<&str>) -> bool {
        !self.is_enabled() || provided_key == Some(self.secret.as_str())
    }

    /// Like [`Authenticator::authenticate`], as a `Result`
    pub fn check(&self, provided_key: Option<&str>) -> Result<(), ServiceError> {
        if self.authenticate(provided_key) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key_accepted() {
        let auth = Authenticator::new("s3cret");
        assert!(auth.authenticate(Some("s3cret")));
        assert!(auth.check(Some("s3cret")).is_ok());
    }

    #[test]
    fn test_missing_or_wrong_key_rejected() {
        let auth = Authenticator::new("s3cret");
        assert!(!auth.authenticate(None));
        assert!(!auth.authenticate(Some("wrong")));
        assert!(!auth.authenticate(Some("s3cret ")));
        assert!(matches!(auth.check(None), Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn test_empty_secret_disables_auth() {
        let auth = Authenticator::new("");
        assert!(!auth.is_enabled());
        assert!(auth.authenticate(None));
        assert!(auth.authenticate(Some("anything")));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let auth = Authenticator::new("s3cret");
        assert!(!format!("{:?}", auth).contains("s3cret"));
    }
}
