//! Authentication: bootstrap admin key and per-user API keys.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

pub use extractor::{ApiKeyAuth, AuthError};

/// The bootstrap admin key from configuration.
///
/// Held as a `SecretString`: `Debug` is redacted and the memory is zeroed on drop.
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    pub fn new(key: Option<SecretString>) -> Self {
        Self(key)
    }

    /// Compare `provided` with the configured key in constant time.
    ///
    /// Always false when no admin key is configured.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(secret) => {
                // Unequal lengths compare as false without an early exit.
                secret
                    .expose_secret()
                    .as_bytes()
                    .ct_eq(provided.as_bytes())
                    .into()
            }
            None => false,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let key = AdminKey::new(Some(SecretString::from("s3cret".to_string())));
        assert!(key.verify("s3cret"));
        assert!(!key.verify("s3cre"));
        assert!(!key.verify("s3cret!"));
        assert!(!key.verify(""));
    }

    #[test]
    fn test_unconfigured_never_verifies() {
        let key = AdminKey::new(None);
        assert!(!key.is_configured());
        assert!(!key.verify(""));
        assert!(!key.verify("anything"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = AdminKey::new(Some(SecretString::from("s3cret".to_string())));
        assert_eq!(format!("{:?}", key), "AdminKey([REDACTED])");
    }
}
