use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Container for sensitive strings that zeroizes its memory on drop.
///
/// Both tokens this process handles (the CodeArtifact authorization token and
/// the GitHub installation token) live inside this type between fetch and
/// use. `Debug` and `Display` redact the value so it cannot leak through
/// logging.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Get a reference to the inner string
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the length of the string
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("inner", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_holds_value() {
        let s = SecureString::from("auth-token-value");
        assert_eq!(s.as_str(), "auth-token-value");
        assert_eq!(s.len(), 16);
        assert!(!s.is_empty());
    }

    #[test]
    fn test_debug_and_display_redact() {
        let s = SecureString::from("super-secret");
        assert!(!format!("{s:?}").contains("super-secret"));
        assert!(!format!("{s}").contains("super-secret"));
    }

    #[test]
    fn test_explicit_zeroize_clears_content() {
        let mut s = SecureString::from("ephemeral");
        s.zeroize();
        assert!(s.is_empty());
    }
}
