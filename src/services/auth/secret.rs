use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("shared secret must not be empty")]
pub struct EmptySecret;

/// HMAC key shared with the token issuer.
///
/// - Never empty: construction fails instead of verifying against a blank key.
/// - Key material is not printable via Debug.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, EmptySecret> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"<redacted>").finish()
    }
}
