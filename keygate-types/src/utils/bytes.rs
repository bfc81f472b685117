use std::ops::Deref;

use serde::Serialize;
use typeshare::typeshare;

use super::encoding;

/// An owned binary buffer as consumed or produced by the platform credential primitives.
///
/// Serializes to its `base64url` text, the form binary data takes once it crosses the wire.
#[typeshare(transparent)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Hash)]
#[repr(transparent)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Take back the underlying buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(buffer: Vec<u8>) -> Self {
        Self(buffer)
    }
}

impl From<&[u8]> for Bytes {
    fn from(buffer: &[u8]) -> Self {
        Self(buffer.to_owned())
    }
}

impl From<Bytes> for String {
    fn from(bytes: Bytes) -> Self {
        encoding::base64url(&bytes)
    }
}

/// The text handed to [`Bytes::try_from`] is neither `base64url` nor `base64`.
#[derive(Debug, PartialEq, Eq)]
pub struct NotBase64Encoded;

impl TryFrom<&str> for Bytes {
    type Error = NotBase64Encoded;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        match encoding::try_from_base64url(text) {
            Ok(buffer) => Ok(Self(buffer)),
            Err(_) => Err(NotBase64Encoded),
        }
    }
}

impl Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&encoding::base64url(&self.0))
    }
}
