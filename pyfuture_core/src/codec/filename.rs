//! Filename encoding helpers.
//!
//! Host filenames are arbitrary bytes. Decoding them with `surrogateescape`
//! gives text that can always be turned back into the original bytes.

use super::registry::register_surrogateescape;
use super::{Encoding, SURROGATE_ESCAPE};
use crate::error::FutureResult;

/// Encoding and error handler used for filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameCodec {
    /// Codec applied to filenames.
    pub encoding: Encoding,
    /// Error handler name.
    pub errors: String,
}

impl FilenameCodec {
    /// Create a codec from an encoding name and handler name.
    pub fn new(encoding: &str, errors: impl Into<String>) -> FutureResult<Self> {
        Ok(Self {
            encoding: Encoding::lookup(encoding)?,
            errors: errors.into(),
        })
    }

    /// Convert filename bytes to text.
    pub fn decode_filename(&self, raw: &[u8]) -> FutureResult<Vec<u32>> {
        register_surrogateescape();
        self.encoding.decode(raw, &self.errors)
    }

    /// Convert filename text back to bytes.
    pub fn encode_filename(&self, name: &[u32]) -> FutureResult<Vec<u8>> {
        register_surrogateescape();
        self.encoding.encode(name, &self.errors)
    }
}

impl Default for FilenameCodec {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            errors: SURROGATE_ESCAPE.to_string(),
        }
    }
}
