//! Serialization of fitted model parameters.
//!
//! Parameters are stored as plain numeric data (never live arrays), prefixed with a
//! small header so that files from an incompatible build are rejected instead of
//! being misread:
//!
//! ```text
//! bincode(Header { magic: b"KSLR", format_version }) ++ bincode(params)
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Identifies a model file written by this crate.
pub const MAGIC: [u8; 4] = *b"KSLR";

/// Bumped whenever the persisted parameter layout changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    magic: [u8; 4],
    format_version: u32,
}

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain numerical data (e.g., `Vec<f64>`, scalars)
/// and names, not array views or other borrowed handles.
pub trait SerializableParams: Sized {
    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl<T> SerializableParams for T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = bincode::serialize(&Header {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
        })?;
        bytes.extend(bincode::serialize(self)?);
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        let header: Header = bincode::deserialize_from(&mut reader)
            .map_err(|_| Error::Serialization("file is too short to be a model".into()))?;
        if header.magic != MAGIC {
            return Err(Error::Serialization("not a model file (bad magic)".into()));
        }
        if header.format_version != FORMAT_VERSION {
            return Err(Error::UnsupportedFormat {
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(bincode::deserialize(reader)?)
    }
}
