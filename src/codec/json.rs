//! Typed JSON Codec
//!
//! Wire format, one JSON object per entry:
//!
//! ```text
//! {"v":1,"type":"f64","value":42.5}
//! {"v":1,"type":"datetime-offset","value":"2024-03-01T09:30:00+02:00"}
//! {"v":1,"type":"bank.AccountBalance","value":null}
//! ```
//!
//! A `null` value is a cached absence. Temporal payloads are RFC 3339 strings
//! with an explicit offset, never epoch numbers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{Cacheable, MAX_ENTRY_BYTES};
use crate::error::{CacheError, Result};

/// Envelope version written by this codec
pub const WIRE_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    v: u32,
    #[serde(rename = "type")]
    type_tag: &'a str,
    value: Value,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    v: u32,
    #[serde(rename = "type")]
    type_tag: String,
    value: Value,
}

// == Typed JSON Codec ==
/// Stateless codec; one instance can be shared by every task.
#[derive(Debug, Clone)]
pub struct TypedJsonCodec {
    max_entry_bytes: usize,
}

impl TypedJsonCodec {
    pub fn new(max_entry_bytes: usize) -> Self {
        Self { max_entry_bytes }
    }

    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry_bytes
    }

    // == Encode ==
    /// Encodes `value` (or a cached absence for `None`) under `T`'s type tag.
    pub fn encode<T: Cacheable>(&self, value: Option<&T>) -> Result<Vec<u8>> {
        let payload = match value {
            Some(v) => {
                let payload = serde_json::to_value(v)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                // A present value must never read back as an absence
                if payload.is_null() {
                    return Err(CacheError::Serialization(format!(
                        "value of type `{}` serializes to null",
                        T::type_tag()
                    )));
                }
                payload
            }
            None => Value::Null,
        };

        let tag = T::type_tag();
        let envelope = EnvelopeOut {
            v: WIRE_VERSION,
            type_tag: &tag,
            value: payload,
        };
        let bytes =
            serde_json::to_vec(&envelope).map_err(|e| CacheError::Serialization(e.to_string()))?;

        if bytes.len() > self.max_entry_bytes {
            return Err(CacheError::ValueTooLarge {
                size: bytes.len(),
                limit: self.max_entry_bytes,
            });
        }
        Ok(bytes)
    }

    // == Decode ==
    /// Decodes an entry written for `T`.
    ///
    /// Returns `Ok(None)` for a cached absence. Malformed bytes, an unknown
    /// envelope version or a type tag other than `T`'s are
    /// [`CacheError::Deserialization`].
    pub fn decode<T: Cacheable>(&self, bytes: &[u8]) -> Result<Option<T>> {
        let envelope: EnvelopeIn = serde_json::from_slice(bytes)?;

        if envelope.v != WIRE_VERSION {
            return Err(CacheError::Deserialization(format!(
                "unsupported envelope version {}",
                envelope.v
            )));
        }

        let expected = T::type_tag();
        if envelope.type_tag != expected {
            return Err(CacheError::Deserialization(format!(
                "entry holds `{}`, expected `{}`",
                envelope.type_tag, expected
            )));
        }

        if envelope.value.is_null() {
            return Ok(None);
        }
        let value = serde_json::from_value(envelope.value)?;
        Ok(Some(value))
    }
}

impl Default for TypedJsonCodec {
    fn default() -> Self {
        Self::new(MAX_ENTRY_BYTES)
    }
}
