//! Codec Module
//!
//! Turns typed values into self-describing bytes and back, refusing to decode
//! an entry as a type other than the one it was stored as.

mod cacheable;
mod json;


pub use cacheable::Cacheable;
pub use json::{TypedJsonCodec, WIRE_VERSION};

// == Public Constants ==
/// Default maximum encoded entry size in bytes
pub const MAX_ENTRY_BYTES: usize = 1024 * 1024; // 1 MB
