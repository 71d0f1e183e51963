//! Value serialization contract
//!
//! The store never interprets value bytes; it moves fixed-length buffers
//! between callers and files. These two traits are the whole contract.

use crate::error::Result;
use crate::key::StoreKey;

/// A value the store can persist.
///
/// The contract is fixed-length: `encoded_len()` must report the exact
/// number of bytes `encode_into` writes, and it must be the same for every
/// value of the type a given store holds (the read path sizes its buffer
/// from the factory before any byte is read back).
pub trait StoreValue {
    /// Key type identifying values of this type.
    type Key: StoreKey;

    /// The key this value is stored under.
    fn key(&self) -> Self::Key;

    /// Exact serialized size in bytes.
    fn encoded_len(&self) -> usize;

    /// Write the serialized form into `buf`.
    ///
    /// The store always passes a zeroed buffer of exactly `encoded_len()`
    /// bytes; implementations must fill all of it.
    fn encode_into(&self, buf: &mut [u8]);
}

/// Reconstructs values from their serialized form.
///
/// A factory is handed to the read operations so the store knows how many
/// bytes to allocate (`encoded_len`) and how to turn them back into a value
/// (`decode`). It is a separate collaborator rather than an associated
/// function so callers can carry per-store context (schema revision,
/// decryption material) inside it.
pub trait ValueFactory {
    /// The value type this factory produces.
    type Value: StoreValue;

    /// Serialized size of every value this factory decodes, in bytes.
    fn encoded_len(&self) -> usize;

    /// Decode a value from `buf` (`buf.len()` equals `encoded_len()`).
    ///
    /// Returns `StoreError::Serialization` when the bytes do not form a
    /// valid value.
    fn decode(&self, buf: &[u8]) -> Result<Self::Value>;
}
