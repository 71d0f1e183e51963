//! Shared fixtures for the integration tests.
//!
//! Three record types exercise the store generically:
//! - `Credential`: a small fixed-layout record keyed by `u64`
//! - `Blob`: a large, highly compressible record keyed by `u32`
//! - `Note`: a record keyed by an arbitrary `String`

#![allow(dead_code)]

use std::sync::Once;

use filekv::{FileStore, Result, StoreError, StoreValue, ValueFactory};
use tempfile::TempDir;

// =============================================================================
// Credential Fixture
// =============================================================================

/// Encoded layout: 8-byte id, 16-byte secret, 4-byte revision (little endian).
pub const CREDENTIAL_LEN: usize = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: u64,
    pub secret: [u8; 16],
    pub revision: u32,
}

impl Credential {
    /// Build a credential whose secret is derived from the id, so readers
    /// can verify a record without carrying the original around.
    pub fn new(id: u64, revision: u32) -> Self {
        Self {
            id,
            secret: Self::secret_for(id),
            revision,
        }
    }

    pub fn secret_for(id: u64) -> [u8; 16] {
        let mut secret = [0u8; 16];
        for (i, byte) in secret.iter_mut().enumerate() {
            *byte = (id as u8).wrapping_add(i as u8);
        }
        secret
    }
}

impl StoreValue for Credential {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn encoded_len(&self) -> usize {
        CREDENTIAL_LEN
    }

    fn encode_into(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.id.to_le_bytes());
        buf[8..24].copy_from_slice(&self.secret);
        buf[24..28].copy_from_slice(&self.revision.to_le_bytes());
    }
}

pub struct CredentialFactory;

impl ValueFactory for CredentialFactory {
    type Value = Credential;

    fn encoded_len(&self) -> usize {
        CREDENTIAL_LEN
    }

    fn decode(&self, buf: &[u8]) -> Result<Credential> {
        let id = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let mut secret = [0u8; 16];
        secret.copy_from_slice(&buf[8..24]);
        let revision = u32::from_le_bytes(buf[24..28].try_into().unwrap());

        // Revisions start at 1; a zero marks bytes that never came from
        // `encode_into` on a real credential.
        if revision == 0 {
            return Err(StoreError::Serialization(
                "credential revision must be non-zero".to_string(),
            ));
        }

        Ok(Credential {
            id,
            secret,
            revision,
        })
    }
}

// =============================================================================
// Blob Fixture
// =============================================================================

pub const BLOB_PAYLOAD_LEN: usize = 4096;
pub const BLOB_LEN: usize = 4 + BLOB_PAYLOAD_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub id: u32,
    pub payload: Vec<u8>,
}

impl Blob {
    /// A blob whose payload is one repeated byte (compresses very well).
    pub fn filled(id: u32, byte: u8) -> Self {
        Self {
            id,
            payload: vec![byte; BLOB_PAYLOAD_LEN],
        }
    }
}

impl StoreValue for Blob {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn encoded_len(&self) -> usize {
        BLOB_LEN
    }

    fn encode_into(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.id.to_le_bytes());
        buf[4..].copy_from_slice(&self.payload);
    }
}

pub struct BlobFactory;

impl ValueFactory for BlobFactory {
    type Value = Blob;

    fn encoded_len(&self) -> usize {
        BLOB_LEN
    }

    fn decode(&self, buf: &[u8]) -> Result<Blob> {
        let id = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        Ok(Blob {
            id,
            payload: buf[4..].to_vec(),
        })
    }
}

// =============================================================================
// Note Fixture
// =============================================================================

/// Encoded layout: 24-byte NUL-padded name, 8-byte stamp (little endian).
pub const NOTE_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub name: String,
    pub stamp: u64,
}

impl Note {
    /// `name` must fit the 24-byte field.
    pub fn new(name: &str, stamp: u64) -> Self {
        assert!(name.len() <= 24);
        Self {
            name: name.to_string(),
            stamp,
        }
    }
}

impl StoreValue for Note {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }

    fn encoded_len(&self) -> usize {
        NOTE_LEN
    }

    fn encode_into(&self, buf: &mut [u8]) {
        buf[0..self.name.len()].copy_from_slice(self.name.as_bytes());
        buf[24..32].copy_from_slice(&self.stamp.to_le_bytes());
    }
}

pub struct NoteFactory;

impl ValueFactory for NoteFactory {
    type Value = Note;

    fn encoded_len(&self) -> usize {
        NOTE_LEN
    }

    fn decode(&self, buf: &[u8]) -> Result<Note> {
        let end = buf[0..24].iter().position(|&b| b == 0).unwrap_or(24);
        let name = std::str::from_utf8(&buf[0..end])
            .map_err(|err| StoreError::Serialization(err.to_string()))?
            .to_string();
        let stamp = u64::from_le_bytes(buf[24..32].try_into().unwrap());
        Ok(Note { name, stamp })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Route store logs to the test harness; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A loaded credential store in a fresh temp directory.
pub fn setup_store(use_compression: bool) -> (TempDir, FileStore<Credential>) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path().join("records"), use_compression).unwrap();
    (temp_dir, store)
}

/// A loaded blob store in a fresh temp directory.
pub fn setup_blob_store(use_compression: bool) -> (TempDir, FileStore<Blob>) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path().join("blobs"), use_compression).unwrap();
    (temp_dir, store)
}

/// A loaded note store (string keys) in a fresh temp directory.
pub fn setup_note_store() -> (TempDir, FileStore<Note>) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::open(temp_dir.path().join("notes"), false).unwrap();
    (temp_dir, store)
}
