//! # filekv
//!
//! A persistent key-value store that materializes each value as one file:
//! - One file per record, named deterministically by the key
//! - Exclusive-create, overwrite, and read-back-then-delete operations
//! - Optional transparent whole-file gzip compression
//! - Single-guard concurrency model (one operation at a time)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       FileStore<V>                           │
//! │          (single guard + advisory record counter)           │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐               ┌───────────────┐
//!     │  StoreKey   │               │  StoreValue   │
//!     │ (file name) │               │ ValueFactory  │
//!     └──────┬──────┘               └───────┬───────┘
//!            │                              │
//!            └──────────────┬───────────────┘
//!                           │
//!                           ▼
//!                    ┌─────────────┐
//!                    │    codec    │
//!                    │ (gzip, tmp) │
//!                    └──────┬──────┘
//!                           │
//!                           ▼
//!                 <root>/<key file name>
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod key;
pub mod value;

mod codec;

pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use key::StoreKey;
pub use store::FileStore;
pub use value::{StoreValue, ValueFactory};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
