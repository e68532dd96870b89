//! File-backed device store for the civic client.
//!
//! Emulates the device-local key-value store of a mobile client: one JSON
//! document holding named records. Implements the storage traits from
//! `civic-store` on top of it.

pub mod document;
pub mod ledger;
pub mod session;

pub use document::FileStore;
