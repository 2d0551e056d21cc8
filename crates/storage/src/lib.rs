//! Storage abstraction and implementations for campus.
//!
//! This crate provides a trait-based document-store interface with a
//! JSON-file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
