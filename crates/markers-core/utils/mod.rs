//! Utility functions and shared types for markers-core
//!
//! Contains the crate-wide error type and hashing helpers used by the
//! parser, model and extraction modules.

pub mod errors;
pub mod hashers;

pub use errors::{CoreError, ErrorCategory};
pub use hashers::{create_hash_map, create_hash_map_with_capacity, create_hash_set};
