//! Deterministic JSON serialization for the credential file.
//!
//! Ensures stable on-disk output by:
//! - Sorting object keys alphabetically (via `BTreeMap` in domain types)
//! - Using 2-space indentation
//! - Adding trailing newline

mod json;

pub use json::{SerializationError, from_json, to_json_stable, to_json_stable_bytes};
