//! Cradle Record Model
//!
//! Loosely-typed profile records with path addressing and partial updates.
//!
//! # Core Concepts
//!
//! - [`ProfileRecord`]: One person row as stored, no field guaranteed
//! - [`FieldPath`]: Hierarchical addressing within a record
//! - [`Patch`]: Minimal update body for one edited field
//! - [`ProfileType`]: Parent or surrogate
//!
//! # Example
//!
//! ```rust
//! use cradle_record::{build_patch, ProfileRecord};
//! use serde_json::json;
//!
//! let record = ProfileRecord::from_value(json!({
//!     "form2Data": {"fertility": {"clinic": "X"}, "embryoRecords": {"count": 2}}
//! })).unwrap();
//!
//! let patch = build_patch("form2Data.fertility", json!({"clinic": "Y"}), &record).unwrap();
//! assert_eq!(patch.payload()["form2Data"]["embryoRecords"]["count"], 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod patch;
mod path;
mod record;

// Re-exports
pub use patch::{build_patch, Patch, PatchError, MAX_PATCH_DEPTH};
pub use path::{FieldPath, PathError};
pub use record::{FileRecord, ProfileRecord, ProfileType, RecordError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
