//! Cradle Profile Views
//!
//! Deterministic resolution of canonical profile fields from records that
//! accumulated data through several independently evolved intake channels.
//!
//! # Overview
//!
//! - **Resolver**: first present value among ordered [`Candidate`]s
//! - **Calculators**: age from birthdate, multi-party joins, tag splitting
//! - **Schemas**: one declared precedence list per canonical field, per profile type
//! - **Builder**: [`build_about_view`], [`build_hero_view`], [`build_profile_view`]
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use cradle_record::{ProfileRecord, ProfileType};
//! use cradle_view::build_about_view;
//! use serde_json::json;
//!
//! let record = ProfileRecord::from_value(json!({
//!     "about": {"occupation": "Teacher"},
//!     "formData": {"occupation": "Nurse"}
//! })).unwrap();
//!
//! let view = build_about_view(&record, ProfileType::Surrogate, Utc::now());
//! assert_eq!(view.get("occupation"), Some("Teacher"));
//! assert_eq!(view.get("bio"), None);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod derive;
pub mod resolver;
pub mod schema;
pub mod view;

// Re-exports
pub use derive::{age_from_dob, join_parties, join_present, parse_birthdate, split_tags};
pub use resolver::{resolve, Candidate, Transform};
pub use schema::{hero_schema_for, schema_for, FieldRule, HeroSchema, Schema};
pub use view::{
    build_about_view, build_hero_view, build_profile_view, AboutView, Completion, HeroView,
    ProfileView,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building profile views
    pub use crate::{
        build_about_view, build_hero_view, build_profile_view, AboutView, Candidate, HeroView,
        ProfileView,
    };
    pub use cradle_record::{ProfileRecord, ProfileType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
