//! View model builder
//!
//! Produces the flat, render-ready models profile screens consume. The
//! builder is pure: same record and clock, same view.

use crate::derive::{age_from_dob, split_tags};
use crate::resolver::resolve;
use crate::schema::{hero_schema_for, schema_for, FieldRule};
use chrono::{DateTime, Utc};
use cradle_record::{ProfileRecord, ProfileType};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Canonical "About" view model
///
/// # Invariants
/// - Every schema field is present as a key, in schema order
/// - Absent values are stored as `""`, never `"null"` or `"NaN"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutView {
    profile_type: ProfileType,
    fields: IndexMap<&'static str, String>,
}

impl AboutView {
    /// Profile type the view was built for
    #[inline]
    #[must_use]
    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    /// Present value of a field, `None` when absent or unknown
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Raw stored value, `""` when absent or unknown
    #[must_use]
    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    /// Check whether the schema declares `name`
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field split into chips/badges
    #[must_use]
    pub fn tags(&self, name: &str) -> Vec<String> {
        self.get(name).map(split_tags).unwrap_or_default()
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Number of schema fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the view has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with a present value
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.fields.values().filter(|value| !value.is_empty()).count()
    }
}

/// Hero header metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroView {
    pub display_name: Option<String>,
    pub location: Option<String>,
    pub timeline: Option<String>,
    pub avatar_url: Option<String>,
    pub status: Option<String>,
}

/// Intake progress for dashboard badges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub profile_completed: bool,
    pub form2_completed: bool,
    pub filled_fields: usize,
    pub total_fields: usize,
    pub documents: usize,
}

impl Completion {
    /// Filled share of about fields, 0–100
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_fields == 0 {
            return 0;
        }
        let pct = self.filled_fields * 100 / self.total_fields;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

/// Everything a profile page renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub about: AboutView,
    pub hero: HeroView,
    pub completion: Completion,
}

/// Build the canonical "About" view
#[must_use]
pub fn build_about_view(
    record: &ProfileRecord,
    profile_type: ProfileType,
    now: DateTime<Utc>,
) -> AboutView {
    let schema = schema_for(profile_type);
    let fields = schema
        .fields()
        .map(|(name, rule)| (name, evaluate_rule(record, rule, now).unwrap_or_default()))
        .collect();

    AboutView {
        profile_type,
        fields,
    }
}

/// Build the hero header
#[must_use]
pub fn build_hero_view(record: &ProfileRecord, profile_type: ProfileType) -> HeroView {
    let hero = hero_schema_for(profile_type);
    HeroView {
        display_name: resolve(record, &hero.display_name),
        location: resolve(record, &hero.location),
        timeline: resolve(record, &hero.timeline),
        avatar_url: resolve(record, &hero.avatar_url),
        status: resolve(record, &hero.status),
    }
}

/// Build the about view, hero header and completion summary together
#[must_use]
pub fn build_profile_view(
    record: &ProfileRecord,
    profile_type: ProfileType,
    now: DateTime<Utc>,
) -> ProfileView {
    let about = build_about_view(record, profile_type, now);
    let completion = Completion {
        profile_completed: flag(record.get("profileCompleted")),
        form2_completed: flag(record.get("form2Completed")),
        filled_fields: about.filled_count(),
        total_fields: about.len(),
        documents: record.documents().len(),
    };

    ProfileView {
        hero: build_hero_view(record, profile_type),
        about,
        completion,
    }
}

fn evaluate_rule(record: &ProfileRecord, rule: &FieldRule, now: DateTime<Utc>) -> Option<String> {
    match rule {
        FieldRule::Resolve(candidates) => resolve(record, candidates),
        FieldRule::Age { stated, birthdate } => resolve(record, stated).or_else(|| {
            let raw = resolve(record, birthdate);
            age_from_dob(raw.as_deref(), now).map(|age| age.to_string())
        }),
    }
}

// Legacy rows store flags as booleans, "true" strings, or 0/1.
fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}
