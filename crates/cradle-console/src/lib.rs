//! Cradle Console
//!
//! Offline tooling over exported profile rows: render the view a profile
//! page would show, preview the payload an edit would send, and print the
//! effective sync configuration.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use cradle_record::{build_patch, ProfileRecord, ProfileType};
use cradle_sync::SyncConfig;
use cradle_view::build_profile_view;
use serde_json::Value;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
///
/// # Errors
/// Returns error if a subscriber is already installed
pub fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("cannot install tracing subscriber: {e}"))
}

/// Parse `--now`, defaulting to the current time
///
/// # Errors
/// Returns error if the value is not RFC 3339
pub fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("--now must be RFC 3339, got {raw:?}")),
    }
}

/// Render the profile view of an exported row as pretty JSON
///
/// Without an explicit type the row's `role` decides.
///
/// # Errors
/// Returns error if the row is not a JSON object or its type is unknown
pub fn render_view(
    record_json: &str,
    profile_type: Option<ProfileType>,
    now: DateTime<Utc>,
) -> Result<String> {
    let record = ProfileRecord::from_json(record_json).context("record is not a JSON object")?;
    let profile_type = profile_type
        .or_else(|| record.profile_type())
        .ok_or_else(|| anyhow!("record has no usable role; pass --profile-type"))?;

    tracing::debug!(%profile_type, fields = record.len(), "building profile view");
    let view = build_profile_view(&record, profile_type, now);
    Ok(serde_json::to_string_pretty(&view)?)
}

/// Render the partial update an edit of `field` would send
///
/// `value` is parsed as JSON; anything that does not parse is taken as a
/// plain string.
///
/// # Errors
/// Returns error if the row is not a JSON object or `field` is not editable
pub fn render_patch(record_json: &str, field: &str, value: &str) -> Result<String> {
    let record = ProfileRecord::from_json(record_json).context("record is not a JSON object")?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    let patch = build_patch(field, value, &record)?;
    tracing::debug!(field = %patch.field(), top_key = patch.top_key(), "patch built");
    Ok(serde_json::to_string_pretty(patch.payload())?)
}

/// Render the effective configuration as TOML
///
/// # Errors
/// Returns error if the file is unreadable or invalid
pub fn render_config(path: Option<&Path>) -> Result<String> {
    let config = match path {
        Some(path) => SyncConfig::from_toml_file(path)?,
        None => SyncConfig::default(),
    };
    Ok(config.to_toml_string()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PARENT_ROW: &str = r#"{
        "role": "parent",
        "formData": {"city": "Austin", "state": "TX", "whenToStart": "ASAP"},
        "parent1": {"name": "Jane Doe"},
        "form2Data": {"fertility": "X", "religion": "None"}
    }"#;

    #[test]
    fn view_uses_role_when_type_not_given() {
        let out = render_view(PARENT_ROW, None, parse_now(Some("2024-06-01T00:00:00Z")).unwrap())
            .unwrap();
        let view: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(view["about"]["profileType"], json!("parent"));
        assert_eq!(view["hero"]["location"], json!("Austin, TX"));
        assert_eq!(view["hero"]["displayName"], json!("Jane Doe"));
    }

    #[test]
    fn view_without_role_needs_type() {
        let err = render_view("{}", None, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("--profile-type"));
        assert!(render_view("{}", Some(ProfileType::Surrogate), Utc::now()).is_ok());
    }

    #[test]
    fn patch_keeps_siblings() {
        let out = render_patch(PARENT_ROW, "form2Data.fertility", "\"Y\"").unwrap();
        let payload: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(payload, json!({"form2Data": {"fertility": "Y", "religion": "None"}}));
    }

    #[test]
    fn patch_value_falls_back_to_string() {
        let out = render_patch("{}", "bio", "plain words").unwrap();
        let payload: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(payload, json!({"bio": "plain words"}));
    }

    #[test]
    fn patch_rejects_deep_paths() {
        assert!(render_patch("{}", "a.b.c", "1").is_err());
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cradle.toml");
        std::fs::write(&path, "rollback_on_write_failure = true\n[retry]\nmax_attempts = 0\n")
            .unwrap();

        let rendered = render_config(Some(&path)).unwrap();
        let reparsed = SyncConfig::from_toml_str(&rendered).unwrap();
        assert!(reparsed.rollback_on_write_failure);
        assert_eq!(reparsed.retry.max_attempts, 0);
        assert_eq!(reparsed.retry.initial_backoff_ms, 500);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn bad_now_is_reported() {
        assert!(parse_now(Some("yesterday")).is_err());
    }
}
