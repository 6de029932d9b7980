//! Functional tests for profile view resolution.
//!
//! These exercise whole records shaped the way each intake channel leaves
//! them, and check what a profile page would end up showing.

use chrono::{DateTime, TimeZone, Utc};
use cradle_record::{ProfileRecord, ProfileType};
use cradle_view::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

/// A parent record created by the short contact form only.
///
/// Nothing curated, no questionnaire: the about section is empty, and the
/// header falls back to the contact form plus the co-parent block.
#[test]
fn contact_form_only_parent() {
    let record = ProfileRecord::from_value(json!({
        "about": {},
        "formData": {"city": "Austin", "state": "TX", "whenToStart": "ASAP"},
        "parent1": {"name": "Jane Doe"}
    }))
    .unwrap();

    let view = build_profile_view(&record, ProfileType::Parent, fixed_now());

    assert_eq!(view.about.get("bio"), None);
    assert_eq!(view.about.get("aboutUs"), None);
    assert_eq!(view.about.value("bio"), "");
    assert_eq!(view.hero.location.as_deref(), Some("Austin, TX"));
    assert_eq!(view.hero.timeline.as_deref(), Some("ASAP"));
    assert_eq!(view.hero.display_name.as_deref(), Some("Jane Doe"));
}

/// Co-parent names take precedence over names typed into the contact form.
#[test]
fn co_parent_names_beat_form_names() {
    let record = ProfileRecord::from_value(json!({
        "formData": {"firstName": "J", "lastName": "D"},
        "parent1": {"name": "Jane Doe"},
        "parent2": {"name": "Sam Doe"}
    }))
    .unwrap();

    let hero = build_hero_view(&record, ProfileType::Parent);
    assert_eq!(hero.display_name.as_deref(), Some("Jane Doe & Sam Doe"));
}

#[test]
fn form_name_used_when_no_co_parents() {
    let record = ProfileRecord::from_value(json!({
        "firstName": "Root",
        "formData": {"firstName": "Maria", "lastName": "Lopez"}
    }))
    .unwrap();

    let hero = build_hero_view(&record, ProfileType::Surrogate);
    assert_eq!(hero.display_name.as_deref(), Some("Maria Lopez"));
}

/// A surrogate who filled the mobile-app questionnaire, with one field
/// later curated by staff.
#[test]
fn mobile_app_surrogate_with_curated_override() {
    let record = ProfileRecord::from_value(json!({
        "role": "surrogate",
        "status": "active",
        "profileImageUrl": "https://cdn.example/p.jpg",
        "about": {"occupation": "Labor & delivery nurse"},
        "form2": {
            "app": {
                "aboutMe": {"bio": "Mom of two who loves hiking."},
                "background": {"occupation": "Nurse", "educationLevel": "BSN"},
                "lifestyle": {"hobbies": ["Hiking", "Baking", ""]},
                "medical": {"amh": "Normal"},
                "preferences": {"secondCycle": true},
                "heritage": {"mother": "Irish & German", "father": "Mexican"},
                "personal": {"dateOfBirth": "1994-09-12"}
            },
            "Height": "5'6\""
        }
    }))
    .unwrap();

    let profile_type = record.profile_type().unwrap();
    let view = build_about_view(&record, profile_type, fixed_now());

    assert_eq!(view.get("bio"), Some("Mom of two who loves hiking."));
    assert_eq!(view.get("occupation"), Some("Labor & delivery nurse"));
    assert_eq!(view.get("education"), Some("BSN"));
    assert_eq!(view.get("hobbies"), Some("Hiking, Baking"));
    assert_eq!(view.tags("hobbies"), vec!["Hiking", "Baking"]);
    assert_eq!(view.get("amhStatus"), Some("Normal"));
    assert_eq!(view.get("opennessToSecondCycle"), Some("Yes"));
    assert_eq!(view.get("height"), Some("5'6\""));
    assert_eq!(view.tags("bioMotherHeritage"), vec!["Irish", "German"]);
    assert_eq!(view.get("bioFatherHeritage"), Some("Mexican"));
    assert_eq!(view.get("age"), Some("29"));
    assert_eq!(view.get("religion"), None);

    let hero = build_hero_view(&record, profile_type);
    assert_eq!(hero.status.as_deref(), Some("active"));
    assert_eq!(hero.avatar_url.as_deref(), Some("https://cdn.example/p.jpg"));
}

/// Parent questionnaire answers live under `form2Data`, surrogate answers
/// under `form2`; each schema only reads its own container.
#[test]
fn questionnaire_container_depends_on_profile_type() {
    let record = ProfileRecord::from_value(json!({
        "form2Data": {"religion": "Catholic"},
        "form2": {"religion": "Buddhist"}
    }))
    .unwrap();

    let parent = build_about_view(&record, ProfileType::Parent, fixed_now());
    let surrogate = build_about_view(&record, ProfileType::Surrogate, fixed_now());

    assert_eq!(parent.get("religion"), Some("Catholic"));
    assert_eq!(surrogate.get("religion"), Some("Buddhist"));
}

#[test]
fn view_is_deterministic() {
    let record = ProfileRecord::from_value(json!({
        "about": {"bio": "Hello"},
        "dob": "1985-03-04"
    }))
    .unwrap();

    let first = build_profile_view(&record, ProfileType::Parent, fixed_now());
    let second = build_profile_view(&record, ProfileType::Parent, fixed_now());
    assert_eq!(first, second);
    assert_eq!(first.about.get("age"), Some("39"));
}
