//! Canonical field schemas
//!
//! Each profile type has one declared precedence list per canonical field.
//! Candidate order inside every list follows the same tiers:
//!
//! 1. manually curated `about.*`
//! 2. root-level legacy fields
//! 3. structured intake forms (`formData`, `form2Data` / `form2`)
//! 4. nested mobile-app variants
//! 5. alternate display-label keys (`"Education Level"`)

use crate::derive::PARTY_SEPARATOR;
use crate::resolver::Candidate;
use cradle_record::ProfileType;
use once_cell::sync::Lazy;

/// How one canonical field is computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// First present candidate
    Resolve(Vec<Candidate>),
    /// A stated age wins; otherwise derived from the first present birthdate
    Age {
        /// Explicit age values
        stated: Vec<Candidate>,
        /// Birthdate locations
        birthdate: Vec<Candidate>,
    },
}

/// Ordered canonical fields for one profile type
#[derive(Debug, Clone)]
pub struct Schema {
    profile_type: ProfileType,
    fields: Vec<(&'static str, FieldRule)>,
}

impl Schema {
    /// Profile type this schema describes
    #[inline]
    #[must_use]
    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    /// Canonical fields in display order
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (*name, rule))
    }

    /// Canonical field names in display order
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    /// Rule for one field
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, rule)| rule)
    }

    /// Number of canonical fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema declares no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Hero header locations for one profile type
#[derive(Debug, Clone)]
pub struct HeroSchema {
    /// Name shown in the header
    pub display_name: Vec<Candidate>,
    /// `City, ST`
    pub location: Vec<Candidate>,
    /// When the person wants to start
    pub timeline: Vec<Candidate>,
    /// Profile picture
    pub avatar_url: Vec<Candidate>,
    /// Account status
    pub status: Vec<Candidate>,
}

/// Schema for a profile type
#[must_use]
pub fn schema_for(profile_type: ProfileType) -> &'static Schema {
    match profile_type {
        ProfileType::Parent => &PARENT_SCHEMA,
        ProfileType::Surrogate => &SURROGATE_SCHEMA,
    }
}

/// Hero schema for a profile type
#[must_use]
pub fn hero_schema_for(profile_type: ProfileType) -> &'static HeroSchema {
    match profile_type {
        ProfileType::Parent => &PARENT_HERO,
        ProfileType::Surrogate => &SURROGATE_HERO,
    }
}

fn p(segments: &[&str]) -> Candidate {
    Candidate::path(segments)
}

fn parties(field: &str) -> Candidate {
    Candidate::combine(&[&["parent1", field], &["parent2", field]], PARTY_SEPARATOR)
}

fn resolve(candidates: Vec<Candidate>) -> FieldRule {
    FieldRule::Resolve(candidates)
}

/// Intended-parent schema; intake answers live under `form2Data`
pub static PARENT_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema {
    profile_type: ProfileType::Parent,
    fields: vec![
        (
            "bio",
            resolve(vec![
                p(&["about", "bio"]),
                p(&["bio"]),
                p(&["formData", "bio"]),
                p(&["form2Data", "bio"]),
                p(&["form2Data", "sections", "aboutYou", "bio"]),
                p(&["form2Data", "Bio"]),
            ]),
        ),
        (
            "aboutUs",
            resolve(vec![
                p(&["about", "aboutUs"]),
                p(&["aboutUs"]),
                p(&["form2Data", "aboutUs"]),
                p(&["form2Data", "letterToSurrogate"]),
                p(&["form2Data", "sections", "aboutUs", "story"]),
                p(&["form2Data", "About Us"]),
            ]),
        ),
        (
            "age",
            FieldRule::Age {
                stated: vec![
                    p(&["about", "age"]),
                    p(&["age"]),
                    parties("age"),
                    p(&["formData", "age"]),
                    p(&["form2Data", "age"]),
                ],
                birthdate: vec![
                    p(&["about", "dateOfBirth"]),
                    p(&["dateOfBirth"]),
                    p(&["dob"]),
                    p(&["parent1", "dateOfBirth"]),
                    p(&["formData", "dateOfBirth"]),
                    p(&["formData", "dob"]),
                    p(&["form2Data", "dateOfBirth"]),
                    p(&["form2Data", "sections", "personal", "dateOfBirth"]),
                    p(&["formData", "Date of Birth"]),
                ],
            },
        ),
        (
            "occupation",
            resolve(vec![
                p(&["about", "occupation"]),
                p(&["occupation"]),
                parties("occupation"),
                p(&["formData", "occupation"]),
                p(&["form2Data", "occupation"]),
                p(&["form2Data", "sections", "background", "occupation"]),
                p(&["form2Data", "Occupation"]),
            ]),
        ),
        (
            "education",
            resolve(vec![
                p(&["about", "education"]),
                p(&["education"]),
                parties("education"),
                p(&["formData", "education"]),
                p(&["form2Data", "educationLevel"]),
                p(&["form2Data", "sections", "background", "educationLevel"]),
                p(&["formData", "Education Level"]),
                p(&["form2Data", "Education Level"]),
            ]),
        ),
        (
            "religion",
            resolve(vec![
                p(&["about", "religion"]),
                p(&["religion"]),
                p(&["formData", "religion"]),
                p(&["form2Data", "religion"]),
                p(&["form2Data", "sections", "values", "religion"]),
                p(&["form2Data", "Religion"]),
                p(&["form2Data", "Religious Affiliation"]),
            ]),
        ),
        (
            "hobbies",
            resolve(vec![
                p(&["about", "hobbies"]),
                p(&["hobbies"]),
                p(&["interests"]),
                p(&["formData", "hobbies"]),
                p(&["form2Data", "hobbies"]),
                p(&["form2Data", "interests"]),
                p(&["form2Data", "sections", "lifestyle", "hobbies"]),
                p(&["form2Data", "Hobbies & Interests"]),
            ]),
        ),
        (
            "relationshipPreference",
            resolve(vec![
                p(&["about", "relationshipPreference"]),
                p(&["relationshipPreference"]),
                p(&["form2Data", "relationshipPreference"]),
                p(&["form2Data", "desiredRelationship"]),
                p(&["form2Data", "sections", "preferences", "relationship"]),
                p(&["form2Data", "Desired Relationship"]),
            ]),
        ),
        (
            "familyLifestyle",
            resolve(vec![
                p(&["about", "familyLifestyle"]),
                p(&["familyLifestyle"]),
                p(&["form2Data", "familyLifestyle"]),
                p(&["form2Data", "lifestyle"]),
                p(&["form2Data", "sections", "lifestyle", "description"]),
                p(&["form2Data", "Family Lifestyle"]),
            ]),
        ),
    ],
});

/// Surrogate schema; intake answers live under `form2`
pub static SURROGATE_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema {
    profile_type: ProfileType::Surrogate,
    fields: vec![
        (
            "bio",
            resolve(vec![
                p(&["about", "bio"]),
                p(&["bio"]),
                p(&["formData", "bio"]),
                p(&["form2", "bio"]),
                p(&["form2", "aboutMe"]),
                p(&["form2", "app", "aboutMe", "bio"]),
                p(&["form2", "About Me"]),
            ]),
        ),
        (
            "age",
            FieldRule::Age {
                stated: vec![
                    p(&["about", "age"]),
                    p(&["age"]),
                    p(&["formData", "age"]),
                    p(&["form2", "age"]),
                ],
                birthdate: vec![
                    p(&["about", "dateOfBirth"]),
                    p(&["dateOfBirth"]),
                    p(&["dob"]),
                    p(&["formData", "dateOfBirth"]),
                    p(&["formData", "dob"]),
                    p(&["form2", "dateOfBirth"]),
                    p(&["form2", "app", "personal", "dateOfBirth"]),
                    p(&["formData", "Date of Birth"]),
                ],
            },
        ),
        (
            "occupation",
            resolve(vec![
                p(&["about", "occupation"]),
                p(&["occupation"]),
                p(&["formData", "occupation"]),
                p(&["form2", "occupation"]),
                p(&["form2", "employment", "occupation"]),
                p(&["form2", "app", "background", "occupation"]),
                p(&["form2", "Occupation"]),
            ]),
        ),
        (
            "education",
            resolve(vec![
                p(&["about", "education"]),
                p(&["education"]),
                p(&["formData", "education"]),
                p(&["form2", "educationLevel"]),
                p(&["form2", "app", "background", "educationLevel"]),
                p(&["formData", "Education Level"]),
                p(&["form2", "Education Level"]),
            ]),
        ),
        (
            "religion",
            resolve(vec![
                p(&["about", "religion"]),
                p(&["religion"]),
                p(&["formData", "religion"]),
                p(&["form2", "religion"]),
                p(&["form2", "app", "values", "religion"]),
                p(&["form2", "Religion"]),
            ]),
        ),
        (
            "hobbies",
            resolve(vec![
                p(&["about", "hobbies"]),
                p(&["hobbies"]),
                p(&["interests"]),
                p(&["formData", "hobbies"]),
                p(&["form2", "hobbies"]),
                p(&["form2", "interests"]),
                p(&["form2", "app", "lifestyle", "hobbies"]),
                p(&["form2", "Hobbies & Interests"]),
            ]),
        ),
        (
            "relationshipPreference",
            resolve(vec![
                p(&["about", "relationshipPreference"]),
                p(&["relationshipPreference"]),
                p(&["form2", "relationshipPreference"]),
                p(&["form2", "desiredRelationship"]),
                p(&["form2", "app", "preferences", "relationship"]),
                p(&["form2", "Desired Relationship with Intended Parents"]),
            ]),
        ),
        (
            "familyLifestyle",
            resolve(vec![
                p(&["about", "familyLifestyle"]),
                p(&["familyLifestyle"]),
                p(&["form2", "familyLifestyle"]),
                p(&["form2", "household", "description"]),
                p(&["form2", "app", "lifestyle", "description"]),
                p(&["form2", "Family Lifestyle"]),
            ]),
        ),
        (
            "amhStatus",
            resolve(vec![
                p(&["about", "amhStatus"]),
                p(&["amhStatus"]),
                p(&["form2", "amhStatus"]),
                p(&["form2", "medical", "amhStatus"]),
                p(&["form2", "app", "medical", "amh"]),
                p(&["form2", "AMH Status"]),
            ]),
        ),
        (
            "opennessToSecondCycle",
            resolve(vec![
                p(&["about", "opennessToSecondCycle"]),
                p(&["opennessToSecondCycle"]),
                p(&["form2", "opennessToSecondCycle"]),
                p(&["form2", "secondCycle"]),
                p(&["form2", "app", "preferences", "secondCycle"]),
                p(&["form2", "Open to Second Cycle"]),
            ]),
        ),
        (
            "height",
            resolve(vec![
                p(&["about", "height"]),
                p(&["height"]),
                p(&["formData", "height"]),
                p(&["form2", "height"]),
                p(&["form2", "physical", "height"]),
                p(&["form2", "app", "physical", "height"]),
                p(&["form2", "Height"]),
            ]),
        ),
        (
            "bioMotherHeritage",
            resolve(vec![
                p(&["about", "bioMotherHeritage"]),
                p(&["bioMotherHeritage"]),
                p(&["form2", "bioMotherHeritage"]),
                p(&["form2", "heritage", "mother"]),
                p(&["form2", "app", "heritage", "mother"]),
                p(&["form2", "Biological Mother's Heritage"]),
            ]),
        ),
        (
            "bioFatherHeritage",
            resolve(vec![
                p(&["about", "bioFatherHeritage"]),
                p(&["bioFatherHeritage"]),
                p(&["form2", "bioFatherHeritage"]),
                p(&["form2", "heritage", "father"]),
                p(&["form2", "app", "heritage", "father"]),
                p(&["form2", "Biological Father's Heritage"]),
            ]),
        ),
    ],
});

/// Parent hero header; co-parents' names win over intake-form names
pub static PARENT_HERO: Lazy<HeroSchema> = Lazy::new(|| HeroSchema {
    display_name: vec![
        parties("name"),
        Candidate::combine(&[&["formData", "firstName"], &["formData", "lastName"]], " "),
        Candidate::combine(&[&["firstName"], &["lastName"]], " "),
    ],
    location: location_candidates("form2Data"),
    timeline: vec![
        p(&["formData", "whenToStart"]),
        p(&["form2Data", "timeline"]),
        p(&["form2Data", "sections", "journey", "timeline"]),
    ],
    avatar_url: avatar_candidates(),
    status: vec![p(&["status"])],
});

/// Surrogate hero header
pub static SURROGATE_HERO: Lazy<HeroSchema> = Lazy::new(|| HeroSchema {
    display_name: vec![
        p(&["about", "displayName"]),
        Candidate::combine(&[&["formData", "firstName"], &["formData", "lastName"]], " "),
        Candidate::combine(&[&["firstName"], &["lastName"]], " "),
    ],
    location: location_candidates("form2"),
    timeline: vec![
        p(&["formData", "whenToStart"]),
        p(&["form2", "timeline"]),
        p(&["form2", "app", "journey", "timeline"]),
    ],
    avatar_url: avatar_candidates(),
    status: vec![p(&["status"])],
});

fn location_candidates(intake: &str) -> Vec<Candidate> {
    vec![
        Candidate::combine(&[&["formData", "city"], &["formData", "state"]], ", "),
        Candidate::combine(&[&["city"], &["state"]], ", "),
        p(&[intake, "location"]),
    ]
}

fn avatar_candidates() -> Vec<Candidate> {
    vec![p(&["profileImageUrl"]), p(&["about", "photoUrl"])]
}
