//! Derived field calculators
//!
//! Small pure functions layered on resolved text: age from a birthdate,
//! multi-party joins and tag splitting. Malformed input degrades to absent.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Separator between two co-parents' values
pub const PARTY_SEPARATOR: &str = " & ";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a stored birthdate
///
/// Accepts RFC 3339 timestamps, naive timestamps (read as UTC) and the
/// date-only forms intake forms produce. Date-only values are midnight UTC.
#[must_use]
pub fn parse_birthdate(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Whole years between `dob` and `now`
///
/// The elapsed time is placed on the Unix epoch and its UTC calendar year
/// compared with 1970, so `abs(year(epoch + (now - dob)) - 1970)`.
#[must_use]
pub fn age_between(dob: DateTime<Utc>, now: DateTime<Utc>) -> Option<u32> {
    let elapsed_ms = now.timestamp_millis().checked_sub(dob.timestamp_millis())?;
    let shifted = DateTime::<Utc>::from_timestamp_millis(elapsed_ms)?;
    Some((shifted.year() - 1970).unsigned_abs())
}

/// Age from a raw birthdate string, absent when missing or unparsable
#[must_use]
pub fn age_from_dob(raw: Option<&str>, now: DateTime<Utc>) -> Option<u32> {
    raw.and_then(parse_birthdate)
        .and_then(|dob| age_between(dob, now))
}

/// Join the present, non-blank parts with `separator`
///
/// One part comes back unadorned; no parts is absent.
#[must_use]
pub fn join_present<I, S>(parts: I, separator: &str) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let present: Vec<String> = parts
        .into_iter()
        .flatten()
        .map(|part| part.as_ref().trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();

    if present.is_empty() {
        None
    } else {
        Some(present.join(separator))
    }
}

/// Join two parties' values with `" & "`
#[inline]
#[must_use]
pub fn join_parties(first: Option<&str>, second: Option<&str>) -> Option<String> {
    join_present([first, second], PARTY_SEPARATOR)
}

/// Split free text into tags on `,`, `&`, or newlines
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split([',', '&', '\n'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn june_first_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn age_from_iso_date() {
        assert_eq!(age_from_dob(Some("2000-01-01"), june_first_2024()), Some(24));
    }

    #[test]
    fn age_before_birthday_rounds_down() {
        assert_eq!(age_from_dob(Some("1990-12-31"), june_first_2024()), Some(33));
    }

    #[test]
    fn age_from_other_formats() {
        let now = june_first_2024();
        assert_eq!(age_from_dob(Some("01/15/1990"), now), Some(34));
        assert_eq!(age_from_dob(Some("March 3, 1988"), now), Some(36));
        assert_eq!(age_from_dob(Some("1995-02-10T08:30:00Z"), now), Some(29));
        assert_eq!(age_from_dob(Some("1995-02-10T08:30:00.000"), now), Some(29));
    }

    #[test]
    fn unparsable_or_missing_is_absent() {
        let now = june_first_2024();
        assert_eq!(age_from_dob(Some("not-a-date"), now), None);
        assert_eq!(age_from_dob(Some(""), now), None);
        assert_eq!(age_from_dob(None, now), None);
    }

    #[test]
    fn future_birthdate_does_not_panic() {
        let now = june_first_2024();
        assert!(age_from_dob(Some("2030-01-01"), now).is_some());
    }

    #[test]
    fn join_parties_laws() {
        assert_eq!(join_parties(Some("A"), Some("B")).as_deref(), Some("A & B"));
        assert_eq!(join_parties(Some("A"), None).as_deref(), Some("A"));
        assert_eq!(join_parties(None, Some("B")).as_deref(), Some("B"));
        assert_eq!(join_parties(None, None), None);
        assert_eq!(join_parties(Some(""), Some("")), None);
    }

    #[test]
    fn split_tags_on_all_delimiters() {
        assert_eq!(
            split_tags("Hiking, cooking & travel\nYoga,,  "),
            vec!["Hiking", "cooking", "travel", "Yoga"]
        );
        assert!(split_tags("  ").is_empty());
    }

    proptest! {
        #[test]
        fn prop_split_tags_are_trimmed_and_nonempty(raw in "[a-z ,&\n]{0,40}") {
            for tag in split_tags(&raw) {
                prop_assert!(!tag.is_empty());
                prop_assert_eq!(tag.trim(), tag.as_str());
                prop_assert!(!tag.contains([',', '&', '\n']));
            }
        }

        #[test]
        fn prop_join_with_absent_is_identity(part in "[A-Za-z]{1,10}") {
            prop_assert_eq!(join_parties(Some(part.as_str()), None), Some(part.clone()));
            prop_assert_eq!(join_parties(None, Some(part.as_str())), Some(part));
        }
    }
}
