//! Timestamp parsing for the service's date fields.
//!
//! Values arrive either as RFC 3339 or as offset-less ISO 8601 with up to nine
//! fractional digits. Offset-less values are taken as UTC.

use serde::{de, Deserialize, Deserializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub fn parse(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    let with_fraction =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
    let whole_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

    PrimitiveDateTime::parse(raw, with_fraction)
        .or_else(|_| PrimitiveDateTime::parse(raw, whole_seconds))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Deserializes an optional timestamp; `null` and empty strings become `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(parse("2026-01-05T09:30:00Z"), Some(datetime!(2026-01-05 09:30 UTC)));
        assert_eq!(
            parse("2026-01-05T11:30:00+02:00"),
            Some(datetime!(2026-01-05 09:30 UTC))
        );
        assert_eq!(parse("2026-01-05T09:30:00"), Some(datetime!(2026-01-05 09:30 UTC)));
        assert_eq!(
            parse("2026-01-05T09:30:00.1234567"),
            Some(datetime!(2026-01-05 09:30:00.1234567 UTC))
        );
        assert_eq!(parse("  "), None);
        assert_eq!(parse("tomorrow"), None);
    }
}
