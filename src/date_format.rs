//! Serializes a [Date] as an ISO 8601 calendar date, e.g. "2025-01-31".
//!
//! Use with `#[serde(with = "crate::date_format")]`.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Date::parse(s.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod date_format_tests {
    use serde::{Deserialize, Serialize};
    use time::{Date, macros::date};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dated {
        #[serde(with = "crate::date_format")]
        date: Date,
    }

    #[test]
    fn writes_iso_date() {
        let json = serde_json::to_string(&Dated {
            date: date!(2025 - 03 - 07),
        })
        .unwrap();

        assert_eq!(json, r#"{"date":"2025-03-07"}"#);
    }

    #[test]
    fn reads_iso_date() {
        let dated: Dated = serde_json::from_str(r#"{"date":"2024-02-29"}"#).unwrap();

        assert_eq!(dated.date, date!(2024 - 02 - 29));
    }

    #[test]
    fn rejects_impossible_date() {
        assert!(serde_json::from_str::<Dated>(r#"{"date":"2025-02-30"}"#).is_err());
        assert!(serde_json::from_str::<Dated>(r#"{"date":"07/03/2025"}"#).is_err());
    }
}
