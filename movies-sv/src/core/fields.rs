//! Deserializers for request fields that need more than serde's defaults.

use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer};

/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp, keeping
/// only the (UTC) date part of the latter.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_utc().date()))
}

pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|r| parse_date(&r).map_err(de::Error::custom))
        .transpose()
}

/// Use with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`.
pub fn patch<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn patch_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
    where
        D: Deserializer<'de>,
{
    date(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_date("2020-01-01").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(parse_date(" 1999-12-31 ").unwrap(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
    }

    #[test]
    fn parses_timestamps_as_utc_dates() {
        assert_eq!(parse_date("2020-01-01T00:00:00.000Z").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(parse_date("2020-01-01T22:30:00-03:00").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("next tuesday").is_err());
        assert!(parse_date("2020-13-01").is_err());
    }
}
