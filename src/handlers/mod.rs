pub mod amazon;
pub mod auth;
pub mod health;
pub mod noon;
pub mod upload;

use crate::MarketError;
use crate::service::sheet::parse_query_datetime;
use chrono::{DateTime, Utc};

/// Treat `?x=` the same as an absent parameter.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an optional date filter; a value that is present but unreadable is a
/// client error rather than a silently dropped filter.
pub(crate) fn date_param(
    name: &str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, MarketError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => parse_query_datetime(&raw).map(Some).ok_or_else(|| {
            MarketError::InvalidParameter(format!("{name}: `{raw}` is not a valid date"))
        }),
    }
}

/// Split `a,b,,c` into trimmed, non-empty parts.
pub(crate) fn split_csv(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_params_are_absent() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Shipped ".to_string())), Some("Shipped".to_string()));
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(date_param("CreatedAfter", Some("2024-01-01".to_string()))
            .unwrap()
            .is_some());
        assert!(date_param("CreatedAfter", None).unwrap().is_none());
        assert!(matches!(
            date_param("CreatedAfter", Some("last week".to_string())),
            Err(MarketError::InvalidParameter(_))
        ));
    }

    #[test]
    fn csv_skips_blanks() {
        let parts: Vec<String> = split_csv("A, B,,C ").collect();
        assert_eq!(parts, ["A", "B", "C"]);
    }
}
