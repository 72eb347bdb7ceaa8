use serde::Deserialize;

use crate::config::PaginationConfig;
use crate::error::ApiError;

/// Raw `?offset=&limit=&search=` query string values, unparsed
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Search term, ignoring blank input
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Bounds applied to a listing route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 1000,
        }
    }
}

impl PaginationPolicy {
    /// Company, user and job listings
    pub fn resources(config: &PaginationConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    /// Job application listings
    pub fn applications(config: &PaginationConfig) -> Self {
        Self {
            default_limit: config.application_default_limit,
            max_limit: config.max_limit,
        }
    }
}

/// A validated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationWindow {
    pub offset: i64,
    pub limit: i64,
}

/// Per-field outcome. Either field may fail while the other succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationResult {
    pub offset: Result<i64, ApiError>,
    pub limit: Result<i64, ApiError>,
}

impl PaginationResult {
    /// Collapse into a window, reporting the offset error first
    pub fn into_window(self) -> Result<PaginationWindow, ApiError> {
        Ok(PaginationWindow {
            offset: self.offset?,
            limit: self.limit?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Offset,
    Limit,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Offset => "offset",
            Field::Limit => "limit",
        }
    }
}

/// Validate `offset` and `limit` independently against `policy`.
///
/// Absent (or empty) values fall back to the defaults: offset 0, limit
/// `policy.default_limit`.
pub fn validate(
    raw_offset: Option<&str>,
    raw_limit: Option<&str>,
    policy: PaginationPolicy,
) -> PaginationResult {
    PaginationResult {
        offset: validate_field(raw_offset, Field::Offset, 0, 0, policy.max_limit),
        limit: validate_field(raw_limit, Field::Limit, policy.default_limit, 1, policy.max_limit),
    }
}

fn validate_field(
    raw: Option<&str>,
    field: Field,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };

    let name = field.name();
    let num = parse_integer(raw).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Invalid {name}: '{raw}', {name} needs to be an integer."
        ))
    })?;

    // Offset has no upper bound of its own
    let upper = match field {
        Field::Offset => i64::MAX,
        Field::Limit => max,
    };
    if num < min || num > upper {
        let bound = match field {
            Field::Offset => format!("{num} is out of range for {name} -- it should be at least {min}."),
            Field::Limit => format!(
                "{num} is out of range for {name} -- it should be between {min} and {max}."
            ),
        };
        return Err(ApiError::bad_request(bound));
    }

    Ok(num)
}

/// Accept plain integers and integral decimals such as "5.0"
fn parse_integer(raw: &str) -> Option<i64> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn policy() -> PaginationPolicy {
        PaginationPolicy::default()
    }

    #[test]
    fn absent_values_use_defaults() {
        let window = validate(None, None, policy()).into_window().unwrap();
        assert_eq!(window, PaginationWindow { offset: 0, limit: 50 });
    }

    #[test]
    fn route_policy_changes_default_limit() {
        let config = PaginationConfig {
            max_limit: 1000,
            default_limit: 1000,
            application_default_limit: 50,
        };
        let window = validate(None, None, PaginationPolicy::resources(&config))
            .into_window()
            .unwrap();
        assert_eq!(window.limit, 1000);
        let window = validate(None, None, PaginationPolicy::applications(&config))
            .into_window()
            .unwrap();
        assert_eq!(window.limit, 50);
    }

    #[test]
    fn parses_valid_values() {
        let result = validate(Some("5"), Some("6"), policy());
        assert_eq!(result.offset, Ok(5));
        assert_eq!(result.limit, Ok(6));
    }

    #[test]
    fn non_numeric_offset_does_not_affect_limit() {
        let result = validate(Some("foo"), None, policy());
        let err = result.offset.clone().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.detail, "Invalid offset: 'foo', offset needs to be an integer.");
        assert_eq!(result.limit, Ok(50));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let result = validate(None, Some("0"), policy());
        assert!(result.limit.is_err());
        assert_eq!(result.offset, Ok(0));
    }

    #[test]
    fn negative_limit_is_rejected() {
        let err = validate(None, Some("-1"), policy()).limit.unwrap_err();
        assert_eq!(
            err.detail,
            "-1 is out of range for limit -- it should be between 1 and 1000."
        );
    }

    #[test]
    fn limit_above_max_is_rejected() {
        assert!(validate(None, Some("1001"), policy()).limit.is_err());
        assert_eq!(validate(None, Some("1000"), policy()).limit, Ok(1000));
    }

    #[test]
    fn negative_offset_is_rejected() {
        assert!(validate(Some("-3"), None, policy()).offset.is_err());
    }

    #[test]
    fn fractional_values_are_not_integers() {
        assert!(validate(None, Some("2.5"), policy()).limit.is_err());
        assert_eq!(validate(Some("5.0"), None, policy()).offset, Ok(5));
    }

    #[test]
    fn offset_error_is_reported_before_limit_error() {
        let err = validate(Some("x"), Some("y"), policy()).into_window().unwrap_err();
        assert!(err.detail.starts_with("Invalid offset"));
    }

    #[test]
    fn validation_is_deterministic() {
        assert_eq!(
            validate(Some("3"), Some("abc"), policy()),
            validate(Some("3"), Some("abc"), policy())
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search(), None);
    }
}
