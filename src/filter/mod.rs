//! Listing filter engine.
//!
//! Pure functions over an in-memory snapshot. Every predicate is evaluated
//! per record and the results are AND-ed, so filters compose in any order
//! and the input order is preserved.
pub mod property;
pub mod requirement;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use property::{PropertyCriteria, filter_properties};
pub use requirement::{RequirementCriteria, filter_requirements};
pub use stats::{DashboardStats, dashboard_stats};

/// Bedroom/bathroom constraint: an exact count or the `"4+"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CountFilter {
    Exactly(i32),
    AtLeast(i32),
}

impl CountFilter {
    pub fn matches(&self, value: Option<i32>) -> bool {
        match (self, value) {
            (Self::Exactly(n), Some(v)) => v == *n,
            (Self::AtLeast(n), Some(v)) => v >= *n,
            (_, None) => false,
        }
    }
}

impl FromStr for CountFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid count: {s}"))
        };
        match s.strip_suffix('+') {
            Some(n) => parse(n).map(Self::AtLeast),
            None => parse(s).map(Self::Exactly),
        }
    }
}

impl fmt::Display for CountFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "{n}+"),
        }
    }
}

impl TryFrom<String> for CountFilter {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CountFilter> for String {
    fn from(c: CountFilter) -> Self {
        c.to_string()
    }
}

/// Inclusive bounds; a missing value fails any bound that is set.
pub(crate) fn within(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(v) = value else {
        return false;
    };
    min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m)
}

/// Lower-cased, trimmed query; `None` when there is nothing to search for.
pub(crate) fn normalize_query(query: Option<&str>) -> Option<String> {
    query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty())
}

pub(crate) fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_filter_parses_sentinel() {
        assert_eq!("4+".parse::<CountFilter>(), Ok(CountFilter::AtLeast(4)));
        assert_eq!(" 2 ".parse::<CountFilter>(), Ok(CountFilter::Exactly(2)));
        assert!("many".parse::<CountFilter>().is_err());
        assert_eq!(CountFilter::AtLeast(4).to_string(), "4+");
    }

    #[test]
    fn count_filter_matching() {
        assert!(CountFilter::AtLeast(4).matches(Some(6)));
        assert!(!CountFilter::AtLeast(4).matches(Some(3)));
        assert!(CountFilter::Exactly(3).matches(Some(3)));
        assert!(!CountFilter::Exactly(3).matches(None));
    }

    #[test]
    fn within_bounds() {
        assert!(within(None, None, None));
        assert!(!within(None, Some(1.0), None));
        assert!(within(Some(5.0), Some(5.0), Some(5.0)));
        assert!(!within(Some(4.9), Some(5.0), None));
        assert!(!within(Some(10.1), None, Some(10.0)));
    }

    #[test]
    fn query_normalization() {
        assert_eq!(normalize_query(Some("  Sea View ")), Some("sea view".into()));
        assert_eq!(normalize_query(Some("   ")), None);
        assert_eq!(normalize_query(None), None);
    }
}
