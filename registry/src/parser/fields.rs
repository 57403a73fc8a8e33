//! Cell-level extractors: ranges, integers and country codes.

use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

use iban_registry_core::Range;

// SAFETY: These regexes are compile-time constants and are validated by tests.
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<from>[0-9]+)\s*-\s*(?P<to>[0-9]+)").expect("static regex must compile")
});
static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("static regex must compile"));
static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2}").expect("static regex must compile"));

/// Parses the first `from-to` expression in `raw` into a half-open range.
///
/// The published `from` is 1-based and inclusive, `to` is 1-based and
/// inclusive, which makes it the 0-based exclusive end as is. Returns
/// `None` when no expression is present, or when the expression cannot
/// form a range (`from` of zero, `to` before `from`).
///
/// # Examples
///
/// ```
/// use iban_registry_core::Range;
/// use iban_registry_parser::parser::parse_range;
///
/// assert_eq!(parse_range("5-30"), Some(Range::new(4, 30)));
/// assert_eq!(parse_range("positions 1 - 4 (bank)"), Some(Range::new(0, 4)));
/// assert_eq!(parse_range("N/A"), None);
/// ```
pub fn parse_range(raw: &str) -> Option<Range> {
    let caps = RANGE_RE.captures(raw)?;
    let from: usize = caps["from"].parse().ok()?;
    let to: usize = caps["to"].parse().ok()?;

    if from == 0 || to < from - 1 {
        warn!(raw, from, to, "ignoring position expression that forms no range");
        return None;
    }

    Some(Range::new(from - 1, to))
}

/// Extracts the first run of digits in `raw` as an integer.
///
/// # Examples
///
/// ```
/// use iban_registry_parser::parser::parse_int;
///
/// assert_eq!(parse_int("30!n"), Some(30));
/// assert_eq!(parse_int("24"), Some(24));
/// assert_eq!(parse_int("n/a"), None);
/// ```
pub fn parse_int(raw: &str) -> Option<usize> {
    INT_RE.find(raw)?.as_str().parse().ok()
}

/// Returns the first two-letter uppercase code in `raw`.
pub fn first_country_code(raw: &str) -> Option<&str> {
    COUNTRY_CODE_RE.find(raw).map(|m| m.as_str())
}

/// Returns every two-letter uppercase code in `raw`, in order.
pub fn all_country_codes(raw: &str) -> Vec<String> {
    COUNTRY_CODE_RE
        .find_iter(raw)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_shifts_start_only() {
        assert_eq!(parse_range("1-4"), Some(Range::new(0, 4)));
        assert_eq!(parse_range("5-9"), Some(Range::new(4, 9)));
        assert_eq!(parse_range("11 - 16"), Some(Range::new(10, 16)));
    }

    #[test]
    fn test_parse_range_uses_first_expression() {
        assert_eq!(parse_range("1-3 and 4-8"), Some(Range::new(0, 3)));
    }

    #[test]
    fn test_parse_range_absent_patterns() {
        assert_eq!(parse_range(""), None);
        assert_eq!(parse_range("N/A"), None);
        assert_eq!(parse_range("4"), None);
        assert_eq!(parse_range("-4"), None);
    }

    #[test]
    fn test_parse_range_single_character() {
        assert_eq!(parse_range("3-3"), Some(Range::new(2, 3)));
    }

    #[test]
    fn test_parse_range_rejects_impossible_ranges() {
        assert_eq!(parse_range("0-4"), None);
        assert_eq!(parse_range("9-5"), None);
    }

    #[test]
    fn test_parse_range_results_are_ordered() {
        for raw in ["1-4", "5-9", "2-2", "10-30", "x 7 - 12 y", "3-2", "9-1", "0-0"] {
            if let Some(range) = parse_range(raw) {
                assert!(range.end >= range.start, "{raw} produced {range}");
            }
        }
    }

    #[test]
    fn test_parse_int_first_digit_run() {
        assert_eq!(parse_int("30!n"), Some(30));
        assert_eq!(parse_int("length: 18 (fixed), 22"), Some(18));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("99999999999999999999999999"), None);
    }

    #[test]
    fn test_country_code_extraction() {
        assert_eq!(first_country_code("AD"), Some("AD"));
        assert_eq!(first_country_code("Andorra"), None);
        assert_eq!(first_country_code(" FR "), Some("FR"));
        assert_eq!(
            all_country_codes("French Guyana (GF), Guadeloupe (GP), MC"),
            vec!["GF", "GP", "MC"]
        );
        assert!(all_country_codes("N/A").is_empty());
    }
}
