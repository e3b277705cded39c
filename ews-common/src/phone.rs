//! Ghana mobile number validation and normalization
//!
//! The gateway only accepts numbers in international form without a plus
//! sign (`233XXXXXXXXX`). Operators type numbers however they like, so every
//! recipient passes through [`normalize`] before delivery.

use serde::Serialize;
use std::collections::HashSet;

/// Country calling code for Ghana
pub const COUNTRY_CODE: &str = "233";

/// Two-digit mobile operator prefixes that follow the country code or trunk zero
pub const OPERATOR_PREFIXES: [&str; 14] = [
    "20", "23", "24", "25", "26", "27", "28", "29", "50", "54", "55", "56", "57", "59",
];

/// Strip everything except ASCII digits
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a raw phone string to `233XXXXXXXXX`
///
/// Accepted shapes (after stripping non-digits):
/// - 12 digits starting with `233`
/// - 10 digits starting with a trunk `0`
/// - 9 digits (bare local number)
///
/// In every shape the two digits after the country code or trunk zero must be
/// a known operator prefix. Returns `None` for anything else.
pub fn normalize(raw: &str) -> Option<String> {
    let digits = digits_only(raw);

    // A leading 233 always means international form, whatever the length
    let local = if let Some(rest) = digits.strip_prefix(COUNTRY_CODE) {
        if digits.len() != 12 {
            return None;
        }
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        if digits.len() != 10 {
            return None;
        }
        rest
    } else if digits.len() == 9 {
        digits.as_str()
    } else {
        return None;
    };

    if !OPERATOR_PREFIXES.contains(&&local[..2]) {
        return None;
    }

    Some(format!("{}{}", COUNTRY_CODE, local))
}

/// Check whether a raw phone string is a deliverable Ghana mobile number
pub fn is_valid_ghana_number(raw: &str) -> bool {
    normalize(raw).is_some()
}

/// Recipients split into deliverable and rejected numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionedNumbers {
    /// Normalized numbers, de-duplicated, in first-seen order
    pub valid: Vec<String>,
    /// Rejected inputs exactly as supplied
    pub invalid: Vec<String>,
}

/// Split raw recipients into normalized valid numbers and rejected originals
///
/// Two inputs that normalize to the same number (`0241234567` and
/// `+233 24 123 4567`) are delivered once.
pub fn partition_numbers<S: AsRef<str>>(raw: &[S]) -> PartitionedNumbers {
    let mut seen = HashSet::new();
    let mut result = PartitionedNumbers::default();

    for phone in raw {
        let phone = phone.as_ref();
        match normalize(phone) {
            Some(number) => {
                if seen.insert(number.clone()) {
                    result.valid.push(number);
                }
            }
            None => result.invalid.push(phone.to_string()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_zero_form_normalizes() {
        assert_eq!(normalize("0241234567").as_deref(), Some("233241234567"));
        assert!(is_valid_ghana_number("0241234567"));
    }

    #[test]
    fn test_international_form_unchanged() {
        assert_eq!(normalize("233241234567").as_deref(), Some("233241234567"));
        assert!(is_valid_ghana_number("233241234567"));
    }

    #[test]
    fn test_bare_local_form_gets_country_code() {
        assert_eq!(normalize("241234567").as_deref(), Some("233241234567"));
    }

    #[test]
    fn test_unknown_operator_rejected() {
        assert!(!is_valid_ghana_number("0991234567"));
        assert!(!is_valid_ghana_number("233991234567"));
        assert!(!is_valid_ghana_number("991234567"));
    }

    #[test]
    fn test_formatting_characters_stripped() {
        assert_eq!(normalize("+233 (24) 123-4567").as_deref(), Some("233241234567"));
        assert_eq!(normalize("024 123 4567").as_deref(), Some("233241234567"));
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        assert!(normalize("").is_none());
        assert!(normalize("02412345678").is_none());
        assert!(normalize("23324123456").is_none());
        assert!(normalize("024123456").is_none());
        assert!(normalize("24123456").is_none());
    }

    #[test]
    fn test_leading_country_code_wins_over_local_shape() {
        // Nine digits that happen to start with 233 are not a bare local number
        assert!(normalize("233456789").is_none());
    }

    #[test]
    fn test_every_operator_prefix_accepted() {
        for prefix in OPERATOR_PREFIXES {
            let raw = format!("0{}1234567", prefix);
            assert_eq!(normalize(&raw), Some(format!("233{}1234567", prefix)));
        }
    }

    #[test]
    fn test_partition_reports_invalid_and_dedupes_valid() {
        let raw = ["0241234567", "bogus", "+233241234567", "0551112222", "0991234567"];
        let parts = partition_numbers(&raw);

        assert_eq!(parts.valid, vec!["233241234567", "233551112222"]);
        assert_eq!(parts.invalid, vec!["bogus", "0991234567"]);
    }
}
