//! Utility functions and helpers for keypage
//!
//! This module provides small helpers shared by the token codec and the CLI:
//! - Number parsing for client- and user-supplied integers
//! - String helpers for log output

/// Number utilities
pub mod number {
    /// Parse a non-negative integer, optionally clamped
    ///
    /// # Arguments
    /// * `text` - Decimal text to parse
    /// * `strict` - Reject zero as well as negative numbers
    /// * `cutoff` - Upper bound the result is clamped to
    ///
    /// # Returns
    /// * `Option<u64>` - Parsed value, or `None` if `text` is not an
    ///   acceptable integer
    pub fn parse_positive_int(text: &str, strict: bool, cutoff: Option<u64>) -> Option<u64> {
        let value: u64 = text.parse().ok()?;

        if strict && value == 0 {
            return None;
        }

        Some(match cutoff {
            Some(cutoff) => value.min(cutoff),
            None => value,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_positive_integer() {
            assert_eq!(parse_positive_int("5", false, None), Some(5));
            assert_eq!(parse_positive_int("0", false, None), Some(0));
            assert_eq!(parse_positive_int("100", false, None), Some(100));
        }

        #[test]
        fn test_strict_mode_rejects_zero() {
            assert_eq!(parse_positive_int("0", true, None), None);
            assert_eq!(parse_positive_int("1", true, None), Some(1));
        }

        #[test]
        fn test_negative_integer_rejected() {
            assert_eq!(parse_positive_int("-1", false, None), None);
            assert_eq!(parse_positive_int("-100", false, None), None);
        }

        #[test]
        fn test_cutoff() {
            assert_eq!(parse_positive_int("1000", false, Some(500)), Some(500));
            assert_eq!(parse_positive_int("100", false, Some(500)), Some(100));
            assert_eq!(parse_positive_int("500", false, Some(500)), Some(500));
        }

        #[test]
        fn test_invalid_string_rejected() {
            assert_eq!(parse_positive_int("abc", false, None), None);
            assert_eq!(parse_positive_int("", false, None), None);
            assert_eq!(parse_positive_int("99999999999999999999999", false, None), None);
        }
    }
}

/// String utilities
pub mod string {
    /// Truncate string to maximum length
    ///
    /// # Arguments
    /// * `s` - String to truncate
    /// * `max_len` - Maximum length in characters
    ///
    /// # Returns
    /// * `String` - Truncated string with ellipsis if needed
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_truncate() {
            assert_eq!(truncate("short", 10), "short");
            assert_eq!(truncate("a longer string", 8), "a lon...");
            assert_eq!(truncate("ééééé", 4), "é...");
        }
    }
}
