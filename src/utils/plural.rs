//! Pluralization utilities.

/// Return "s" suffix for plural counts
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Format count with noun, handling pluralization
///
/// - `plural_count(0, "row")` -> `"0 rows"`
/// - `plural_count(1, "row")` -> `"1 row"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, plural_s(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "row"), "0 rows");
        assert_eq!(plural_count(1, "row"), "1 row");
        assert_eq!(plural_count(12, "url"), "12 urls");
    }
}
