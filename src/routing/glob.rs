//! Wildcard rule matching for function names.
//!
//! # Design Decisions
//! - `*` is only meaningful as the first and/or last character of a rule
//! - No regex, so matching stays linear in the candidate length
//! - A rule consisting of a single `*` is treated as a suffix rule with an
//!   empty remainder, which matches everything

/// Returns true if `candidate` matches `rule`.
///
/// Supported forms, checked in order:
/// - `hello` exact match
/// - `*ell*` substring containment
/// - `*llo` suffix match
/// - `hel*` prefix match
///
/// `*` in the middle of a rule has no special meaning.
pub fn match_glob(candidate: &str, rule: &str) -> bool {
    if candidate == rule {
        return true;
    }

    match (rule.strip_prefix('*'), rule.strip_suffix('*')) {
        (Some(_), Some(_)) if rule.len() >= 2 => candidate.contains(&rule[1..rule.len() - 1]),
        (Some(suffix), _) => candidate.ends_with(suffix),
        (None, Some(prefix)) => candidate.starts_with(prefix),
        (None, None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_glob_table() {
        let cases = [
            ("hello", "hello", true),
            ("hello", "ello", false),
            ("hello", "*ello", true),
            ("hello", "hel*", true),
            ("hello", "*ell*", true),
            ("hello", "*xyz*", false),
            ("hello", "*hel", false),
            ("hello", "llo*", false),
            ("hello", "h*o", false),
            ("h*o", "h*o", true),
            ("anything", "*", true),
            ("anything", "**", true),
        ];

        for (i, (candidate, rule, expected)) in cases.iter().enumerate() {
            assert_eq!(
                match_glob(candidate, rule),
                *expected,
                "case {}: candidate={} rule={}",
                i,
                candidate,
                rule
            );
        }
    }

    #[test]
    fn test_infix_rule_is_containment_not_affix() {
        assert!(match_glob("test-cats-here", "*cats*"));
        assert!(match_glob("cats", "*cats*"));
        assert!(!match_glob("cat", "*cats*"));
    }
}
