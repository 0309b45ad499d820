//! Text Normalizer (§4.2): canonicalizes token text and target values before
//! alignment, and supplies the junk predicate used to keep punctuation noise
//! from depressing the fuzzy matcher's ratios.

/// Thin space, `U+2009`.
pub const THIN_SPACE: char = '\u{2009}';
/// En dash, `U+2013`.
pub const EN_DASH: char = '\u{2013}';
/// Em dash, `U+2014`.
pub const EM_DASH: char = '\u{2014}';

/// Folds case and equates semantically-equivalent whitespace/punctuation:
/// thin space becomes an ordinary space, en-dash and em-dash each become
/// `-`. Consecutive dashes (of any mix) are preserved as consecutive `-`.
/// Everything else passes through unchanged.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            THIN_SPACE => ' ',
            EN_DASH | EM_DASH => '-',
            other => other.to_lowercase().next().unwrap_or(other),
        })
        .collect()
}

/// Junk predicate for use with [`crate::fuzzy_match`]: ASCII punctuation
/// (notably `.` and `,`) and whitespace are treated as junk, so trailing or
/// mid-sequence punctuation does not depress alignment ratios.
///
/// `s` is the string the index is taken against (already normalized);
/// `index` is a *char* offset, matching the positions [`crate::FuzzyMatchResult`]
/// index ranges are expressed in.
#[must_use]
pub fn is_junk(s: &str, index: usize) -> bool {
    s.chars()
        .nth(index)
        .is_some_and(|c| c.is_ascii_punctuation() || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case() {
        assert_eq!(normalize("This Is Matching"), "this is matching");
    }

    #[test]
    fn thin_space_becomes_space() {
        assert_eq!(normalize("a\u{2009}b"), "a b");
    }

    #[test]
    fn dashes_become_hyphen_and_runs_are_preserved() {
        assert_eq!(normalize("a\u{2013}\u{2014}b"), "a--b");
        assert_eq!(normalize("a\u{2013} \u{2014}b"), "a- -b");
    }

    #[test]
    fn is_junk_flags_punctuation_and_whitespace() {
        assert!(is_junk("a.b", 1));
        assert!(is_junk("a b", 1));
        assert!(!is_junk("a.b", 0));
        assert!(!is_junk("a.b", 2));
    }
}
