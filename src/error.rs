//! Error taxonomy (§7). Matching-domain outcomes (`NoMatch`, `AlreadyTagged`,
//! `MalformedTarget`) are local and recoverable — they never reach this
//! enum, they are folded into [`crate::AnnotationStats`] and logged.  Only
//! genuinely structural failures propagate out of
//! [`crate::MatchingAnnotator::annotate`].

use thiserror::Error;

/// Structural failures that abort `annotate` entirely.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    /// A line or token could not be resolved against the haystack index
    /// (e.g. its character span falls outside the haystack it was built
    /// from).
    #[error("structural error: {0}")]
    StructuralError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_error_displays_its_reason() {
        let err = AnnotationError::StructuralError("line 3 out of bounds".to_string());
        assert_eq!(err.to_string(), "structural error: line 3 out of bounds");
    }
}
