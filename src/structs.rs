use std::fmt;

/// A matching block `(i, j, n)`: `a[i..i+n] == b[j..j+n]` (after normalization).
pub type MatchingBlock = (usize, usize, usize);

/// Position-indexed predicate marking characters that should not depress
/// alignment-quality metrics (typically punctuation runs and stray whitespace).
///
/// Modeled as a capability object rather than an implicit closure so a
/// [`FuzzyMatchResult`] stays inspectable and splittable without recomputing
/// which positions were junk.
pub type JunkPredicate = std::sync::Arc<dyn Fn(&str, usize) -> bool + Send + Sync>;

/// Immutable alignment between two strings, produced by [`crate::fuzzy_match`].
///
/// `matching_blocks` is ordered, strictly increasing in both `i` and `j`, and
/// non-overlapping on both sides. All derived metrics (`ratio`, `a_ratio`, …)
/// are pure functions of `a`, `b`, `matching_blocks` and `isjunk`.
#[derive(Clone)]
pub struct FuzzyMatchResult {
    pub(crate) a: String,
    pub(crate) b: String,
    pub(crate) matching_blocks: Vec<MatchingBlock>,
    pub(crate) isjunk: Option<JunkPredicate>,
}

impl fmt::Debug for FuzzyMatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyMatchResult")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("matching_blocks", &self.matching_blocks)
            .finish()
    }
}

impl PartialEq for FuzzyMatchResult {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.b == other.b && self.matching_blocks == other.matching_blocks
    }
}

/// An opaque unit of text inside a [`Line`]. Owned by the document; the tag
/// is the only mutable field, and is never overwritten once set (see
/// [`crate::MatchingAnnotator::annotate`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub(crate) text: String,
    pub(crate) tag: Option<String>,
}

impl Token {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    /// Construct a token that already carries a tag, e.g. pre-labeled by an
    /// earlier pipeline stage. The annotator will never override this.
    #[must_use]
    pub fn tagged(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: Some(tag.into()),
        }
    }
}

/// An ordered sequence of [`Token`]s. Line breaks are significant for
/// locality (bonding) but do not affect string alignment once tokens are
/// concatenated into the haystack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub(crate) tokens: Vec<Token>,
}

impl Line {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: texts.into_iter().map(Token::new).collect(),
        }
    }
}

/// An ordered sequence of [`Line`]s: the reference implementation of the
/// document a [`crate::MatchingAnnotator`] operates on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub(crate) lines: Vec<Line>,
}

impl Document {
    #[must_use]
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }
}
