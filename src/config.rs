//! Numeric thresholds the Matching Annotator's accept/reject policy and
//! bonding/multi-line extension logic are parameterized over (§4.3,
//! §9 open questions). Gathered here instead of scattered as magic numbers,
//! with `Default` pinning the values this implementation settled on.

/// Chained `#[must_use]` setters over the annotator's tunable thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatorConfig {
    pub(crate) short_target_token_threshold: usize,
    pub(crate) t_short: f32,
    pub(crate) t_gap: f32,
    pub(crate) t_b: f32,
    pub(crate) multi_line_lookahead: usize,
    pub(crate) bonding_window_lines: usize,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            short_target_token_threshold: 3,
            t_short: 0.9,
            t_gap: 0.8,
            t_b: 0.5,
            multi_line_lookahead: 2,
            bonding_window_lines: 2,
        }
    }
}

impl AnnotatorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A target of at most this many normalized tokens uses the
    /// near-exact "short target" acceptance regime rather than the
    /// gap/coverage-based "long target" one.
    #[must_use]
    pub fn short_target_token_threshold(mut self, tokens: usize) -> Self {
        self.short_target_token_threshold = tokens;
        self
    }

    /// Minimum `ratio()` for short-target acceptance.
    #[must_use]
    pub fn t_short(mut self, value: f32) -> Self {
        self.t_short = value;
        self
    }

    /// Minimum `b_gap_ratio()` for long-target acceptance.
    #[must_use]
    pub fn t_gap(mut self, value: f32) -> Self {
        self.t_gap = value;
        self
    }

    /// Minimum `b_ratio()` for long-target acceptance.
    #[must_use]
    pub fn t_b(mut self, value: f32) -> Self {
        self.t_b = value;
        self
    }

    /// Bounded number of trailing lines glued onto a candidate window
    /// during multi-line extension.
    #[must_use]
    pub fn multi_line_lookahead(mut self, lines: usize) -> Self {
        self.multi_line_lookahead = lines;
        self
    }

    /// Accepted line-distance window for a bonded acceptance to anchor
    /// subsequent bonded same-name targets. The source tests exercise
    /// rejection at distance 10; this default sits well inside that bound.
    #[must_use]
    pub fn bonding_window_lines(mut self, lines: usize) -> Self {
        self.bonding_window_lines = lines;
        self
    }
}
