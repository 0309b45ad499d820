//! Matching Annotator (§4.3): drives alignment of each target annotation
//! against the document's token stream, applies the accept/reject policy,
//! and stamps tags. This is the largest module in the crate — the haystack
//! index, the short/long acceptance regimes, multi-line extension, bonding
//! groups and the no-override rule all live here.

use crate::normalize::{is_junk, normalize};
use crate::{
    AnnotationError, AnnotatorConfig, DocumentLike, JunkPredicate, LineLike, TargetAnnotation,
    TokenLike,
};
use crate::fuzzy::fuzzy_match;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One token's slot inside the flattened haystack.
#[derive(Debug, Clone, Copy)]
struct HaystackToken {
    line_idx: usize,
    token_idx: usize,
    start: usize,
    end: usize,
}

/// The document flattened into a single normalized character stream, with
/// an index back to (line, token) for any character range, and per-line
/// token-index boundaries so multi-line extension can glue whole lines on.
struct Haystack {
    chars: Vec<char>,
    tokens: Vec<HaystackToken>,
    line_ranges: Vec<(usize, usize)>,
}

impl Haystack {
    fn build<D: DocumentLike>(document: &D) -> Self {
        let mut text = String::new();
        let mut tokens = Vec::new();
        let mut line_ranges = Vec::new();
        let mut running_len = 0usize;

        for (line_idx, line) in document.lines().iter().enumerate() {
            let line_token_start = tokens.len();
            for (token_idx, token) in line.tokens().iter().enumerate() {
                if running_len > 0 {
                    text.push(' ');
                    running_len += 1;
                }
                let normalized = normalize(token.text());
                let token_len = normalized.chars().count();
                text.push_str(&normalized);
                let start = running_len;
                running_len += token_len;
                tokens.push(HaystackToken {
                    line_idx,
                    token_idx,
                    start,
                    end: running_len,
                });
            }
            line_ranges.push((line_token_start, tokens.len()));
        }

        Haystack {
            chars: text.chars().collect(),
            tokens,
            line_ranges,
        }
    }

    fn token_text(&self, idx: usize) -> String {
        let t = self.tokens[idx];
        self.chars[t.start..t.end].iter().collect()
    }

    fn window_text(&self, start_tok: usize, end_tok: usize) -> (String, usize) {
        let abs_start = self.tokens[start_tok].start;
        let abs_end = self.tokens[end_tok - 1].end;
        (self.chars[abs_start..abs_end].iter().collect(), abs_start)
    }

    fn line_end_token_idx(&self, start_tok: usize, extra_lines: usize) -> usize {
        let line_idx = self.tokens[start_tok].line_idx;
        let target_line = (line_idx + extra_lines).min(self.line_ranges.len() - 1);
        self.line_ranges[target_line].1
    }

    /// Tokens whose char span is fully contained in `[start, end)`, used to
    /// pick which tokens actually get tagged (partial intra-token matches
    /// never tag the token).
    fn tokens_fully_contained(&self, start: usize, end: usize) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.start >= start && t.end <= end)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// A char position is a clean word boundary if it does not fall
    /// strictly inside some token's span (landing on a separator, or on a
    /// token's own start/end, is fine).
    fn is_boundary(&self, pos: usize) -> bool {
        !self.tokens.iter().any(|t| pos > t.start && pos < t.end)
    }

    /// Like [`Self::tokens_fully_contained`], but additionally requires both
    /// ends of the range to land on clean word boundaries (required for the
    /// short-target acceptance regime, so a match never clips a token).
    fn boundary_clean_tokens(&self, start: usize, end: usize) -> Option<Vec<usize>> {
        if !self.is_boundary(start) || !self.is_boundary(end) {
            return None;
        }
        let covered = self.tokens_fully_contained(start, end);
        if covered.is_empty() { None } else { Some(covered) }
    }
}

fn overlaps(occupied: &BTreeMap<usize, usize>, start: usize, end: usize) -> bool {
    occupied
        .range(..start)
        .next_back()
        .is_some_and(|(_, &occ_end)| occ_end > start)
        || occupied.range(start..end).next().is_some()
}

struct Candidate {
    token_range: (usize, usize),
    abs_range: (usize, usize),
    b_gap_ratio: f32,
    match_count: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Regime {
    Short,
    Long,
}

fn regime_for(token_count: usize, config: &AnnotatorConfig) -> Regime {
    if token_count <= config.short_target_token_threshold {
        Regime::Short
    } else {
        Regime::Long
    }
}

/// Finds the best-scoring acceptable alignment of `probe_normalized`
/// against `haystack`, honoring `occupied` exclusions. Returns `None` when
/// no candidate clears the regime's acceptance thresholds (`NoMatch`).
fn find_best_match(
    haystack: &Haystack,
    probe_normalized: &str,
    config: &AnnotatorConfig,
    occupied: &BTreeMap<usize, usize>,
    junk: &JunkPredicate,
) -> Option<Candidate> {
    let target_token_count = probe_normalized.split_whitespace().count().max(1);
    let regime = regime_for(target_token_count, config);
    let first_word = probe_normalized.split_whitespace().next().unwrap_or(probe_normalized);

    let mut best: Option<Candidate> = None;

    for start_tok in 0..haystack.tokens.len() {
        if !first_word.is_empty() {
            let token_text = haystack.token_text(start_tok);
            if fuzzy_match(first_word, &token_text, None).match_count() == 0 {
                continue;
            }
        }

        let by_count_end = start_tok + target_token_count;
        for extra_lines in 0..=config.multi_line_lookahead {
            let line_end = haystack.line_end_token_idx(start_tok, extra_lines);
            let end_tok = by_count_end.min(line_end);
            if end_tok <= start_tok {
                continue;
            }
            let (window, abs_start) = haystack.window_text(start_tok, end_tok);
            if overlaps(occupied, abs_start, abs_start + window.chars().count()) {
                continue;
            }

            // `a` is the haystack window, `b` is the target — matches the
            // convention the acceptance thresholds are defined against
            // (`|b|` is the target's length; `b_ratio`/`b_gap_ratio` describe
            // how much of the target matched, and how densely).
            let fm = fuzzy_match(&window, probe_normalized, Some(junk.clone()));
            if !fm.has_match() {
                continue;
            }

            let accepted = match regime {
                Regime::Short => fm.ratio() >= config.t_short,
                Regime::Long => fm.b_gap_ratio() >= config.t_gap && fm.b_ratio() >= config.t_b,
            };
            if !accepted {
                continue;
            }

            let (rel_start, rel_end) = fm.a_index_range();
            let abs_match_start = abs_start + rel_start;
            let abs_match_end = abs_start + rel_end;
            if overlaps(occupied, abs_match_start, abs_match_end) {
                continue;
            }

            let token_range = match regime {
                Regime::Short => match haystack.boundary_clean_tokens(abs_match_start, abs_match_end) {
                    Some(covered) if !covered.is_empty() => {
                        (covered[0], covered[covered.len() - 1] + 1)
                    }
                    _ => continue,
                },
                Regime::Long => {
                    let covered = haystack.tokens_fully_contained(abs_match_start, abs_match_end);
                    if covered.is_empty() {
                        continue;
                    }
                    (covered[0], covered[covered.len() - 1] + 1)
                }
            };

            let candidate = Candidate {
                token_range,
                abs_range: (abs_match_start, abs_match_end),
                b_gap_ratio: fm.b_gap_ratio(),
                match_count: fm.match_count(),
            };

            let is_better = match &best {
                None => true,
                Some(current) => {
                    (candidate.b_gap_ratio, candidate.match_count, std::cmp::Reverse(candidate.abs_range.0))
                        > (current.b_gap_ratio, current.match_count, std::cmp::Reverse(current.abs_range.0))
                }
            };
            if is_better {
                best = Some(candidate);
            }
        }
    }

    best
}

/// Per-tag bonding anchor: the line range of the group's first accepted
/// bonded span.
struct BondingAnchor {
    line_start: usize,
    line_end: usize,
}

fn line_distance(anchor: &BondingAnchor, line_start: usize, line_end: usize) -> usize {
    if line_end < anchor.line_start {
        anchor.line_start - line_end
    } else if line_start > anchor.line_end {
        line_start - anchor.line_end
    } else {
        0
    }
}

/// Summary of a completed `annotate` call, useful for logging without
/// re-deriving counts from the mutated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotationStats {
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
}

impl fmt::Display for AnnotationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accepted, {} rejected, {} malformed",
            self.accepted, self.rejected, self.malformed
        )
    }
}

/// Drives alignment of each [`TargetAnnotation`] against a document,
/// subject to ordering, overlap and multi-occurrence policies.
pub struct MatchingAnnotator {
    targets: Vec<TargetAnnotation>,
    config: AnnotatorConfig,
}

impl MatchingAnnotator {
    #[must_use]
    pub fn new(targets: Vec<TargetAnnotation>) -> Self {
        Self {
            targets,
            config: AnnotatorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(targets: Vec<TargetAnnotation>, config: AnnotatorConfig) -> Self {
        Self { targets, config }
    }

    /// Mutates `document` in place, stamping tags for every target that
    /// could be acceptably aligned. Never overwrites an existing tag.
    pub fn annotate<D: DocumentLike>(&self, document: &mut D) -> Result<AnnotationStats, AnnotationError> {
        if document.lines().is_empty() {
            log::debug!("annotate: empty document, nothing to do");
            return Ok(AnnotationStats::default());
        }

        let haystack = Haystack::build(document);
        let junk: JunkPredicate = Arc::new(is_junk);

        let mut occupied: BTreeMap<usize, usize> = BTreeMap::new();
        let mut bonding_anchors: BTreeMap<String, BondingAnchor> = BTreeMap::new();
        let mut stats = AnnotationStats::default();
        let mut stamped: Vec<(usize, usize, String)> = Vec::new();

        for target in &self.targets {
            let probes = target.value().probes();
            // A list-valued target's sub-values are one logical annotation, not
            // independent probes: they must stay clustered even without an
            // explicit `bonding` flag, so they share a locality anchor here.
            // An explicit `bonding=true` additionally shares that anchor across
            // other targets with the same name.
            let enforce_locality = target.is_bonding() || probes.len() > 1;
            let mut local_anchor: Option<BondingAnchor> = None;

            for probe in probes {
                if probe.trim().is_empty() {
                    log::warn!("skipping malformed target '{}': empty value", target.name());
                    stats.malformed += 1;
                    continue;
                }
                let normalized_probe = normalize(probe);

                loop {
                    let Some(candidate) =
                        find_best_match(&haystack, &normalized_probe, &self.config, &occupied, &junk)
                    else {
                        log::debug!("no acceptable match for target '{}'", target.name());
                        stats.rejected += 1;
                        break;
                    };

                    let (start_tok, end_tok) = candidate.token_range;
                    let line_start = haystack.tokens[start_tok].line_idx;
                    let line_end = haystack.tokens[end_tok - 1].line_idx;

                    if enforce_locality {
                        let anchor = if target.is_bonding() {
                            bonding_anchors.get(target.name())
                        } else {
                            local_anchor.as_ref()
                        };
                        if let Some(anchor) = anchor {
                            let distance = line_distance(anchor, line_start, line_end);
                            if distance > self.config.bonding_window_lines {
                                log::debug!(
                                    "rejecting target '{}': distance {distance} from its group exceeds window",
                                    target.name()
                                );
                                stats.rejected += 1;
                                break;
                            }
                        }
                    }

                    occupied.insert(candidate.abs_range.0, candidate.abs_range.1);

                    for tok_idx in start_tok..end_tok {
                        let t = haystack.tokens[tok_idx];
                        stamped.push((t.line_idx, t.token_idx, target.name().to_string()));
                    }

                    if enforce_locality {
                        if target.is_bonding() {
                            bonding_anchors
                                .entry(target.name().to_string())
                                .and_modify(|anchor| {
                                    anchor.line_start = anchor.line_start.min(line_start);
                                    anchor.line_end = anchor.line_end.max(line_end);
                                })
                                .or_insert(BondingAnchor { line_start, line_end });
                        } else {
                            local_anchor = Some(match local_anchor {
                                Some(anchor) => BondingAnchor {
                                    line_start: anchor.line_start.min(line_start),
                                    line_end: anchor.line_end.max(line_end),
                                },
                                None => BondingAnchor { line_start, line_end },
                            });
                        }
                    }

                    log::debug!(
                        "accepted target '{}': b_gap_ratio={:.2} match_count={}",
                        target.name(),
                        candidate.b_gap_ratio,
                        candidate.match_count
                    );
                    stats.accepted += 1;

                    if !target.is_match_multiple() {
                        break;
                    }
                }
            }
        }

        for (line_idx, token_idx, tag) in stamped {
            let line = document.lines_mut().get_mut(line_idx).ok_or_else(|| {
                AnnotationError::StructuralError(format!("line {line_idx} out of bounds"))
            })?;
            let token = line.tokens_mut().get_mut(token_idx).ok_or_else(|| {
                AnnotationError::StructuralError(format!(
                    "token {token_idx} out of bounds on line {line_idx}"
                ))
            })?;
            if token.get_tag().is_none() {
                token.set_tag(tag);
            }
        }

        log::info!("annotate finished: {stats}");
        Ok(stats)
    }
}
