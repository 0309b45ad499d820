//! Fuzzy Matcher (§4.1): the Ratcliff–Obershelp / Hunt–McIlroy "matching
//! blocks" alignment between two strings, plus the ratio-style metrics and
//! split operations the Matching Annotator drives its accept/reject policy
//! from.

use crate::{FuzzyMatchResult, JunkPredicate, MatchingBlock};
use std::collections::HashMap;

/// Finds the longest contiguous run common to `a[alo..ahi]` and
/// `b[blo..bhi]`, ties broken by earliest `i` then earliest `j` — the
/// classic `find_longest_match` building block of the matching-blocks
/// algorithm.
fn find_longest_match(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best_i = alo;
    let mut best_j = blo;
    let mut best_size = 0usize;
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b_index.get(&a[i]) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j2len.get(&j.wrapping_sub(1)).copied().unwrap_or(0) + 1;
                new_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = new_j2len;
    }

    (best_i, best_j, best_size)
}

fn collect_matching_blocks(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
    out: &mut Vec<MatchingBlock>,
) {
    let (i, j, n) = find_longest_match(a, b_index, alo, ahi, blo, bhi);
    if n == 0 {
        return;
    }
    if alo < i && blo < j {
        collect_matching_blocks(a, b_index, alo, i, blo, j, out);
    }
    out.push((i, j, n));
    if i + n < ahi && j + n < bhi {
        collect_matching_blocks(a, b_index, i + n, ahi, j + n, bhi, out);
    }
}

/// Builds the `b`-character position index and runs the recursive block
/// search, merging adjacent blocks that turn out to be contiguous on both
/// sides (recursion can hand back neighbors that touch exactly).
fn get_matching_blocks(a: &[char], b: &[char]) -> Vec<MatchingBlock> {
    let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b_index.entry(c).or_default().push(j);
    }

    let mut raw = Vec::new();
    collect_matching_blocks(a, &b_index, 0, a.len(), 0, b.len(), &mut raw);

    let mut merged: Vec<MatchingBlock> = Vec::with_capacity(raw.len());
    for block in raw {
        if let Some(&(pi, pj, pn)) = merged.last() {
            if pi + pn == block.0 && pj + pn == block.1 {
                let last = merged.last_mut().unwrap();
                last.2 += block.2;
                continue;
            }
        }
        merged.push(block);
    }
    merged
}

/// Computes an alignment between `a` and `b`, optionally ignoring certain
/// positions (as marked by `isjunk`) when scoring the alignment — junk never
/// influences which blocks are found, only the ratio metrics derived from
/// them.
///
/// The algorithm canonicalizes argument order internally (shorter/lexically
/// smaller string first) and transposes the result back, so
/// `fuzzy_match(a, b).match_count() == fuzzy_match(b, a).match_count()`
/// holds regardless of which string is passed as `a`.
#[must_use]
pub fn fuzzy_match(a: &str, b: &str, isjunk: Option<JunkPredicate>) -> FuzzyMatchResult {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let a_key = (a_chars.len(), a);
    let b_key = (b_chars.len(), b);

    let matching_blocks = if a_key <= b_key {
        get_matching_blocks(&a_chars, &b_chars)
    } else {
        get_matching_blocks(&b_chars, &a_chars)
            .into_iter()
            .map(|(i, j, n)| (j, i, n))
            .collect()
    };

    FuzzyMatchResult {
        a: a.to_string(),
        b: b.to_string(),
        matching_blocks,
        isjunk,
    }
}

fn covered_positions(blocks: &[MatchingBlock], side_index: impl Fn(&MatchingBlock) -> usize) -> Vec<(usize, usize)> {
    blocks
        .iter()
        .map(|block| {
            let start = side_index(block);
            (start, start + block.2)
        })
        .collect()
}

fn is_covered(ranges: &[(usize, usize)], pos: usize) -> bool {
    ranges.iter().any(|&(start, end)| pos >= start && pos < end)
}

impl FuzzyMatchResult {
    #[must_use]
    pub fn a(&self) -> &str {
        &self.a
    }

    #[must_use]
    pub fn b(&self) -> &str {
        &self.b
    }

    #[must_use]
    pub fn matching_blocks(&self) -> &[MatchingBlock] {
        &self.matching_blocks
    }

    /// `Σn` over all matching blocks.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matching_blocks.iter().map(|&(_, _, n)| n).sum()
    }

    #[must_use]
    pub fn has_match(&self) -> bool {
        self.match_count() > 0
    }

    fn is_junk_at(&self, s: &str, index: usize) -> bool {
        self.isjunk.as_ref().is_some_and(|f| f(s, index))
    }

    /// Count of junk positions in `a` that fall outside every matching block.
    fn junk_outside_a(&self) -> usize {
        let a_chars: Vec<char> = self.a.chars().collect();
        let covered = covered_positions(&self.matching_blocks, |&(i, _, _)| i);
        (0..a_chars.len())
            .filter(|&pos| !is_covered(&covered, pos) && self.is_junk_at(&self.a, pos))
            .count()
    }

    /// Count of junk positions in `b` that fall outside every matching block.
    fn junk_outside_b(&self) -> usize {
        let b_chars: Vec<char> = self.b.chars().collect();
        let covered = covered_positions(&self.matching_blocks, |&(_, j, _)| j);
        (0..b_chars.len())
            .filter(|&pos| !is_covered(&covered, pos) && self.is_junk_at(&self.b, pos))
            .count()
    }

    fn a_len_effective(&self) -> usize {
        self.a.chars().count().saturating_sub(self.junk_outside_a())
    }

    fn b_len_effective(&self) -> usize {
        self.b.chars().count().saturating_sub(self.junk_outside_b())
    }

    /// `2M / (|a|' + |b|')`, clamped to `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        let denom = self.a_len_effective() + self.b_len_effective();
        if denom == 0 {
            return 0.0;
        }
        (2.0 * self.match_count() as f32 / denom as f32).clamp(0.0, 1.0)
    }

    /// `M / |a|'`.
    #[must_use]
    pub fn a_ratio(&self) -> f32 {
        let denom = self.a_len_effective();
        if denom == 0 {
            0.0
        } else {
            self.match_count() as f32 / denom as f32
        }
    }

    /// `M / |b|'`.
    #[must_use]
    pub fn b_ratio(&self) -> f32 {
        let denom = self.b_len_effective();
        if denom == 0 {
            0.0
        } else {
            self.match_count() as f32 / denom as f32
        }
    }

    /// `M / (M + b_gap)`, where `b_gap` is the count of unmatched, non-junk
    /// positions strictly inside the `b`-span of the alignment.
    #[must_use]
    pub fn b_gap_ratio(&self) -> f32 {
        let m = self.match_count();
        if m == 0 {
            return 0.0;
        }
        let (j_min, j_max) = self.b_index_range();
        let covered = covered_positions(&self.matching_blocks, |&(_, j, _)| j);
        let b_gap = (j_min..j_max)
            .filter(|&pos| !is_covered(&covered, pos) && !self.is_junk_at(&self.b, pos))
            .count();
        m as f32 / (m + b_gap) as f32
    }

    /// `(first_block.i, last_block.i + last_block.n)`, or `(0, 0)` if there
    /// is no match.
    #[must_use]
    pub fn a_index_range(&self) -> (usize, usize) {
        match (self.matching_blocks.first(), self.matching_blocks.last()) {
            (Some(&(i, _, _)), Some(&(li, _, ln))) => (i, li + ln),
            _ => (0, 0),
        }
    }

    /// `(first_block.j, last_block.j + last_block.n)`, or `(0, 0)` if there
    /// is no match.
    #[must_use]
    pub fn b_index_range(&self) -> (usize, usize) {
        match (self.matching_blocks.first(), self.matching_blocks.last()) {
            (Some(&(_, j, _)), Some(&(_, lj, ln))) => (j, lj + ln),
            _ => (0, 0),
        }
    }

    /// Splits the alignment at `a`-position `k`: `left` covers `a[..k]`,
    /// `right` covers `a[k..]` re-indexed to start at `0`. `b` is shared,
    /// unchanged, by both halves.
    #[must_use]
    pub fn a_split_at(&self, k: usize) -> (FuzzyMatchResult, FuzzyMatchResult) {
        let a_chars: Vec<char> = self.a.chars().collect();
        let k = k.min(a_chars.len());
        let left_a: String = a_chars[..k].iter().collect();
        let right_a: String = a_chars[k..].iter().collect();

        let mut left_blocks = Vec::new();
        let mut right_blocks = Vec::new();
        for &(i, j, n) in &self.matching_blocks {
            if i + n <= k {
                left_blocks.push((i, j, n));
            } else if i >= k {
                right_blocks.push((i - k, j, n));
            } else {
                let left_len = k - i;
                left_blocks.push((i, j, left_len));
                right_blocks.push((0, j + left_len, n - left_len));
            }
        }

        (
            FuzzyMatchResult {
                a: left_a,
                b: self.b.clone(),
                matching_blocks: left_blocks,
                isjunk: self.isjunk.clone(),
            },
            FuzzyMatchResult {
                a: right_a,
                b: self.b.clone(),
                matching_blocks: right_blocks,
                isjunk: self.isjunk.clone(),
            },
        )
    }

    /// Splits the alignment at `b`-position `k`: symmetric to
    /// [`Self::a_split_at`] but on the `b` side.
    #[must_use]
    pub fn b_split_at(&self, k: usize) -> (FuzzyMatchResult, FuzzyMatchResult) {
        let b_chars: Vec<char> = self.b.chars().collect();
        let k = k.min(b_chars.len());
        let left_b: String = b_chars[..k].iter().collect();
        let right_b: String = b_chars[k..].iter().collect();

        let mut left_blocks = Vec::new();
        let mut right_blocks = Vec::new();
        for &(i, j, n) in &self.matching_blocks {
            if j + n <= k {
                left_blocks.push((i, j, n));
            } else if j >= k {
                right_blocks.push((i, j - k, n));
            } else {
                let left_len = k - j;
                left_blocks.push((i, j, left_len));
                right_blocks.push((i + left_len, 0, n - left_len));
            }
        }

        (
            FuzzyMatchResult {
                a: self.a.clone(),
                b: left_b,
                matching_blocks: left_blocks,
                isjunk: self.isjunk.clone(),
            },
            FuzzyMatchResult {
                a: self.a.clone(),
                b: right_b,
                matching_blocks: right_blocks,
                isjunk: self.isjunk.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn dot_junk() -> JunkPredicate {
        Arc::new(|s: &str, i: usize| s.chars().nth(i) == Some('.'))
    }

    #[test]
    fn exact_match() {
        let fm = fuzzy_match("abc", "abc", None);
        assert!(fm.has_match());
        assert_eq!(fm.match_count(), 3);
        assert_eq!(fm.ratio(), 1.0);
        assert_eq!(fm.a_ratio(), 1.0);
        assert_eq!(fm.b_ratio(), 1.0);
        assert_eq!(fm.b_gap_ratio(), 1.0);
        assert_eq!(fm.a_index_range(), (0, 3));
        assert_eq!(fm.b_index_range(), (0, 3));
    }

    #[test]
    fn no_match() {
        let fm = fuzzy_match("abc", "xyz", None);
        assert!(!fm.has_match());
        assert_eq!(fm.match_count(), 0);
    }

    #[test]
    fn partial_match() {
        let fm = fuzzy_match("abx", "aby", None);
        assert_eq!(fm.match_count(), 2);
        assert!((fm.ratio() - 2.0 / 3.0).abs() < 1e-6);
        assert!((fm.a_ratio() - 2.0 / 3.0).abs() < 1e-6);
        assert!((fm.b_ratio() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(fm.b_gap_ratio(), 1.0);
        assert_eq!(fm.a_index_range(), (0, 2));
        assert_eq!(fm.b_index_range(), (0, 2));
    }

    #[test]
    fn symmetry_holds_for_arbitrary_pairs() {
        let pairs = [
            ("abc", "abc"),
            ("abc", "xyz"),
            ("this is matching", "this is. matching indeed matching"),
            ("", "abc"),
            ("saddam hussein", "sadam husein"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                fuzzy_match(a, b, None).match_count(),
                fuzzy_match(b, a, None).match_count(),
                "symmetry violated for {a:?}/{b:?}"
            );
        }
    }

    #[test]
    fn junk_in_middle_of_a_spans_across_gap() {
        let fm = fuzzy_match("a.b", "ab", Some(dot_junk()));
        assert_eq!(fm.match_count(), 2);
        assert_eq!(fm.ratio(), 1.0);
        assert_eq!(fm.a_ratio(), 1.0);
        assert_eq!(fm.b_ratio(), 1.0);
        assert_eq!(fm.b_gap_ratio(), 1.0);
        assert_eq!(fm.a_index_range(), (0, 3));
        assert_eq!(fm.b_index_range(), (0, 2));
    }

    #[test]
    fn junk_in_middle_of_b_spans_across_gap() {
        let fm = fuzzy_match("ab", "a.b", Some(dot_junk()));
        assert_eq!(fm.match_count(), 2);
        assert_eq!(fm.ratio(), 1.0);
        assert_eq!(fm.a_index_range(), (0, 2));
        assert_eq!(fm.b_index_range(), (0, 3));
    }

    #[test]
    fn double_counted_junk_counts_once() {
        let fm = fuzzy_match("a.b", "a.b", Some(dot_junk()));
        assert_eq!(fm.match_count(), 3);
        assert_eq!(fm.ratio(), 1.0);
    }

    #[test]
    fn split_conservation_holds() {
        let fm = fuzzy_match("this is matching", "this is matching", None);
        for k in 0..=fm.a().chars().count() {
            let (left, right) = fm.a_split_at(k);
            assert_eq!(left.match_count() + right.match_count(), fm.match_count());
        }
    }

    #[test]
    fn a_split_at_redistributes_blocks_and_rebases_the_right_half() {
        let fm = fuzzy_match("abc", "abc", None);
        let (left, right) = fm.a_split_at(2);
        assert_eq!(left.a(), "ab");
        assert_eq!(left.b(), "abc");
        assert_eq!(left.match_count(), 2);
        assert_eq!(left.a_ratio(), 1.0);
        assert!((left.b_ratio() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(left.a_index_range(), (0, 2));
        assert_eq!(left.b_index_range(), (0, 2));

        assert_eq!(right.a(), "c");
        assert_eq!(right.b(), "abc");
        assert_eq!(right.match_count(), 1);
        assert_eq!(right.a_ratio(), 1.0);
        assert!((right.b_ratio() - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(right.a_index_range(), (0, 1));
        assert_eq!(right.b_index_range(), (2, 3));

        assert_eq!(left.match_count() + right.match_count(), fm.match_count());
    }

    #[test]
    fn split_on_no_match_redistributes_strings_without_match() {
        let fm = fuzzy_match("abc", "xyz", None);
        let (left, right) = fm.a_split_at(1);
        assert_eq!(left.a(), "a");
        assert_eq!(right.a(), "bc");
        assert!(!left.has_match());
        assert!(!right.has_match());

        let fm = fuzzy_match("xyz", "abc", None);
        let (left, right) = fm.b_split_at(1);
        assert_eq!(left.b(), "a");
        assert_eq!(right.b(), "bc");
        assert!(!left.has_match());
        assert!(!right.has_match());
    }
}
