//! Ratcliff/Obershelp sequence matching over token slices.
//!
//! Matching blocks are found by taking the longest common contiguous run,
//! then recursing into the unmatched regions on either side of it. The
//! similarity ratio is `2 * M / T`, where `M` is the total length of all
//! matching blocks and `T` the combined length of both sequences.
//!
//! When the second sequence has at least 200 elements, elements occurring
//! more than `1 + len / 100` times in it are "popular": they never seed a
//! match and only join one by extending a run found from rarer elements.

use std::collections::HashMap;

/// A contiguous run where `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    /// Start of the run in the first sequence.
    pub a_start: usize,
    /// Start of the run in the second sequence.
    pub b_start: usize,
    /// Length of the run.
    pub len: usize,
}

/// Find all non-overlapping matching blocks, ordered by position.
pub fn matching_blocks<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> Vec<MatchBlock> {
    let b_positions = seed_positions(b);

    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let block = longest_match(a, b, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if block.len == 0 {
            continue;
        }
        blocks.push(block);
        if a_lo < block.a_start && b_lo < block.b_start {
            pending.push((a_lo, block.a_start, b_lo, block.b_start));
        }
        let (a_end, b_end) = (block.a_start + block.len, block.b_start + block.len);
        if a_end < a_hi && b_end < b_hi {
            pending.push((a_end, a_hi, b_end, b_hi));
        }
    }
    blocks.sort_by_key(|block| (block.a_start, block.b_start));
    blocks
}

/// Positions of each element of `b`, without the popular ones.
fn seed_positions<T: Eq + std::hash::Hash>(b: &[T]) -> HashMap<&T, Vec<usize>> {
    let mut positions: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, item) in b.iter().enumerate() {
        positions.entry(item).or_default().push(j);
    }
    if b.len() >= POPULAR_MIN_LEN {
        let limit = b.len() / 100 + 1;
        positions.retain(|_, seen| seen.len() <= limit);
    }
    positions
}

const POPULAR_MIN_LEN: usize = 200;

/// Longest common run inside `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Ties go to the run starting earliest in `a`, then earliest in `b`. The
/// run found from seeded positions is then widened over equal neighbours.
fn longest_match<T: Eq + std::hash::Hash>(
    a: &[T],
    b: &[T],
    b_positions: &HashMap<&T, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> MatchBlock {
    let mut best = MatchBlock { a_start: a_lo, b_start: b_lo, len: 0 };
    // run length of the match ending at (i - 1, j), keyed by j
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, item) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_positions.get(item) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let len = j.checked_sub(1).and_then(|prev| run_ending_at.get(&prev)).copied().unwrap_or(0) + 1;
                next_runs.insert(j, len);
                if len > best.len {
                    best = MatchBlock { a_start: i + 1 - len, b_start: j + 1 - len, len };
                }
            }
        }
        run_ending_at = next_runs;
    }

    while best.a_start > a_lo && best.b_start > b_lo && a[best.a_start - 1] == b[best.b_start - 1] {
        best.a_start -= 1;
        best.b_start -= 1;
        best.len += 1;
    }
    while best.a_start + best.len < a_hi
        && best.b_start + best.len < b_hi
        && a[best.a_start + best.len] == b[best.b_start + best.len]
    {
        best.len += 1;
    }
    best
}

/// Similarity ratio in `[0, 1]`; two empty sequences are identical.
pub fn sequence_ratio<T: Eq + std::hash::Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matches: usize = matching_blocks(a, b).iter().map(|block| block.len).sum();
    2.0 * matches as f64 / total as f64
}
