//! Character-level similarity between normalized titles.
//!
//! The ratio is `2 * M / T`, where `T` is the combined length of both strings
//! and `M` the number of characters covered by their matching blocks. Matching
//! blocks are found recursively: take the longest common substring, then
//! repeat on the pieces to its left and to its right. This is order-sensitive,
//! so two titles sharing the same words in a different order score lower than
//! a token-based measure would give them.

use std::collections::HashMap;

/// Titles at or above this ratio are treated as the same story.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.92;

/// Sequences at least this long get their most frequent characters left out of
/// the match index, which keeps the search fast on long inputs.
const POPULAR_MIN_LEN: usize = 200;

/// Similarity ratio in `[0, 1]`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matched_len();
    2.0 * matched as f64 / total as f64
}

/// True when `ratio(a, b) >= threshold`.
pub fn similar(a: &str, b: &str, threshold: f64) -> bool {
    ratio(a, b) >= threshold
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character in `b`, ascending.
    b_index: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b_index.entry(*c).or_default().push(j);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_index.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_index }
    }

    /// Total length of all matching blocks.
    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let (i, j, k) = self.longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                pending.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                pending.push((i + k, ahi, j + k, bhi));
            }
        }

        matched
    }

    /// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows. Among
    /// equally long blocks the one starting earliest in `a`, then in `b`, wins.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (a, b) = (self.a, self.b);
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

        // run length of the match ending at a[i-1], b[j]
        let mut runs: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_runs = HashMap::new();
            if let Some(positions) = self.b_index.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = match j.checked_sub(1) {
                        Some(prev) => runs.get(&prev).copied().unwrap_or(0) + 1,
                        None => 1,
                    };
                    next_runs.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            runs = next_runs;
        }

        // characters left out of the index can still extend a block
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k] {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}
