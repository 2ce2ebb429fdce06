//! Ratcliff/Obershelp sequence matching over characters
//!
//! Finds the longest common block, then recurses into the unmatched text on
//! either side of it. The ratio is `2 * M / (len(a) + len(b))` where `M` is the
//! total size of all matched blocks. Scattered single characters only count
//! when they fall inside a block, so unrelated strings stay near 0.0.
//!
//! Characters that make up more than 1% of a long second sequence (200 chars
//! or more) are treated as too common to start a block on, though blocks may
//! still extend across them.

use std::collections::HashMap;

/// Second sequences at least this long get the popular-character filter
const POPULAR_MIN_LEN: usize = 200;

/// A matched block: `a[a_start..a_start + size] == b[b_start..b_start + size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// Positions of each character in `b`, ascending
    b_index: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b_index.entry(*c).or_default().push(j);
        }
        if b.len() >= POPULAR_MIN_LEN {
            let max_count = b.len() / 100 + 1;
            b_index.retain(|_, positions| positions.len() <= max_count);
        }

        Self { a, b, b_index }
    }

    /// Longest block within `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    /// A zero-size block means nothing matched.
    pub fn find_longest_match(
        &self,
        a_lo: usize,
        a_hi: usize,
        b_lo: usize,
        b_hi: usize,
    ) -> Block {
        let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

        // Length of the match ending at each b position, for the previous a position
        let mut run_len: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_run_len = HashMap::new();
            if let Some(positions) = self.b_index.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| run_len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_run_len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            run_len = next_run_len;
        }

        // Grow across characters left out of the index
        while best_i > a_lo && best_j > b_lo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Block {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }

    /// All matched blocks, ordered by position
    pub fn matching_blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let block = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if block.size == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.size);
            blocks.push(block);
            if a_lo < i && b_lo < j {
                pending.push((a_lo, i, b_lo, j));
            }
            if i + k < a_hi && j + k < b_hi {
                pending.push((i + k, a_hi, j + k, b_hi));
            }
        }

        blocks.sort_by_key(|b| (b.a_start, b.b_start));
        blocks
    }

    /// Similarity in `[0.0, 1.0]`; two empty sequences are identical
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|b| b.size).sum();
        2.0 * matched as f64 / total as f64
    }
}
