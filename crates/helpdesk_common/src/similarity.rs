//! Ratcliff/Obershelp sequence similarity.
//!
//! `ratio = 2 * M / T`, where `T` is the combined length of both sequences and
//! `M` the number of characters in matching blocks. Blocks are found by taking
//! the longest common block (earliest on ties) and recursing on the pieces to
//! its left and right.

use std::collections::{HashMap, HashSet};

/// Sequences at least this long get the popular-element heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A run of `size` equal characters at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Similarity of `a` against `b` in `[0.0, 1.0]`.
///
/// Not symmetric in general: `b` is the sequence that gets indexed, so pass
/// the stored candidate as `a` and the query as `b`. Two empty strings score 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches: usize = SequenceMatcher::new(&a, &b)
        .matching_blocks()
        .iter()
        .map(|block| block.size)
        .sum();

    2.0 * matches as f64 / total as f64
}

struct SequenceMatcher<'s> {
    a: &'s [char],
    b: &'s [char],
    /// Positions of each character in `b`, ascending, minus popular ones.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> SequenceMatcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(c, _)| *c)
                .collect();
            for c in popular {
                b2j.remove(&c);
            }
        }

        Self { a, b, b2j }
    }

    /// Longest block in `a[alo..ahi]` x `b[blo..bhi]`; earliest `i`, then earliest `j`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular characters are missing from b2j; grow the block across them.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }

    fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.size == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.size);
            blocks.push(block);
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_by_key(|b| (b.a_start, b.b_start));
        blocks
    }
}
