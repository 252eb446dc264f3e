// src/matching/name.rs
//! Name equivalence for points that already sit in the same proximity cluster.

use std::collections::HashMap;

/// Names at least this long get their very common characters ignored when
/// anchoring matches, so long free-text names don't degrade to noise.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Case normalization applied to both sides before any comparison.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Gestalt (Ratcliff/Obershelp) similarity of two strings in [0, 1].
///
/// Finds the longest common block, recurses on both sides of it, and
/// returns `2 * matched / (len(a) + len(b))`. Two empty strings are identical.
/// Not symmetric in general: anchor ties resolve toward the earliest block of `a`.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Two normalized names are equivalent if either contains the other, or
/// their sequence ratio reaches `threshold`. Containment wins regardless
/// of the threshold.
pub fn names_equivalent(a: &str, b: &str, threshold: f64) -> bool {
    if a.contains(b) || b.contains(a) {
        return true;
    }
    sequence_ratio(a, b) >= threshold
}

/// Positions of each character of `b`, minus the popular ones for long `b`.
fn index_b(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }
    if b.len() >= AUTOJUNK_MIN_LEN {
        let popular_cutoff = b.len() / 100 + 1;
        b2j.retain(|_, positions| positions.len() <= popular_cutoff);
    }
    b2j
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let b2j = index_b(b);
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` within the given bounds.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_match(
    a: &[char],
    b: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of matches ending at b[j], for the previous row of a
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for i in alo..ahi {
        let mut next_run_lengths: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(&a[i]) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = if j > 0 {
                    run_lengths.get(&(j - 1)).copied().unwrap_or(0)
                } else {
                    0
                } + 1;
                next_run_lengths.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_lengths = next_run_lengths;
    }

    // Popular characters were dropped from the index; extend across them.
    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_size += 1;
    }
    while best_i + best_size < ahi
        && best_j + best_size < bhi
        && a[best_i + best_size] == b[best_j + best_size]
    {
        best_size += 1;
    }

    (best_i, best_j, best_size)
}
