//! String distance measures used by header similarity scoring.
//! Both measures work on Unicode scalar values, not bytes.

/// Minimum number of single-character insertions, deletions and substitutions
/// turning `a` into `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (longer, shorter) = if a.len() < b.len() { (&b, &a) } else { (&a, &b) };
    if shorter.is_empty() {
        return longer.len();
    }

    let mut previous: Vec<usize> = (0..=shorter.len()).collect();
    let mut current = vec![0usize; shorter.len() + 1];
    for (i, c1) in longer.iter().enumerate() {
        current[0] = i + 1;
        for (j, c2) in shorter.iter().enumerate() {
            let insertion = previous[j + 1] + 1;
            let deletion = current[j] + 1;
            let substitution = previous[j] + usize::from(c1 != c2);
            current[j + 1] = insertion.min(deletion).min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[shorter.len()]
}

/// `1 - distance / max_len`, or None when both strings are empty.
pub fn edit_similarity(a: &str, b: &str) -> Option<f64> {
    let max_length = a.chars().count().max(b.chars().count());
    if max_length == 0 {
        return None;
    }
    Some(1.0 - edit_distance(a, b) as f64 / max_length as f64)
}

/// Matching-blocks ratio `2 * M / (len(a) + len(b))`, where `M` counts the characters in
/// the blocks found by repeatedly taking the longest common substring and recursing on
/// both sides of it. Two empty strings have a ratio of 1.
///
/// The longest-block search breaks ties by position, which makes the raw measure
/// order-sensitive; the pair is put in lexicographic order first so the result is symmetric.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lower, a_upper, b_lower, b_upper)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, a_lower, a_upper, b_lower, b_upper);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lower < i && b_lower < j {
            queue.push((a_lower, i, b_lower, j));
        }
        if i + size < a_upper && j + size < b_upper {
            queue.push((i + size, a_upper, j + size, b_upper));
        }
    }
    matched
}

/// Longest common substring of `a[a_lower..a_upper]` and `b[b_lower..b_upper]`.
/// Among equally long blocks the one starting earliest in `a`, then in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    a_lower: usize,
    a_upper: usize,
    b_lower: usize,
    b_upper: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lower, b_lower, 0);
    let width = b_upper - b_lower + 1;
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];
    for i in a_lower..a_upper {
        for j in b_lower..b_upper {
            let offset = j - b_lower;
            current[offset + 1] = if a[i] == b[j] { previous[offset] + 1 } else { 0 };
            let size = current[offset + 1];
            if size > best_size {
                best_i = i + 1 - size;
                best_j = j + 1 - size;
                best_size = size;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    (best_i, best_j, best_size)
}
