//! Longest increasing subsequence, used to keep the most keyed children in place.

/// Marks the positions of `seq` that form a longest strictly increasing subsequence.
///
/// Runs in O(n log n). Ties between equally long subsequences resolve towards the
/// subsequence ending earliest.
#[must_use]
pub fn longest_increasing(seq: &[usize]) -> Vec<bool> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::with_capacity(seq.len());
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (position, value) in seq.iter().enumerate() {
        let len = tails.partition_point(|tail| seq[*tail] < *value);
        if len > 0 {
            prev[position] = Some(tails[len - 1]);
        }
        if len == tails.len() {
            tails.push(position);
        } else {
            tails[len] = position;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        keep[position] = true;
        cursor = prev[position];
    }
    keep
}
