//! Tie-sensitive median used as the IDHash magnitude threshold.
//!
//! This is not a textbook median. When the middle of the sorted sequence sits
//! inside a run of equal values, the run is split into a left and a right
//! half and the side holding more copies of the tied value wins: a heavier
//! left half pushes the threshold up to the next distinct value on the right.

/// Select the threshold value from an ascending sequence.
///
/// Input must already be sorted; sortedness is assumed, not checked.
/// Returns `None` only for an empty sequence.
pub fn median(sorted: &[u32]) -> Option<u32> {
    match sorted.len() {
        0 => return None,
        1 => return Some(sorted[0]),
        _ => {}
    }

    let half = sorted.len() / 2;
    if sorted[half] != sorted[half - 1] {
        return Some(sorted[half]);
    }

    let (left, mut right) = sorted.split_at(half);
    if right.len() > left.len() {
        right = &right[1..];
    }

    let left_last = left[left.len() - 1];
    let right_first = right[0];
    if left_last != right_first {
        return Some(right_first);
    }

    let left_ties = left.iter().filter(|&&v| v == left_last).count();
    let right_ties = right.iter().filter(|&&v| v == right_first).count();
    if left_ties > right_ties {
        // Halves are equal length here, so a heavier left half means the
        // right half cannot be all ties.
        let next = right.iter().copied().find(|&v| v != right_first);
        return Some(next.unwrap_or(right_first));
    }

    Some(left_last)
}
