//! Local violation rules, one per constraint kind.
//!
//! Every rule inspects the current partial digit map only: missing digits
//! never count as violations, and no rule reasons about what could still be
//! placed. Digits are 1-indexed throughout.

use crate::board::{CellSet, DigitMap};

/// Look up a cell's digit, tolerating out-of-range indices from hand-edited
/// board files
fn digit(digits: &DigitMap, cell: usize) -> Option<i64> {
    digits.get(&cell).map(|&d| d as i64)
}

fn mark(warnings: &mut CellSet, capacity: usize, cell: usize) {
    if cell < capacity {
        warnings.insert(cell);
    }
}

fn mark_all(warnings: &mut CellSet, capacity: usize, cells: &[usize]) {
    for &cell in cells {
        mark(warnings, capacity, cell);
    }
}

/// Flag every cell whose digit repeats inside its group
pub fn mark_duplicates<I>(groups: I, digits: &DigitMap, warnings: &mut CellSet, capacity: usize)
where
    I: IntoIterator<Item = Vec<usize>>,
{
    for group in groups {
        for (i, &a) in group.iter().enumerate() {
            let Some(da) = digit(digits, a) else {
                continue;
            };
            for &b in &group[i + 1..] {
                if digit(digits, b) == Some(da) {
                    mark(warnings, capacity, a);
                    mark(warnings, capacity, b);
                }
            }
        }
    }
}

/// Thermometer: digits increase from bulb to tip. The strict form flags
/// equal neighbors too; the slow form allows them.
pub fn thermometer(
    cells: &[usize],
    strict: bool,
    digits: &DigitMap,
    warnings: &mut CellSet,
    capacity: usize,
) {
    // Forward pass against the running maximum
    let mut max_seen: Option<i64> = None;
    for &cell in cells {
        if let Some(d) = digit(digits, cell) {
            if let Some(max) = max_seen {
                if d < max || (strict && d == max) {
                    mark(warnings, capacity, cell);
                }
            }
            max_seen = Some(max_seen.map_or(d, |m: i64| m.max(d)));
        }
    }

    // Backward pass against the running minimum
    let mut min_seen: Option<i64> = None;
    for &cell in cells.iter().rev() {
        if let Some(d) = digit(digits, cell) {
            if let Some(min) = min_seen {
                if d > min || (strict && d == min) {
                    mark(warnings, capacity, cell);
                }
            }
            min_seen = Some(min_seen.map_or(d, |m: i64| m.min(d)));
        }
    }
}

/// Between line: interior digits lie strictly between the two end digits
pub fn between_line(cells: &[usize], digits: &DigitMap, warnings: &mut CellSet, capacity: usize) {
    if cells.len() < 2 {
        return;
    }
    let head = cells[0];
    let tail = cells[cells.len() - 1];
    let (Some(head_digit), Some(tail_digit)) = (digit(digits, head), digit(digits, tail)) else {
        return;
    };

    let low = head_digit.min(tail_digit);
    let high = head_digit.max(tail_digit);
    let mut violated = false;

    for &cell in &cells[1..cells.len() - 1] {
        if let Some(d) = digit(digits, cell) {
            if d <= low || d >= high {
                mark(warnings, capacity, cell);
                violated = true;
            }
        }
    }

    if violated {
        mark(warnings, capacity, head);
        mark(warnings, capacity, tail);
    }
}

/// Double arrow: the interior digits sum to the sum of the two end digits
pub fn double_arrow(cells: &[usize], digits: &DigitMap, warnings: &mut CellSet, capacity: usize) {
    if cells.len() < 2 {
        return;
    }
    let head = cells[0];
    let tail = cells[cells.len() - 1];
    let (Some(head_digit), Some(tail_digit)) = (digit(digits, head), digit(digits, tail)) else {
        return;
    };

    let target = head_digit + tail_digit;
    let interior = &cells[1..cells.len() - 1];
    let mut partial = 0;
    let mut filled = 0;
    for &cell in interior {
        if let Some(d) = digit(digits, cell) {
            partial += d;
            filled += 1;
        }
    }

    if partial > target || (filled == interior.len() && partial != target) {
        mark_all(warnings, capacity, cells);
    }
}

/// Lockout line: the circle digits differ by at least `delta`, and no
/// interior digit falls in the closed range they span
pub fn lockout_line(
    cells: &[usize],
    delta: i64,
    digits: &DigitMap,
    warnings: &mut CellSet,
    capacity: usize,
) {
    if cells.len() < 2 {
        return;
    }
    let head = cells[0];
    let tail = cells[cells.len() - 1];
    let (Some(head_digit), Some(tail_digit)) = (digit(digits, head), digit(digits, tail)) else {
        return;
    };

    if (head_digit - tail_digit).abs() < delta {
        mark(warnings, capacity, head);
        mark(warnings, capacity, tail);
    }

    let low = head_digit.min(tail_digit);
    let high = head_digit.max(tail_digit);
    let mut violated = false;

    for &cell in &cells[1..cells.len() - 1] {
        if let Some(d) = digit(digits, cell) {
            if d >= low && d <= high {
                mark(warnings, capacity, cell);
                violated = true;
            }
        }
    }

    if violated {
        mark(warnings, capacity, head);
        mark(warnings, capacity, tail);
    }
}

/// Palindrome: the digit sequence reads the same from both ends
pub fn palindrome_line(cells: &[usize], digits: &DigitMap, warnings: &mut CellSet, capacity: usize) {
    for i in 0..cells.len() / 2 {
        let a = cells[i];
        let b = cells[cells.len() - 1 - i];
        if let (Some(da), Some(db)) = (digit(digits, a), digit(digits, b)) {
            if da != db {
                mark(warnings, capacity, a);
                mark(warnings, capacity, b);
            }
        }
    }
}

/// Whisper line: adjacent digits differ by at least `delta`
pub fn whisper_line(
    cells: &[usize],
    delta: i64,
    digits: &DigitMap,
    warnings: &mut CellSet,
    capacity: usize,
) {
    for pair in cells.windows(2) {
        if let (Some(a), Some(b)) = (digit(digits, pair[0]), digit(digits, pair[1])) {
            if (a - b).abs() < delta {
                mark(warnings, capacity, pair[0]);
                mark(warnings, capacity, pair[1]);
            }
        }
    }
}

/// Renban line: once every cell is filled, the digits must form a
/// consecutive run in some order. Incomplete lines are never flagged.
pub fn renban_line(cells: &[usize], digits: &DigitMap, warnings: &mut CellSet, capacity: usize) {
    let mut unique: Vec<usize> = cells.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut values = Vec::with_capacity(unique.len());
    for &cell in &unique {
        match digit(digits, cell) {
            Some(d) => values.push(d),
            None => return,
        }
    }

    values.sort_unstable();
    let broken = values.windows(2).any(|pair| pair[1] - pair[0] != 1);
    if broken {
        mark_all(warnings, capacity, cells);
    }
}

/// Little killer: a fully filled diagonal must hit its sum exactly
pub fn little_killer_sum(
    cells: &[usize],
    target: i64,
    digits: &DigitMap,
    warnings: &mut CellSet,
    capacity: usize,
) {
    let mut sum = 0;
    for &cell in cells {
        match digit(digits, cell) {
            Some(d) => sum += d,
            None => return,
        }
    }

    if sum != target {
        mark_all(warnings, capacity, cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(pairs: &[(usize, u8)]) -> DigitMap {
        pairs.iter().copied().collect()
    }

    fn flagged(warnings: &CellSet) -> Vec<usize> {
        warnings.iter().collect()
    }

    #[test]
    fn test_thermo_increasing_is_clean() {
        let map = digits(&[(0, 2), (1, 5), (2, 9)]);
        let mut warnings = CellSet::new(81);
        thermometer(&[0, 1, 2], true, &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_thermo_flags_equal_step() {
        let map = digits(&[(0, 4), (1, 4)]);
        let mut warnings = CellSet::new(81);
        thermometer(&[0, 1], true, &map, &mut warnings, 81);
        assert!(warnings.contains(1));
    }

    #[test]
    fn test_thermo_flags_decrease_in_both_passes() {
        let map = digits(&[(0, 7), (1, 3)]);
        let mut warnings = CellSet::new(81);
        thermometer(&[0, 1], true, &map, &mut warnings, 81);
        // Forward pass flags the drop, backward pass flags the bulb
        assert_eq!(flagged(&warnings), vec![0, 1]);
    }

    #[test]
    fn test_thermo_skips_gaps() {
        let map = digits(&[(0, 3), (2, 6)]);
        let mut warnings = CellSet::new(81);
        thermometer(&[0, 1, 2], true, &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_slow_thermo_allows_equal_step() {
        let map = digits(&[(0, 4), (1, 4), (2, 3)]);
        let mut warnings = CellSet::new(81);
        thermometer(&[0, 1, 2], false, &map, &mut warnings, 81);
        assert!(!warnings.contains(1));
        assert!(warnings.contains(2));
    }

    #[test]
    fn test_between_flags_interior_and_ends() {
        let map = digits(&[(0, 2), (1, 9), (2, 7)]);
        let mut warnings = CellSet::new(81);
        between_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1, 2]);
    }

    #[test]
    fn test_between_clean_interior() {
        let map = digits(&[(0, 2), (1, 5), (2, 7)]);
        let mut warnings = CellSet::new(81);
        between_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_between_needs_both_ends() {
        let map = digits(&[(0, 2), (1, 9)]);
        let mut warnings = CellSet::new(81);
        between_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_double_arrow_partial_overshoot() {
        let map = digits(&[(0, 2), (1, 8), (3, 3)]);
        let mut warnings = CellSet::new(81);
        double_arrow(&[0, 1, 2, 3], &map, &mut warnings, 81);
        // Interior 8 already exceeds 2 + 3
        assert_eq!(flagged(&warnings), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_double_arrow_exact_sum_is_clean() {
        let map = digits(&[(0, 4), (1, 3), (2, 6), (3, 5)]);
        let mut warnings = CellSet::new(81);
        double_arrow(&[0, 1, 2, 3], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_double_arrow_complete_mismatch() {
        let map = digits(&[(0, 4), (1, 2), (2, 1), (3, 5)]);
        let mut warnings = CellSet::new(81);
        double_arrow(&[0, 1, 2, 3], &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_lockout_close_circles() {
        let map = digits(&[(0, 4), (2, 6)]);
        let mut warnings = CellSet::new(81);
        lockout_line(&[0, 1, 2], 4, &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 2]);
    }

    #[test]
    fn test_lockout_interior_in_range() {
        let map = digits(&[(0, 1), (1, 3), (2, 9)]);
        let mut warnings = CellSet::new(81);
        lockout_line(&[0, 1, 2], 4, &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1, 2]);
    }

    #[test]
    fn test_lockout_clean_line() {
        let map = digits(&[(0, 9), (1, 1), (2, 4)]);
        let mut warnings = CellSet::new(81);
        lockout_line(&[0, 1, 2], 4, &map, &mut warnings, 81);
        // 1 is outside [4, 9], circles differ by 5
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_palindrome_symmetric_is_clean() {
        let map = digits(&[(0, 3), (1, 7), (2, 3)]);
        let mut warnings = CellSet::new(81);
        palindrome_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_palindrome_flags_mismatched_pair() {
        let map = digits(&[(0, 3), (1, 7), (2, 7), (3, 4)]);
        let mut warnings = CellSet::new(81);
        palindrome_line(&[0, 1, 2, 3], &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 3]);
    }

    #[test]
    fn test_whisper_small_gap() {
        let map = digits(&[(0, 4), (1, 6)]);
        let mut warnings = CellSet::new(81);
        whisper_line(&[0, 1], 5, &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1]);
    }

    #[test]
    fn test_whisper_wide_gap_is_clean() {
        let map = digits(&[(0, 1), (1, 6), (2, 1)]);
        let mut warnings = CellSet::new(81);
        whisper_line(&[0, 1, 2], 5, &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_renban_incomplete_is_never_flagged() {
        let map = digits(&[(0, 1), (1, 9)]);
        let mut warnings = CellSet::new(81);
        renban_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_renban_consecutive_run_is_clean() {
        let map = digits(&[(0, 5), (1, 3), (2, 4)]);
        let mut warnings = CellSet::new(81);
        renban_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_renban_gap_flags_whole_line() {
        let map = digits(&[(0, 5), (1, 3), (2, 9)]);
        let mut warnings = CellSet::new(81);
        renban_line(&[0, 1, 2], &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicates_in_group() {
        let map = digits(&[(0, 5), (1, 5), (2, 3)]);
        let mut warnings = CellSet::new(81);
        mark_duplicates(vec![vec![0, 1, 2]], &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1]);
    }

    #[test]
    fn test_little_killer_mismatch() {
        let map = digits(&[(0, 1), (1, 2), (2, 4)]);
        let mut warnings = CellSet::new(81);
        little_killer_sum(&[0, 1, 2], 6, &map, &mut warnings, 81);
        assert_eq!(flagged(&warnings), vec![0, 1, 2]);
    }

    #[test]
    fn test_little_killer_incomplete_is_clean() {
        let map = digits(&[(0, 1), (1, 2)]);
        let mut warnings = CellSet::new(81);
        little_killer_sum(&[0, 1, 2], 6, &map, &mut warnings, 81);
        assert!(warnings.is_empty());
    }
}
