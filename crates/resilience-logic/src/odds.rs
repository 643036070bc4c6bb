//! Random event odds: the idle chance ratchet and weighted event selection.
//!
//! These are deterministic given the random draws, so callers own the RNG.

/// Whether a roll in `[0, 100)` triggers an event at `current_chance` percent.
/// A chance of 0 never triggers.
pub fn roll_succeeds(current_chance: u32, draw: u32) -> bool {
    current_chance > 0 && draw < current_chance
}

/// Raise the chance by `delta` after an idle tick, held within `[min, max]`.
pub fn ratchet(current_chance: u32, delta: u32, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    current_chance.saturating_add(delta).clamp(lo, hi)
}

/// Sum of all weights.
pub fn total_weight(weights: &[u32]) -> u32 {
    weights.iter().fold(0u32, |acc, w| acc.saturating_add(*w))
}

/// Index picked by a draw in `[0, total_weight)`, proportional to weight.
///
/// Zero-weight entries are never chosen. Returns `None` when the total
/// weight is 0 or the draw is out of range.
pub fn pick_weighted(weights: &[u32], draw: u32) -> Option<usize> {
    let mut remaining = draw;
    for (i, &w) in weights.iter().enumerate() {
        if remaining < w {
            return Some(i);
        }
        remaining -= w;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll() {
        assert!(!roll_succeeds(0, 0));
        assert!(roll_succeeds(1, 0));
        assert!(!roll_succeeds(1, 1));
        assert!(roll_succeeds(100, 99));
    }

    #[test]
    fn test_ratchet_clamps() {
        assert_eq!(ratchet(0, 5, 10, 50), 10);
        assert_eq!(ratchet(20, 5, 10, 50), 25);
        assert_eq!(ratchet(48, 5, 10, 50), 50);
        assert_eq!(ratchet(50, 5, 10, 50), 50);
        assert_eq!(ratchet(u32::MAX, 1, 0, 100), 100);
    }

    #[test]
    fn test_pick_weighted_is_proportional() {
        let weights = [1, 0, 3];
        assert_eq!(total_weight(&weights), 4);
        let picks: Vec<_> = (0..4).map(|d| pick_weighted(&weights, d)).collect();
        assert_eq!(picks, vec![Some(0), Some(2), Some(2), Some(2)]);
        assert_eq!(pick_weighted(&weights, 4), None);
    }

    #[test]
    fn test_pick_weighted_empty() {
        assert_eq!(pick_weighted(&[], 0), None);
        assert_eq!(pick_weighted(&[0, 0], 0), None);
    }
}
