//! Deterministic score computation for a finished game session.

/// Compute the final score from game telemetry.
///
/// Each hit is worth 10 points, each combo 5, and every whole second left on
/// the clock adds 1. `time_left` is assumed non-negative; callers clamp
/// `game_length - elapsed` to zero before calling.
pub fn compute_score(hits: u32, combos: u32, time_left: f64) -> u32 {
    let total = u64::from(hits) * 10 + u64::from(combos) * 5 + time_left.floor() as u64;
    total.min(u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_score_formula() {
        assert_eq!(compute_score(10, 5, 20.0), 145);
        assert_eq!(compute_score(0, 0, 0.0), 0);
        assert_eq!(compute_score(1, 0, 0.0), 10);
        assert_eq!(compute_score(0, 1, 0.0), 5);
    }

    #[test]
    fn test_compute_score_floors_fractional_time() {
        assert_eq!(compute_score(0, 0, 4.999), 4);
        assert_eq!(compute_score(10, 3, 5.0), 120);
        assert_eq!(compute_score(10, 3, 5.9), 120);
    }
}
