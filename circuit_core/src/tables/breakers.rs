//! Standard Overcurrent Device Ratings (240.6(A))

/// Standard ampere ratings for fuses and inverse-time breakers, ascending.
pub static STANDARD_BREAKERS_A: [f64; 20] = [
    15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 125.0,
    150.0, 175.0, 200.0, 225.0, 250.0,
];

/// Outcome of rounding a current up to a standard device rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakerSelection {
    /// Selected rating (A)
    pub rating_a: f64,
    /// True when no rating was large enough and the largest one was returned
    pub saturated: bool,
}

/// Smallest standard rating ≥ `min_amps`.
///
/// Saturates at the largest tabulated rating instead of failing; the
/// `saturated` flag lets the caller tell the two cases apart.
///
/// # Example
///
/// ```rust
/// use circuit_core::tables::next_standard_breaker;
///
/// assert_eq!(next_standard_breaker(13.125).rating_a, 15.0);
/// assert_eq!(next_standard_breaker(20.0).rating_a, 20.0);
/// assert!(next_standard_breaker(400.0).saturated);
/// ```
pub fn next_standard_breaker(min_amps: f64) -> BreakerSelection {
    match STANDARD_BREAKERS_A.iter().find(|&&rating| rating >= min_amps) {
        Some(&rating_a) => BreakerSelection {
            rating_a,
            saturated: false,
        },
        None => BreakerSelection {
            rating_a: STANDARD_BREAKERS_A[STANDARD_BREAKERS_A.len() - 1],
            saturated: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing() {
        for pair in STANDARD_BREAKERS_A.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_round_up() {
        assert_eq!(next_standard_breaker(0.0).rating_a, 15.0);
        assert_eq!(next_standard_breaker(15.01).rating_a, 20.0);
        assert_eq!(next_standard_breaker(126.0).rating_a, 150.0);
    }

    #[test]
    fn test_exact_rating_is_selected() {
        let sel = next_standard_breaker(60.0);
        assert_eq!(sel.rating_a, 60.0);
        assert!(!sel.saturated);
    }

    #[test]
    fn test_saturates_at_largest() {
        let sel = next_standard_breaker(251.0);
        assert_eq!(sel.rating_a, 250.0);
        assert!(sel.saturated);
    }
}
