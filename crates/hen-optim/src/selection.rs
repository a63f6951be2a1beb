//! Selection operators on a scalar indicator (larger is better).

use hen_core::Real;
use rand::Rng;
use std::cmp::Ordering;

/// `k` tournament winners; aspirants are drawn with replacement.
pub fn tournament<R: Rng + ?Sized>(indicators: &[Real], k: usize, size: usize, rng: &mut R) -> Vec<usize> {
    if indicators.is_empty() {
        return Vec::new();
    }
    (0..k)
        .map(|_| {
            let mut winner = rng.random_range(0..indicators.len());
            for _ in 1..size {
                let aspirant = rng.random_range(0..indicators.len());
                if indicators[aspirant] > indicators[winner] {
                    winner = aspirant;
                }
            }
            winner
        })
        .collect()
}

/// Indices of the `k` largest indicators, best first. Ties keep input order.
pub fn best(indicators: &[Real], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..indicators.len()).collect();
    order.sort_by(|&a, &b| indicators[b].partial_cmp(&indicators[a]).unwrap_or(Ordering::Equal));
    order.truncate(k);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn best_is_sorted_and_stable() {
        let indicators = [0.3, 0.9, 0.3, 0.1];
        assert_eq!(best(&indicators, 3), vec![1, 0, 2]);
        assert_eq!(best(&indicators, 10).len(), 4);
    }

    #[test]
    fn full_size_tournament_favours_the_best() {
        let indicators = [0.1, 0.2, 5.0, 0.3];
        let mut rng = StdRng::seed_from_u64(12);
        let winners = tournament(&indicators, 200, 4, &mut rng);
        let hits = winners.iter().filter(|&&w| w == 2).count();
        // P(best not drawn in 4 tries) = (3/4)^4 ≈ 0.32
        assert!(hits > 100);
        assert!(tournament(&[], 3, 2, &mut rng).is_empty());
    }
}
