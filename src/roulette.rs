use rand::Rng;

use crate::error::NeatError;

const NORMALIZATION_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ProbabilityInterval {
    start: f64,
    stop: f64,
}

/// Fitness-proportionate selection over a normalized distribution.
///
/// Items own consecutive half-open slices `[start, stop)` of the unit interval in
/// the order they were given.
#[derive(Debug, Clone)]
pub struct Roulette<T> {
    items: Vec<T>,
    intervals: Vec<ProbabilityInterval>,
}

impl<T: Clone> Roulette<T> {
    pub fn new<I>(items: I) -> Result<Self, NeatError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut roulette = Roulette {
            items: Vec::new(),
            intervals: Vec::new(),
        };

        let mut stop = 0.0;
        for (item, probability) in items {
            let start = stop;
            stop += probability;
            roulette.items.push(item);
            roulette.intervals.push(ProbabilityInterval { start, stop });
        }

        if roulette.items.is_empty() {
            return Err(NeatError::EmptyRoulette);
        }
        if (stop - 1.0).abs() >= NORMALIZATION_TOLERANCE {
            return Err(NeatError::UnnormalizedProbabilities { total: stop });
        }
        Ok(roulette)
    }

    pub fn select<R: Rng>(&self, rng: &mut R) -> T {
        self.item_at(rng.gen::<f64>())
    }

    /// Item whose interval holds `u`. A `u` past the last stop, which the
    /// normalization tolerance allows, falls to the last item.
    pub fn item_at(&self, u: f64) -> T {
        let idx = self
            .intervals
            .partition_point(|interval| interval.stop <= u)
            .min(self.items.len() - 1);
        self.items[idx].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sevenths() -> Vec<(u32, f64)> {
        [47.0, 23.0, 56.0, 32.0, 44.0, 65.0, 33.0]
            .iter()
            .enumerate()
            .map(|(i, w)| (i as u32 + 1, w / 300.0))
            .collect()
    }

    #[test]
    fn test_intervals_reach_one() {
        let roulette = Roulette::new(sevenths()).unwrap();
        let last = roulette.intervals.last().unwrap();
        assert!((last.stop - 1.0).abs() < 1e-4);
        for pair in roulette.intervals.windows(2) {
            assert_eq!(pair[0].stop, pair[1].start);
        }
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let roulette = Roulette::new(vec![('a', 0.25), ('b', 0.0), ('c', 0.75)]).unwrap();
        assert_eq!(roulette.item_at(0.0), 'a');
        assert_eq!(roulette.item_at(0.2499), 'a');
        assert_eq!(roulette.item_at(0.25), 'c');
        assert_eq!(roulette.item_at(0.9999), 'c');
        assert_eq!(roulette.item_at(1.0), 'c');
    }

    #[test]
    fn test_rejects_bad_distributions() {
        assert!(matches!(
            Roulette::new(vec![(1u32, 0.5), (2, 0.3)]),
            Err(NeatError::UnnormalizedProbabilities { .. })
        ));
        assert!(matches!(
            Roulette::<u32>::new(Vec::new()),
            Err(NeatError::EmptyRoulette)
        ));
        assert!(Roulette::new(vec![(1u32, 0.5), (2, 0.4995)]).is_ok());
    }

    #[test]
    fn test_selection_follows_probabilities() {
        let roulette = Roulette::new(vec![(1u32, 0.1), (2, 0.9)]).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let draws = 10_000;
        let ones = (0..draws).filter(|_| roulette.select(&mut rng) == 1).count();
        let share = ones as f64 / draws as f64;
        assert!((share - 0.1).abs() < 0.02, "share was {}", share);
    }
}
