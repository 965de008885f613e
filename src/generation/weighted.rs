//! # Weighted Sampling
//!
//! A single generic sampler shared by pack selection, rule products and
//! template selection.

use crate::{PocketDimError, PocketDimResult};
use rand::Rng;

/// A value paired with the integer weight it is sampled by.
///
/// # Examples
///
/// ```
/// use pocketdim::WeightedItem;
///
/// let item = WeightedItem::new("Hub", 40);
/// assert_eq!(*item.value(), "Hub");
/// assert_eq!(item.weight(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedItem<T> {
    value: T,
    weight: u32,
}

impl<T> WeightedItem<T> {
    /// Creates a new weighted item.
    pub fn new(value: T, weight: u32) -> Self {
        Self { value, weight }
    }

    /// Gets the wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Gets the sampling weight.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Consumes the item and returns the wrapped value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Picks an index with probability proportional to its item's weight.
///
/// Draws a uniform integer in `[0, total)` and walks the items in order until
/// the running sum exceeds the draw.
pub fn sample_index<T, R>(items: &[WeightedItem<T>], rng: &mut R) -> PocketDimResult<usize>
where
    T: std::fmt::Debug,
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return Err(PocketDimError::EmptySelection(
            "cannot sample from an empty weighted list".to_string(),
        ));
    }

    let mut total: u64 = 0;
    for item in items {
        if item.weight == 0 {
            return Err(PocketDimError::InvalidWeight {
                item: format!("{:?}", item.value),
                weight: item.weight,
            });
        }
        total += u64::from(item.weight);
    }

    let draw = rng.gen_range(0..total);
    let mut running: u64 = 0;
    for (index, item) in items.iter().enumerate() {
        running += u64::from(item.weight);
        if running > draw {
            return Ok(index);
        }
    }

    // The draw is strictly below the total, so the walk always ends above.
    Ok(items.len() - 1)
}

/// Picks a value with probability proportional to its weight.
///
/// # Examples
///
/// ```
/// use pocketdim::{sample, WeightedItem};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let items = vec![WeightedItem::new("only", 5)];
/// let mut rng = StdRng::seed_from_u64(7);
/// assert_eq!(*sample(&items, &mut rng).unwrap(), "only");
/// ```
pub fn sample<'a, T, R>(items: &'a [WeightedItem<T>], rng: &mut R) -> PocketDimResult<&'a T>
where
    T: std::fmt::Debug,
    R: Rng + ?Sized,
{
    let index = sample_index(items, rng)?;
    Ok(&items[index].value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_empty_input_is_an_error() {
        let items: Vec<WeightedItem<u8>> = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let result = sample(&items, &mut rng);
        assert!(matches!(result, Err(PocketDimError::EmptySelection(_))));
    }

    #[test]
    fn test_zero_weight_is_rejected() {
        let items = vec![WeightedItem::new("a", 3), WeightedItem::new("b", 0)];
        let mut rng = StdRng::seed_from_u64(1);
        let result = sample(&items, &mut rng);
        assert!(matches!(
            result,
            Err(PocketDimError::InvalidWeight { weight: 0, .. })
        ));
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let items = vec![
            WeightedItem::new(0usize, 1),
            WeightedItem::new(1usize, 3),
            WeightedItem::new(2usize, 6),
        ];
        let mut rng = StdRng::seed_from_u64(12345);
        let mut counts = [0u32; 3];
        let draws = 60_000;

        for _ in 0..draws {
            counts[*sample(&items, &mut rng).unwrap()] += 1;
        }

        let expected = [0.1, 0.3, 0.6];
        for (count, expected) in counts.iter().zip(expected) {
            let observed = *count as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "observed {} expected {}",
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_same_seed_same_choice() {
        let items: Vec<_> = (0..10).map(|i| WeightedItem::new(i, i + 1)).collect();
        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);

        for _ in 0..100 {
            assert_eq!(
                sample(&items, &mut first).unwrap(),
                sample(&items, &mut second).unwrap()
            );
        }
    }

    proptest! {
        #[test]
        fn test_sample_returns_member(weights in prop::collection::vec(1u32..10_000, 1..20), seed in any::<u64>()) {
            let items: Vec<_> = weights
                .iter()
                .enumerate()
                .map(|(index, weight)| WeightedItem::new(index, *weight))
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let index = sample_index(&items, &mut rng).unwrap();
            prop_assert!(index < items.len());
        }
    }
}
