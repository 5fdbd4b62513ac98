use std::fmt;
use std::ops::Index;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::alias::{AliasTable, WeightStats};
use crate::error::WeightError;
use crate::weight::{BadWeightPolicy, Weight};

/// A list of items with integer weights that draws items in O(1).
///
/// Items and weights live in two index-aligned vectors. Every mutation
/// rebuilds the alias table from scratch (O(n)) before it returns, so the
/// table never lags behind the weights. Populate in bulk with
/// [`from_pairs`](Self::from_pairs) or [`add_batch`](Self::add_batch) to pay
/// for that rebuild once.
///
/// `W` picks the weight width (default `i32`); `R` is the random source used
/// by [`sample`](Self::sample).
///
/// Not synchronized: wrap it in a lock if several threads need it.
#[derive(Debug, Clone)]
pub struct WeightedSampler<T, W: Weight = i32, R = StdRng> {
    items: Vec<T>,
    weights: Vec<W>,
    // None when empty or when every weight is equal
    table: Option<AliasTable<W>>,
    stats: WeightStats<W>,
    policy: BadWeightPolicy,
    rng: R,
}

/// Aggregates and table derived from one weight sequence, ready to install.
struct Rebuilt<W> {
    stats: WeightStats<W>,
    table: Option<AliasTable<W>>,
}

impl<W: Weight> Rebuilt<W> {
    fn from_weights(weights: &[W]) -> Result<Self, WeightError> {
        let stats = WeightStats::of(weights)?;
        let table = if weights.is_empty() || stats.min == stats.max {
            None
        } else {
            Some(AliasTable::build_with_stats(weights, stats)?)
        };
        tracing::trace!(
            len = weights.len(),
            total = %stats.total,
            min = %stats.min,
            max = %stats.max,
            "rebuilt sampler"
        );
        Ok(Self { stats, table })
    }
}

impl<T, W: Weight> WeightedSampler<T, W, StdRng> {
    /// An empty sampler with an OS-seeded [`StdRng`].
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Build from `(item, weight)` pairs with a single rebuild.
    ///
    /// Weights go through the default [`BadWeightPolicy`], so non-positive
    /// weights become `1`.
    ///
    /// # Errors
    /// [`WeightError::Overflow`] if the total weight does not fit `W`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (T, W)>,
    {
        Self::from_pairs_with_rng(pairs, StdRng::from_os_rng())
    }
}

impl<T, W: Weight> Default for WeightedSampler<T, W, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, W: Weight, R> WeightedSampler<T, W, R> {
    /// An empty sampler drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            items: Vec::new(),
            weights: Vec::new(),
            table: None,
            stats: WeightStats {
                total: W::ZERO,
                min: W::ZERO,
                max: W::ZERO,
            },
            policy: BadWeightPolicy::default(),
            rng,
        }
    }

    /// Like [`from_pairs`](WeightedSampler::from_pairs) with a caller-supplied random source.
    pub fn from_pairs_with_rng<I>(pairs: I, rng: R) -> Result<Self, WeightError>
    where
        I: IntoIterator<Item = (T, W)>,
    {
        let mut sampler = Self::with_rng(rng);
        sampler.add_batch(pairs)?;
        Ok(sampler)
    }

    /// Builder-style [`set_policy`](Self::set_policy).
    pub fn with_policy(mut self, policy: BadWeightPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> BadWeightPolicy {
        self.policy
    }

    /// Takes effect on the next call that accepts a weight.
    pub fn set_policy(&mut self, policy: BadWeightPolicy) {
        self.policy = policy;
    }

    // ---- accessors ----

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_weight(&self) -> W {
        self.stats.total
    }

    /// `0` when empty.
    pub fn min_weight(&self) -> W {
        self.stats.min
    }

    /// `0` when empty.
    pub fn max_weight(&self) -> W {
        self.stats.max
    }

    /// `true` when min and max weight coincide; sampling is then a plain
    /// uniform draw.
    pub fn all_weights_equal(&self) -> bool {
        self.stats.min == self.stats.max
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn weight_at(&self, index: usize) -> Result<W, WeightError> {
        self.weights
            .get(index)
            .copied()
            .ok_or(WeightError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn weights(&self) -> &[W] {
        &self.weights
    }

    /// The current alias table, if one is in use.
    pub fn alias_table(&self) -> Option<&AliasTable<W>> {
        self.table.as_ref()
    }

    /// Items in storage order.
    ///
    /// Changing weights inside the loop is allowed but each change rebuilds
    /// the table, so a loop over `n` items becomes O(n²).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Replace the random source with one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64)
    where
        R: SeedableRng,
    {
        self.rng = R::seed_from_u64(seed);
    }

    // ---- lookups by value ----

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    /// Position of the first item equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.iter().position(|x| x == item)
    }

    pub fn weight_of(&self, item: &T) -> Result<W, WeightError>
    where
        T: PartialEq,
    {
        let index = self.index_of(item).ok_or(WeightError::ItemNotFound)?;
        Ok(self.weights[index])
    }

    // ---- mutation ----

    /// Swap in a weight sequence together with its freshly built table.
    /// Items must already match `weights` in length.
    fn install(&mut self, weights: Vec<W>, rebuilt: Rebuilt<W>) {
        debug_assert_eq!(self.items.len(), weights.len());
        self.weights = weights;
        self.stats = rebuilt.stats;
        self.table = rebuilt.table;
    }

    fn check_index(&self, index: usize, len: usize) -> Result<(), WeightError> {
        if index < len {
            Ok(())
        } else {
            Err(WeightError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    pub fn add(&mut self, item: T, weight: W) -> Result<(), WeightError> {
        self.add_batch([(item, weight)])
    }

    /// Append many pairs; rebuilds once. Nothing is appended if any weight is
    /// rejected.
    pub fn add_batch<I>(&mut self, pairs: I) -> Result<(), WeightError>
    where
        I: IntoIterator<Item = (T, W)>,
    {
        let mut new_items = Vec::new();
        let mut weights = self.weights.clone();
        for (item, w) in pairs {
            weights.push(self.policy.fix_weight(w.to_wide())?);
            new_items.push(item);
        }
        let rebuilt = Rebuilt::from_weights(&weights)?;
        self.items.extend(new_items);
        self.install(weights, rebuilt);
        Ok(())
    }

    /// Insert at `index` in `0..=len`.
    pub fn insert(&mut self, index: usize, item: T, weight: W) -> Result<(), WeightError> {
        self.check_index(index, self.len() + 1)?;
        let w = self.policy.fix_weight(weight.to_wide())?;
        let mut weights = self.weights.clone();
        weights.insert(index, w);
        let rebuilt = Rebuilt::from_weights(&weights)?;
        self.items.insert(index, item);
        self.install(weights, rebuilt);
        Ok(())
    }

    /// Remove the first item equal to `item`, returning it with its weight.
    pub fn remove(&mut self, item: &T) -> Result<(T, W), WeightError>
    where
        T: PartialEq,
    {
        let index = self.index_of(item).ok_or(WeightError::ItemNotFound)?;
        self.remove_at(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<(T, W), WeightError> {
        self.check_index(index, self.len())?;
        let mut weights = self.weights.clone();
        let w = weights.remove(index);
        let rebuilt = Rebuilt::from_weights(&weights)?;
        let item = self.items.remove(index);
        self.install(weights, rebuilt);
        Ok((item, w))
    }

    pub fn set_weight_at(&mut self, index: usize, weight: W) -> Result<(), WeightError> {
        self.check_index(index, self.len())?;
        let w = self.policy.fix_weight(weight.to_wide())?;
        let mut weights = self.weights.clone();
        weights[index] = w;
        let rebuilt = Rebuilt::from_weights(&weights)?;
        self.install(weights, rebuilt);
        Ok(())
    }

    pub fn set_weight(&mut self, item: &T, weight: W) -> Result<(), WeightError>
    where
        T: PartialEq,
    {
        let index = self.index_of(item).ok_or(WeightError::ItemNotFound)?;
        self.set_weight_at(index, weight)
    }

    /// Add `delta` to every weight.
    ///
    /// Under [`BadWeightPolicy::ThrowOnAdd`] the call fails up front if the
    /// current minimum plus `delta` would not be positive.
    pub fn add_weight_to_all(&mut self, delta: W) -> Result<(), WeightError> {
        self.shift_all(delta.to_wide())
    }

    /// Subtract `delta` from every weight; see [`add_weight_to_all`](Self::add_weight_to_all).
    pub fn subtract_weight_from_all(&mut self, delta: W) -> Result<(), WeightError> {
        self.shift_all(-delta.to_wide())
    }

    fn shift_all(&mut self, delta: i128) -> Result<(), WeightError> {
        if self.is_empty() {
            return Ok(());
        }
        if self.policy == BadWeightPolicy::ThrowOnAdd {
            let lowest = self.stats.min.to_wide() + delta;
            if lowest <= 0 {
                return Err(WeightError::InvalidWeight { weight: lowest });
            }
        }
        let weights = self
            .weights
            .iter()
            .map(|w| self.policy.fix_weight(w.to_wide() + delta))
            .collect::<Result<Vec<W>, _>>()?;
        let rebuilt = Rebuilt::from_weights(&weights)?;
        self.install(weights, rebuilt);
        Ok(())
    }

    /// Give every item the same weight.
    pub fn set_weight_of_all(&mut self, weight: W) -> Result<(), WeightError> {
        let w = self.policy.fix_weight(weight.to_wide())?;
        let weights = vec![w; self.len()];
        let rebuilt = Rebuilt::from_weights(&weights)?;
        self.install(weights, rebuilt);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.weights.clear();
        self.table = None;
        self.stats = WeightStats {
            total: W::ZERO,
            min: W::ZERO,
            max: W::ZERO,
        };
    }

    // ---- sampling ----

    fn draw_index<Q: Rng + ?Sized>(
        len: usize,
        table: Option<&AliasTable<W>>,
        rng: &mut Q,
    ) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let bucket = rng.random_range(0..len);
        Some(match table {
            Some(table) => table.resolve(bucket, rng),
            // all weights tied
            None => bucket,
        })
    }

    /// Sample an item **by reference** with an external random source.
    /// `None` when empty.
    pub fn sample_with<Q: Rng + ?Sized>(&self, rng: &mut Q) -> Option<&T> {
        let i = Self::draw_index(self.len(), self.table.as_ref(), rng)?;
        Some(&self.items[i])
    }

    /// Draw an index with an external random source. `None` when empty.
    pub fn sample_index_with<Q: Rng + ?Sized>(&self, rng: &mut Q) -> Option<usize> {
        Self::draw_index(self.len(), self.table.as_ref(), rng)
    }
}

impl<T, W: Weight, R: Rng> WeightedSampler<T, W, R> {
    /// Draw an item using the sampler's own random source. O(1).
    ///
    /// Returns `None` when the sampler is empty.
    pub fn sample(&mut self) -> Option<&T> {
        let i = Self::draw_index(self.items.len(), self.table.as_ref(), &mut self.rng)?;
        Some(&self.items[i])
    }

    /// Sample an item **by value** (clones the chosen element).
    ///
    /// Prefer [`sample`](Self::sample) if you don't need ownership.
    pub fn sample_owned(&mut self) -> Option<T>
    where
        T: Clone,
    {
        self.sample().cloned()
    }
}

impl<T, W: Weight, R> Index<usize> for WeightedSampler<T, W, R> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T, W: Weight, R> IntoIterator for &'a WeightedSampler<T, W, R> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `WeightedSampler<type>: Total:.. Min:.. Max:.. Count:.. {item:weight, ...}`
impl<T: fmt::Display, W: Weight, R> fmt::Display for WeightedSampler<T, W, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WeightedSampler<{}>: Total:{} Min:{} Max:{} Count:{} {{",
            std::any::type_name::<T>(),
            self.stats.total,
            self.stats.min,
            self.stats.max,
            self.len()
        )?;
        for (i, (item, w)) in self.items.iter().zip(&self.weights).enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}:{w}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_pcg::Pcg32;

    fn abc() -> WeightedSampler<&'static str, i32, Pcg32> {
        WeightedSampler::from_pairs_with_rng(
            [("a", 1), ("b", 1), ("c", 1)],
            Pcg32::seed_from_u64(1),
        )
        .unwrap()
    }

    #[test]
    fn round_trip_pairs() {
        let s: WeightedSampler<&str> = WeightedSampler::from_pairs([("a", 10), ("b", 20)]).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.total_weight(), 30);
        assert_eq!(s.weight_of(&"a"), Ok(10));
        assert_eq!(s.weight_of(&"b"), Ok(20));
        assert_eq!((s.min_weight(), s.max_weight()), (10, 20));
        assert!(s.alias_table().is_some());
    }

    #[test]
    fn remove_at_middle() {
        let mut s = abc();
        assert_eq!(s.remove_at(1), Ok(("b", 1)));
        assert_eq!(s.items(), &["a", "c"]);
        assert_eq!(s.weights(), &[1, 1]);
        assert_eq!(s.total_weight(), 2);
    }

    #[test]
    fn remove_missing_item_is_an_error() {
        let mut s = abc();
        assert_eq!(s.remove(&"z"), Err(WeightError::ItemNotFound));
        assert_eq!(s.len(), 3);
        assert_eq!(s.remove(&"c"), Ok(("c", 1)));
        assert!(!s.contains(&"c"));
    }

    #[test]
    fn clamp_under_default_policy() {
        let mut s = WeightedSampler::<&str, i32, _>::with_rng(Pcg32::seed_from_u64(3));
        s.add("zero", 0).unwrap();
        s.add("neg", -5).unwrap();
        assert_eq!(s.weights(), &[1, 1]);
        assert_eq!(s.total_weight(), 2);
    }

    #[test]
    fn throw_policy_rejects_without_change() {
        let mut s = abc().with_policy(BadWeightPolicy::ThrowOnAdd);
        assert_eq!(s.add("d", 0), Err(WeightError::InvalidWeight { weight: 0 }));
        assert_eq!(s.add("d", -5), Err(WeightError::InvalidWeight { weight: -5 }));
        assert_eq!(
            s.add_batch([("d", 2), ("e", 0)]),
            Err(WeightError::InvalidWeight { weight: 0 })
        );
        assert_eq!(
            s.insert(0, "d", -1),
            Err(WeightError::InvalidWeight { weight: -1 })
        );
        assert_eq!(
            s.set_weight_at(0, 0),
            Err(WeightError::InvalidWeight { weight: 0 })
        );
        assert_eq!(s.len(), 3);
        assert_eq!(s.weights(), &[1, 1, 1]);
    }

    #[test]
    fn bulk_subtract_is_all_or_nothing() {
        let mut s = WeightedSampler::from_pairs_with_rng(
            [("a", 1), ("b", 3), ("c", 5)],
            Pcg32::seed_from_u64(9),
        )
        .unwrap()
        .with_policy(BadWeightPolicy::ThrowOnAdd);

        assert_eq!(
            s.subtract_weight_from_all(5),
            Err(WeightError::InvalidWeight { weight: -4 })
        );
        assert_eq!(s.weights(), &[1, 3, 5]);
        assert_eq!(s.subtract_weight_from_all(1), Err(WeightError::InvalidWeight { weight: 0 }));

        s.subtract_weight_from_all(0).unwrap();
        assert_eq!(s.weights(), &[1, 3, 5]);

        s.add_weight_to_all(2).unwrap();
        assert_eq!(s.weights(), &[3, 5, 7]);
        assert_eq!(s.total_weight(), 15);
    }

    #[test]
    fn bulk_subtract_clamps_under_default_policy() {
        let mut s = WeightedSampler::from_pairs_with_rng(
            [("a", 1), ("b", 3), ("c", 5)],
            Pcg32::seed_from_u64(9),
        )
        .unwrap();
        s.subtract_weight_from_all(3).unwrap();
        assert_eq!(s.weights(), &[1, 1, 2]);
        assert_eq!((s.min_weight(), s.max_weight(), s.total_weight()), (1, 2, 4));
    }

    #[test]
    fn set_weight_of_all_goes_uniform() {
        let mut s = WeightedSampler::from_pairs_with_rng(
            [("a", 1), ("b", 3)],
            Pcg32::seed_from_u64(2),
        )
        .unwrap();
        assert!(!s.all_weights_equal());
        s.set_weight_of_all(4).unwrap();
        assert!(s.all_weights_equal());
        assert!(s.alias_table().is_none());
        assert_eq!(s.total_weight(), 8);
    }

    #[test]
    fn insert_bounds() {
        let mut s = abc();
        assert_eq!(
            s.insert(4, "x", 1),
            Err(WeightError::IndexOutOfRange { index: 4, len: 3 })
        );
        s.insert(3, "d", 4).unwrap();
        s.insert(0, "z", 2).unwrap();
        assert_eq!(s.items(), &["z", "a", "b", "c", "d"]);
        assert_eq!(s.index_of(&"d"), Some(4));
        assert_eq!(s.weight_at(4), Ok(4));
        assert_eq!(
            s.remove_at(5),
            Err(WeightError::IndexOutOfRange { index: 5, len: 5 })
        );
    }

    #[test]
    fn weight_index_bounds() {
        let mut s = abc();
        assert_eq!(
            s.set_weight_at(3, 2),
            Err(WeightError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            s.weight_at(3),
            Err(WeightError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(s.weights(), &[1, 1, 1]);
        s.set_weight_at(2, 6).unwrap();
        assert_eq!(s.weight_at(2), Ok(6));
    }

    #[test]
    fn set_weight_by_item() {
        let mut s = abc();
        s.set_weight(&"b", 8).unwrap();
        assert_eq!(s.weight_of(&"b"), Ok(8));
        assert_eq!(s.total_weight(), 10);
        assert_eq!(s.set_weight(&"q", 8), Err(WeightError::ItemNotFound));
    }

    #[test]
    fn overflow_leaves_state_untouched() {
        let mut s = WeightedSampler::<&str, i8, _>::with_rng(Pcg32::seed_from_u64(4));
        s.add("a", 100).unwrap();
        assert_eq!(s.add("b", 100), Err(WeightError::Overflow));
        assert_eq!(s.len(), 1);
        assert_eq!(s.total_weight(), 100);
    }

    #[test]
    fn empty_sampling_returns_none() {
        let mut s = abc();
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.total_weight(), 0);
        assert_eq!((s.min_weight(), s.max_weight()), (0, 0));
        assert_eq!(s.sample(), None);
        assert_eq!(s.sample_owned(), None);
    }

    #[test]
    fn sampling_skips_table_when_uniform() {
        let mut s = abc();
        assert!(s.all_weights_equal());
        assert!(s.alias_table().is_none());
        for _ in 0..100 {
            assert!(s.sample().is_some());
        }
    }

    #[test]
    fn reseed_repeats_sequence() {
        let mut a = WeightedSampler::from_pairs_with_rng(
            [(1u8, 1), (2, 5), (3, 9)],
            Pcg32::seed_from_u64(100),
        )
        .unwrap();
        let mut b = a.clone();
        a.reseed(7);
        b.reseed(7);
        let xs: Vec<u8> = (0..50).filter_map(|_| a.sample_owned()).collect();
        let ys: Vec<u8> = (0..50).filter_map(|_| b.sample_owned()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn external_and_owned_sources_agree_when_seeded_alike() {
        let mut s = WeightedSampler::from_pairs_with_rng(
            [('x', 2), ('y', 3), ('z', 11)],
            Pcg32::seed_from_u64(5),
        )
        .unwrap();
        let mut ext = Pcg32::seed_from_u64(5);
        for _ in 0..20 {
            let i = s.sample_index_with(&mut ext).unwrap();
            let expected = s.items()[i];
            assert_eq!(s.sample_owned(), Some(expected));
        }
        // the owned source can also be driven directly
        let _: u32 = s.rng_mut().random();
    }

    #[test]
    fn summary_lists_items() {
        let s = WeightedSampler::from_pairs_with_rng(
            [("a", 10), ("b", 20)],
            Pcg32::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(
            s.to_string(),
            "WeightedSampler<&str>: Total:30 Min:10 Max:20 Count:2 {a:10, b:20}"
        );
    }

    #[test]
    fn iteration_is_storage_order() {
        let s = abc();
        let seen: Vec<_> = s.iter().copied().collect();
        assert_eq!(seen, ["a", "b", "c"]);
        let again: Vec<_> = (&s).into_iter().copied().collect();
        assert_eq!(seen, again);
        assert_eq!(s[2], "c");
        assert_eq!(s.get(3), None);
    }
}
