//! Vose's variant of Walker's alias method, in exact integer arithmetic.

use rand::Rng;

use crate::IndexSampler;
use crate::error::WeightError;
use crate::weight::Weight;

/// Sum, minimum and maximum of a weight sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WeightStats<W> {
    pub total: W,
    pub min: W,
    pub max: W,
}

impl<W: Weight> WeightStats<W> {
    /// All zero for an empty slice. Fails if the total does not fit `W`.
    pub fn of(weights: &[W]) -> Result<Self, WeightError> {
        let Some(&first) = weights.first() else {
            return Ok(Self {
                total: W::ZERO,
                min: W::ZERO,
                max: W::ZERO,
            });
        };
        let mut total = 0i128;
        let (mut min, mut max) = (first, first);
        for &w in weights {
            total += w.to_wide();
            min = min.min(w);
            max = max.max(w);
        }
        let total = W::from_wide(total).ok_or(WeightError::Overflow)?;
        Ok(Self { total, min, max })
    }
}

/// Alias table for discrete distribution sampling.
///
/// Bucket `i` returns `i` with probability `threshold[i] / total` and
/// `alias[i]` otherwise. Every threshold lies in `0..=total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable<W> {
    threshold: Vec<W>,
    alias: Vec<usize>,
    total: W,
}

impl<W: Weight> AliasTable<W> {
    /// Construct an alias table from strictly positive weights. O(n).
    ///
    /// The same weights always produce the same table.
    pub fn build(weights: &[W]) -> Result<Self, WeightError> {
        let n = weights.len();
        if n == 0 {
            return Err(WeightError::Empty);
        }
        if let Some(&w) = weights.iter().find(|&&w| w <= W::ZERO) {
            return Err(WeightError::InvalidWeight {
                weight: w.to_wide(),
            });
        }
        let stats = WeightStats::of(weights)?;
        Self::build_with_stats(weights, stats)
    }

    /// [`build`](Self::build) for weights already admitted by the policy,
    /// reusing stats the caller has computed. `weights` must be non-empty and
    /// strictly positive, and `stats` must describe them.
    pub(crate) fn build_with_stats(
        weights: &[W],
        stats: WeightStats<W>,
    ) -> Result<Self, WeightError> {
        let n = weights.len();
        debug_assert!(n > 0 && stats.min > W::ZERO);
        let total = stats.total.to_wide();
        let n_wide = i128::try_from(n).map_err(|_| WeightError::Overflow)?;
        // scaled weights sum to n * total, which bounds every intermediate below
        total.checked_mul(n_wide).ok_or(WeightError::Overflow)?;

        let mut scaled: Vec<i128> = weights.iter().map(|&w| w.to_wide() * n_wide).collect();

        let mut threshold = vec![total; n];
        let mut alias: Vec<usize> = (0..n).collect();

        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);

        for (i, &s) in scaled.iter().enumerate() {
            if s < total {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        while let (Some(&l), Some(&g)) = (small.last(), large.last()) {
            small.pop();
            large.pop();

            threshold[l] = scaled[l]; // in [0, total)
            alias[l] = g;

            scaled[g] += scaled[l] - total;

            if scaled[g] < total {
                small.push(g);
            } else {
                large.push(g);
            }
        }

        // Remaining large buckets keep threshold == total and alias == self.
        if !small.is_empty() {
            tracing::warn!(
                leftover = small.len(),
                "alias construction left small buckets; pinning them to themselves"
            );
            debug_assert!(small.is_empty(), "exact integer alias build left small entries");
        }

        let threshold = threshold
            .into_iter()
            .map(|t| W::from_wide(t).ok_or(WeightError::Overflow))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(len = n, total = %stats.total, "built alias table");
        Ok(Self {
            threshold,
            alias,
            total: stats.total,
        })
    }

    /// Pick the outcome for a bucket that has already been drawn.
    #[inline]
    pub(crate) fn resolve<R: Rng + ?Sized>(&self, bucket: usize, rng: &mut R) -> usize {
        let r = rng.random_range(W::ZERO..self.total);
        if r < self.threshold[bucket] {
            bucket
        } else {
            self.alias[bucket]
        }
    }

    /// Draw a single index in O(1).
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let bucket = rng.random_range(0..self.threshold.len());
        self.resolve(bucket, rng)
    }

    pub fn thresholds(&self) -> &[W] {
        &self.threshold
    }

    pub fn aliases(&self) -> &[usize] {
        &self.alias
    }

    /// Sum of the weights the table was built from.
    pub fn total(&self) -> W {
        self.total
    }

    pub fn len(&self) -> usize {
        self.threshold.len()
    }

    /// Always `false` for a table returned by [`build`](Self::build).
    pub fn is_empty(&self) -> bool {
        self.threshold.is_empty()
    }

    /// Draw k samples, returning counts per index (useful for checks).
    #[cfg(test)]
    pub fn sample_counts<R: Rng + ?Sized>(&self, rng: &mut R, draws: usize) -> Vec<usize> {
        let mut counts = vec![0usize; self.len()];
        for _ in 0..draws {
            counts[self.sample_index(rng)] += 1;
        }
        counts
    }
}

impl<W: Weight> IndexSampler for AliasTable<W> {
    #[inline]
    fn len(&self) -> usize {
        AliasTable::len(self)
    }

    #[inline]
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        AliasTable::sample_index(self, rng)
    }
}
