//! # weightedbag
//!
//! A mutable weighted list that draws items in O(1).
//!
//! Items carry positive integer weights. Sampling uses Vose's variant of
//! [Walker's Alias Method](https://en.wikipedia.org/wiki/Alias_method), built
//! in exact integer arithmetic, so an item with weight `w` is drawn with
//! probability exactly `w / total`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use weightedbag::WeightedSampler;
//!
//! # fn main() -> Result<(), weightedbag::WeightError> {
//! let mut loot: WeightedSampler<&str> = WeightedSampler::from_pairs([
//!     ("common", 60),
//!     ("uncommon", 30),
//!     ("rare", 9),
//!     ("legendary", 1),
//! ])?;
//!
//! let tier = loot.sample(); // Option<&&str>
//! loot.set_weight(&"legendary", 5)?;
//! loot.remove(&"common")?;
//! # Ok(()) }
//! ```
//!
//! ## Enum + macro
//!
//! ```rust,ignore
//! use weightedbag::WeightedEnum;
//!
//! #[derive(Copy, Clone, Debug, PartialEq, WeightedEnum)]
//! enum Loot {
//!     #[weight(60)] Common,
//!     #[weight(30)] Uncommon,
//!     #[weight(9)]  Rare,
//!     #[weight(1)]  Legendary,
//! }
//!
//! # fn main() -> Result<(), weightedbag::WeightError> {
//! let mut table = Loot::sampler()?;
//! let item = table.sample_owned(); // Option<Loot>
//! # Ok(()) }
//! ```
//!
//! ## Performance
//! * **Mutation**: every change rebuilds the table, O(n). Use
//!   [`WeightedSampler::from_pairs`] or [`WeightedSampler::add_batch`] to load
//!   many items with one rebuild.
//! * **Sample**: O(1) per draw (2 random integers, 1 branch); 1 integer when
//!   all weights are equal.
//! * **Space**: items, weights, thresholds and aliases, each of length `n`.
//!
//! ## Gotchas
//! * Non-positive weights are clamped to `1` by default. Switch to
//!   [`BadWeightPolicy::ThrowOnAdd`] to get [`WeightError::InvalidWeight`]
//!   instead.
//! * The total weight must fit the weight type `W` (default `i32`); pick
//!   `i64` for large totals.
//! * Not thread-safe; guard with a lock for shared use.

mod alias;
mod error;
mod sampler;
mod weight;

/// A minimal interface for "index samplers".
#[allow(clippy::len_without_is_empty)]
pub trait IndexSampler {
    fn len(&self) -> usize;
    fn sample_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> usize;
}

pub use alias::AliasTable;
pub use error::WeightError;
pub use sampler::WeightedSampler;
pub use weight::{BadWeightPolicy, Weight};

/// Derive macro imported from `weightedbag_macros`.
/// See the crate-level example for usage.
pub use weightedbag_macros::WeightedEnum;

/// Trait implemented by the `WeightedEnum` derive macro.
///
/// Each variant and its weight is exposed via [`WeightedEnum::ENTRIES`],
/// which enables building a ready-to-sample [`WeightedSampler`].
///
/// Each `#[weight(...)]` must be a constant expression of type `i32`:
///
/// ```
/// use weightedbag::WeightedEnum;
///
/// #[derive(Copy, Clone, Debug, PartialEq, WeightedEnum)]
/// enum Drop {
///     #[weight(i32::MAX / 2)]
///     Big,
///     #[weight(3 * 4)]
///     Small,
/// }
///
/// assert_eq!(Drop::ENTRIES[0].1, i32::MAX / 2);
/// assert_eq!(Drop::ENTRIES[1].1, 12);
/// ```
///
/// A value that does not fit `i32` is rejected at compile time rather than
/// wrapped:
///
/// ```compile_fail
/// use weightedbag::WeightedEnum;
///
/// #[derive(Copy, Clone, PartialEq, WeightedEnum)]
/// enum Drop {
///     #[weight(3_000_000_000u64)]
///     Huge,
/// }
/// ```
///
/// So is a fractional weight:
///
/// ```compile_fail
/// use weightedbag::WeightedEnum;
///
/// #[derive(Copy, Clone, PartialEq, WeightedEnum)]
/// enum Drop {
///     #[weight(2.9)]
///     Frac,
/// }
/// ```
pub trait WeightedEnum: Sized + 'static {
    /// All `(variant, weight)` pairs for the enum.
    const ENTRIES: &'static [(Self, i32)];

    /// Convenience constructor that loads every entry with one rebuild.
    ///
    /// # Errors
    /// [`WeightError::Overflow`] if the weights sum past `i32::MAX`.
    fn sampler() -> Result<WeightedSampler<Self>, WeightError>
    where
        Self: Copy,
    {
        WeightedSampler::from_pairs(Self::ENTRIES.iter().copied())
    }
}
