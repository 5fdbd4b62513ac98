use thiserror::Error;

/// Everything that can go wrong while admitting weights or editing a sampler.
///
/// A mutation that returns an error has not touched the sampler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeightError {
    /// A non-positive weight was offered under [`BadWeightPolicy::ThrowOnAdd`],
    /// or a bulk delta would push some weight to zero or below.
    ///
    /// [`BadWeightPolicy::ThrowOnAdd`]: crate::BadWeightPolicy::ThrowOnAdd
    #[error("weight must be positive, got {weight}")]
    InvalidWeight { weight: i128 },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("item not found")]
    ItemNotFound,

    /// The total weight (or a scaled weight) does not fit the chosen width.
    #[error("weight arithmetic overflowed the weight type")]
    Overflow,

    /// An alias table was requested for zero weights.
    #[error("weights slice is empty")]
    Empty,
}
