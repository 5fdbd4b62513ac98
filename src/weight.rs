//! Integer weight types and the bad-weight admission policy.

use std::fmt;

use rand::distr::uniform::SampleUniform;

use crate::error::WeightError;

/// An integer type usable as a weight.
///
/// The width is a compile-time choice: a wider type raises the ceiling on the
/// total weight at the cost of memory per slot. Table construction always runs
/// in an `i128` accumulator, so only the total itself has to fit in `Self`.
pub trait Weight:
    Copy + Ord + Default + fmt::Debug + fmt::Display + SampleUniform + 'static
{
    const ZERO: Self;
    const ONE: Self;

    fn to_wide(self) -> i128;

    /// `None` if `wide` does not fit.
    fn from_wide(wide: i128) -> Option<Self>;
}

macro_rules! impl_weight {
    ($($t:ty),* $(,)?) => {
        $(
            impl Weight for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn to_wide(self) -> i128 {
                    i128::from(self)
                }

                #[inline]
                fn from_wide(wide: i128) -> Option<Self> {
                    <$t>::try_from(wide).ok()
                }
            }
        )*
    };
}

impl_weight!(i8, i16, i32, i64);

/// What to do with a weight of zero or less.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BadWeightPolicy {
    /// Quietly store `1` instead.
    #[default]
    SetNonPositiveToOne,
    /// Reject the call with [`WeightError::InvalidWeight`].
    ThrowOnAdd,
}

impl BadWeightPolicy {
    /// Admit a candidate weight.
    ///
    /// Every path that stores a weight goes through here. The candidate is
    /// taken wide so that bulk deltas can be checked before narrowing.
    pub(crate) fn fix_weight<W: Weight>(self, weight: i128) -> Result<W, WeightError> {
        if weight <= 0 {
            return match self {
                BadWeightPolicy::ThrowOnAdd => Err(WeightError::InvalidWeight { weight }),
                BadWeightPolicy::SetNonPositiveToOne => {
                    tracing::debug!(weight, "clamping non-positive weight to 1");
                    Ok(W::ONE)
                }
            };
        }
        W::from_wide(weight).ok_or(WeightError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_clamps() {
        let p = BadWeightPolicy::default();
        assert_eq!(p.fix_weight::<i32>(0), Ok(1));
        assert_eq!(p.fix_weight::<i32>(-5), Ok(1));
        assert_eq!(p.fix_weight::<i32>(7), Ok(7));
    }

    #[test]
    fn throw_policy_rejects_non_positive() {
        let p = BadWeightPolicy::ThrowOnAdd;
        assert_eq!(
            p.fix_weight::<i32>(0),
            Err(WeightError::InvalidWeight { weight: 0 })
        );
        assert_eq!(
            p.fix_weight::<i64>(-5),
            Err(WeightError::InvalidWeight { weight: -5 })
        );
        assert_eq!(p.fix_weight::<i64>(3), Ok(3));
    }

    #[test]
    fn narrowing_overflow_is_reported() {
        let p = BadWeightPolicy::SetNonPositiveToOne;
        assert_eq!(p.fix_weight::<i8>(200), Err(WeightError::Overflow));
        assert_eq!(p.fix_weight::<i8>(127), Ok(127));
    }
}
