//! Amount arithmetic helpers.
//!
//! Amounts are plain `u64` sats. Totals over attacker-sized inputs use
//! checked arithmetic so overflow surfaces as an error instead of wrapping.

use crate::error::MixError;

/// Sum a sequence of amounts, failing on overflow.
pub fn checked_total<'a, I>(amounts: I) -> Result<u64, MixError>
where
    I: IntoIterator<Item = &'a u64>,
{
    amounts
        .into_iter()
        .try_fold(0u64, |acc, &a| acc.checked_add(a))
        .ok_or(MixError::ArithmeticOverflow)
}

/// Sum a sequence of amount groups, failing on overflow.
pub fn checked_group_total(groups: &[Vec<u64>]) -> Result<u64, MixError> {
    groups
        .iter()
        .try_fold(0u64, |acc, g| {
            let group = checked_total(g).ok()?;
            acc.checked_add(group)
        })
        .ok_or(MixError::ArithmeticOverflow)
}
