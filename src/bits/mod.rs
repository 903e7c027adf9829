//! Bit width calculation
//!
//! Width b = smallest value with 2^b > count
//! Id 0 is the implicit idle value, ids 1..=count are real entries.

mod channels;

pub use channels::{all_assignments, ChannelAssignment};

use std::fmt;

use crate::{Result, SyncError};

/// Widest tree supported (ids are carried as `u32`)
pub const MAX_BIT_WIDTH: usize = 31;

/// Minimum number of boolean channels needed for `count` ids plus idle
///
/// Returns one more than the bit length of `count`, with a floor of one bit
/// so that `count = 0` still yields a (degenerate) single-channel encoding.
pub fn minimum_bits(count: i64) -> Result<usize> {
    if count < 0 {
        return Err(SyncError::invalid_argument(format!(
            "count must be non-negative, got {count}"
        )));
    }
    let bit_length = (u64::BITS - (count as u64).leading_zeros()) as usize;
    Ok(bit_length.max(1))
}

/// Validated number of channels in an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitWidth(usize);

impl BitWidth {
    /// Wrap an explicit width, rejecting `0` and anything above [`MAX_BIT_WIDTH`]
    pub fn new(bits: usize) -> Result<Self> {
        if bits == 0 {
            return Err(SyncError::invalid_argument("bit width must be > 0"));
        }
        if bits > MAX_BIT_WIDTH {
            return Err(SyncError::invalid_argument(format!(
                "bit width {bits} exceeds maximum of {MAX_BIT_WIDTH}"
            )));
        }
        Ok(Self(bits))
    }

    /// Width needed to address `count` entries plus idle
    pub fn for_count(count: usize) -> Result<Self> {
        let count = i64::try_from(count)
            .map_err(|_| SyncError::invalid_argument(format!("count {count} too large")))?;
        Self::new(minimum_bits(count)?)
    }

    /// Raw number of bits
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of distinct ids (leaves) this width addresses: 2^b
    #[inline]
    pub fn capacity(self) -> usize {
        1usize << self.0
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bit", self.0)?;
        if self.0 != 1 {
            write!(f, "s")?;
        }
        Ok(())
    }
}
