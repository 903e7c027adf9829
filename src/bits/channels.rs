//! Live values of the boolean channels
//!
//! Channel j carries bit j of the id (channel 0 = least significant).
//! Trees read these MSB-first: depth d tests channel b - d - 1.

use std::fmt;

use bitvec::prelude::*;

use super::MAX_BIT_WIDTH;
use crate::{Result, SyncError};

/// One value per channel, indexed by bit position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelAssignment {
    bits: BitVec,
}

impl ChannelAssignment {
    /// All channels off (the idle id)
    pub fn zeroed(width: usize) -> Result<Self> {
        check_width(width)?;
        Ok(Self {
            bits: bitvec![0; width],
        })
    }

    /// Flag pattern encoding `id` over `width` channels
    pub fn from_id(id: u32, width: usize) -> Result<Self> {
        check_width(width)?;
        if u64::from(id) >= 1u64 << width {
            return Err(SyncError::invalid_argument(format!(
                "id {id} does not fit in {width} channels"
            )));
        }
        Ok(Self::encode(id, width))
    }

    /// Build from per-channel flags, channel 0 first
    pub fn from_flags<I>(flags: I) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let bits: BitVec = flags.into_iter().collect();
        check_width(bits.len())?;
        Ok(Self { bits })
    }

    /// Caller guarantees `width` is in range and `id < 2^width`
    pub(crate) fn encode(id: u32, width: usize) -> Self {
        let mut bits = bitvec![0; width];
        for channel in 0..width {
            bits.set(channel, id & (1 << channel) != 0);
        }
        Self { bits }
    }

    /// Number of channels
    #[inline]
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Value of one channel; channels past the width read as `false`
    #[inline]
    pub fn flag(&self, channel: usize) -> bool {
        self.bits.get(channel).map(|bit| *bit).unwrap_or(false)
    }

    /// Overwrite one channel; fails for channels past the width
    pub fn set(&mut self, channel: usize, value: bool) -> Result<()> {
        if channel >= self.width() {
            return Err(SyncError::invalid_argument(format!(
                "channel {channel} outside width {}",
                self.width()
            )));
        }
        self.bits.set(channel, value);
        Ok(())
    }

    /// Integer formed by the channels
    pub fn id(&self) -> u32 {
        self.bits
            .iter()
            .by_vals()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .fold(0u32, |acc, (channel, _)| acc | (1 << channel))
    }

    /// True when every channel is off
    pub fn is_zeroed(&self) -> bool {
        self.bits.not_any()
    }

    /// Channel values, channel 0 first
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }
}

impl fmt::Display for ChannelAssignment {
    /// Most significant channel first, like a binary literal
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().by_vals().rev() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

fn check_width(width: usize) -> Result<()> {
    if width == 0 || width > MAX_BIT_WIDTH {
        return Err(SyncError::invalid_argument(format!(
            "channel width {width} outside 1..={MAX_BIT_WIDTH}"
        )));
    }
    Ok(())
}

/// Every assignment of `width` channels in ascending id order
pub fn all_assignments(width: usize) -> Result<impl Iterator<Item = ChannelAssignment>> {
    check_width(width)?;
    let capacity = 1u32 << width;
    Ok((0..capacity).map(move |id| ChannelAssignment::encode(id, width)))
}
