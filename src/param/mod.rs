//! Decision parameters
//!
//! A decision parameter is the encoding state at one node of the tree:
//!   id    = bits fixed by ancestors (0 at the root)
//!   depth = number of bits fixed so far (bit_count only at leaves)
//!
//! At depth d the reachable ids form [id, id + 2^(b-d)).
//! Descending into 0 keeps the lower half, 1 sets bit b-d-1.

mod condition;

pub use condition::Condition;

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::bits::{ChannelAssignment, MAX_BIT_WIDTH};
use crate::{Result, SyncError};

/// Child of an internal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Next bit is 0 (lower half of the range)
    Zero,

    /// Next bit is 1 (upper half of the range)
    One,
}

impl Branch {
    /// Both branches in canonical enumeration order
    pub const ORDER: [Branch; 2] = [Branch::Zero, Branch::One];

    /// Bit value of the branch
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Branch::Zero => 0,
            Branch::One => 1,
        }
    }
}

/// How the id is carried by the host's parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Single integer parameter, compared by value (local side)
    Int {
        /// Parameter name
        parameter: Arc<str>,
    },

    /// One boolean parameter per bit, tested directly (networked side)
    BoolGroup {
        /// Parameter names, index j carries bit j
        parameters: Arc<[Arc<str>]>,
    },
}

/// Immutable per-node state carried down the decision tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionParameter {
    encoding: Encoding,
    bit_count: usize,
    id: u32,
    depth: usize,
}

impl DecisionParameter {
    /// Root parameter backed by a single integer parameter
    pub fn int(parameter: impl Into<Arc<str>>, bit_count: usize) -> Result<Self> {
        Self::root(
            Encoding::Int {
                parameter: parameter.into(),
            },
            bit_count,
        )
    }

    /// Root parameter backed by one boolean parameter per bit
    pub fn bool_group<I, S>(parameters: I, bit_count: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let parameters: Arc<[Arc<str>]> = parameters.into_iter().map(Into::into).collect();
        Self::root(Encoding::BoolGroup { parameters }, bit_count)
    }

    /// Root parameter for an arbitrary encoding
    pub fn root(encoding: Encoding, bit_count: usize) -> Result<Self> {
        if bit_count == 0 {
            return Err(SyncError::invalid_argument("bit count must be > 0"));
        }
        if bit_count > MAX_BIT_WIDTH {
            return Err(SyncError::invalid_argument(format!(
                "bit count {bit_count} exceeds maximum of {MAX_BIT_WIDTH}"
            )));
        }
        if let Encoding::BoolGroup { parameters } = &encoding {
            if parameters.len() != bit_count {
                return Err(SyncError::invalid_argument(format!(
                    "bool group has {} parameters for {} bits",
                    parameters.len(),
                    bit_count
                )));
            }
        }
        Ok(Self {
            encoding,
            bit_count,
            id: 0,
            depth: 0,
        })
    }

    /// Total tree depth
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Id accumulated from the bits fixed so far
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Number of bits fixed so far
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Parameter encoding
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// True once every bit is fixed
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.depth == self.bit_count
    }

    /// Ids still reachable from this node: [id, id + 2^(b-d))
    pub fn range(&self) -> Range<u32> {
        let span = 1u64 << (self.bit_count - self.depth);
        // bit_count <= 31 keeps the end within u32
        self.id..(u64::from(self.id) + span) as u32
    }

    /// Channel tested at this depth: b - d - 1 (most significant remaining bit)
    pub fn bit_index(&self) -> Result<usize> {
        if self.is_leaf() {
            return Err(SyncError::invalid_state(format!(
                "leaf {} has no remaining bits",
                self.id
            )));
        }
        Ok(self.bit_count - self.depth - 1)
    }

    /// Predicate routing into the 0-branch at this depth
    ///
    /// Int: value below the midpoint of the current range.
    /// Bool group: the tested channel is off.
    pub fn is_zero_branch(&self) -> Result<Condition> {
        let bit_index = self.bit_index()?;
        Ok(match &self.encoding {
            Encoding::Int { parameter } => Condition::IntLessThan {
                parameter: Arc::clone(parameter),
                value: self.id | (1 << bit_index),
            },
            Encoding::BoolGroup { parameters } => Condition::BoolIs {
                parameter: Arc::clone(&parameters[bit_index]),
                channel: bit_index,
                value: false,
            },
        })
    }

    /// Copy of this parameter one level down the given branch
    pub fn descend(&self, branch: Branch) -> Result<Self> {
        let bit_index = self.bit_index()?;
        let mut child = self.clone();
        child.depth += 1;
        if branch == Branch::One {
            child.id |= 1 << bit_index;
        }
        Ok(child)
    }

    /// Both children in canonical order
    pub fn children(&self) -> Result<(Self, Self)> {
        Ok((self.descend(Branch::Zero)?, self.descend(Branch::One)?))
    }

    /// Channels match this id exactly
    pub fn entry_condition(&self) -> Condition {
        match &self.encoding {
            Encoding::Int { parameter } => Condition::IntEquals {
                parameter: Arc::clone(parameter),
                value: self.id,
            },
            Encoding::BoolGroup { parameters } => Condition::All(
                self.flag_terms(parameters, |expected| expected),
            ),
        }
    }

    /// At least one channel differs from this id
    pub fn exit_condition(&self) -> Condition {
        match &self.encoding {
            Encoding::Int { parameter } => Condition::IntNotEquals {
                parameter: Arc::clone(parameter),
                value: self.id,
            },
            Encoding::BoolGroup { parameters } => Condition::Any(
                self.flag_terms(parameters, |expected| !expected),
            ),
        }
    }

    /// Every channel is off (idle)
    pub fn idle_condition(&self) -> Condition {
        match &self.encoding {
            Encoding::Int { parameter } => Condition::IntEquals {
                parameter: Arc::clone(parameter),
                value: 0,
            },
            Encoding::BoolGroup { parameters } => Condition::All(
                Self::constant_terms(parameters, false),
            ),
        }
    }

    /// Some channel is on
    pub fn active_condition(&self) -> Condition {
        match &self.encoding {
            Encoding::Int { parameter } => Condition::IntNotEquals {
                parameter: Arc::clone(parameter),
                value: 0,
            },
            Encoding::BoolGroup { parameters } => Condition::Any(
                Self::constant_terms(parameters, true),
            ),
        }
    }

    /// Flag pattern of the accumulated id, one value per channel
    pub fn bits(&self) -> ChannelAssignment {
        // bit_count and id are range-checked at construction
        ChannelAssignment::encode(self.id, self.bit_count)
    }

    fn flag_terms(
        &self,
        parameters: &[Arc<str>],
        expect: impl Fn(bool) -> bool,
    ) -> Vec<Condition> {
        parameters
            .iter()
            .enumerate()
            .map(|(channel, parameter)| Condition::BoolIs {
                parameter: Arc::clone(parameter),
                channel,
                value: expect(self.id & (1 << channel) != 0),
            })
            .collect()
    }

    fn constant_terms(parameters: &[Arc<str>], value: bool) -> Vec<Condition> {
        parameters
            .iter()
            .enumerate()
            .map(|(channel, parameter)| Condition::BoolIs {
                parameter: Arc::clone(parameter),
                channel,
                value,
            })
            .collect()
    }
}

impl fmt::Display for DecisionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            write!(f, "[{}]", self.id)
        } else {
            let range = self.range();
            write!(f, "[{}, {})@{}", range.start, range.end, self.depth)
        }
    }
}
