//! Predicates over live channel values
//!
//! Integer forms read the id the channels spell out, boolean forms read a
//! single channel. Both evaluate against the same [`ChannelAssignment`].

use std::fmt;
use std::sync::Arc;

use crate::bits::ChannelAssignment;

/// Condition a consumer attaches to a route or transition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Integer parameter is strictly below `value`
    IntLessThan {
        /// Parameter name
        parameter: Arc<str>,
        /// Exclusive upper bound
        value: u32,
    },

    /// Integer parameter equals `value`
    IntEquals {
        /// Parameter name
        parameter: Arc<str>,
        /// Expected value
        value: u32,
    },

    /// Integer parameter differs from `value`
    IntNotEquals {
        /// Parameter name
        parameter: Arc<str>,
        /// Rejected value
        value: u32,
    },

    /// One boolean channel has the given value
    BoolIs {
        /// Parameter name
        parameter: Arc<str>,
        /// Bit position the parameter carries
        channel: usize,
        /// Expected value
        value: bool,
    },

    /// Every inner condition holds (empty = true)
    All(Vec<Condition>),

    /// At least one inner condition holds (empty = false)
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate against the current channel values
    pub fn evaluate(&self, channels: &ChannelAssignment) -> bool {
        match self {
            Condition::IntLessThan { value, .. } => channels.id() < *value,
            Condition::IntEquals { value, .. } => channels.id() == *value,
            Condition::IntNotEquals { value, .. } => channels.id() != *value,
            Condition::BoolIs { channel, value, .. } => channels.flag(*channel) == *value,
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(channels)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(channels)),
        }
    }

    /// Number of leaf predicates (a conjunction over b flags has b terms)
    pub fn term_count(&self) -> usize {
        match self {
            Condition::All(conditions) | Condition::Any(conditions) => {
                conditions.iter().map(Condition::term_count).sum()
            }
            _ => 1,
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Condition::All(_) | Condition::Any(_))
    }

    fn fmt_joined(f: &mut fmt::Formatter<'_>, conditions: &[Condition], op: &str) -> fmt::Result {
        for (i, condition) in conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " {op} ")?;
            }
            if condition.is_compound() {
                write!(f, "({condition})")?;
            } else {
                write!(f, "{condition}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::IntLessThan { parameter, value } => write!(f, "{parameter} < {value}"),
            Condition::IntEquals { parameter, value } => write!(f, "{parameter} == {value}"),
            Condition::IntNotEquals { parameter, value } => write!(f, "{parameter} != {value}"),
            Condition::BoolIs {
                parameter, value, ..
            } => write!(f, "{parameter} == {value}"),
            Condition::All(conditions) if conditions.is_empty() => write!(f, "true"),
            Condition::Any(conditions) if conditions.is_empty() => write!(f, "false"),
            Condition::All(conditions) => Self::fmt_joined(f, conditions, "&&"),
            Condition::Any(conditions) => Self::fmt_joined(f, conditions, "||"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(channel: usize, value: bool) -> Condition {
        Condition::BoolIs {
            parameter: Arc::from(format!("Bit{channel}")),
            channel,
            value,
        }
    }

    #[test]
    fn test_int_conditions_read_id() {
        let channels = ChannelAssignment::from_id(5, 3).unwrap();
        let parameter: Arc<str> = Arc::from("Anim");

        assert!(Condition::IntLessThan { parameter: parameter.clone(), value: 6 }.evaluate(&channels));
        assert!(!Condition::IntLessThan { parameter: parameter.clone(), value: 5 }.evaluate(&channels));
        assert!(Condition::IntEquals { parameter: parameter.clone(), value: 5 }.evaluate(&channels));
        assert!(Condition::IntNotEquals { parameter, value: 4 }.evaluate(&channels));
    }

    #[test]
    fn test_bool_conditions_read_single_channel() {
        let channels = ChannelAssignment::from_id(0b010, 3).unwrap();
        assert!(flag(1, true).evaluate(&channels));
        assert!(flag(0, false).evaluate(&channels));
        assert!(!flag(2, true).evaluate(&channels));
    }

    #[test]
    fn test_empty_compounds() {
        let channels = ChannelAssignment::zeroed(2).unwrap();
        assert!(Condition::All(vec![]).evaluate(&channels));
        assert!(!Condition::Any(vec![]).evaluate(&channels));
    }

    #[test]
    fn test_display() {
        let all = Condition::All(vec![flag(0, true), flag(1, false)]);
        assert_eq!(all.to_string(), "Bit0 == true && Bit1 == false");

        let nested = Condition::Any(vec![all.clone(), flag(2, true)]);
        assert_eq!(
            nested.to_string(),
            "(Bit0 == true && Bit1 == false) || Bit2 == true"
        );
        assert_eq!(nested.term_count(), 3);
    }
}
