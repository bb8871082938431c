//! Partitions of a condition's outcome slots.
//!
//! A partition is an ordered list of [`IndexSet`]s used to split collateral (or a parent
//! position) into outcome positions, or to merge those positions back. It is valid for a
//! condition with `n` outcome slots when every member lies inside `0..n`, no slot appears in two
//! members, and every slot appears in some member.
//!
//! ```
//! use conditional_tokens_sdk::ids::IndexSet;
//! use conditional_tokens_sdk::partition::{self, Partition};
//! use conditional_tokens_sdk::types::U256;
//!
//! # fn main() -> conditional_tokens_sdk::Result<()> {
//! let trivial = partition::trivial_partition(3)?;
//! assert!(trivial.is_valid_for(3));
//!
//! let custom = Partition::new(vec![
//!     IndexSet::new(U256::from(0b011))?,
//!     IndexSet::new(U256::from(0b100))?,
//! ]);
//! assert!(custom.is_valid_for(3));
//! # Ok(())
//! # }
//! ```

pub mod editor;

use std::error::Error as StdError;
use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{Error, Kind};
use crate::ids::{IndexSet, MAX_OUTCOME_SLOTS, full_mask};

/// Ordered sequence of index sets over the outcome slots of one condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(Vec<IndexSet>);

impl Partition {
    #[must_use]
    pub const fn new(members: Vec<IndexSet>) -> Self {
        Self(members)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IndexSet] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexSet> {
        self.0.iter()
    }

    /// The union of all members, or `None` for an empty partition.
    #[must_use]
    pub fn union(&self) -> Option<IndexSet> {
        self.0.iter().copied().reduce(|acc, member| acc.union(&member))
    }

    #[must_use]
    pub fn is_valid_for(&self, outcome_slot_count: usize) -> bool {
        is_valid_partition(&self.0, outcome_slot_count)
    }

    pub fn validate_for(
        &self,
        outcome_slot_count: usize,
    ) -> std::result::Result<(), PartitionViolation> {
        validate_partition(&self.0, outcome_slot_count)
    }

    /// Raw `uint256[]` form expected by `splitPosition` and `mergePositions`.
    #[must_use]
    pub fn to_u256_vec(&self) -> Vec<U256> {
        self.0.iter().map(IndexSet::value).collect()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<IndexSet> {
        self.0
    }
}

impl From<Vec<IndexSet>> for Partition {
    fn from(members: Vec<IndexSet>) -> Self {
        Self(members)
    }
}

impl FromIterator<IndexSet> for Partition {
    fn from_iter<T: IntoIterator<Item = IndexSet>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'partition> IntoIterator for &'partition Partition {
    type Item = &'partition IndexSet;
    type IntoIter = std::slice::Iter<'partition, IndexSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Why a sequence of index sets is not a valid partition.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionViolation {
    /// The condition has more outcome slots than an index set can address
    TooManySlots { outcome_slot_count: usize },
    /// The member at this position selects a slot at or above the outcome slot count
    OutOfRange { member: usize },
    /// The member at this position shares a slot with an earlier member
    Overlap { member: usize },
    /// Some outcome slot is not covered by any member
    Incomplete,
}

impl fmt::Display for PartitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManySlots { outcome_slot_count } => write!(
                f,
                "{outcome_slot_count} outcome slots exceed the maximum of {MAX_OUTCOME_SLOTS}"
            ),
            Self::OutOfRange { member } => {
                write!(f, "index set #{member} selects slots outside the condition")
            }
            Self::Overlap { member } => {
                write!(f, "index set #{member} overlaps an earlier index set")
            }
            Self::Incomplete => write!(f, "partition does not cover every outcome slot"),
        }
    }
}

impl StdError for PartitionViolation {}

impl From<PartitionViolation> for Error {
    fn from(err: PartitionViolation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

/// Returns the canonical partition of `outcome_slot_count` singleton index sets, ordered by slot.
///
/// # Errors
///
/// Returns [`Kind::InvalidInput`] if `outcome_slot_count` exceeds [`MAX_OUTCOME_SLOTS`].
pub fn trivial_partition(outcome_slot_count: usize) -> Result<Partition> {
    full_mask(outcome_slot_count)?;

    (0..outcome_slot_count)
        .map(IndexSet::singleton)
        .collect::<Result<Vec<_>>>()
        .map(Partition)
}

/// The index set covering every slot of a condition, i.e. the union of any valid partition.
pub fn full_index_set(outcome_slot_count: usize) -> Result<IndexSet> {
    IndexSet::full(outcome_slot_count)
}

#[must_use]
pub fn is_valid_partition(partition: &[IndexSet], outcome_slot_count: usize) -> bool {
    validate_partition(partition, outcome_slot_count).is_ok()
}

/// Checks that `partition` is in range, pairwise disjoint and complete.
///
/// Runs in a single pass over the members, stopping at the first one that overlaps a slot seen
/// before it.
pub fn validate_partition(
    partition: &[IndexSet],
    outcome_slot_count: usize,
) -> std::result::Result<(), PartitionViolation> {
    let full = full_mask(outcome_slot_count)
        .map_err(|_e| PartitionViolation::TooManySlots { outcome_slot_count })?;

    let mut seen = U256::ZERO;
    for (member, index_set) in partition.iter().enumerate() {
        let bits = index_set.value();

        if !(bits & !full).is_zero() {
            return Err(PartitionViolation::OutOfRange { member });
        }
        if !(bits & seen).is_zero() {
            return Err(PartitionViolation::Overlap { member });
        }

        seen |= bits;
    }

    if seen == full {
        Ok(())
    } else {
        Err(PartitionViolation::Incomplete)
    }
}
