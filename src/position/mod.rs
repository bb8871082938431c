//! Positions and the rules for merging them.
//!
//! A [`Position`] is an ERC-1155 balance of outcome tokens backed by a collateral token. Its
//! lineage lists, for every condition it was split on, which outcome slots it covers. Positions
//! can be merged on a condition when they differ only in that condition and their index sets on
//! it form a valid partition.
//!
//! ```
//! use conditional_tokens_sdk::ids::{self, IndexSet};
//! use conditional_tokens_sdk::position::{self, Position, PositionCondition};
//! use conditional_tokens_sdk::types::{B256, address};
//!
//! # fn main() -> conditional_tokens_sdk::Result<()> {
//! let usdc = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
//! let condition = ids::condition_id(address!("0x0000000000000000000000000000000000000001"), B256::ZERO, 2);
//!
//! let yes = Position::from_lineage(usdc, vec![PositionCondition::new(condition, 2, IndexSet::singleton(0)?)?])?;
//! let no = Position::from_lineage(usdc, vec![PositionCondition::new(condition, 2, IndexSet::singleton(1)?)?])?;
//!
//! assert!(position::are_positions_mergeable(&[yes, no]));
//! # Ok(())
//! # }
//! ```

mod plan;
mod summary;

use alloy::primitives::Address;
use bon::Builder;
use serde::{Deserialize, Serialize};

pub use plan::{MergePlan, MergeTarget, RedeemPlan, SplitPlan};
pub use summary::{PositionSummary, Token};

use crate::Result;
use crate::error::Error;
use crate::ids::{self, CollectionId, ConditionId, IndexSet, MAX_OUTCOME_SLOTS, PositionId};
use crate::partition::Partition;

/// One step of a position's lineage: the outcome slots it covers on a single condition.
///
/// Deserializing runs the same check as [`PositionCondition::new`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPositionCondition")]
pub struct PositionCondition {
    pub condition_id: ConditionId,
    pub outcome_slot_count: usize,
    pub index_set: IndexSet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPositionCondition {
    condition_id: ConditionId,
    outcome_slot_count: usize,
    index_set: IndexSet,
}

impl TryFrom<RawPositionCondition> for PositionCondition {
    type Error = Error;

    fn try_from(raw: RawPositionCondition) -> Result<Self> {
        Self::new(raw.condition_id, raw.outcome_slot_count, raw.index_set)
    }
}

impl PositionCondition {
    /// # Errors
    ///
    /// Returns [`Kind::InvalidInput`](crate::error::Kind::InvalidInput) if the index set selects a
    /// slot the condition does not have.
    pub fn new(
        condition_id: ConditionId,
        outcome_slot_count: usize,
        index_set: IndexSet,
    ) -> Result<Self> {
        if outcome_slot_count > MAX_OUTCOME_SLOTS || !index_set.fits(outcome_slot_count) {
            return Err(Error::invalid_input(
                "index_set",
                format!("{index_set} does not fit a condition with {outcome_slot_count} outcome slots"),
            ));
        }

        Ok(Self {
            condition_id,
            outcome_slot_count,
            index_set,
        })
    }
}

/// An outcome token balance as tracked by the contract.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: PositionId,
    pub collateral_token: Address,
    /// Conditions this position was split on, in the order they were reported
    pub lineage: Vec<PositionCondition>,
}

impl Position {
    #[must_use]
    pub fn new(id: PositionId, collateral_token: Address, lineage: Vec<PositionCondition>) -> Self {
        Self {
            id,
            collateral_token,
            lineage,
        }
    }

    /// Builds a position whose ID is derived from its collateral and lineage.
    pub fn from_lineage(
        collateral_token: Address,
        lineage: Vec<PositionCondition>,
    ) -> Result<Self> {
        let collection_id = collection_of(&lineage)?;

        Ok(Self {
            id: ids::position_id(collateral_token, &collection_id),
            collateral_token,
            lineage,
        })
    }

    /// Recomputes the collection ID from the lineage.
    pub fn collection_id(&self) -> Result<CollectionId> {
        collection_of(&self.lineage)
    }

    /// Recomputes the position ID from the collateral and lineage. For a well-formed position it
    /// equals [`Position::id`].
    pub fn derived_id(&self) -> Result<PositionId> {
        Ok(ids::position_id(
            self.collateral_token,
            &self.collection_id()?,
        ))
    }

    #[must_use]
    pub fn condition(&self, condition_id: &ConditionId) -> Option<&PositionCondition> {
        self.lineage
            .iter()
            .find(|step| &step.condition_id == condition_id)
    }

    pub fn condition_ids(&self) -> impl Iterator<Item = &ConditionId> {
        self.lineage.iter().map(|step| &step.condition_id)
    }

    /// Splits the lineage into the step on `condition_id` and the remaining steps sorted by
    /// condition ID. Returns `None` unless the condition appears exactly once.
    fn split_on(
        &self,
        condition_id: &ConditionId,
    ) -> Option<(PositionCondition, Vec<PositionCondition>)> {
        let (matching, mut rest): (Vec<_>, Vec<_>) = self
            .lineage
            .iter()
            .copied()
            .partition(|step| &step.condition_id == condition_id);

        let [target] = matching.as_slice() else {
            return None;
        };

        rest.sort_unstable_by_key(|step| step.condition_id);
        Some((*target, rest))
    }
}

/// Returns `true` if the positions can be merged on at least one condition.
#[must_use]
pub fn are_positions_mergeable(positions: &[Position]) -> bool {
    !mergeable_conditions(positions).is_empty()
}

/// Returns `true` if merging `positions` on `condition_id` is accepted by the contract.
///
/// That requires at least two positions on the same collateral, each split on `condition_id`
/// exactly once, identical on every other condition, and with index sets on `condition_id` that
/// form a valid partition of its outcome slots.
#[must_use]
pub fn are_positions_mergeable_by_condition(
    positions: &[Position],
    condition_id: &ConditionId,
) -> bool {
    merge_shape(positions, condition_id).is_some()
}

/// Every condition the positions can be merged on, in ascending condition ID order.
#[must_use]
pub fn mergeable_conditions(positions: &[Position]) -> Vec<ConditionId> {
    let Some(first) = positions.first() else {
        return Vec::new();
    };

    let mut candidates: Vec<ConditionId> = first.condition_ids().copied().collect();
    candidates.sort_unstable();
    candidates.dedup();

    let found: Vec<ConditionId> = candidates
        .into_iter()
        .filter(|condition_id| are_positions_mergeable_by_condition(positions, condition_id))
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        positions = positions.len(),
        conditions = found.len(),
        "searched for mergeable conditions"
    );

    found
}

/// What a merge on one condition looks like once the positions have been checked.
#[derive(Debug)]
pub(crate) struct MergeShape {
    pub(crate) collateral_token: Address,
    /// Lineage shared by every position, sorted by condition ID
    pub(crate) remainder: Vec<PositionCondition>,
    pub(crate) partition: Partition,
}

pub(crate) fn merge_shape(positions: &[Position], condition_id: &ConditionId) -> Option<MergeShape> {
    let [first, ..] = positions else {
        return None;
    };
    if positions.len() < 2 {
        return None;
    }

    if positions
        .iter()
        .any(|position| position.collateral_token != first.collateral_token)
    {
        #[cfg(feature = "tracing")]
        tracing::trace!(%condition_id, "positions use different collateral tokens");
        return None;
    }

    let (target, remainder) = first.split_on(condition_id)?;
    let mut members = Vec::with_capacity(positions.len());
    members.push(target.index_set);

    for position in &positions[1..] {
        let (step, rest) = position.split_on(condition_id)?;
        if step.outcome_slot_count != target.outcome_slot_count || rest != remainder {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                %condition_id,
                position = %position.id,
                "lineage differs outside the merged condition"
            );
            return None;
        }
        members.push(step.index_set);
    }

    let partition = Partition::new(members);
    if let Err(_violation) = partition.validate_for(target.outcome_slot_count) {
        #[cfg(feature = "tracing")]
        tracing::trace!(%condition_id, %_violation, "index sets do not partition the condition");
        return None;
    }

    Some(MergeShape {
        collateral_token: first.collateral_token,
        remainder,
        partition,
    })
}

fn collection_of(lineage: &[PositionCondition]) -> Result<CollectionId> {
    let components: Vec<(ConditionId, IndexSet)> = lineage
        .iter()
        .map(|step| (step.condition_id, step.index_set))
        .collect();

    ids::combine_collection_ids(&components)
}
