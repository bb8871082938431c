use alloy::primitives::{Address, U256};

use crate::Result;
use crate::error::Error;
use crate::ids::{self, CollectionId, ConditionId, IndexSet, PositionId};
use crate::partition::{Partition, trivial_partition};
use crate::position::{Position, merge_shape};

/// Where the collateral of a merge ends up.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTarget {
    /// The merged positions were split directly from collateral
    Collateral,
    /// The merged positions were split from this parent position
    Position(PositionId),
}

/// The arguments of a `mergePositions` call for a set of positions.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub collateral_token: Address,
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    /// Index sets on `condition_id`, in the order the positions were given
    pub partition: Partition,
    pub target: MergeTarget,
    /// Positions consumed by the merge, parallel to `partition`
    pub position_ids: Vec<PositionId>,
}

impl MergePlan {
    /// # Errors
    ///
    /// Returns [`Kind::Validation`](crate::error::Kind::Validation) if the positions cannot be
    /// merged on `condition_id`.
    pub fn new(positions: &[Position], condition_id: &ConditionId) -> Result<Self> {
        let shape = merge_shape(positions, condition_id).ok_or_else(|| {
            Error::validation(format!(
                "{} positions cannot be merged on condition {condition_id}",
                positions.len()
            ))
        })?;

        let components: Vec<(ConditionId, IndexSet)> = shape
            .remainder
            .iter()
            .map(|step| (step.condition_id, step.index_set))
            .collect();
        let parent_collection_id = ids::combine_collection_ids(&components)?;

        let target = if parent_collection_id.is_null() {
            MergeTarget::Collateral
        } else {
            MergeTarget::Position(ids::position_id(
                shape.collateral_token,
                &parent_collection_id,
            ))
        };

        Ok(Self {
            collateral_token: shape.collateral_token,
            parent_collection_id,
            condition_id: *condition_id,
            partition: shape.partition,
            target,
            position_ids: positions.iter().map(|position| position.id).collect(),
        })
    }

    /// Largest amount that can be merged given the holder's balance of each position in
    /// [`MergePlan::position_ids`]: the smallest balance, or zero without balances.
    #[must_use]
    pub fn max_amount(balances: &[U256]) -> U256 {
        balances.iter().min().copied().unwrap_or(U256::ZERO)
    }
}

/// The arguments of a `splitPosition` call over a full partition of one condition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub collateral_token: Address,
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub outcome_slot_count: usize,
    pub partition: Partition,
}

impl SplitPlan {
    /// Splits collateral on `condition_id`, using the trivial partition unless one is given.
    pub fn from_collateral(
        collateral_token: Address,
        condition_id: ConditionId,
        outcome_slot_count: usize,
        partition: Option<Partition>,
    ) -> Result<Self> {
        Self::checked(
            collateral_token,
            CollectionId::NULL,
            condition_id,
            outcome_slot_count,
            partition,
        )
    }

    /// Splits an existing position on a condition it has not been split on yet.
    pub fn from_position(
        position: &Position,
        condition_id: ConditionId,
        outcome_slot_count: usize,
        partition: Option<Partition>,
    ) -> Result<Self> {
        if position.condition(&condition_id).is_some() {
            return Err(Error::validation(format!(
                "position {} is already split on condition {condition_id}",
                position.id
            )));
        }

        Self::checked(
            position.collateral_token,
            position.collection_id()?,
            condition_id,
            outcome_slot_count,
            partition,
        )
    }

    fn checked(
        collateral_token: Address,
        parent_collection_id: CollectionId,
        condition_id: ConditionId,
        outcome_slot_count: usize,
        partition: Option<Partition>,
    ) -> Result<Self> {
        let partition = match partition {
            Some(partition) => partition,
            None => trivial_partition(outcome_slot_count)?,
        };

        if partition.len() < 2 {
            return Err(Error::validation(
                "a split needs a partition with at least two index sets",
            ));
        }
        partition.validate_for(outcome_slot_count)?;

        Ok(Self {
            collateral_token,
            parent_collection_id,
            condition_id,
            outcome_slot_count,
            partition,
        })
    }

    /// IDs of the positions the split creates, one per partition member.
    pub fn resulting_positions(&self) -> Result<Vec<PositionId>> {
        self.partition
            .iter()
            .map(|index_set| {
                let collection_id = ids::collection_id(
                    Some(&self.parent_collection_id),
                    &self.condition_id,
                    *index_set,
                )?;
                Ok(ids::position_id(self.collateral_token, &collection_id))
            })
            .collect()
    }
}

/// The arguments of a `redeemPositions` call for one position on a resolved condition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemPlan {
    pub collateral_token: Address,
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub index_sets: Vec<IndexSet>,
}

impl RedeemPlan {
    /// # Errors
    ///
    /// Returns [`Kind::Validation`](crate::error::Kind::Validation) if the position was not split
    /// on `condition_id` exactly once.
    pub fn for_position(position: &Position, condition_id: &ConditionId) -> Result<Self> {
        let (step, remainder) = position.split_on(condition_id).ok_or_else(|| {
            Error::validation(format!(
                "position {} is not split on condition {condition_id}",
                position.id
            ))
        })?;

        let components: Vec<(ConditionId, IndexSet)> = remainder
            .iter()
            .map(|step| (step.condition_id, step.index_set))
            .collect();

        Ok(Self {
            collateral_token: position.collateral_token,
            parent_collection_id: ids::combine_collection_ids(&components)?,
            condition_id: *condition_id,
            index_sets: vec![step.index_set],
        })
    }
}
