//! Request types for Conditional Tokens contract calls.

use alloy::primitives::{B256, U256};
use bon::Builder;

use crate::Result;
use crate::error::Error;
use crate::ids::{CollectionId, ConditionId, IndexSet, MAX_OUTCOME_SLOTS};
use crate::partition::Partition;
use crate::position::{MergePlan, RedeemPlan, SplitPlan};
use crate::types::Address;

/// Request to calculate a condition ID on-chain.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ConditionIdRequest {
    /// The oracle that will report the payouts
    pub oracle: Address,
    pub question_id: B256,
    pub outcome_slot_count: usize,
}

/// Request to calculate a collection ID on-chain.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct CollectionIdRequest {
    /// Parent collection ID, null for collections directly below collateral
    #[builder(default)]
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub index_set: IndexSet,
}

/// Request to calculate a position ID on-chain.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct PositionIdRequest {
    pub collateral_token: Address,
    pub collection_id: CollectionId,
}

/// Request to register a new condition with the contract.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct PrepareConditionRequest {
    pub oracle: Address,
    pub question_id: B256,
    pub outcome_slot_count: usize,
}

/// Request to split collateral, or a parent position, over a partition of one condition.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct SplitPositionRequest {
    pub collateral_token: Address,
    #[builder(default)]
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub partition: Partition,
    /// Amount of collateral (or parent position tokens) to split
    pub amount: U256,
}

impl SplitPositionRequest {
    /// Request executing `plan` for `amount`.
    #[must_use]
    pub fn from_plan(plan: &SplitPlan, amount: U256) -> Self {
        Self {
            collateral_token: plan.collateral_token,
            parent_collection_id: plan.parent_collection_id,
            condition_id: plan.condition_id,
            partition: plan.partition.clone(),
            amount,
        }
    }
}

/// Request to merge positions back into their parent position or collateral.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct MergePositionsRequest {
    pub collateral_token: Address,
    #[builder(default)]
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub partition: Partition,
    /// Amount of each position to merge
    pub amount: U256,
}

impl MergePositionsRequest {
    /// Request executing `plan` for `amount`.
    #[must_use]
    pub fn from_plan(plan: &MergePlan, amount: U256) -> Self {
        Self {
            collateral_token: plan.collateral_token,
            parent_collection_id: plan.parent_collection_id,
            condition_id: plan.condition_id,
            partition: plan.partition.clone(),
            amount,
        }
    }
}

/// Request to redeem positions on a resolved condition.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct RedeemPositionsRequest {
    pub collateral_token: Address,
    #[builder(default)]
    pub parent_collection_id: CollectionId,
    pub condition_id: ConditionId,
    pub index_sets: Vec<IndexSet>,
}

impl From<&RedeemPlan> for RedeemPositionsRequest {
    fn from(plan: &RedeemPlan) -> Self {
        Self {
            collateral_token: plan.collateral_token,
            parent_collection_id: plan.parent_collection_id,
            condition_id: plan.condition_id,
            index_sets: plan.index_sets.clone(),
        }
    }
}

/// Request to resolve a condition. Must be sent by the condition's oracle.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ReportPayoutsRequest {
    pub question_id: B256,
    /// Number of outcome slots the condition was prepared with
    pub outcome_slot_count: usize,
    /// Payout numerator per outcome slot
    pub payouts: Vec<U256>,
}

impl ReportPayoutsRequest {
    /// Checks the payouts the contract would reject before sending a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Kind::Validation`](crate::error::Kind::Validation) if there is not exactly one
    /// payout per outcome slot or every payout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.outcome_slot_count < 2 || self.outcome_slot_count > MAX_OUTCOME_SLOTS {
            return Err(Error::validation(format!(
                "a condition has between 2 and {MAX_OUTCOME_SLOTS} outcome slots, got {}",
                self.outcome_slot_count
            )));
        }

        if self.payouts.len() != self.outcome_slot_count {
            return Err(Error::validation(format!(
                "expected {} payouts, got {}",
                self.outcome_slot_count,
                self.payouts.len()
            )));
        }

        if self.payouts.iter().all(U256::is_zero) {
            return Err(Error::validation("payouts are all zero"));
        }

        Ok(())
    }
}
