//! Response types for Conditional Tokens contract calls.

use alloy::primitives::{B256, U256};
use bon::Builder;

use crate::ids::{CollectionId, ConditionId, PositionId};

#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ConditionIdResponse {
    pub condition_id: ConditionId,
}

#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct CollectionIdResponse {
    pub collection_id: CollectionId,
}

#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct PositionIdResponse {
    /// ERC-1155 token ID
    pub position_id: PositionId,
}

/// Resolution state of a condition.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct PayoutsResponse {
    /// Zero while the condition is unresolved
    pub denominator: U256,
    /// One numerator per outcome slot
    pub numerators: Vec<U256>,
}

impl PayoutsResponse {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.denominator.is_zero()
    }
}

/// A mined state-changing transaction.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct TransactionResponse {
    pub transaction_hash: B256,
    /// Block the transaction was mined in
    pub block_number: u64,
}
