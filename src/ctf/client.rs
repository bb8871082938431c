//! Client for the Gnosis Conditional Tokens contract.
//!
//! View calls return the contract's own answers, which lets callers cross-check the identifiers
//! derived locally by [`crate::ids`]. State-changing calls wait for the transaction receipt.
//!
//! # Example
//!
//! ```no_run
//! use conditional_tokens_sdk::ctf::Client;
//! use alloy::providers::ProviderBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new()
//!     .connect("https://polygon-rpc.com")
//!     .await?;
//!
//! let client = Client::new(provider, conditional_tokens_sdk::POLYGON)?;
//! # Ok(())
//! # }
//! ```

#![allow(
    clippy::exhaustive_structs,
    clippy::exhaustive_enums,
    reason = "Alloy sol! macro generates code that triggers these lints"
)]

use alloy::contract::SolCallBuilder;
use alloy::primitives::{Address, B256, ChainId, U256};
use alloy::providers::Provider;
use alloy::sol;
use alloy::sol_types::SolCall;

use super::error::ContractError;
use super::types::{
    CollectionIdRequest, CollectionIdResponse, ConditionIdRequest, ConditionIdResponse,
    MergePositionsRequest, PayoutsResponse, PositionIdRequest, PositionIdResponse,
    PrepareConditionRequest, RedeemPositionsRequest, ReportPayoutsRequest, SplitPositionRequest,
    TransactionResponse,
};
use crate::error::Error;
use crate::ids::{CollectionId, ConditionId, IndexSet, PositionId};
use crate::position::MergePlan;
use crate::{Result, contract_config};

// Subset of `ConditionalTokens.sol` used by this client.
// Source: https://github.com/gnosis/conditional-tokens-contracts
sol! {
    #[sol(rpc)]
    interface IConditionalTokens {
        function prepareCondition(
            address oracle,
            bytes32 questionId,
            uint256 outcomeSlotCount
        ) external;

        /// Called by the oracle; the condition is identified by `msg.sender` and the payout count.
        function reportPayouts(bytes32 questionId, uint256[] calldata payouts) external;

        function getConditionId(
            address oracle,
            bytes32 questionId,
            uint256 outcomeSlotCount
        ) external pure returns (bytes32);

        function getCollectionId(
            bytes32 parentCollectionId,
            bytes32 conditionId,
            uint256 indexSet
        ) external view returns (bytes32);

        function getPositionId(
            address collateralToken,
            bytes32 collectionId
        ) external pure returns (uint256);

        /// Zero for conditions that were never prepared.
        function getOutcomeSlotCount(bytes32 conditionId) external view returns (uint256);

        function payoutNumerators(bytes32 conditionId, uint256 index) external view returns (uint256);

        /// Zero until the condition is resolved.
        function payoutDenominator(bytes32 conditionId) external view returns (uint256);

        function balanceOf(address owner, uint256 id) external view returns (uint256);

        function balanceOfBatch(
            address[] calldata owners,
            uint256[] calldata ids
        ) external view returns (uint256[] memory);

        function splitPosition(
            address collateralToken,
            bytes32 parentCollectionId,
            bytes32 conditionId,
            uint256[] calldata partition,
            uint256 amount
        ) external;

        function mergePositions(
            address collateralToken,
            bytes32 parentCollectionId,
            bytes32 conditionId,
            uint256[] calldata partition,
            uint256 amount
        ) external;

        function redeemPositions(
            address collateralToken,
            bytes32 parentCollectionId,
            bytes32 conditionId,
            uint256[] calldata indexSets
        ) external;
    }
}

// Collateral tokens are plain ERC-20s; the contract pulls them with `transferFrom` on a split.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);

        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Client for one deployment of the Conditional Tokens contract.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Client<P: Provider> {
    contract: IConditionalTokens::IConditionalTokensInstance<P>,
    provider: P,
}

impl<P: Provider + Clone> Client<P> {
    /// Creates a client for the deployment configured for `chain_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no deployment is configured for `chain_id`.
    pub fn new(provider: P, chain_id: ChainId) -> Result<Self> {
        let config =
            contract_config(chain_id).ok_or_else(|| Error::missing_contract_config(chain_id))?;

        Ok(Self::with_address(provider, config.conditional_tokens))
    }

    /// Creates a client for a deployment at a custom address, e.g. a local development chain.
    #[must_use]
    pub fn with_address(provider: P, conditional_tokens: Address) -> Self {
        Self {
            contract: IConditionalTokens::new(conditional_tokens, provider.clone()),
            provider,
        }
    }

    /// Address of the contract this client talks to.
    #[must_use]
    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            oracle = %request.oracle,
            question_id = %request.question_id,
            outcome_slot_count = request.outcome_slot_count
        ))
    )]
    pub async fn condition_id(&self, request: &ConditionIdRequest) -> Result<ConditionIdResponse> {
        let condition_id = self
            .contract
            .getConditionId(
                request.oracle,
                request.question_id,
                U256::from(request.outcome_slot_count),
            )
            .call()
            .await
            .map_err(|e| ContractError::new("get condition ID", e))?;

        Ok(ConditionIdResponse {
            condition_id: ConditionId::new(condition_id),
        })
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            parent_collection_id = %request.parent_collection_id,
            condition_id = %request.condition_id,
            index_set = %request.index_set
        ))
    )]
    pub async fn collection_id(
        &self,
        request: &CollectionIdRequest,
    ) -> Result<CollectionIdResponse> {
        let collection_id = self
            .contract
            .getCollectionId(
                request.parent_collection_id.into(),
                request.condition_id.into(),
                request.index_set.into(),
            )
            .call()
            .await
            .map_err(|e| ContractError::new("get collection ID", e))?;

        Ok(CollectionIdResponse {
            collection_id: CollectionId::new(collection_id),
        })
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %request.collateral_token,
            collection_id = %request.collection_id
        ))
    )]
    pub async fn position_id(&self, request: &PositionIdRequest) -> Result<PositionIdResponse> {
        let position_id = self
            .contract
            .getPositionId(request.collateral_token, request.collection_id.into())
            .call()
            .await
            .map_err(|e| ContractError::new("get position ID", e))?;

        Ok(PositionIdResponse {
            position_id: PositionId::new(position_id),
        })
    }

    /// Number of outcome slots of a condition, `0` if it was never prepared.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(condition_id = %condition_id))
    )]
    pub async fn outcome_slot_count(&self, condition_id: &ConditionId) -> Result<usize> {
        let count = self
            .contract
            .getOutcomeSlotCount((*condition_id).into())
            .call()
            .await
            .map_err(|e| ContractError::new("get outcome slot count", e))?;

        usize::try_from(count).map_err(|e| ContractError::new("read outcome slot count", e).into())
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(condition_id = %condition_id))
    )]
    pub async fn payout_denominator(&self, condition_id: &ConditionId) -> Result<U256> {
        let denominator = self
            .contract
            .payoutDenominator((*condition_id).into())
            .call()
            .await
            .map_err(|e| ContractError::new("get payout denominator", e))?;

        Ok(denominator)
    }

    /// Payout numerators of every outcome slot, all zero while the condition is unresolved.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(condition_id = %condition_id))
    )]
    pub async fn payout_numerators(&self, condition_id: &ConditionId) -> Result<Vec<U256>> {
        let outcome_slot_count = self.outcome_slot_count(condition_id).await?;
        let id: B256 = (*condition_id).into();

        let mut numerators = Vec::with_capacity(outcome_slot_count);
        for index in 0..outcome_slot_count {
            let numerator = self
                .contract
                .payoutNumerators(id, U256::from(index))
                .call()
                .await
                .map_err(|e| ContractError::new("get payout numerator", e))?;
            numerators.push(numerator);
        }

        Ok(numerators)
    }

    /// Denominator and numerators of a condition in one response.
    pub async fn payouts(&self, condition_id: &ConditionId) -> Result<PayoutsResponse> {
        Ok(PayoutsResponse {
            denominator: self.payout_denominator(condition_id).await?,
            numerators: self.payout_numerators(condition_id).await?,
        })
    }

    /// ERC-1155 balance of `owner` in a position.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(owner = %owner, position_id = %position_id))
    )]
    pub async fn balance_of(&self, owner: Address, position_id: &PositionId) -> Result<U256> {
        let balance = self
            .contract
            .balanceOf(owner, (*position_id).into())
            .call()
            .await
            .map_err(|e| ContractError::new("get balance", e))?;

        Ok(balance)
    }

    /// ERC-1155 balances of `owner` in several positions, in the order given.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, position_ids), fields(
            owner = %owner,
            positions = position_ids.len()
        ))
    )]
    pub async fn balance_of_batch(
        &self,
        owner: Address,
        position_ids: &[PositionId],
    ) -> Result<Vec<U256>> {
        let owners = vec![owner; position_ids.len()];
        let ids: Vec<U256> = position_ids.iter().map(|id| <U256 as From<PositionId>>::from(*id)).collect();

        let balances = self
            .contract
            .balanceOfBatch(owners, ids)
            .call()
            .await
            .map_err(|e| ContractError::new("get balances", e))?;

        Ok(balances)
    }

    /// Largest amount `owner` can merge with `plan`, limited by their smallest position balance.
    pub async fn max_merge_amount(&self, owner: Address, plan: &MergePlan) -> Result<U256> {
        let balances = self.balance_of_batch(owner, &plan.position_ids).await?;

        Ok(MergePlan::max_amount(&balances))
    }

    /// How much of `collateral_token` this contract may pull from `owner`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %collateral_token,
            owner = %owner
        ))
    )]
    pub async fn collateral_allowance(
        &self,
        collateral_token: Address,
        owner: Address,
    ) -> Result<U256> {
        let token = IERC20::new(collateral_token, self.provider.clone());

        let allowance = token
            .allowance(owner, *self.address())
            .call()
            .await
            .map_err(|e| ContractError::new("get collateral allowance", e))?;

        Ok(allowance)
    }

    /// Lets this contract pull up to `amount` of `collateral_token` from the sender.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %collateral_token,
            amount = %amount
        ))
    )]
    pub async fn approve_collateral(
        &self,
        collateral_token: Address,
        amount: U256,
    ) -> Result<TransactionResponse> {
        let token = IERC20::new(collateral_token, self.provider.clone());
        let call = token.approve(*self.address(), amount);

        confirm(call, "approve collateral").await
    }

    /// Approves an unlimited allowance unless `owner`, the sender, already allows `amount`.
    ///
    /// Returns the approval transaction, or `None` when no approval was needed.
    pub async fn ensure_collateral_allowance(
        &self,
        collateral_token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<Option<TransactionResponse>> {
        if self.collateral_allowance(collateral_token, owner).await? >= amount {
            return Ok(None);
        }

        self.approve_collateral(collateral_token, U256::MAX)
            .await
            .map(Some)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            oracle = %request.oracle,
            question_id = %request.question_id,
            outcome_slot_count = request.outcome_slot_count
        ))
    )]
    pub async fn prepare_condition(
        &self,
        request: &PrepareConditionRequest,
    ) -> Result<TransactionResponse> {
        let call = self.contract.prepareCondition(
            request.oracle,
            request.question_id,
            U256::from(request.outcome_slot_count),
        );

        confirm(call, "prepare condition").await
    }

    /// Resolves a condition. The sender must be the condition's oracle.
    ///
    /// # Errors
    ///
    /// Returns a [`Kind::Validation`](crate::error::Kind::Validation) error without sending
    /// anything if [`ReportPayoutsRequest::validate`] fails.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            question_id = %request.question_id,
            outcome_slot_count = request.outcome_slot_count
        ))
    )]
    pub async fn report_payouts(
        &self,
        request: &ReportPayoutsRequest,
    ) -> Result<TransactionResponse> {
        request.validate()?;

        let call = self
            .contract
            .reportPayouts(request.question_id, request.payouts.clone());

        confirm(call, "report payouts").await
    }

    /// Splits collateral or a parent position over a partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails, e.g. the sender lacks balance or allowance or
    /// the condition has not been prepared.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %request.collateral_token,
            condition_id = %request.condition_id,
            amount = %request.amount
        ))
    )]
    pub async fn split_position(
        &self,
        request: &SplitPositionRequest,
    ) -> Result<TransactionResponse> {
        let call = self.contract.splitPosition(
            request.collateral_token,
            request.parent_collection_id.into(),
            request.condition_id.into(),
            request.partition.to_u256_vec(),
            request.amount,
        );

        confirm(call, "split position").await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %request.collateral_token,
            condition_id = %request.condition_id,
            amount = %request.amount
        ))
    )]
    pub async fn merge_positions(
        &self,
        request: &MergePositionsRequest,
    ) -> Result<TransactionResponse> {
        let call = self.contract.mergePositions(
            request.collateral_token,
            request.parent_collection_id.into(),
            request.condition_id.into(),
            request.partition.to_u256_vec(),
            request.amount,
        );

        confirm(call, "merge positions").await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self), fields(
            collateral_token = %request.collateral_token,
            condition_id = %request.condition_id
        ))
    )]
    pub async fn redeem_positions(
        &self,
        request: &RedeemPositionsRequest,
    ) -> Result<TransactionResponse> {
        let call = self.contract.redeemPositions(
            request.collateral_token,
            request.parent_collection_id.into(),
            request.condition_id.into(),
            request.index_sets.iter().map(IndexSet::value).collect(),
        );

        confirm(call, "redeem positions").await
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }
}

/// Sends a transaction and waits until it is mined.
async fn confirm<P: Provider, C: SolCall>(
    call: SolCallBuilder<&P, C>,
    action: &'static str,
) -> Result<TransactionResponse> {
    let pending_tx = call
        .send()
        .await
        .map_err(|e| ContractError::new(action, e))?;

    let transaction_hash = *pending_tx.tx_hash();

    let receipt = pending_tx
        .get_receipt()
        .await
        .map_err(|e| ContractError::new(action, e))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(%transaction_hash, action, "transaction mined");

    let block_number = receipt
        .block_number
        .ok_or_else(|| ContractError::new(action, "receipt has no block number"))?;

    Ok(TransactionResponse {
        transaction_hash,
        block_number,
    })
}
