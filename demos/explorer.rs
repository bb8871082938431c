#![allow(clippy::exhaustive_enums, reason = "Fine for examples")]
#![allow(clippy::exhaustive_structs, reason = "Fine for examples")]

//! Position explorer.
//!
//! Lists the most recent positions known to an indexer, checks their IDs against the
//! Conditional Tokens contract and reports which of them could be merged.
//!
//! ## Usage
//!
//! ```sh
//! export CONDITIONAL_TOKENS_INDEXER="https://api.thegraph.com/subgraphs/name/..."
//! export CONDITIONAL_TOKENS_RPC="https://polygon-rpc.com"   # optional
//! export CONDITIONAL_TOKENS_OWNER="0x..."                   # optional, shows balances
//! cargo run --example explorer --features ctf,indexer,tracing
//! ```

use std::collections::BTreeMap;
use std::env;

use alloy::primitives::U256;
use alloy::providers::ProviderBuilder;
use anyhow::{Context as _, Result};
use conditional_tokens_sdk::ctf::Client as CtfClient;
use conditional_tokens_sdk::ctf::types::PositionIdRequest;
use conditional_tokens_sdk::ids::{ConditionId, parse_address};
use conditional_tokens_sdk::indexer::Client as IndexerClient;
use conditional_tokens_sdk::indexer::types::{PositionFilter, PositionsRequest};
use conditional_tokens_sdk::position::{self, MergePlan, Position, PositionSummary, Token};
use conditional_tokens_sdk::types::Address;
use conditional_tokens_sdk::{POLYGON, contract_config};
use tracing::{info, warn};

const INDEXER_VAR: &str = "CONDITIONAL_TOKENS_INDEXER";
const RPC_VAR: &str = "CONDITIONAL_TOKENS_RPC";
const OWNER_VAR: &str = "CONDITIONAL_TOKENS_OWNER";
const DEFAULT_RPC: &str = "https://polygon-rpc.com";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let indexer_url = env::var(INDEXER_VAR).with_context(|| format!("{INDEXER_VAR} is not set"))?;
    let rpc_url = env::var(RPC_VAR).unwrap_or_else(|_| DEFAULT_RPC.to_owned());
    let owner = env::var(OWNER_VAR)
        .ok()
        .map(|value| parse_address(&value))
        .transpose()?;

    let indexer = IndexerClient::new(&indexer_url)?;
    let provider = ProviderBuilder::new().connect(&rpc_url).await?;
    let ctf = CtfClient::new(provider, POLYGON)?;
    let usdc = contract_config(POLYGON)
        .context("missing Polygon config")?
        .collateral;

    info!(indexer = %indexer.host(), contract = %ctf.address(), "connected");

    // Only positions backed by the chain's default collateral.
    let request = PositionsRequest::builder()
        .first(50)
        .filter(PositionFilter::builder().collateral_tokens(vec![usdc]).build())
        .build();
    let records = indexer.positions(&request).await?;
    info!(count = records.len(), "fetched positions");

    let mut positions = Vec::with_capacity(records.len());
    for record in records {
        match Position::try_from(record) {
            Ok(position) => positions.push(position),
            Err(e) => warn!(error = %e, "skipping malformed position"),
        }
    }

    for position in &positions {
        let collection_id = position.collection_id()?;
        let request = PositionIdRequest::builder()
            .collateral_token(position.collateral_token)
            .collection_id(collection_id)
            .build();
        let on_chain = ctf.position_id(&request).await?.position_id;

        if on_chain != position.id {
            warn!(indexed = %position.id, %on_chain, "position ID mismatch");
        }

        let balance = match owner {
            Some(owner) => ctf.balance_of(owner, &position.id).await?,
            None => U256::ZERO,
        };
        let token = token_for(position.collateral_token, usdc);

        info!("{}", PositionSummary::new(position, &token, balance));
    }

    // Positions can only merge with positions that share their collateral.
    let mut by_collateral: BTreeMap<Address, Vec<Position>> = BTreeMap::new();
    for position in positions {
        by_collateral
            .entry(position.collateral_token)
            .or_default()
            .push(position);
    }

    for (collateral, group) in &by_collateral {
        let conditions: Vec<ConditionId> = position::mergeable_conditions(group);
        if conditions.is_empty() {
            info!(%collateral, positions = group.len(), "nothing to merge");
        }
        for condition_id in conditions {
            info!(%collateral, %condition_id, "positions merge on condition");

            if let Some(owner) = owner {
                let plan = MergePlan::new(group, &condition_id)?;
                let amount = ctf.max_merge_amount(owner, &plan).await?;
                info!(%collateral, %condition_id, %amount, "mergeable amount");
            }
        }
    }

    Ok(())
}

fn token_for(collateral: Address, usdc: Address) -> Token {
    if collateral == usdc {
        Token::new(collateral, "USDC", 6)
    } else {
        Token::new(collateral, collateral.to_string(), 18)
    }
}
