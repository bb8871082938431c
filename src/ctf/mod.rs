//! On-chain access to the Conditional Tokens contract.
//!
//! **Feature flag:** `ctf`
//!
//! The client wraps an alloy [`Provider`](alloy::providers::Provider). View calls derive
//! identifiers and read resolution state and balances; state-changing calls prepare and resolve
//! conditions and split, merge or redeem positions. Splitting collateral needs an ERC-20 allowance
//! for the contract, which the client can check and grant. Requests can be built from the plans in
//! [`crate::position`].
//!
//! # Example
//!
//! ```no_run
//! use alloy::providers::ProviderBuilder;
//! use conditional_tokens_sdk::ctf::{Client, types::SplitPositionRequest};
//! use conditional_tokens_sdk::position::SplitPlan;
//! use conditional_tokens_sdk::types::{B256, U256, address};
//! use conditional_tokens_sdk::{POLYGON, contract_config, ids};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderBuilder::new()
//!     .connect("https://polygon-rpc.com")
//!     .await?;
//! let client = Client::new(provider, POLYGON)?;
//!
//! let oracle = address!("0x0000000000000000000000000000000000000001");
//! let condition_id = ids::condition_id(oracle, B256::ZERO, 2);
//! let usdc = contract_config(POLYGON).ok_or("no config")?.collateral;
//!
//! let plan = SplitPlan::from_collateral(usdc, condition_id, 2, None)?;
//! let request = SplitPositionRequest::from_plan(&plan, U256::from(1_000_000));
//!
//! let sender = address!("0x0000000000000000000000000000000000000002");
//! client
//!     .ensure_collateral_allowance(usdc, sender, request.amount)
//!     .await?;
//!
//! let receipt = client.split_position(&request).await?;
//! println!("split in block {}", receipt.block_number);
//! # Ok(())
//! # }
//! ```
//!
//! # Resources
//!
//! - [Conditional Tokens contracts](https://github.com/gnosis/conditional-tokens-contracts)

pub mod client;
mod error;
pub mod types;

pub use client::Client;
pub use error::ContractError;
