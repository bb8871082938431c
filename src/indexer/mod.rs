//! Read-only access to indexed conditions and positions.
//!
//! **Feature flag:** `indexer`
//!
//! The indexer is a GraphQL endpoint that tracks `ConditionPreparation`, `ConditionResolution`
//! and position transfer events of the Conditional Tokens contract. Its position records carry
//! the raw lineage, which converts into a [`Position`](crate::position::Position) for the merge,
//! split and redeem planning in [`crate::position`].
//!
//! # Example
//!
//! ```no_run
//! use conditional_tokens_sdk::indexer::Client;
//! use conditional_tokens_sdk::indexer::types::{PositionFilter, PositionSearch, PositionsRequest};
//! use conditional_tokens_sdk::position::{self, Position};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("https://api.thegraph.com/subgraphs/name/gnosis/hg")?;
//!
//! let search = PositionSearch::parse(
//!     "0x8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f",
//! )?;
//! let request = PositionsRequest::builder()
//!     .filter(PositionFilter::builder().search(search).build())
//!     .build();
//!
//! let records = client.positions(&request).await?;
//! let positions = records
//!     .iter()
//!     .map(Position::try_from)
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! println!("mergeable: {}", position::are_positions_mergeable(&positions));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::Client;
