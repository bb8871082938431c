#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[cfg(feature = "ctf")]
pub mod ctf;
pub mod error;
pub mod ids;
#[cfg(feature = "indexer")]
pub mod indexer;
pub mod partition;
pub mod position;
#[cfg(feature = "indexer")]
pub(crate) mod serde_helpers;
pub mod types;

use alloy::primitives::ChainId;
use phf::phf_map;
#[cfg(feature = "indexer")]
use reqwest::Request;
#[cfg(feature = "indexer")]
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::types::{Address, address};

pub type Result<T> = std::result::Result<T, Error>;

/// [`ChainId`] for Ethereum mainnet
pub const MAINNET: ChainId = 1;

/// [`ChainId`] for Polygon mainnet
pub const POLYGON: ChainId = 137;

/// [`ChainId`] for Polygon testnet <https://polygon.technology/blog/introducing-the-amoy-testnet-for-polygon-pos>
pub const AMOY: ChainId = 80002;

static CONFIG: phf::Map<ChainId, ContractConfig> = phf_map! {
    1_u64 => ContractConfig {
        conditional_tokens: address!("0xC59b0e4De5F1248C1140964E0fF287B192407E0C"),
        collateral: address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"),
    },
    137_u64 => ContractConfig {
        conditional_tokens: address!("0x4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
        collateral: address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    },
    80002_u64 => ContractConfig {
        conditional_tokens: address!("0x69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
        collateral: address!("0x9c4e1703476e875070ee25b56a58b008cfb8fa78"),
    },
};

/// Deployed Conditional Tokens contract and the collateral commonly used with it on a chain.
#[non_exhaustive]
#[derive(Debug)]
pub struct ContractConfig {
    pub conditional_tokens: Address,
    /// Default collateral token (DAI on mainnet, USDC on Polygon)
    pub collateral: Address,
}

/// Given a `chain_id`, return the relevant [`ContractConfig`]
#[must_use]
pub fn contract_config(chain_id: ChainId) -> Option<&'static ContractConfig> {
    CONFIG.get(&chain_id)
}

#[cfg(feature = "indexer")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "indexer request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    serde_helpers::deserialize_with_warnings(json_value)
}
