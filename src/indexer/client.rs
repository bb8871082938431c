use alloy::primitives::hex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use url::Url;

use super::types::{
    Condition, MAX_PAGE_SIZE, PageRequest, PositionFilter, PositionRecord, PositionSearch,
    PositionsRequest,
};
use crate::Result;
use crate::error::Error;
use crate::ids::{ConditionId, PositionId};

const CONDITION_QUERY: &str = r"
query Condition($id: ID!) {
  condition(id: $id) {
    id creator oracle questionId outcomeSlotCount resolved
    payoutNumerators payoutDenominator createTimestamp
  }
}";

const CONDITIONS_QUERY: &str = r"
query Conditions($first: Int!, $skip: Int!) {
  conditions(first: $first, skip: $skip, orderBy: createTimestamp, orderDirection: desc) {
    id creator oracle questionId outcomeSlotCount resolved
    payoutNumerators payoutDenominator createTimestamp
  }
}";

const POSITION_QUERY: &str = r"
query Position($id: ID!) {
  position(id: $id) {
    id collateralToken { id } collection { id } conditionIds indexSets
    conditions { id outcomeSlotCount } createTimestamp
  }
}";

const POSITIONS_QUERY: &str = r"
query Positions($first: Int!, $skip: Int!, $where: Position_filter!) {
  positions(
    first: $first, skip: $skip, where: $where,
    orderBy: createTimestamp, orderDirection: desc
  ) {
    id collateralToken { id } collection { id } conditionIds indexSets
    conditions { id outcomeSlotCount } createTimestamp
  }
}";

/// GraphQL client for a Conditional Tokens indexer (a subgraph exposing `conditions` and
/// `positions`).
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
}

impl Client {
    /// Creates a client posting queries to the GraphQL endpoint at `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(host: &str) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("conditional_tokens_sdk"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            host: Url::parse(host)?,
            client,
        })
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Looks up a condition, `None` if the indexer has not seen it.
    pub async fn condition(&self, id: &ConditionId) -> Result<Option<Condition>> {
        let data: ConditionData = self
            .query(CONDITION_QUERY, json!({ "id": id.to_string() }))
            .await?;

        Ok(data.condition)
    }

    /// Lists conditions, newest first.
    pub async fn conditions(&self, page: &PageRequest) -> Result<Vec<Condition>> {
        let data: ConditionsData = self.query(CONDITIONS_QUERY, page_variables(page)).await?;

        Ok(data.conditions)
    }

    /// Looks up a position, `None` if the indexer has not seen it.
    pub async fn position(&self, id: &PositionId) -> Result<Option<PositionRecord>> {
        let data: PositionData = self
            .query(POSITION_QUERY, json!({ "id": position_key(id) }))
            .await?;

        Ok(data.position)
    }

    /// Lists positions matching `request.filter`, newest first.
    pub async fn positions(&self, request: &PositionsRequest) -> Result<Vec<PositionRecord>> {
        let data: PositionsData = self
            .query(POSITIONS_QUERY, positions_variables(request))
            .await?;

        Ok(data.positions)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, variables), fields(host = %self.host))
    )]
    async fn query<T: DeserializeOwned>(&self, query: &'static str, variables: Value) -> Result<T> {
        let request = self
            .client
            .request(Method::POST, self.host.clone())
            .json(&GraphQlRequest { query, variables })
            .build()?;

        let response: GraphQlResponse<T> = crate::request(&self.client, request).await?;

        if !response.errors.is_empty() {
            let message = response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            #[cfg(feature = "tracing")]
            tracing::warn!(%message, "indexer returned GraphQL errors");

            return Err(Error::status(
                StatusCode::OK,
                Method::POST,
                self.host.path().to_owned(),
                message,
            ));
        }

        response.data.ok_or_else(|| {
            Error::status(
                StatusCode::OK,
                Method::POST,
                self.host.path().to_owned(),
                "response carries neither data nor errors",
            )
        })
    }
}

fn page_variables(page: &PageRequest) -> Value {
    json!({
        "first": page.first.min(MAX_PAGE_SIZE),
        "skip": page.skip,
    })
}

fn positions_variables(request: &PositionsRequest) -> Value {
    json!({
        "first": request.first.min(MAX_PAGE_SIZE),
        "skip": request.skip,
        "where": request.filter.as_ref().map_or_else(|| json!({}), position_filter),
    })
}

/// Translates a filter into the subgraph's `Position_filter` input.
fn position_filter(filter: &PositionFilter) -> Value {
    let mut clause = Map::new();

    if let Some(tokens) = &filter.collateral_tokens {
        let tokens: Vec<String> = tokens.iter().map(hex::encode_prefixed).collect();
        clause.insert("collateralToken_in".to_owned(), json!(tokens));
    }
    if let Some(from) = filter.created_from {
        clause.insert("createTimestamp_gte".to_owned(), json!(from.timestamp().to_string()));
    }
    if let Some(to) = filter.created_to {
        clause.insert("createTimestamp_lte".to_owned(), json!(to.timestamp().to_string()));
    }
    match filter.search {
        Some(PositionSearch::PositionId(id)) => {
            clause.insert("id".to_owned(), json!(position_key(&id)));
        }
        Some(PositionSearch::ConditionId(id)) => {
            clause.insert("conditionIds_contains".to_owned(), json!([id.to_string()]));
        }
        None => {}
    }

    Value::Object(clause)
}

/// The indexer keys positions by their 32 byte hex token ID.
fn position_key(id: &PositionId) -> String {
    hex::encode_prefixed(id.as_u256().to_be_bytes::<32>())
}

#[derive(Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ConditionData {
    condition: Option<Condition>,
}

#[derive(Deserialize)]
struct ConditionsData {
    conditions: Vec<Condition>,
}

#[derive(Deserialize)]
struct PositionData {
    position: Option<PositionRecord>,
}

#[derive(Deserialize)]
struct PositionsData {
    positions: Vec<PositionRecord>,
}
