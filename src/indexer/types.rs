//! Records returned by the Conditional Tokens indexer.

use alloy::primitives::{Address, B256, U256};
use bon::Builder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, TimestampSeconds, serde_as};

use crate::error::Error;
use crate::ids::{CollectionId, ConditionId, IndexSet, PositionId};
use crate::position::{Position, PositionCondition};

/// Largest page the indexer serves.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Decimal places kept by [`Condition::payout_share`].
const SHARE_SCALE: u32 = 18;

/// Pagination of list queries.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Builder, Serialize)]
pub struct PageRequest {
    /// Page size, capped at [`MAX_PAGE_SIZE`]
    #[builder(default = 100)]
    pub first: u32,
    #[builder(default)]
    pub skip: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Pagination and filters of a positions listing.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct PositionsRequest {
    /// Page size, capped at [`MAX_PAGE_SIZE`]
    #[builder(default = 100)]
    pub first: u32,
    #[builder(default)]
    pub skip: u32,
    pub filter: Option<PositionFilter>,
}

impl Default for PositionsRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<PageRequest> for PositionsRequest {
    fn from(page: PageRequest) -> Self {
        Self::builder().first(page.first).skip(page.skip).build()
    }
}

/// Narrows a positions listing. Unset fields do not filter.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct PositionFilter {
    /// Keep positions backed by any of these tokens
    pub collateral_tokens: Option<Vec<Address>>,
    /// Inclusive lower bound on the creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the creation time
    pub created_to: Option<DateTime<Utc>>,
    pub search: Option<PositionSearch>,
}

/// Looks a position up by one of its identifiers.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSearch {
    /// The position itself
    PositionId(PositionId),
    /// Positions split on this condition
    ConditionId(ConditionId),
}

impl PositionSearch {
    /// Reads free text as a condition ID (`0x` and 64 hex digits) or else as a position ID
    /// (decimal or hex token ID).
    ///
    /// # Errors
    ///
    /// Returns [`Kind::InvalidInput`](crate::error::Kind::InvalidInput) if the text is neither.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let text = text.trim();

        if ConditionId::is_valid_str(text) {
            return Ok(Self::ConditionId(text.parse()?));
        }

        text.parse::<PositionId>()
            .map(Self::PositionId)
            .map_err(|_| {
                Error::invalid_input(
                    "search",
                    format!("{text} is neither a condition ID nor a position ID"),
                )
            })
    }
}

/// A prepared condition.
#[serde_as]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: ConditionId,
    pub creator: Option<Address>,
    pub oracle: Address,
    pub question_id: B256,
    pub outcome_slot_count: usize,
    #[serde(default)]
    #[builder(default)]
    pub resolved: bool,
    /// One numerator per outcome slot once resolved
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    pub payout_numerators: Option<Vec<U256>>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub payout_denominator: Option<U256>,
    #[serde_as(as = "Option<TimestampSeconds<String>>")]
    pub create_timestamp: Option<DateTime<Utc>>,
}

impl Condition {
    /// Fraction of the collateral paid out to the outcome slots in `index_set`, or `None` while
    /// the condition is unresolved.
    #[must_use]
    pub fn payout_share(&self, index_set: &IndexSet) -> Option<Decimal> {
        let denominator = self.payout_denominator.filter(|d| !d.is_zero())?;
        let numerators = self.payout_numerators.as_deref()?;

        let numerator = numerators
            .iter()
            .enumerate()
            .filter(|(slot, _)| index_set.contains(*slot))
            .fold(U256::ZERO, |acc, (_, payout)| acc.saturating_add(*payout));

        let scaled = numerator.checked_mul(U256::from(10_u64.pow(SHARE_SCALE)))? / denominator;
        let mantissa = i128::try_from(scaled).ok()?;

        Decimal::try_from_i128_with_scale(mantissa, SHARE_SCALE)
            .ok()
            .map(|share| share.normalize())
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    pub id: Address,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: CollectionId,
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRef {
    pub id: ConditionId,
    pub outcome_slot_count: usize,
}

/// A position as indexed, before its lineage is checked.
#[serde_as]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    pub id: PositionId,
    pub collateral_token: TokenRef,
    pub collection: Option<CollectionRef>,
    /// Parallel to `index_sets`
    pub condition_ids: Vec<ConditionId>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub index_sets: Vec<U256>,
    /// Outcome slot counts of the conditions in `condition_ids`, in any order
    pub conditions: Vec<ConditionRef>,
    #[serde_as(as = "Option<TimestampSeconds<String>>")]
    pub create_timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<&PositionRecord> for Position {
    type Error = Error;

    fn try_from(record: &PositionRecord) -> crate::Result<Self> {
        if record.condition_ids.len() != record.index_sets.len() {
            return Err(Error::invalid_input(
                "index_sets",
                format!(
                    "position {} lists {} conditions but {} index sets",
                    record.id,
                    record.condition_ids.len(),
                    record.index_sets.len()
                ),
            ));
        }

        let lineage = record
            .condition_ids
            .iter()
            .zip(&record.index_sets)
            .map(|(condition_id, index_set)| {
                let condition = record
                    .conditions
                    .iter()
                    .find(|condition| &condition.id == condition_id)
                    .ok_or_else(|| {
                        Error::invalid_input(
                            "conditions",
                            format!("position {} is missing condition {condition_id}", record.id),
                        )
                    })?;

                PositionCondition::new(
                    *condition_id,
                    condition.outcome_slot_count,
                    IndexSet::new(*index_set)?,
                )
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Position::new(record.id, record.collateral_token.id, lineage))
    }
}

impl TryFrom<PositionRecord> for Position {
    type Error = Error;

    fn try_from(record: PositionRecord) -> crate::Result<Self> {
        Position::try_from(&record)
    }
}
