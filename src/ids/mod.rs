//! Condition, collection and position identifiers.
//!
//! Every function here reproduces the hashing scheme of the Gnosis Conditional Tokens contract
//! (`CTHelpers`) bit for bit, so IDs computed off-chain match the ERC-1155 token IDs minted
//! on-chain:
//!
//! - **Condition ID**: `keccak256(oracle ‖ questionId ‖ outcomeSlotCount)`
//! - **Collection ID**: the compressed `alt_bn128` point of `keccak256(conditionId ‖ indexSet)`,
//!   added to the point of the parent collection (if any)
//! - **Position ID**: `keccak256(collateralToken ‖ collectionId)` read as a `uint256`
//!
//! # Example
//!
//! ```
//! use conditional_tokens_sdk::ids::{self, IndexSet};
//! use conditional_tokens_sdk::types::{address, B256};
//!
//! # fn main() -> conditional_tokens_sdk::Result<()> {
//! let oracle = address!("0x0000000000000000000000000000000000000001");
//! let condition = ids::condition_id(oracle, B256::ZERO, 2);
//!
//! let yes = ids::collection_id(None, &condition, IndexSet::singleton(0)?)?;
//! let usdc = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
//! let token_id = ids::position_id(usdc, &yes);
//!
//! assert!(!yes.is_null());
//! # let _ = token_id;
//! # Ok(())
//! # }
//! ```

mod curve;

use std::fmt;
use std::str::FromStr;

use alloy::primitives::hex;
use alloy::primitives::{Address, B256, U256, keccak256};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::Result;
use crate::error::Error;

/// The contract stores payouts and index sets in a `uint256`, which caps the outcome slots.
pub const MAX_OUTCOME_SLOTS: usize = 256;

/// Identifier of a condition: an oracle, a question and a number of outcome slots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ConditionId(B256);

impl ConditionId {
    #[must_use]
    pub const fn new(id: B256) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_b256(&self) -> &B256 {
        &self.0
    }

    /// Returns `true` if `value` is a `0x`-prefixed, 64 hex digit condition ID.
    #[must_use]
    pub fn is_valid_str(value: &str) -> bool {
        parse_fixed_hex::<32>("condition_id", value).is_ok()
    }
}

impl From<B256> for ConditionId {
    fn from(id: B256) -> Self {
        Self(id)
    }
}

impl From<ConditionId> for B256 {
    fn from(id: ConditionId) -> Self {
        id.0
    }
}

impl FromStr for ConditionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_fixed_hex::<32>("condition_id", s).map(|bytes| Self(B256::from(bytes)))
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Identifier of a collection: a set of outcomes across one or more conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct CollectionId(B256);

impl CollectionId {
    /// The root collection, used as parent for positions backed directly by collateral.
    pub const NULL: Self = Self(B256::ZERO);

    #[must_use]
    pub const fn new(id: B256) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_b256(&self) -> &B256 {
        &self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::NULL
    }
}

impl From<B256> for CollectionId {
    fn from(id: B256) -> Self {
        Self(id)
    }
}

impl From<CollectionId> for B256 {
    fn from(id: CollectionId) -> Self {
        id.0
    }
}

impl FromStr for CollectionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_fixed_hex::<32>("collection_id", s).map(|bytes| Self(B256::from(bytes)))
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// ERC-1155 token ID of a position. Displayed and parsed as a decimal integer, like the indexer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct PositionId(U256);

impl PositionId {
    #[must_use]
    pub const fn new(id: U256) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_u256(&self) -> &U256 {
        &self.0
    }
}

impl From<U256> for PositionId {
    fn from(id: U256) -> Self {
        Self(id)
    }
}

impl From<PositionId> for U256 {
    fn from(id: PositionId) -> Self {
        id.0
    }
}

impl FromStr for PositionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        U256::from_str(s)
            .map(Self)
            .map_err(|e| Error::invalid_input("position_id", e.to_string()))
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Bitmask over the outcome slots of a condition: bit `i` set means outcome `i` is included.
///
/// An index set is never zero, since the empty selection is not a legal collection component.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct IndexSet(U256);

impl IndexSet {
    pub fn new(value: U256) -> Result<Self> {
        if value.is_zero() {
            return Err(Error::invalid_input(
                "index_set",
                "zero selects no outcome slots",
            ));
        }

        Ok(Self(value))
    }

    /// The index set selecting only `slot`.
    pub fn singleton(slot: usize) -> Result<Self> {
        check_slot(slot)?;
        Ok(Self(U256::from(1_u8) << slot))
    }

    /// Builds an index set from zero-based outcome slot indexes.
    pub fn from_outcomes<I>(slots: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut value = U256::ZERO;
        for slot in slots {
            check_slot(slot)?;
            value |= U256::from(1_u8) << slot;
        }

        Self::new(value)
    }

    /// The index set selecting every slot of a condition with `outcome_slot_count` outcomes.
    pub fn full(outcome_slot_count: usize) -> Result<Self> {
        Self::new(full_mask(outcome_slot_count)?)
    }

    #[must_use]
    pub const fn value(&self) -> U256 {
        self.0
    }

    /// Zero-based outcome slots in ascending order.
    #[must_use]
    pub fn outcomes(&self) -> Vec<usize> {
        (0..self.0.bit_len()).filter(|&slot| self.0.bit(slot)).collect()
    }

    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.0.count_ones()
    }

    #[must_use]
    pub fn contains(&self, slot: usize) -> bool {
        slot < MAX_OUTCOME_SLOTS && self.0.bit(slot)
    }

    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        (self.0 & other.0).is_zero()
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if every selected slot lies below `outcome_slot_count`.
    #[must_use]
    pub fn fits(&self, outcome_slot_count: usize) -> bool {
        self.0.bit_len() <= outcome_slot_count
    }
}

impl TryFrom<U256> for IndexSet {
    type Error = Error;

    fn try_from(value: U256) -> Result<Self> {
        Self::new(value)
    }
}

impl From<IndexSet> for U256 {
    fn from(index_set: IndexSet) -> Self {
        index_set.0
    }
}

impl FromStr for IndexSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value =
            U256::from_str(s).map_err(|e| Error::invalid_input("index_set", e.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Calculates a condition ID.
#[must_use]
pub fn condition_id(oracle: Address, question_id: B256, outcome_slot_count: usize) -> ConditionId {
    let mut packed = [0_u8; 84];
    packed[..20].copy_from_slice(oracle.as_slice());
    packed[20..52].copy_from_slice(question_id.as_slice());
    packed[52..].copy_from_slice(&U256::from(outcome_slot_count).to_be_bytes::<32>());

    ConditionId(keccak256(packed))
}

/// Calculates the ID of the collection selecting `index_set` of `condition_id`, nested inside
/// `parent` (`None` or [`CollectionId::NULL`] for the root collection).
///
/// # Errors
///
/// Returns [`Kind::InvalidInput`](crate::error::Kind::InvalidInput) if `parent` is not a valid
/// collection ID, i.e. does not encode a point of `alt_bn128`.
pub fn collection_id(
    parent: Option<&CollectionId>,
    condition_id: &ConditionId,
    index_set: IndexSet,
) -> Result<CollectionId> {
    let mut packed = [0_u8; 64];
    packed[..32].copy_from_slice(condition_id.0.as_slice());
    packed[32..].copy_from_slice(&index_set.0.to_be_bytes::<32>());

    let mut point = curve::hash_to_point(&keccak256(packed));

    if let Some(parent) = parent.filter(|p| !p.is_null()) {
        let parent_point = curve::decompress(&parent.0).ok_or_else(|| {
            Error::invalid_input(
                "parent_collection_id",
                format!("{parent} is not a valid collection ID"),
            )
        })?;
        point = curve::add(&point, &parent_point);
    }

    Ok(CollectionId(curve::compress(&point)))
}

/// Calculates a position ID (ERC-1155 token ID).
#[must_use]
pub fn position_id(collateral_token: Address, collection_id: &CollectionId) -> PositionId {
    let mut packed = [0_u8; 52];
    packed[..20].copy_from_slice(collateral_token.as_slice());
    packed[20..].copy_from_slice(collection_id.0.as_slice());

    PositionId(U256::from_be_bytes(keccak256(packed).0))
}

/// Calculates the collection ID of several `(condition, index set)` components at once.
///
/// Components are folded in ascending condition ID order, so the result does not depend on the
/// order in which the conditions were split. An empty slice yields [`CollectionId::NULL`].
pub fn combine_collection_ids(components: &[(ConditionId, IndexSet)]) -> Result<CollectionId> {
    let mut sorted = components.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    sorted
        .iter()
        .try_fold(CollectionId::NULL, |parent, (condition, index_set)| {
            collection_id(Some(&parent), condition, *index_set)
        })
}

/// Adds already derived collection IDs together. Null IDs are skipped.
pub fn merge_collection_ids(collection_ids: &[CollectionId]) -> Result<CollectionId> {
    let mut sum: Option<ark_bn254::G1Affine> = None;

    for id in collection_ids.iter().filter(|id| !id.is_null()) {
        let point = curve::decompress(&id.0).ok_or_else(|| {
            Error::invalid_input("collection_id", format!("{id} is not a valid collection ID"))
        })?;
        sum = Some(match sum {
            Some(acc) => curve::add(&acc, &point),
            None => point,
        });
    }

    Ok(sum.map_or(CollectionId::NULL, |point| CollectionId(curve::compress(&point))))
}

/// Parses a `0x`-prefixed, 40 hex digit address.
pub fn parse_address(value: &str) -> Result<Address> {
    parse_fixed_hex::<20>("address", value).map(Address::from)
}

/// Bitmask with the lowest `outcome_slot_count` bits set.
pub(crate) fn full_mask(outcome_slot_count: usize) -> Result<U256> {
    match outcome_slot_count {
        0 => Ok(U256::ZERO),
        n if n <= MAX_OUTCOME_SLOTS => Ok(U256::MAX >> (MAX_OUTCOME_SLOTS - n)),
        n => Err(Error::invalid_input(
            "outcome_slot_count",
            format!("{n} exceeds the maximum of {MAX_OUTCOME_SLOTS}"),
        )),
    }
}

fn check_slot(slot: usize) -> Result<()> {
    if slot < MAX_OUTCOME_SLOTS {
        Ok(())
    } else {
        Err(Error::invalid_input(
            "outcome_slot",
            format!("{slot} is out of range 0..{MAX_OUTCOME_SLOTS}"),
        ))
    }
}

fn parse_fixed_hex<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N]> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| Error::invalid_input(field, format!("{value:?} is missing the 0x prefix")))?;

    if digits.len() != N * 2 {
        return Err(Error::invalid_input(
            field,
            format!("expected {} hex digits, got {}", N * 2, digits.len()),
        ));
    }

    let mut bytes = [0_u8; N];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| Error::invalid_input(field, e.to_string()))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;
    use crate::error::Kind;

    const ORACLE: Address = address!("0x0000000000000000000000000000000000000001");
    const USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

    fn binary_condition() -> ConditionId {
        condition_id(ORACLE, B256::ZERO, 2)
    }

    #[test]
    fn condition_id_matches_contract() {
        assert_eq!(
            binary_condition().as_b256(),
            &b256!("0x8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f")
        );
    }

    #[test]
    fn collection_ids_for_binary_outcomes() {
        let condition = binary_condition();

        let yes = collection_id(None, &condition, IndexSet::singleton(0).unwrap()).unwrap();
        let no = collection_id(None, &condition, IndexSet::singleton(1).unwrap()).unwrap();

        assert_eq!(
            yes.as_b256(),
            &b256!("0x1ea598e0fe126b707d9ef65cce379170e22626b479f3280f5cd897402b593b13")
        );
        assert_eq!(
            no.as_b256(),
            &b256!("0x23fdbf3d36f649a7fcba64e13c7558b86562b650a75503956136e6ce65ba9674")
        );
    }

    #[test]
    fn position_ids_for_binary_outcomes() {
        let condition = binary_condition();
        let yes = collection_id(None, &condition, IndexSet::singleton(0).unwrap()).unwrap();

        assert_eq!(
            position_id(USDC, &yes),
            "6650001538591442833773429975529249703175990646737985509172313262337531636570"
                .parse::<PositionId>()
                .unwrap()
        );
    }

    #[test]
    fn null_parent_equals_no_parent() {
        let condition = binary_condition();
        let index_set = IndexSet::singleton(1).unwrap();

        assert_eq!(
            collection_id(Some(&CollectionId::NULL), &condition, index_set).unwrap(),
            collection_id(None, &condition, index_set).unwrap()
        );
    }

    #[test]
    fn invalid_parent_is_rejected() {
        let parent = CollectionId::new(b256!(
            "0x0000000000000000000000000000000000000000000000000000000000000004"
        ));

        let err = collection_id(
            Some(&parent),
            &binary_condition(),
            IndexSet::singleton(0).unwrap(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }

    #[test]
    fn zero_index_set_is_rejected() {
        let err = IndexSet::new(U256::ZERO).unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidInput);

        let err = IndexSet::from_outcomes([]).unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidInput);
    }

    #[test]
    fn index_set_outcomes_are_ascending() {
        let index_set = IndexSet::new(U256::from(0b1011_u32)).unwrap();

        assert_eq!(index_set.outcomes(), vec![0, 1, 3]);
        assert_eq!(index_set.outcome_count(), 3);
        assert!(index_set.contains(3));
        assert!(!index_set.contains(2));
        assert!(index_set.fits(4));
        assert!(!index_set.fits(3));
    }

    #[test]
    fn full_index_set_covers_every_slot() {
        assert_eq!(IndexSet::full(3).unwrap().value(), U256::from(0b111_u32));
        assert_eq!(IndexSet::full(256).unwrap().value(), U256::MAX);
        IndexSet::full(0).unwrap_err();
        IndexSet::full(257).unwrap_err();
    }

    #[test]
    fn highest_slot_is_accepted() {
        let index_set = IndexSet::singleton(255).unwrap();

        assert_eq!(index_set.outcomes(), vec![255]);
        IndexSet::singleton(256).unwrap_err();
    }

    #[test]
    fn condition_id_parsing_is_strict() {
        assert!(ConditionId::is_valid_str(
            "0x8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f"
        ));
        assert!(ConditionId::is_valid_str(
            "0x8BFBEAAB2E8FCEA4B97DB75C3B23D40D50D7CE89A1935D00CA59E53BF02A765F"
        ));
        assert!(!ConditionId::is_valid_str(
            "8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f"
        ));
        assert!(!ConditionId::is_valid_str("0x8bfb"));
        assert!(!ConditionId::is_valid_str(
            "0xzzfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f"
        ));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let condition = binary_condition();
        let text = condition.to_string();

        assert_eq!(
            text,
            "0x8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f"
        );
        assert_eq!(text.parse::<ConditionId>().unwrap(), condition);
    }

    #[test]
    fn parse_address_requires_prefix_and_length() {
        assert_eq!(
            parse_address("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174").unwrap(),
            USDC
        );
        assert_eq!(
            parse_address("2791Bca1f2de4661ED88A30C99A7a9449Aa84174")
                .unwrap_err()
                .kind(),
            Kind::InvalidInput
        );
        assert_eq!(
            parse_address("0x2791Bca1").unwrap_err().kind(),
            Kind::InvalidInput
        );
    }
}
