#![allow(clippy::unwrap_used, reason = "Fine for tests")]

use conditional_tokens_sdk::error::{InvalidInput, Kind};
use conditional_tokens_sdk::ids::{
    self, CollectionId, ConditionId, IndexSet, PositionId, combine_collection_ids,
};
use conditional_tokens_sdk::types::{Address, B256, U256, address, b256};

const ORACLE: Address = address!("0x0000000000000000000000000000000000000001");
const USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

fn binary() -> ConditionId {
    ids::condition_id(ORACLE, B256::ZERO, 2)
}

fn ternary() -> ConditionId {
    ids::condition_id(ORACLE, B256::with_last_byte(1), 3)
}

fn set(value: u64) -> IndexSet {
    IndexSet::new(U256::from(value)).unwrap()
}

mod derivation {
    use super::*;

    #[test]
    fn ternary_condition_id_matches_contract() {
        assert_eq!(
            ternary().as_b256(),
            &b256!("0x9b5ac25a545c43f9fab096b9a8e5185b8f451eb237c62b7836463700d7db1332")
        );
    }

    #[test]
    fn no_position_id_matches_contract() {
        let no = ids::collection_id(None, &binary(), set(0b10)).unwrap();

        assert_eq!(
            ids::position_id(USDC, &no),
            "31371014724781045320016715228241562001662097404595817681914711109859139322706"
                .parse::<PositionId>()
                .unwrap()
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let first = ids::collection_id(None, &ternary(), set(0b101)).unwrap();
        let second = ids::collection_id(None, &ternary(), set(0b101)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn nested_collection_matches_contract() {
        let yes = ids::collection_id(None, &binary(), set(0b01)).unwrap();

        let nested = ids::collection_id(Some(&yes), &ternary(), set(0b001)).unwrap();

        assert_eq!(
            nested.as_b256(),
            &b256!("0x63de2dc9af682feaf8527abbbaf398e9dbbe1266fc90dd0e1aec6c23acd49661")
        );
    }

    #[test]
    fn parent_with_top_bit_set_reads_as_odd() {
        // The contract treats any bit above 253 as odd y parity, so bit 255 alone flips the parent.
        let parent = CollectionId::new(b256!(
            "0x9ea598e0fe126b707d9ef65cce379170e22626b479f3280f5cd897402b593b13"
        ));
        let odd_parent = CollectionId::new(b256!(
            "0x5ea598e0fe126b707d9ef65cce379170e22626b479f3280f5cd897402b593b13"
        ));

        let nested = ids::collection_id(Some(&parent), &ternary(), set(0b001)).unwrap();

        assert_eq!(
            nested.as_b256(),
            &b256!("0x62387dfcd77c55ea26df4ce4e5f0a3e7319ef39e41a190fd6a32bd92d6f8ba93")
        );
        assert_eq!(
            nested,
            ids::collection_id(Some(&odd_parent), &ternary(), set(0b001)).unwrap()
        );
    }

    #[test]
    fn nesting_order_does_not_matter() {
        let outer = ids::collection_id(None, &ternary(), set(0b001)).unwrap();
        assert_eq!(
            outer.as_b256(),
            &b256!("0x61170ffe6e20bfbf8f5487817c70c330cb7b01b45c2ae5c68806ceb55bb33912")
        );

        let binary_first = ids::collection_id(
            Some(&ids::collection_id(None, &binary(), set(0b01)).unwrap()),
            &ternary(),
            set(0b001),
        )
        .unwrap();
        let ternary_first = ids::collection_id(Some(&outer), &binary(), set(0b01)).unwrap();

        assert_eq!(binary_first, ternary_first);
    }
}

mod combine {
    use super::*;

    #[test]
    fn empty_input_is_null() {
        assert_eq!(combine_collection_ids(&[]).unwrap(), CollectionId::NULL);
    }

    #[test]
    fn single_component_equals_collection_id() {
        let combined = combine_collection_ids(&[(binary(), set(0b01))]).unwrap();

        assert_eq!(
            combined,
            ids::collection_id(None, &binary(), set(0b01)).unwrap()
        );
    }

    #[test]
    fn permutations_give_the_same_id() {
        let forward = combine_collection_ids(&[(binary(), set(0b01)), (ternary(), set(0b001))]);
        let backward = combine_collection_ids(&[(ternary(), set(0b001)), (binary(), set(0b01))]);

        assert_eq!(forward.unwrap(), backward.unwrap());
    }

    #[test]
    fn combined_id_matches_nested_derivation() {
        let combined =
            combine_collection_ids(&[(ternary(), set(0b001)), (binary(), set(0b01))]).unwrap();

        assert_eq!(
            combined.as_b256(),
            &b256!("0x63de2dc9af682feaf8527abbbaf398e9dbbe1266fc90dd0e1aec6c23acd49661")
        );
    }

    #[test]
    fn merge_collection_ids_adds_derived_ids() {
        let yes = ids::collection_id(None, &binary(), set(0b01)).unwrap();
        let outer = ids::collection_id(None, &ternary(), set(0b001)).unwrap();

        let merged = ids::merge_collection_ids(&[CollectionId::NULL, yes, outer]).unwrap();

        assert_eq!(
            merged,
            combine_collection_ids(&[(binary(), set(0b01)), (ternary(), set(0b001))]).unwrap()
        );
        assert_eq!(
            ids::merge_collection_ids(&[]).unwrap(),
            CollectionId::NULL
        );
    }
}

mod parsing {
    use super::*;

    #[test]
    fn malformed_condition_id_is_invalid_input() {
        let err = "not-32-bytes".parse::<ConditionId>().unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
        assert_eq!(
            err.downcast_ref::<InvalidInput>().unwrap().field,
            "condition_id"
        );
    }

    #[test]
    fn short_collection_id_is_invalid_input() {
        let err = "0x1234".parse::<CollectionId>().unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }

    #[test]
    fn zero_index_set_string_is_invalid_input() {
        let err = "0".parse::<IndexSet>().unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidInput);
    }

    #[test]
    fn identifiers_serialize_as_strings() {
        let condition = binary();
        let json = serde_json::to_value(condition).unwrap();

        assert_eq!(
            json,
            serde_json::json!("0x8bfbeaab2e8fcea4b97db75c3b23d40d50d7ce89a1935d00ca59e53bf02a765f")
        );
        assert_eq!(
            serde_json::from_value::<ConditionId>(json).unwrap(),
            condition
        );
        assert_eq!(serde_json::to_value(set(6)).unwrap(), serde_json::json!("6"));
    }
}
