#![allow(clippy::unwrap_used, reason = "Fine for tests")]

use conditional_tokens_sdk::error::Kind;
use conditional_tokens_sdk::ids::{self, CollectionId, ConditionId, IndexSet, PositionId};
use conditional_tokens_sdk::partition::Partition;
use conditional_tokens_sdk::position::{
    self, MergePlan, MergeTarget, Position, PositionCondition, PositionSummary, RedeemPlan,
    SplitPlan, Token,
};
use conditional_tokens_sdk::types::{Address, B256, U256, address, b256};

const ORACLE: Address = address!("0x0000000000000000000000000000000000000001");
const USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");

fn binary() -> ConditionId {
    ids::condition_id(ORACLE, B256::ZERO, 2)
}

fn ternary() -> ConditionId {
    ids::condition_id(ORACLE, B256::with_last_byte(1), 3)
}

fn on_binary(index_set: u64) -> PositionCondition {
    PositionCondition::new(binary(), 2, IndexSet::new(U256::from(index_set)).unwrap()).unwrap()
}

fn on_ternary(index_set: u64) -> PositionCondition {
    PositionCondition::new(ternary(), 3, IndexSet::new(U256::from(index_set)).unwrap()).unwrap()
}

fn position(collateral: Address, lineage: Vec<PositionCondition>) -> Position {
    Position::from_lineage(collateral, lineage).unwrap()
}

fn yes_position_id() -> PositionId {
    "6650001538591442833773429975529249703175990646737985509172313262337531636570"
        .parse()
        .unwrap()
}

mod mergeability {
    use super::*;

    #[test]
    fn binary_outcomes_merge_back_to_collateral() {
        let positions = [
            position(USDC, vec![on_binary(0b01)]),
            position(USDC, vec![on_binary(0b10)]),
        ];

        assert_eq!(positions[0].id, yes_position_id());
        assert!(position::are_positions_mergeable(&positions));
        assert_eq!(position::mergeable_conditions(&positions), vec![binary()]);

        let plan = MergePlan::new(&positions, &binary()).unwrap();
        assert_eq!(plan.target, MergeTarget::Collateral);
        assert_eq!(plan.parent_collection_id, CollectionId::NULL);
        assert_eq!(plan.partition.to_u256_vec(), vec![U256::from(1), U256::from(2)]);
    }

    #[test]
    fn nested_positions_merge_into_their_parent() {
        // Lineages list the shared condition in different orders.
        let positions = [
            position(USDC, vec![on_binary(0b01), on_ternary(0b001)]),
            position(USDC, vec![on_ternary(0b010), on_binary(0b01)]),
            position(USDC, vec![on_binary(0b01), on_ternary(0b100)]),
        ];

        assert!(position::are_positions_mergeable_by_condition(&positions, &ternary()));
        assert!(!position::are_positions_mergeable_by_condition(&positions, &binary()));
        assert_eq!(position::mergeable_conditions(&positions), vec![ternary()]);

        let plan = MergePlan::new(&positions, &ternary()).unwrap();
        assert_eq!(plan.target, MergeTarget::Position(yes_position_id()));
        assert_eq!(
            plan.parent_collection_id.as_b256(),
            &b256!("0x1ea598e0fe126b707d9ef65cce379170e22626b479f3280f5cd897402b593b13")
        );
    }

    #[test]
    fn mixed_collateral_is_not_mergeable() {
        let positions = [
            position(USDC, vec![on_binary(0b01)]),
            position(DAI, vec![on_binary(0b10)]),
        ];

        assert!(!position::are_positions_mergeable(&positions));
    }

    #[test]
    fn incomplete_partition_is_not_mergeable() {
        let positions = [
            position(USDC, vec![on_ternary(0b001)]),
            position(USDC, vec![on_ternary(0b010)]),
        ];

        assert!(!position::are_positions_mergeable_by_condition(&positions, &ternary()));

        let err = MergePlan::new(&positions, &ternary()).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn different_parents_are_not_mergeable() {
        let positions = [
            position(USDC, vec![on_binary(0b01), on_ternary(0b001)]),
            position(USDC, vec![on_binary(0b10), on_ternary(0b110)]),
        ];

        assert!(position::mergeable_conditions(&positions).is_empty());
    }

    #[test]
    fn fewer_than_two_positions_are_not_mergeable() {
        assert!(!position::are_positions_mergeable(&[]));
        assert!(!position::are_positions_mergeable(&[position(
            USDC,
            vec![on_binary(0b11)]
        )]));
    }
}

mod plans {
    use super::*;

    #[test]
    fn split_of_a_position_creates_nested_positions() {
        let yes = position(USDC, vec![on_binary(0b01)]);

        let plan = SplitPlan::from_position(&yes, ternary(), 3, None).unwrap();
        let created = plan.resulting_positions().unwrap();

        let nested = CollectionId::new(b256!(
            "0x63de2dc9af682feaf8527abbbaf398e9dbbe1266fc90dd0e1aec6c23acd49661"
        ));
        assert_eq!(created.len(), 3);
        assert_eq!(created[0], ids::position_id(USDC, &nested));
    }

    #[test]
    fn split_plan_rejects_an_invalid_partition() {
        let partition = Partition::new(vec![
            IndexSet::new(U256::from(0b011)).unwrap(),
            IndexSet::new(U256::from(0b110)).unwrap(),
        ]);

        let err = SplitPlan::from_collateral(USDC, ternary(), 3, Some(partition)).unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn split_plan_rejects_a_condition_already_in_the_lineage() {
        let yes = position(USDC, vec![on_binary(0b01)]);

        let err = SplitPlan::from_position(&yes, binary(), 2, None).unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn redeem_plan_uses_the_rest_of_the_lineage_as_parent() {
        let nested = position(USDC, vec![on_binary(0b01), on_ternary(0b100)]);

        let plan = RedeemPlan::for_position(&nested, &ternary()).unwrap();

        assert_eq!(
            plan.parent_collection_id,
            ids::collection_id(None, &binary(), IndexSet::new(U256::from(1)).unwrap()).unwrap()
        );
        assert_eq!(plan.index_sets, vec![IndexSet::new(U256::from(0b100)).unwrap()]);
    }
}

#[test]
fn summary_lists_every_condition() {
    let nested = position(USDC, vec![on_binary(0b01), on_ternary(0b101)]);
    let token = Token::new(USDC, "USDC", 6);

    let summary = PositionSummary::new(&nested, &token, U256::from(1_500_000)).to_string();

    assert_eq!(
        summary,
        "[USDC C: 0x8bfbea...2a765f O: 0 & C: 0x9b5ac2...db1332 O: 0,2] x1.5"
    );
}
