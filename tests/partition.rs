#![allow(clippy::unwrap_used, reason = "Fine for tests")]

use conditional_tokens_sdk::ids::IndexSet;
use conditional_tokens_sdk::partition::editor::{EditAction, PartitionEditor};
use conditional_tokens_sdk::partition::{
    Partition, PartitionViolation, is_valid_partition, trivial_partition, validate_partition,
};
use conditional_tokens_sdk::types::U256;

fn sets(values: &[u64]) -> Vec<IndexSet> {
    values
        .iter()
        .map(|&v| IndexSet::new(U256::from(v)).unwrap())
        .collect()
}

#[test]
fn two_way_split_of_three_outcomes_is_valid() {
    assert!(is_valid_partition(&sets(&[0b011, 0b100]), 3));
}

#[test]
fn repeated_member_is_invalid() {
    assert!(!is_valid_partition(&sets(&[0b011, 0b011]), 3));
}

#[test]
fn single_outcome_of_three_is_invalid() {
    assert!(!is_valid_partition(&sets(&[0b001]), 3));
}

#[test]
fn trivial_partition_of_every_size_is_valid() {
    for n in 0..=256 {
        let partition = trivial_partition(n).unwrap();

        assert_eq!(partition.len(), n);
        assert!(partition.is_valid_for(n), "trivial partition of {n}");
    }
}

#[test]
fn overlap_is_reported_at_the_first_offending_member() {
    assert_eq!(
        validate_partition(&sets(&[0b0001, 0b0110, 0b1100, 0b0011]), 4),
        Err(PartitionViolation::Overlap { member: 2 })
    );
}

#[test]
fn partitions_serialize_as_decimal_strings() {
    let partition = Partition::new(sets(&[1, 6]));

    assert_eq!(
        serde_json::to_value(&partition).unwrap(),
        serde_json::json!(["1", "6"])
    );
}

#[test]
fn editor_builds_custom_partition() {
    // {0}, {1}, {2}, {3} -> {1, 0}, {3, 2}
    let editor = PartitionEditor::trivial(4)
        .unwrap()
        .apply(EditAction::MoveOutcome {
            from: 0,
            position: 0,
            to: 1,
        })
        .unwrap();
    assert_eq!(editor.collections(), &[vec![1, 0], vec![2], vec![3]]);

    let editor = editor
        .apply(EditAction::MoveOutcome {
            from: 1,
            position: 0,
            to: 2,
        })
        .unwrap();
    assert_eq!(editor.collections(), &[vec![1, 0], vec![3, 2]]);

    let partition = editor.to_partition().unwrap();
    assert_eq!(partition.as_slice(), sets(&[0b0011, 0b1100]).as_slice());
    assert!(partition.is_valid_for(4));
}

#[test]
fn editor_starts_from_an_existing_partition() {
    let partition = Partition::new(sets(&[0b101, 0b010]));
    let editor = PartitionEditor::new(&partition, 3).unwrap();

    assert_eq!(editor.collections(), &[vec![0, 2], vec![1]]);
    assert_eq!(editor.to_partition().unwrap(), partition);
}
