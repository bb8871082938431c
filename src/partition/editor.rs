//! Interactive partition editing as an immutable state plus actions.
//!
//! The editor keeps three groups of outcome slots: the `collections` that will become the
//! partition, a staging `new_collection`, and the `available` slots that were removed from a
//! collection and not yet reassigned. Every [`EditAction`] produces a new editor; the previous
//! state is left untouched, so callers can keep it for undo.

use crate::Result;
use crate::error::Error;
use crate::ids::IndexSet;
use crate::partition::{Partition, trivial_partition};

/// A change applied to a [`PartitionEditor`]. Positions are indexes into the corresponding list.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    /// Move one outcome from a collection back to the available outcomes
    RemoveOutcome { collection: usize, position: usize },
    /// Move one outcome from a collection into another collection
    MoveOutcome {
        from: usize,
        position: usize,
        to: usize,
    },
    /// Move one available outcome into the new collection
    SelectAvailable { position: usize },
    /// Move one outcome of the new collection back to the available outcomes
    DeselectNew { position: usize },
    /// Move every available outcome into the new collection
    SelectAllAvailable,
    /// Move every outcome of the new collection back to the available outcomes
    ClearNewCollection,
    /// Turn the new collection into the first collection of the partition
    CommitNewCollection,
    /// Move all outcomes of one collection back to the available outcomes
    RemoveCollection { collection: usize },
    /// Move all outcomes of every collection back to the available outcomes
    RemoveAllCollections,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEditor {
    outcome_slot_count: usize,
    collections: Vec<Vec<usize>>,
    available: Vec<usize>,
    new_collection: Vec<usize>,
}

impl PartitionEditor {
    /// Starts editing from an existing partition, which must be valid for the condition.
    pub fn new(partition: &Partition, outcome_slot_count: usize) -> Result<Self> {
        partition.validate_for(outcome_slot_count)?;

        Ok(Self {
            outcome_slot_count,
            collections: partition.iter().map(IndexSet::outcomes).collect(),
            available: Vec::new(),
            new_collection: Vec::new(),
        })
    }

    /// Starts editing from one collection per outcome slot.
    pub fn trivial(outcome_slot_count: usize) -> Result<Self> {
        Self::new(&trivial_partition(outcome_slot_count)?, outcome_slot_count)
    }

    #[must_use]
    pub fn outcome_slot_count(&self) -> usize {
        self.outcome_slot_count
    }

    #[must_use]
    pub fn collections(&self) -> &[Vec<usize>] {
        &self.collections
    }

    #[must_use]
    pub fn available(&self) -> &[usize] {
        &self.available
    }

    #[must_use]
    pub fn new_collection(&self) -> &[usize] {
        &self.new_collection
    }

    /// A partition can be submitted once it has at least two collections and no orphaned outcomes.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.collections.len() >= 2 && self.available.is_empty() && self.new_collection.is_empty()
    }

    /// Returns the state after applying `action`.
    ///
    /// # Errors
    ///
    /// Returns [`Kind::InvalidInput`](crate::error::Kind::InvalidInput) if a position is out of
    /// bounds and [`Kind::Validation`](crate::error::Kind::Validation) when committing an empty
    /// new collection.
    pub fn apply(&self, action: EditAction) -> Result<Self> {
        let mut next = self.clone();

        match action {
            EditAction::RemoveOutcome {
                collection,
                position,
            } => {
                let outcome = take(collection_mut(&mut next.collections, collection)?, position)?;
                next.available.push(outcome);
            }
            EditAction::MoveOutcome { from, position, to } => {
                if to >= next.collections.len() {
                    return Err(out_of_bounds("collection", to));
                }
                if from != to {
                    let outcome = take(collection_mut(&mut next.collections, from)?, position)?;
                    next.collections[to].push(outcome);
                }
            }
            EditAction::SelectAvailable { position } => {
                let outcome = take(&mut next.available, position)?;
                next.new_collection.push(outcome);
            }
            EditAction::DeselectNew { position } => {
                let outcome = take(&mut next.new_collection, position)?;
                next.available.push(outcome);
            }
            EditAction::SelectAllAvailable => {
                next.new_collection.append(&mut next.available);
            }
            EditAction::ClearNewCollection => {
                next.available.append(&mut next.new_collection);
            }
            EditAction::CommitNewCollection => {
                if next.new_collection.is_empty() {
                    return Err(Error::validation("the new collection has no outcomes"));
                }
                let committed = std::mem::take(&mut next.new_collection);
                next.collections.insert(0, committed);
            }
            EditAction::RemoveCollection { collection } => {
                if collection >= next.collections.len() {
                    return Err(out_of_bounds("collection", collection));
                }
                let mut removed = next.collections.remove(collection);
                next.available.append(&mut removed);
            }
            EditAction::RemoveAllCollections => {
                for mut collection in std::mem::take(&mut next.collections) {
                    next.available.append(&mut collection);
                }
            }
        }

        next.collections.retain(|collection| !collection.is_empty());

        Ok(next)
    }

    /// Builds the edited partition.
    ///
    /// # Errors
    ///
    /// Returns [`Kind::Validation`](crate::error::Kind::Validation) unless
    /// [`can_submit`](Self::can_submit) holds.
    pub fn to_partition(&self) -> Result<Partition> {
        if !self.can_submit() {
            return Err(Error::validation(
                "a partition needs at least two collections and no unassigned outcomes",
            ));
        }

        let partition = self
            .collections
            .iter()
            .map(|collection| IndexSet::from_outcomes(collection.iter().copied()))
            .collect::<Result<Partition>>()?;
        partition.validate_for(self.outcome_slot_count)?;

        Ok(partition)
    }
}

fn collection_mut(collections: &mut [Vec<usize>], index: usize) -> Result<&mut Vec<usize>> {
    collections
        .get_mut(index)
        .ok_or_else(|| out_of_bounds("collection", index))
}

fn take(outcomes: &mut Vec<usize>, position: usize) -> Result<usize> {
    if position < outcomes.len() {
        Ok(outcomes.remove(position))
    } else {
        Err(out_of_bounds("outcome position", position))
    }
}

fn out_of_bounds(what: &'static str, index: usize) -> Error {
    Error::invalid_input(what, format!("index {index} is out of bounds"))
}
