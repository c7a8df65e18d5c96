//! Drag-and-drop reordering.
//!
//! Pure functions over a [`Collection`]: given what was dragged and where it
//! was dropped, compute the new arrangement. Nothing here persists anything.
//!
//! Supported moves are group-onto-group and snippet-onto-snippet within one
//! container. Moving a snippet across containers is not supported and is
//! reported as [`IgnoreReason::CrossContainer`] with no change.

use crate::models::{Collection, Container};

/// The item being dragged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    Snippet { id: String, container: Container },
    Group { id: String },
}

/// The item the drag was released over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Snippet { id: String, container: Container },
    Group { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SameItem,
    SourceNotFound,
    TargetNotFound,
    CrossContainer,
    KindMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Moved(Collection),
    Ignored(IgnoreReason),
}

/// Removes the element at `from` and reinserts it at `to`, shifting the
/// elements in between by one. Out-of-range indices leave `items` untouched.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

pub fn compute_reorder(
    collection: &Collection,
    source: &DragSource,
    target: &DropTarget,
) -> ReorderOutcome {
    match (source, target) {
        (DragSource::Group { id: from_id }, DropTarget::Group { id: to_id }) => {
            if from_id == to_id {
                return ReorderOutcome::Ignored(IgnoreReason::SameItem);
            }
            let Some(from) = collection.groups.iter().position(|g| &g.id == from_id) else {
                return ReorderOutcome::Ignored(IgnoreReason::SourceNotFound);
            };
            let Some(to) = collection.groups.iter().position(|g| &g.id == to_id) else {
                return ReorderOutcome::Ignored(IgnoreReason::TargetNotFound);
            };

            let mut next = collection.clone();
            array_move(&mut next.groups, from, to);
            ReorderOutcome::Moved(next)
        }
        (
            DragSource::Snippet {
                id: from_id,
                container: from_container,
            },
            DropTarget::Snippet {
                id: to_id,
                container: to_container,
            },
        ) => {
            if from_id == to_id {
                return ReorderOutcome::Ignored(IgnoreReason::SameItem);
            }
            if from_container != to_container {
                return ReorderOutcome::Ignored(IgnoreReason::CrossContainer);
            }
            reorder_within(collection, from_container, from_id, to_id)
        }
        (DragSource::Snippet { container, .. }, DropTarget::Group { id }) => {
            if container.group_id() == Some(id.as_str()) {
                ReorderOutcome::Ignored(IgnoreReason::KindMismatch)
            } else {
                ReorderOutcome::Ignored(IgnoreReason::CrossContainer)
            }
        }
        (DragSource::Group { .. }, DropTarget::Snippet { .. }) => {
            ReorderOutcome::Ignored(IgnoreReason::KindMismatch)
        }
    }
}

fn reorder_within(
    collection: &Collection,
    container: &Container,
    from_id: &str,
    to_id: &str,
) -> ReorderOutcome {
    let Some(list) = collection.list(container) else {
        return ReorderOutcome::Ignored(IgnoreReason::SourceNotFound);
    };
    let Some(from) = list.iter().position(|s| s.id == from_id) else {
        return ReorderOutcome::Ignored(IgnoreReason::SourceNotFound);
    };
    let Some(to) = list.iter().position(|s| s.id == to_id) else {
        return ReorderOutcome::Ignored(IgnoreReason::TargetNotFound);
    };

    let mut next = collection.clone();
    if let Some(list) = next.list_mut(container) {
        array_move(list, from, to);
    }
    ReorderOutcome::Moved(next)
}
