use crate::core_types::chamber::ChamberId;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};

/// Chambers whose fuel element has melted, in the order they melted.
///
/// Append-only: the set never loses a member.
#[derive(Debug, Clone, Default)]
pub struct MeltdownSet {
    order: Vec<ChamberId>,
    members: FxHashSet<ChamberId>,
}

impl MeltdownSet {
    /// Add a chamber. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, id: ChamberId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: ChamberId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[ChamberId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = ChamberId> + '_ {
        self.order.iter().copied()
    }
}

impl Serialize for MeltdownSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}
