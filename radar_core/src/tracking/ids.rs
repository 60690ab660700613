// radar_core/src/tracking/ids.rs

use crate::types::{EntityHandle, ObjectId};

/// Number of distinct compact object ids.
pub const ID_SPACE: usize = 256;

/// Hands out 8-bit object ids to entities.
///
/// Owned by one tracker; two radars never share an id table.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    owners: [Option<EntityHandle>; ID_SPACE],
    live: usize,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            owners: [None; ID_SPACE],
            live: 0,
        }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids currently held.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn owner(&self, id: ObjectId) -> Option<EntityHandle> {
        self.owners[id as usize]
    }

    pub fn is_used(&self, id: ObjectId) -> bool {
        self.owners[id as usize].is_some()
    }

    pub fn id_of(&self, entity: EntityHandle) -> Option<ObjectId> {
        self.owners
            .iter()
            .position(|owner| *owner == Some(entity))
            .map(|id| id as ObjectId)
    }

    /// Returns the id held by `entity`, assigning a free one if it has none.
    ///
    /// A new id is the first unused value above the current highest live id,
    /// wrapping past 255. With no live ids, or with all 256 taken, the answer
    /// is 0; in the saturated case nothing is recorded.
    pub fn acquire(&mut self, entity: EntityHandle) -> ObjectId {
        if let Some(id) = self.id_of(entity) {
            return id;
        }
        if self.live >= ID_SPACE {
            return 0;
        }

        let id = if self.live == 0 {
            0
        } else {
            let highest = self
                .owners
                .iter()
                .rposition(Option::is_some)
                .unwrap_or_default() as ObjectId;
            let mut candidate = highest.wrapping_add(1);
            while self.is_used(candidate) {
                candidate = candidate.wrapping_add(1);
            }
            candidate
        };

        self.owners[id as usize] = Some(entity);
        self.live += 1;
        id
    }

    /// Frees `id`. Returns the entity that held it.
    pub fn release(&mut self, id: ObjectId) -> Option<EntityHandle> {
        let owner = self.owners[id as usize].take();
        if owner.is_some() {
            self.live -= 1;
        }
        owner
    }

    pub fn clear(&mut self) {
        self.owners = [None; ID_SPACE];
        self.live = 0;
    }
}
