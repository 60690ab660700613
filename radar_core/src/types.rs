// radar_core/src/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Identifier ---

/// A stable, generation-checked reference to an entity living in the scene.
///
/// The tracker never owns entities. It only remembers their handle, and a handle
/// whose generation no longer matches the scene's slot is treated as a destroyed
/// entity. The bit layout (generation in the high 32 bits, index in the low 32)
/// matches Bevy's `Entity::to_bits`, so the two convert losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    pub index: u32,
    pub generation: u32,
}

impl EntityHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    // A convenience method for use in a Bevy adapter crate.
    #[cfg(feature = "bevy")] // This will only compile if the "bevy" feature is enabled
    pub fn from_entity(entity: bevy_ecs::prelude::Entity) -> Self {
        Self::from_bits(entity.to_bits())
    }

    /// `None` for handles Bevy cannot represent (generation 0).
    #[cfg(feature = "bevy")]
    pub fn to_entity(self) -> Option<bevy_ecs::prelude::Entity> {
        bevy_ecs::prelude::Entity::try_from_bits(self.to_bits()).ok()
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// The compact 8-bit identifier reported for a tracked object.
pub type ObjectId = u8;

/// Simulation time in seconds.
pub type Timestamp = f64;
