//! Loadout messages raised once a spawned mob is fully equipped.
use bevy::prelude::{Entity, Message};

use super::allocator::AllocationOutcome;

/// Raised once per humanoid spawn after loadout and starting gear are applied.
#[derive(Message, Debug, Clone)]
pub struct StartingGearEquipped {
    pub entity: Entity,
    pub job: String,
    pub outcome: AllocationOutcome,
}
