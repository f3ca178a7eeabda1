//! Loadout allocation and equipment: what a freshly spawned character carries.
pub mod allocator;
pub mod equipment;
pub mod events;

pub use allocator::{
    allocate, plan_allocation, AllocationOutcome, AllocationRequest, Budget, GroupAllocation,
    SlotConflict,
};
pub use equipment::{equip_gear, spawn_item, Equipment, Item, SlotPolicy, ID_SLOT};
pub use events::StartingGearEquipped;
