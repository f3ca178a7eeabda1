//! Prototype store: read-only job, species, gear and loadout definitions.
pub mod data;
pub mod types;

pub use data::{PrototypeCatalog, PrototypeConfig};
pub use types::{
    role_loadout_id, CredentialKind, GearSet, ItemPrototype, JobPrototype, JobSpecial,
    LoadoutEffect, LoadoutGroupPrototype, LoadoutPrototype, RoleLoadoutPrototype,
    SpeciesPrototype, StartingGearPrototype,
};
