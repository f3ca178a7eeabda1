//! Character preferences handed to the spawning pipeline.
pub mod profile;
pub mod role_loadout;
pub mod session;

pub use profile::{CharacterProfile, Sex, SpawnPriorityPreference, DEFAULT_SPECIES};
pub use role_loadout::RoleLoadout;
pub use session::SessionId;
