//! Station character spawning: placement dispatch, budgeted loadouts and credentials.
pub mod access;
pub mod economy;
pub mod loadout;
pub mod preferences;
pub mod prototypes;
pub mod spawning;

pub use spawning::StationSpawningPlugin;
