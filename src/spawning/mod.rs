//! Player spawning: dispatch through placement strategies and mob materialization.
pub mod components;
pub mod dispatch;
pub mod materializer;
pub mod plugin;
pub mod request;
pub mod settings;
pub mod strategies;
pub mod telemetry;

pub use components::{
    ArrivalsGate, CharacterDetail, CryoPod, HumanoidAppearance, JobAssignment, JobTags,
    MobPrototype, OnStation, Sentient, SpawnPoint, SpawnPointKind, Station,
};
pub use dispatch::{
    dispatch, dispatch_spawn_request, spawn_player_character_on_station, SpawnError,
    SpawnPlacementRegistry, SpawnPlacementStrategy, SpawnRequestSubscriber,
};
pub use materializer::{apply_job_specials, spawn_player_mob, MobSpawnParams};
pub use plugin::StationSpawningPlugin;
pub use request::{PlacementKind, PlayerSpawningRequest};
pub use settings::{SpawnRng, SpawnSettings};
pub use strategies::{ArrivalsStrategy, CryostorageStrategy, JobSpawnPointStrategy};
pub use telemetry::{SpawnRecord, SpawnTelemetry, SpawnTelemetryLog};
