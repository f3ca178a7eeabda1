//! Spawning plugin wiring prototypes, ledger, placement strategies and telemetry.
use bevy::prelude::*;

use crate::{economy::BankLedger, loadout::StartingGearEquipped, prototypes::PrototypeCatalog};

use super::{
    dispatch::SpawnPlacementRegistry,
    settings::{SpawnRng, SpawnSettings},
    telemetry::{
        flush_spawn_telemetry_log, record_spawn_telemetry, SpawnTelemetry, SpawnTelemetryLog,
    },
};

/// Resources inserted before the plugin is added take precedence over config files.
pub struct StationSpawningPlugin;

impl Plugin for StationSpawningPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<SpawnSettings>()
            .cloned()
            .unwrap_or_else(SpawnSettings::load_or_default);

        if !app.world().contains_resource::<SpawnPlacementRegistry>() {
            app.insert_resource(SpawnPlacementRegistry::with_default_strategies());
        }

        app.insert_resource(SpawnRng::from_settings(&settings))
            .insert_resource(SpawnTelemetry::new(settings.telemetry_capacity))
            .insert_resource(SpawnTelemetryLog::new(settings.telemetry_log_path.clone()))
            .insert_resource(settings)
            .init_resource::<PrototypeCatalog>()
            .init_resource::<BankLedger>()
            .add_message::<StartingGearEquipped>()
            .add_systems(Startup, log_spawning_setup)
            .add_systems(
                Update,
                (record_spawn_telemetry, flush_spawn_telemetry_log).chain(),
            );
    }
}

fn log_spawning_setup(
    catalog: Res<PrototypeCatalog>,
    settings: Res<SpawnSettings>,
    registry: Res<SpawnPlacementRegistry>,
) {
    info!(
        target: "spawning",
        "StationSpawningPlugin initialised with {} jobs, strategies [{}], randomize_characters={}",
        catalog.job_count(),
        registry.strategy_names().collect::<Vec<_>>().join(", "),
        settings.randomize_characters
    );
}
