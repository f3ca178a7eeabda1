//! Built-in placement strategies: map spawn points, the arrivals gate and cryo pods.
use bevy::{
    log::{debug, info},
    prelude::*,
};
use rand::seq::SliceRandom;

use crate::preferences::SpawnPriorityPreference;

use super::{
    components::{ArrivalsGate, CryoPod, OnStation, SpawnPoint, SpawnPointKind},
    dispatch::SpawnPlacementStrategy,
    materializer::{spawn_player_mob, MobSpawnParams},
    request::{PlacementKind, PlayerSpawningRequest},
    settings::SpawnRng,
};

/// Map-defined spawn points: the job's own points at round start, late-join points
/// otherwise or when the job has none.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobSpawnPointStrategy;

impl SpawnPlacementStrategy for JobSpawnPointStrategy {
    fn name(&self) -> &'static str {
        "job_spawn_point"
    }

    fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
        if request.is_handled() {
            return;
        }

        let points: Vec<(Entity, SpawnPoint, Vec3)> = world
            .query::<(Entity, &SpawnPoint, &Transform, Option<&OnStation>)>()
            .iter(world)
            .filter(|(_, _, _, on)| belongs_to(request.station, *on))
            .map(|(entity, point, transform, _)| (entity, point.clone(), transform.translation))
            .collect();

        let job_points: Vec<(Entity, Vec3)> = points
            .iter()
            .filter(|(_, point, _)| {
                point.kind == SpawnPointKind::Job && point.job.is_some() && point.job == request.job
            })
            .map(|(entity, _, at)| (*entity, *at))
            .collect();
        let late_join_points: Vec<(Entity, Vec3)> = points
            .iter()
            .filter(|(_, point, _)| point.kind == SpawnPointKind::LateJoin)
            .map(|(entity, _, at)| (*entity, *at))
            .collect();

        let candidates = match request.placement {
            PlacementKind::LateJoin => late_join_points,
            PlacementKind::RoundStart | PlacementKind::Unset if !job_points.is_empty() => {
                job_points
            }
            _ => late_join_points,
        };

        let Some((point, at)) = pick(world, candidates) else {
            debug!(target: "spawning", "No spawn point available for {:?}", request.job);
            return;
        };

        let mob = spawn_player_mob(world, params_for(request, at));
        request.try_fill(mob);
        debug!(target: "spawning", "Placed {mob:?} at spawn point {point:?}");
    }
}

/// Late joiners step off the arrivals shuttle.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrivalsStrategy;

impl SpawnPlacementStrategy for ArrivalsStrategy {
    fn name(&self) -> &'static str {
        "arrivals"
    }

    fn preference(&self) -> Option<SpawnPriorityPreference> {
        Some(SpawnPriorityPreference::Arrivals)
    }

    fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
        if request.is_handled() || request.placement != PlacementKind::LateJoin {
            return;
        }

        let gates: Vec<(Entity, Vec3)> = world
            .query_filtered::<(Entity, &Transform, Option<&OnStation>), With<ArrivalsGate>>()
            .iter(world)
            .filter(|(_, _, on)| belongs_to(request.station, *on))
            .map(|(entity, transform, _)| (entity, transform.translation))
            .collect();

        let Some((gate, at)) = pick(world, gates) else {
            return;
        };

        let mob = spawn_player_mob(world, params_for(request, at));
        request.try_fill(mob);
        info!(target: "spawning", "{mob:?} arrived through gate {gate:?}");
    }
}

/// Late joiners wake up in a free cryo pod, which they then occupy.
#[derive(Debug, Default, Clone, Copy)]
pub struct CryostorageStrategy;

impl SpawnPlacementStrategy for CryostorageStrategy {
    fn name(&self) -> &'static str {
        "cryostorage"
    }

    fn preference(&self) -> Option<SpawnPriorityPreference> {
        Some(SpawnPriorityPreference::Cryosleep)
    }

    fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
        if request.is_handled() || request.placement != PlacementKind::LateJoin {
            return;
        }

        let pods: Vec<(Entity, Vec3)> = world
            .query::<(Entity, &CryoPod, &Transform, Option<&OnStation>)>()
            .iter(world)
            .filter(|(_, pod, _, on)| pod.is_free() && belongs_to(request.station, *on))
            .map(|(entity, _, transform, _)| (entity, transform.translation))
            .collect();

        let Some((pod, at)) = pick(world, pods) else {
            return;
        };

        let mob = spawn_player_mob(world, params_for(request, at));
        if let Some(mut cryo) = world.get_mut::<CryoPod>(pod) {
            cryo.occupant = Some(mob);
        }
        request.try_fill(mob);
        info!(target: "spawning", "{mob:?} woke up in cryo pod {pod:?}");
    }
}

/// Locations without a station link are usable by any request.
fn belongs_to(station: Option<Entity>, location: Option<&OnStation>) -> bool {
    match (station, location) {
        (Some(station), Some(on)) => on.0 == station,
        _ => true,
    }
}

fn pick(world: &mut World, mut candidates: Vec<(Entity, Vec3)>) -> Option<(Entity, Vec3)> {
    candidates.sort_by_key(|(entity, _)| *entity);
    world.init_resource::<SpawnRng>();
    let mut rng = world.resource_mut::<SpawnRng>();
    candidates.choose(&mut rng.0).copied()
}

fn params_for(request: &PlayerSpawningRequest, coordinates: Vec3) -> MobSpawnParams {
    MobSpawnParams {
        coordinates,
        job: request.job.clone(),
        profile: request.profile.clone(),
        station: request.station,
        existing: None,
        session: request.session,
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;

    use super::*;
    use crate::{
        loadout::StartingGearEquipped,
        preferences::CharacterProfile,
        prototypes::PrototypeCatalog,
        spawning::{components::Station, settings::SpawnSettings},
    };

    const CATALOG: &str = r#"
        [[species]]
        id = "Human"
        name = "Human"
        prototype = "MobHuman"

        [[jobs]]
        id = "Captain"
        name = "Captain"

        [[jobs]]
        id = "Passenger"
        name = "Passenger"
    "#;

    fn world() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(PrototypeCatalog::from_toml_str(CATALOG).expect("catalog"));
        world.insert_resource(SpawnSettings::default());
        world.insert_resource(SpawnRng::seeded(3));
        world.init_resource::<Messages<StartingGearEquipped>>();
        let station = world.spawn(Station::default()).id();
        (world, station)
    }

    fn spawn_at(world: &mut World, station: Entity, at: Vec3, bundle: impl Bundle) -> Entity {
        world
            .spawn((bundle, Transform::from_translation(at), OnStation(station)))
            .id()
    }

    fn request(station: Entity, job: &str, placement: PlacementKind) -> PlayerSpawningRequest {
        PlayerSpawningRequest::new(
            Some(job.to_string()),
            Some(CharacterProfile::default()),
            Some(station),
            placement,
            None,
        )
    }

    fn position(world: &World, entity: Option<Entity>) -> Option<Vec3> {
        entity
            .and_then(|entity| world.get::<Transform>(entity))
            .map(|transform| transform.translation)
    }

    #[test]
    fn round_start_prefers_the_job_point() {
        let (mut world, station) = world();
        spawn_at(&mut world, station, Vec3::X, SpawnPoint::for_job("Passenger"));
        spawn_at(&mut world, station, Vec3::Y, SpawnPoint::for_job("Captain"));
        spawn_at(&mut world, station, Vec3::Z, SpawnPoint::late_join());

        let mut captain = request(station, "Captain", PlacementKind::RoundStart);
        JobSpawnPointStrategy.try_place(&mut world, &mut captain);
        assert_eq!(position(&world, captain.result()), Some(Vec3::Y));

        let mut late = request(station, "Captain", PlacementKind::LateJoin);
        JobSpawnPointStrategy.try_place(&mut world, &mut late);
        assert_eq!(position(&world, late.result()), Some(Vec3::Z));
    }

    #[test]
    fn points_on_other_stations_are_ignored() {
        let (mut world, station) = world();
        let elsewhere = world.spawn(Station::default()).id();
        spawn_at(&mut world, elsewhere, Vec3::X, SpawnPoint::late_join());

        let mut late = request(station, "Passenger", PlacementKind::LateJoin);
        JobSpawnPointStrategy.try_place(&mut world, &mut late);

        assert!(!late.is_handled());
    }

    #[test]
    fn arrivals_only_serve_late_joins() {
        let (mut world, station) = world();
        spawn_at(&mut world, station, Vec3::new(5.0, 0.0, 0.0), ArrivalsGate);

        let mut round_start = request(station, "Passenger", PlacementKind::RoundStart);
        ArrivalsStrategy.try_place(&mut world, &mut round_start);
        assert!(!round_start.is_handled());

        let mut late = request(station, "Passenger", PlacementKind::LateJoin);
        ArrivalsStrategy.try_place(&mut world, &mut late);
        assert_eq!(position(&world, late.result()), Some(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn cryostorage_occupies_pods() {
        let (mut world, station) = world();
        let pod = spawn_at(&mut world, station, Vec3::ONE, CryoPod::default());

        let mut first = request(station, "Passenger", PlacementKind::LateJoin);
        CryostorageStrategy.try_place(&mut world, &mut first);
        let sleeper = first.result().expect("first sleeper");
        assert_eq!(world.get::<CryoPod>(pod).and_then(|pod| pod.occupant), Some(sleeper));

        let mut second = request(station, "Passenger", PlacementKind::LateJoin);
        CryostorageStrategy.try_place(&mut world, &mut second);
        assert!(!second.is_handled());
    }

    #[test]
    fn filled_requests_are_left_alone() {
        let (mut world, station) = world();
        let pod = spawn_at(&mut world, station, Vec3::ONE, CryoPod::default());
        let placed = world.spawn_empty().id();

        let mut late = request(station, "Passenger", PlacementKind::LateJoin);
        late.try_fill(placed);
        CryostorageStrategy.try_place(&mut world, &mut late);

        assert_eq!(late.result(), Some(placed));
        assert!(world.get::<CryoPod>(pod).is_some_and(CryoPod::is_free));
    }
}
