//! Ordered spawn dispatch: placement strategies get a chance to place a new character
//! before unordered subscribers see the request.
use bevy::{
    log::{debug, warn},
    prelude::*,
};
use thiserror::Error;

use crate::preferences::{CharacterProfile, SessionId, SpawnPriorityPreference};

use super::{
    components::Station,
    request::{PlacementKind, PlayerSpawningRequest},
    strategies::{ArrivalsStrategy, CryostorageStrategy, JobSpawnPointStrategy},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("entity {0:?} is not a station")]
    NotAStation(Entity),
}

/// Something able to put a new character into the world.
///
/// Every registered strategy runs for every request; implementations must leave a
/// request alone once its result slot is filled, apart from side effects they own.
pub trait SpawnPlacementStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Spawn priority this strategy serves first, if any.
    fn preference(&self) -> Option<SpawnPriorityPreference> {
        None
    }

    fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest);
}

/// Observer notified after every ordered strategy has run.
pub trait SpawnRequestSubscriber: Send + Sync {
    fn observe(&mut self, world: &mut World, request: &mut PlayerSpawningRequest);
}

/// Placement strategies in registration order plus external subscribers.
#[derive(Resource, Default)]
pub struct SpawnPlacementRegistry {
    strategies: Vec<Box<dyn SpawnPlacementStrategy>>,
    subscribers: Vec<Box<dyn SpawnRequestSubscriber>>,
}

impl SpawnPlacementRegistry {
    /// Job spawn points, then arrivals, then cryostorage.
    pub fn with_default_strategies() -> Self {
        let mut registry = Self::default();
        registry.register(JobSpawnPointStrategy);
        registry.register(ArrivalsStrategy);
        registry.register(CryostorageStrategy);
        registry
    }

    pub fn register(&mut self, strategy: impl SpawnPlacementStrategy + 'static) {
        self.strategies.push(Box::new(strategy));
    }

    pub fn subscribe(&mut self, subscriber: impl SpawnRequestSubscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn strategy_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|strategy| strategy.name())
    }

    fn run(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
        if request.has_context() {
            let preference = request.preference();
            if let Some(preferred) = self
                .strategies
                .iter_mut()
                .find(|strategy| strategy.preference() == Some(preference))
            {
                debug!(target: "spawning", "Trying preferred strategy {} first", preferred.name());
                preferred.try_place(world, request);
            }
        }

        for strategy in &mut self.strategies {
            strategy.try_place(world, request);
        }

        for subscriber in &mut self.subscribers {
            subscriber.observe(world, request);
        }
    }
}

/// Runs a request through the registry and returns the entity placed, if any.
pub fn dispatch(world: &mut World, mut request: PlayerSpawningRequest) -> Option<Entity> {
    dispatch_spawn_request(world, &mut request);
    request.result()
}

/// In-place variant of [`dispatch`] for callers that keep the request.
pub fn dispatch_spawn_request(world: &mut World, request: &mut PlayerSpawningRequest) {
    let ran = world
        .try_resource_scope(|world, mut registry: Mut<SpawnPlacementRegistry>| {
            registry.run(world, request);
        })
        .is_some();

    if !ran {
        warn!(target: "spawning", "No SpawnPlacementRegistry present; spawn request left unhandled");
    }

    debug_assert!(
        request
            .result()
            .is_none_or(|entity| world.get_entity(entity).is_ok()),
        "spawn strategy reported an entity that does not exist"
    );
}

/// Spawns a player character onto `station` through the placement strategies.
///
/// `Ok(None)` means no strategy found a location; the caller picks a fallback.
pub fn spawn_player_character_on_station(
    world: &mut World,
    station: Entity,
    job: Option<String>,
    profile: Option<CharacterProfile>,
    session: Option<SessionId>,
    placement: PlacementKind,
) -> Result<Option<Entity>, SpawnError> {
    if world.get::<Station>(station).is_none() {
        return Err(SpawnError::NotAStation(station));
    }

    let request = PlayerSpawningRequest::new(job, profile, Some(station), placement, session);
    Ok(dispatch(world, request))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct Recording {
        name: &'static str,
        preference: Option<SpawnPriorityPreference>,
        places: bool,
        log: CallLog,
    }

    impl SpawnPlacementStrategy for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn preference(&self) -> Option<SpawnPriorityPreference> {
            self.preference
        }

        fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
            self.log.lock().expect("log").push(self.name);
            if self.places && !request.is_handled() {
                let entity = world.spawn(Name::new(self.name)).id();
                request.try_fill(entity);
            }
        }
    }

    struct Watcher {
        log: CallLog,
    }

    impl SpawnRequestSubscriber for Watcher {
        fn observe(&mut self, _world: &mut World, request: &mut PlayerSpawningRequest) {
            let seen = if request.is_handled() { "watcher:filled" } else { "watcher:empty" };
            self.log.lock().expect("log").push(seen);
        }
    }

    /// Claims the slot for a fresh entity and records whether the claim stuck.
    struct Filler {
        log: CallLog,
    }

    impl SpawnRequestSubscriber for Filler {
        fn observe(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
            let entity = world.spawn(Name::new("filler")).id();
            if request.try_fill(entity) {
                self.log.lock().expect("log").push("filler:accepted");
            } else {
                world.despawn(entity);
                self.log.lock().expect("log").push("filler:refused");
            }
        }
    }

    struct Dangling;

    impl SpawnPlacementStrategy for Dangling {
        fn name(&self) -> &'static str {
            "dangling"
        }

        fn try_place(&mut self, world: &mut World, request: &mut PlayerSpawningRequest) {
            let entity = world.spawn_empty().id();
            world.despawn(entity);
            request.try_fill(entity);
        }
    }

    fn registry(log: &CallLog, placing: &[&'static str]) -> SpawnPlacementRegistry {
        let mut registry = SpawnPlacementRegistry::default();
        for (name, preference) in [
            ("points", None),
            ("arrivals", Some(SpawnPriorityPreference::Arrivals)),
            ("cryo", Some(SpawnPriorityPreference::Cryosleep)),
        ] {
            registry.register(Recording {
                name,
                preference,
                places: placing.contains(&name),
                log: log.clone(),
            });
        }
        registry.subscribe(Watcher { log: log.clone() });
        registry
    }

    fn world_with(registry: SpawnPlacementRegistry) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(registry);
        let station = world
            .spawn(Station {
                name: "Outpost".to_string(),
                ..Station::default()
            })
            .id();
        (world, station)
    }

    fn winner(world: &World, entity: Option<Entity>) -> Option<String> {
        entity
            .and_then(|entity| world.get::<Name>(entity))
            .map(|name| name.as_str().to_string())
    }

    #[test]
    fn preferred_strategy_runs_first_then_everyone() {
        let log = CallLog::default();
        let (mut world, station) = world_with(registry(&log, &["points", "cryo"]));
        let profile =
            CharacterProfile::default().with_spawn_priority(SpawnPriorityPreference::Cryosleep);

        let spawned = spawn_player_character_on_station(
            &mut world,
            station,
            Some("Passenger".to_string()),
            Some(profile),
            None,
            PlacementKind::LateJoin,
        )
        .expect("station");

        assert_eq!(winner(&world, spawned).as_deref(), Some("cryo"));
        assert_eq!(
            *log.lock().expect("log"),
            vec!["cryo", "points", "arrivals", "cryo", "watcher:filled"]
        );
    }

    #[test]
    fn without_context_strategies_run_in_registration_order() {
        let log = CallLog::default();
        let (mut world, station) = world_with(registry(&log, &["arrivals", "cryo"]));
        let profile =
            CharacterProfile::default().with_spawn_priority(SpawnPriorityPreference::Cryosleep);

        let spawned = spawn_player_character_on_station(
            &mut world,
            station,
            None,
            Some(profile),
            None,
            PlacementKind::LateJoin,
        )
        .expect("station");

        assert_eq!(winner(&world, spawned).as_deref(), Some("arrivals"));
        assert_eq!(
            *log.lock().expect("log"),
            vec!["points", "arrivals", "cryo", "watcher:filled"]
        );
    }

    #[test]
    fn unhandled_requests_return_none() {
        let log = CallLog::default();
        let (mut world, station) = world_with(registry(&log, &[]));

        let spawned = spawn_player_character_on_station(
            &mut world,
            station,
            Some("Passenger".to_string()),
            Some(CharacterProfile::default()),
            None,
            PlacementKind::RoundStart,
        );

        assert_eq!(spawned, Ok(None));
        assert_eq!(log.lock().expect("log").last(), Some(&"watcher:empty"));
    }

    #[test]
    fn non_station_targets_are_rejected() {
        let log = CallLog::default();
        let (mut world, _) = world_with(registry(&log, &["points"]));
        let rock = world.spawn(Name::new("rock")).id();

        let result = spawn_player_character_on_station(
            &mut world,
            rock,
            None,
            None,
            None,
            PlacementKind::LateJoin,
        );

        assert_eq!(result, Err(SpawnError::NotAStation(rock)));
        assert!(log.lock().expect("log").is_empty());
    }

    #[test]
    fn missing_registry_leaves_request_unhandled() {
        let mut world = World::new();
        let request = PlayerSpawningRequest::new(None, None, None, PlacementKind::LateJoin, None);

        assert_eq!(dispatch(&mut world, request), None);
    }

    #[test]
    fn default_registry_order() {
        let registry = SpawnPlacementRegistry::with_default_strategies();
        assert_eq!(
            registry.strategy_names().collect::<Vec<_>>(),
            vec!["job_spawn_point", "arrivals", "cryostorage"]
        );
    }

    #[test]
    fn subscriber_fills_an_unclaimed_slot() {
        let log = CallLog::default();
        let mut registry = registry(&log, &[]);
        registry.subscribe(Filler { log: log.clone() });
        let (mut world, station) = world_with(registry);

        let spawned = spawn_player_character_on_station(
            &mut world,
            station,
            Some("Passenger".to_string()),
            Some(CharacterProfile::default()),
            None,
            PlacementKind::LateJoin,
        )
        .expect("station");

        assert_eq!(winner(&world, spawned).as_deref(), Some("filler"));
        assert!(log
            .lock()
            .expect("log")
            .ends_with(&["watcher:empty", "filler:accepted"]));
    }

    #[test]
    fn subscriber_cannot_replace_a_placed_result() {
        let log = CallLog::default();
        let mut registry = registry(&log, &["points"]);
        registry.subscribe(Filler { log: log.clone() });
        let (mut world, station) = world_with(registry);

        let spawned = spawn_player_character_on_station(
            &mut world,
            station,
            Some("Passenger".to_string()),
            Some(CharacterProfile::default()),
            None,
            PlacementKind::LateJoin,
        )
        .expect("station");

        assert_eq!(winner(&world, spawned).as_deref(), Some("points"));
        assert_eq!(log.lock().expect("log").last(), Some(&"filler:refused"));
        let fillers = world
            .query::<&Name>()
            .iter(&world)
            .filter(|name| name.as_str() == "filler")
            .count();
        assert_eq!(fillers, 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "does not exist")]
    fn despawned_result_trips_debug_assertion() {
        let mut registry = SpawnPlacementRegistry::default();
        registry.register(Dangling);
        let (mut world, station) = world_with(registry);

        let request =
            PlayerSpawningRequest::new(None, None, Some(station), PlacementKind::LateJoin, None);
        dispatch(&mut world, request);
    }
}
