//! Spawn requests passed through the placement strategies.
use bevy::prelude::Entity;

use crate::preferences::{CharacterProfile, SessionId, SpawnPriorityPreference};

/// Which kind of spawn location the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementKind {
    #[default]
    Unset,
    RoundStart,
    LateJoin,
}

/// A pending player spawn. Everything but the result slot is fixed once built.
#[derive(Debug, Clone)]
pub struct PlayerSpawningRequest {
    pub job: Option<String>,
    pub profile: Option<CharacterProfile>,
    pub station: Option<Entity>,
    pub placement: PlacementKind,
    pub session: Option<SessionId>,
    result: Option<Entity>,
}

impl PlayerSpawningRequest {
    pub fn new(
        job: Option<String>,
        profile: Option<CharacterProfile>,
        station: Option<Entity>,
        placement: PlacementKind,
        session: Option<SessionId>,
    ) -> Self {
        Self {
            job,
            profile,
            station,
            placement,
            session,
            result: None,
        }
    }

    pub fn result(&self) -> Option<Entity> {
        self.result
    }

    pub fn is_handled(&self) -> bool {
        self.result.is_some()
    }

    /// Records the spawned entity. Returns `false` and keeps the first writer when
    /// another strategy already filled the slot.
    pub fn try_fill(&mut self, entity: Entity) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.result = Some(entity);
        true
    }

    /// Whether job, profile and station are all known.
    pub fn has_context(&self) -> bool {
        self.job.is_some() && self.profile.is_some() && self.station.is_some()
    }

    pub fn preference(&self) -> SpawnPriorityPreference {
        self.profile
            .as_ref()
            .map(|profile| profile.spawn_priority)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::World;

    use super::*;

    #[test]
    fn first_writer_wins() {
        let mut world = World::new();
        let mut request =
            PlayerSpawningRequest::new(None, None, None, PlacementKind::LateJoin, None);
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();

        assert!(request.try_fill(first));
        assert!(!request.try_fill(second));
        assert_eq!(request.result(), Some(first));
    }

    #[test]
    fn preference_requires_profile() {
        let request = PlayerSpawningRequest::new(
            Some("Passenger".to_string()),
            None,
            None,
            PlacementKind::Unset,
            None,
        );
        assert!(!request.has_context());
        assert_eq!(request.preference(), SpawnPriorityPreference::None);

        let profile = CharacterProfile::default()
            .with_spawn_priority(SpawnPriorityPreference::Arrivals);
        let request = PlayerSpawningRequest {
            profile: Some(profile),
            ..request
        };
        assert_eq!(request.preference(), SpawnPriorityPreference::Arrivals);
    }
}
