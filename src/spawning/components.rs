//! Components attached to stations, spawn locations and spawned characters.
use bevy::prelude::{Component, Entity};

use crate::preferences::Sex;

/// Marks a grid as a station characters can be spawned onto.
#[derive(Component, Debug, Clone, Default)]
pub struct Station {
    pub name: String,
    /// Hand out jobs' extended access on this station (e.g. low population).
    pub extended_access: bool,
}

/// Belongs-to-station link for spawn locations and spawned characters.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnStation(pub Entity);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPointKind {
    /// Round-start point, optionally reserved for one job.
    Job,
    /// Generic point used for late joins.
    LateJoin,
}

/// Map-defined spawn location.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SpawnPoint {
    pub kind: SpawnPointKind,
    pub job: Option<String>,
}

impl SpawnPoint {
    pub fn for_job(job: impl Into<String>) -> Self {
        Self {
            kind: SpawnPointKind::Job,
            job: Some(job.into()),
        }
    }

    pub fn late_join() -> Self {
        Self {
            kind: SpawnPointKind::LateJoin,
            job: None,
        }
    }
}

/// Arrivals shuttle gate used by late joiners who prefer to arrive by shuttle.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ArrivalsGate;

/// Cryo-sleep pod; a character spawned inside occupies it.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CryoPod {
    pub occupant: Option<Entity>,
}

impl CryoPod {
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Entity prototype a mob was spawned from.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct MobPrototype(pub String);

#[derive(Component, Debug, Clone, PartialEq)]
pub struct HumanoidAppearance {
    pub species: String,
    pub age: u32,
    pub sex: Sex,
    pub skin_tone: [u8; 3],
}

#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterDetail {
    pub flavor_text: String,
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct JobAssignment {
    pub job: String,
}

/// Tags granted by job specials.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct JobTags(pub Vec<String>);

impl JobTags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.contains(&tag) {
            self.0.push(tag);
        }
    }
}

/// Mob a player can take control of.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Sentient;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_tags_ignore_duplicates() {
        let mut tags = JobTags::default();
        tags.insert("security");
        tags.insert("security");
        tags.insert("command");

        assert_eq!(tags.0, vec!["security".to_string(), "command".to_string()]);
        assert!(tags.contains("command"));
    }
}
