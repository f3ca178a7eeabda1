//! Prototype definitions for jobs, species, gear and loadouts.
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::preferences::CharacterProfile;

/// Prefix joining a job id to the id of its role loadout prototype.
pub const ROLE_LOADOUT_PREFIX: &str = "Job";

/// Returns the role loadout id selectable for the given job.
pub fn role_loadout_id(job_id: &str) -> String {
    format!("{ROLE_LOADOUT_PREFIX}{job_id}")
}

/// Playable species and the body entity spawned for it.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesPrototype {
    pub id: String,
    pub name: String,
    /// Entity prototype instantiated as the character's body.
    pub prototype: String,
    /// Whether the species may be picked when characters are randomised.
    #[serde(default = "default_round_start")]
    pub round_start: bool,
    #[serde(default = "default_skin_tone")]
    pub default_skin_tone: [u8; 3],
}

fn default_round_start() -> bool {
    true
}

fn default_skin_tone() -> [u8; 3] {
    [196, 160, 130]
}

/// Hook applied to a freshly spawned mob after its gear is in place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobSpecial {
    AddTag { tag: String },
    GrantSentience,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobPrototype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub access: Vec<String>,
    /// Extra access granted when the station hands out extended access.
    #[serde(default)]
    pub extended_access: Vec<String>,
    /// Fixed gear equipped regardless of budget.
    #[serde(default)]
    pub starting_gear: Option<String>,
    #[serde(default)]
    pub special: Vec<JobSpecial>,
    /// Entity spawned instead of a humanoid body (e.g. station AI).
    #[serde(default)]
    pub job_entity: Option<String>,
}

/// Slot-addressed equipment plus loose items placed in storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GearSet {
    #[serde(default)]
    pub equipment: BTreeMap<String, String>,
    #[serde(default)]
    pub storage: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartingGearPrototype {
    pub id: String,
    #[serde(flatten)]
    pub gear: GearSet,
}

/// Credential hardware an item carries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialKind {
    IdCard,
    /// A device holding an ID card spawned from `card`.
    Pda { card: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemPrototype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub credential: Option<CredentialKind>,
}

/// Eligibility rule a loadout enforces against a character profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadoutEffect {
    SpeciesRestriction { species: Vec<String> },
    MinimumAge { age: u32 },
}

impl LoadoutEffect {
    pub fn validate(&self, profile: &CharacterProfile) -> Result<(), String> {
        match self {
            Self::SpeciesRestriction { species } => {
                if species.iter().any(|allowed| *allowed == profile.species) {
                    Ok(())
                } else {
                    Err(format!("species {} is not allowed", profile.species))
                }
            }
            Self::MinimumAge { age } => {
                if profile.age >= *age {
                    Ok(())
                } else {
                    Err(format!("requires age {age}, character is {}", profile.age))
                }
            }
        }
    }
}

/// A purchasable loadout entry inside a loadout group.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadoutPrototype {
    pub id: String,
    #[serde(default)]
    pub price: i32,
    #[serde(default)]
    pub effects: Vec<LoadoutEffect>,
    #[serde(flatten)]
    pub gear: GearSet,
}

impl LoadoutPrototype {
    /// Amount deducted from the balance; negative prices cost nothing.
    pub fn cost(&self) -> i32 {
        self.price.max(0)
    }

    pub fn validate(&self, profile: &CharacterProfile) -> Result<(), String> {
        self.effects
            .iter()
            .try_for_each(|effect| effect.validate(profile))
    }

    pub fn is_valid_for(&self, profile: &CharacterProfile) -> bool {
        self.validate(profile).is_ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadoutGroupPrototype {
    pub id: String,
    /// Minimum number of equipped loadouts this group should end up with.
    #[serde(default)]
    pub min_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    pub loadouts: Vec<String>,
    /// Substitutes, in order, used when purchases leave the group under its minimum.
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

fn default_max_limit() -> u32 {
    1
}

/// Ordered loadout groups offered to one job.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleLoadoutPrototype {
    pub id: String,
    pub groups: Vec<String>,
}
