//! Prototype catalog loading and lookup.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use bevy::{
    log::{info, warn},
    prelude::Resource,
};
use serde::Deserialize;

use super::types::{
    ItemPrototype, JobPrototype, LoadoutGroupPrototype, LoadoutPrototype, RoleLoadoutPrototype,
    SpeciesPrototype, StartingGearPrototype,
};

const PROTOTYPES_CONFIG_PATH: &str = "config/prototypes.toml";
const FALLBACK_PROTOTYPES: &str = include_str!("../../config/prototypes.toml");

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrototypeConfig {
    #[serde(default)]
    pub species: Vec<SpeciesPrototype>,
    #[serde(default)]
    pub jobs: Vec<JobPrototype>,
    #[serde(default)]
    pub starting_gear: Vec<StartingGearPrototype>,
    #[serde(default)]
    pub items: Vec<ItemPrototype>,
    #[serde(default)]
    pub role_loadouts: Vec<RoleLoadoutPrototype>,
    #[serde(default)]
    pub loadout_groups: Vec<LoadoutGroupPrototype>,
    #[serde(default)]
    pub loadouts: Vec<LoadoutPrototype>,
}

/// Read-only catalog of every prototype the spawning pipeline resolves by id.
#[derive(Resource, Debug, Clone)]
pub struct PrototypeCatalog {
    species: HashMap<String, SpeciesPrototype>,
    species_order: Vec<String>,
    jobs: HashMap<String, JobPrototype>,
    starting_gear: HashMap<String, StartingGearPrototype>,
    items: HashMap<String, ItemPrototype>,
    role_loadouts: HashMap<String, RoleLoadoutPrototype>,
    loadout_groups: HashMap<String, LoadoutGroupPrototype>,
    loadouts: HashMap<String, LoadoutPrototype>,
}

impl PrototypeCatalog {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data =
            fs::read_to_string(&path).map_err(|err| format!("unable to read file: {err}"))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, String> {
        let config: PrototypeConfig =
            toml::from_str(data).map_err(|err| format!("invalid prototype config: {err}"))?;
        Self::from_config(config)
    }

    pub fn from_config(config: PrototypeConfig) -> Result<Self, String> {
        if config.species.is_empty() {
            return Err("prototype config must define at least one species".to_string());
        }

        let species_order = config
            .species
            .iter()
            .map(|species| species.id.clone())
            .collect();

        let mut groups = HashMap::new();
        for mut group in config.loadout_groups {
            group.max_limit = group.max_limit.max(group.min_limit);
            insert_unique(&mut groups, "loadout group", group.id.clone(), group)?;
        }

        let catalog = Self {
            species: index("species", config.species, |species| &species.id)?,
            species_order,
            jobs: index("job", config.jobs, |job| &job.id)?,
            starting_gear: index("starting gear", config.starting_gear, |gear| &gear.id)?,
            items: index("item", config.items, |item| &item.id)?,
            role_loadouts: index("role loadout", config.role_loadouts, |role| &role.id)?,
            loadout_groups: groups,
            loadouts: index("loadout", config.loadouts, |loadout| &loadout.id)?,
        };

        catalog.report_dangling_references();
        Ok(catalog)
    }

    fn fallback() -> Self {
        Self::from_toml_str(FALLBACK_PROTOTYPES)
            .expect("bundled prototype config should be valid")
    }

    pub fn species(&self, id: &str) -> Option<&SpeciesPrototype> {
        self.species.get(id)
    }

    /// First species declared in the config; used when no other choice resolves.
    pub fn first_species(&self) -> &SpeciesPrototype {
        self.species_order
            .first()
            .and_then(|id| self.species.get(id))
            .expect("catalog always holds at least one species")
    }

    /// Species eligible for randomised characters, in declaration order.
    pub fn round_start_species(&self) -> Vec<&SpeciesPrototype> {
        self.species_order
            .iter()
            .filter_map(|id| self.species.get(id))
            .filter(|species| species.round_start)
            .collect()
    }

    pub fn job(&self, id: &str) -> Option<&JobPrototype> {
        self.jobs.get(id)
    }

    pub fn starting_gear(&self, id: &str) -> Option<&StartingGearPrototype> {
        self.starting_gear.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemPrototype> {
        self.items.get(id)
    }

    pub fn role_loadout(&self, id: &str) -> Option<&RoleLoadoutPrototype> {
        self.role_loadouts.get(id)
    }

    pub fn loadout_group(&self, id: &str) -> Option<&LoadoutGroupPrototype> {
        self.loadout_groups.get(id)
    }

    pub fn loadout(&self, id: &str) -> Option<&LoadoutPrototype> {
        self.loadouts.get(id)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    // Dangling ids are tolerated at load time and skipped when resolved.
    fn report_dangling_references(&self) {
        for role in self.role_loadouts.values() {
            for group in role.groups.iter().filter(|id| !self.loadout_groups.contains_key(*id)) {
                warn!(
                    target: "prototypes",
                    "Role loadout '{}' references unknown group '{}'", role.id, group
                );
            }
        }

        for group in self.loadout_groups.values() {
            for loadout in group
                .loadouts
                .iter()
                .chain(group.fallbacks.iter())
                .filter(|id| !self.loadouts.contains_key(*id))
            {
                warn!(
                    target: "prototypes",
                    "Loadout group '{}' references unknown loadout '{}'", group.id, loadout
                );
            }
        }

        for job in self.jobs.values() {
            if let Some(gear) = &job.starting_gear {
                if !self.starting_gear.contains_key(gear) {
                    warn!(
                        target: "prototypes",
                        "Job '{}' references unknown starting gear '{}'", job.id, gear
                    );
                }
            }
        }
    }
}

impl Default for PrototypeCatalog {
    fn default() -> Self {
        match Self::load_from_file(PROTOTYPES_CONFIG_PATH) {
            Ok(catalog) => {
                info!(
                    "Loaded {} jobs and {} species from {}",
                    catalog.job_count(),
                    catalog.species_order.len(),
                    PROTOTYPES_CONFIG_PATH
                );
                catalog
            }
            Err(error) => {
                warn!(
                    "Failed to load prototypes from {}: {error}. Falling back to bundled defaults.",
                    PROTOTYPES_CONFIG_PATH
                );
                Self::fallback()
            }
        }
    }
}

fn index<T>(
    kind: &str,
    entries: Vec<T>,
    id_of: impl Fn(&T) -> &String,
) -> Result<HashMap<String, T>, String> {
    let mut map = HashMap::with_capacity(entries.len());
    for entry in entries {
        let id = id_of(&entry).clone();
        insert_unique(&mut map, kind, id, entry)?;
    }
    Ok(map)
}

fn insert_unique<T>(
    map: &mut HashMap<String, T>,
    kind: &str,
    id: String,
    entry: T,
) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err(format!("{kind} id cannot be empty"));
    }
    if map.contains_key(&id) {
        return Err(format!("duplicate {kind} id '{id}'"));
    }
    map.insert(id, entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_is_valid() {
        let catalog = PrototypeCatalog::fallback();

        assert!(catalog.species("Human").is_some());
        assert_eq!(catalog.first_species().id, "Human");
        assert!(catalog
            .round_start_species()
            .iter()
            .all(|species| species.id != "Skeleton"));

        let captain = catalog.job("Captain").expect("captain job");
        assert_eq!(captain.starting_gear.as_deref(), Some("CaptainGear"));
        let gear = catalog.starting_gear("CaptainGear").expect("captain gear");
        assert_eq!(
            gear.gear.equipment.get("id").map(String::as_str),
            Some("CaptainPDA")
        );

        let role = catalog.role_loadout("JobCaptain").expect("captain loadout");
        assert_eq!(role.groups[0], "CaptainHead");
        assert_eq!(catalog.loadout("LoadoutCigar").map(|l| l.price), Some(15));
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        let duplicate = r#"
            [[species]]
            id = "Human"
            name = "Human"
            prototype = "MobHuman"

            [[species]]
            id = "Human"
            name = "Also Human"
            prototype = "MobHuman"
        "#;
        let error = PrototypeCatalog::from_toml_str(duplicate).expect_err("duplicate species");
        assert!(error.contains("duplicate species id 'Human'"));

        let empty = r#"
            [[species]]
            id = " "
            name = "Nobody"
            prototype = "MobHuman"
        "#;
        assert!(PrototypeCatalog::from_toml_str(empty).is_err());
        assert!(PrototypeCatalog::from_toml_str("").is_err());
    }

    #[test]
    fn clamps_group_limits_and_tolerates_dangling_ids() {
        let config = r#"
            [[species]]
            id = "Human"
            name = "Human"
            prototype = "MobHuman"

            [[role_loadouts]]
            id = "JobClown"
            groups = ["ClownShoes", "Missing"]

            [[loadout_groups]]
            id = "ClownShoes"
            min_limit = 2
            max_limit = 1
            loadouts = ["LoadoutClownShoes", "LoadoutGhost"]
        "#;

        let catalog = PrototypeCatalog::from_toml_str(config).expect("dangling ids are tolerated");
        let group = catalog.loadout_group("ClownShoes").expect("group");
        assert_eq!(group.max_limit, 2);
        assert!(catalog.loadout("LoadoutGhost").is_none());
    }
}
