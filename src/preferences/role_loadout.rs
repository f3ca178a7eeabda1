//! Player loadout selections for a single job.
use std::collections::HashMap;

use bevy::log::debug;

use crate::prototypes::{PrototypeCatalog, RoleLoadoutPrototype};

use super::profile::CharacterProfile;

/// Loadout ids a player picked per group. Map order carries no meaning; allocation walks
/// groups in the role loadout prototype's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleLoadout {
    role: String,
    selected: HashMap<String, Vec<String>>,
}

impl RoleLoadout {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            selected: HashMap::new(),
        }
    }

    /// Builds a default selection: the first valid loadout(s) of every group.
    pub fn default_for(
        prototype: &RoleLoadoutPrototype,
        profile: &CharacterProfile,
        catalog: &PrototypeCatalog,
    ) -> Self {
        let mut loadout = Self::new(prototype.id.clone());

        for group_id in &prototype.groups {
            let Some(group) = catalog.loadout_group(group_id) else {
                continue;
            };

            let wanted = group.min_limit.max(1).min(group.max_limit) as usize;
            let picks: Vec<String> = group
                .loadouts
                .iter()
                .filter_map(|id| catalog.loadout(id))
                .filter(|candidate| candidate.is_valid_for(profile))
                .take(wanted)
                .map(|candidate| candidate.id.clone())
                .collect();

            if !picks.is_empty() {
                loadout.selected.insert(group_id.clone(), picks);
            }
        }

        loadout
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn select(&mut self, group: impl Into<String>, loadout: impl Into<String>) {
        self.selected
            .entry(group.into())
            .or_default()
            .push(loadout.into());
    }

    pub fn selections(&self, group: &str) -> &[String] {
        self.selected
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.selected.values().all(Vec::is_empty)
    }

    /// Drops selections the catalog or profile no longer allows: unknown groups, loadouts
    /// outside their group, invalid loadouts, duplicates, and picks beyond the group limit.
    pub fn ensure_valid(&mut self, profile: &CharacterProfile, catalog: &PrototypeCatalog) {
        let Some(prototype) = catalog.role_loadout(&self.role) else {
            debug!(target: "loadout", "Clearing selections for unknown role loadout {}", self.role);
            self.selected.clear();
            return;
        };

        self.retain_allowed(prototype, profile, catalog);
    }

    /// Same pruning as [`Self::ensure_valid`], against an already resolved prototype.
    pub(crate) fn retain_allowed(
        &mut self,
        prototype: &RoleLoadoutPrototype,
        profile: &CharacterProfile,
        catalog: &PrototypeCatalog,
    ) {
        self.selected
            .retain(|group_id, _| prototype.groups.iter().any(|id| id == group_id));

        for (group_id, picks) in self.selected.iter_mut() {
            let Some(group) = catalog.loadout_group(group_id) else {
                picks.clear();
                continue;
            };

            let mut kept: Vec<String> = Vec::with_capacity(picks.len());
            for pick in picks.drain(..) {
                let allowed = group.loadouts.contains(&pick)
                    && !kept.contains(&pick)
                    && catalog
                        .loadout(&pick)
                        .is_some_and(|loadout| loadout.is_valid_for(profile));
                if allowed {
                    kept.push(pick);
                } else {
                    debug!(target: "loadout", "Dropping selection {pick} from {group_id}");
                }
            }
            kept.truncate(group.max_limit as usize);
            *picks = kept;
        }

        self.selected.retain(|_, picks| !picks.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
        [[species]]
        id = "Human"
        name = "Human"
        prototype = "MobHuman"

        [[role_loadouts]]
        id = "JobBartender"
        groups = ["BarShirt", "BarExtras", "Ghost"]

        [[loadout_groups]]
        id = "BarShirt"
        min_limit = 1
        loadouts = ["LoadoutCigar", "LoadoutShirt"]

        [[loadout_groups]]
        id = "BarExtras"
        min_limit = 0
        max_limit = 2
        loadouts = ["LoadoutShaker", "LoadoutRag", "LoadoutCigar"]

        [[loadouts]]
        id = "LoadoutCigar"
        price = 5
        effects = [{ kind = "minimum_age", age = 21 }]

        [[loadouts]]
        id = "LoadoutShirt"

        [[loadouts]]
        id = "LoadoutShaker"

        [[loadouts]]
        id = "LoadoutRag"
    "#;

    fn catalog() -> PrototypeCatalog {
        PrototypeCatalog::from_toml_str(CATALOG).expect("test catalog")
    }

    #[test]
    fn default_selection_skips_invalid_loadouts() {
        let catalog = catalog();
        let role = catalog.role_loadout("JobBartender").expect("role");
        let young = CharacterProfile {
            age: 19,
            ..CharacterProfile::default()
        };

        let loadout = RoleLoadout::default_for(role, &young, &catalog);

        assert_eq!(loadout.role(), "JobBartender");
        assert_eq!(loadout.selections("BarShirt"), ["LoadoutShirt".to_string()]);
        assert_eq!(loadout.selections("BarExtras"), ["LoadoutShaker".to_string()]);
        assert!(loadout.selections("Ghost").is_empty());
    }

    #[test]
    fn ensure_valid_prunes_selections() {
        let catalog = catalog();
        let profile = CharacterProfile {
            age: 19,
            ..CharacterProfile::default()
        };

        let mut loadout = RoleLoadout::new("JobBartender");
        loadout.select("BarShirt", "LoadoutCigar");
        loadout.select("BarExtras", "LoadoutRag");
        loadout.select("BarExtras", "LoadoutRag");
        loadout.select("BarExtras", "LoadoutShirt");
        loadout.select("BarExtras", "LoadoutShaker");
        loadout.select("BarExtras", "LoadoutCigar");
        loadout.select("Unlisted", "LoadoutRag");

        loadout.ensure_valid(&profile, &catalog);

        assert!(loadout.selections("BarShirt").is_empty());
        assert_eq!(
            loadout.selections("BarExtras"),
            ["LoadoutRag".to_string(), "LoadoutShaker".to_string()]
        );
        assert!(loadout.selections("Unlisted").is_empty());
    }

    #[test]
    fn ensure_valid_clears_unknown_roles() {
        let mut loadout = RoleLoadout::new("JobMime");
        loadout.select("BarShirt", "LoadoutShirt");

        loadout.ensure_valid(&CharacterProfile::default(), &catalog());

        assert!(loadout.is_empty());
    }
}
