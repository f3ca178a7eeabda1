//! Budget-constrained loadout allocation.
//!
//! [`plan_allocation`] is pure: from a role loadout selection, a profile and a starting
//! [`Budget`] it decides which loadouts each group receives, purchased or substituted from
//! the group's fallbacks. [`allocate`] applies such a plan to a spawned mob, equips the job's
//! starting gear, settles the ledger and raises one [`StartingGearEquipped`] message.
//!
//! Groups are walked in the role loadout prototype's order, so identical inputs always buy
//! the same items in the same sequence.
use std::collections::HashMap;

use bevy::{
    log::{debug, warn},
    prelude::{Entity, World},
};

use crate::{
    economy::BankLedger,
    preferences::{CharacterProfile, RoleLoadout, SessionId},
    prototypes::{JobPrototype, LoadoutGroupPrototype, LoadoutPrototype, PrototypeCatalog},
};

use super::{
    equipment::{equip_gear, SlotPolicy},
    events::StartingGearEquipped,
};

/// Remaining spendable balance for one allocation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    remaining: i32,
    can_withdraw: bool,
}

impl Budget {
    /// Negative balances are treated as empty.
    pub fn new(balance: i32, can_withdraw: bool) -> Self {
        Self {
            remaining: balance.max(0),
            can_withdraw,
        }
    }

    pub fn remaining(self) -> i32 {
        self.remaining
    }

    /// Whether the ledger confirmed it can settle purchases for this character.
    pub fn can_withdraw(self) -> bool {
        self.can_withdraw
    }

    /// Paid items need a confirmed ledger; free items never do.
    pub fn can_afford(self, price: i32) -> bool {
        price <= self.remaining && (price <= 0 || self.can_withdraw)
    }

    /// Budget left after buying `loadout`, or `None` when unaffordable.
    pub fn spend(self, loadout: &LoadoutPrototype) -> Option<Self> {
        self.can_afford(loadout.price).then(|| Self {
            remaining: self.remaining - loadout.cost(),
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAllocation {
    pub group: String,
    pub minimum: u32,
    /// Primary selections bought within budget, in selection order.
    pub purchased: Vec<String>,
    /// Fallbacks granted to reach the group minimum.
    pub fallbacks: Vec<String>,
}

impl GroupAllocation {
    fn new(group: &LoadoutGroupPrototype) -> Self {
        Self {
            group: group.id.clone(),
            minimum: group.min_limit,
            purchased: Vec::new(),
            fallbacks: Vec::new(),
        }
    }

    /// Equipped loadouts in equip order.
    pub fn equipped(&self) -> impl Iterator<Item = &str> + '_ {
        self.purchased
            .iter()
            .chain(self.fallbacks.iter())
            .map(String::as_str)
    }

    pub fn contains(&self, loadout: &str) -> bool {
        self.equipped().any(|id| id == loadout)
    }

    pub fn coverage(&self) -> usize {
        self.purchased.len() + self.fallbacks.len()
    }

    pub fn is_covered(&self) -> bool {
        self.coverage() >= self.minimum as usize
    }
}

/// Final loadout decisions for one spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub role_loadout: Option<String>,
    pub groups: Vec<GroupAllocation>,
    pub initial_balance: i32,
    pub remaining_balance: i32,
}

impl AllocationOutcome {
    pub fn empty(initial_balance: i32) -> Self {
        let balance = initial_balance.max(0);
        Self {
            role_loadout: None,
            groups: Vec::new(),
            initial_balance: balance,
            remaining_balance: balance,
        }
    }

    pub fn amount_spent(&self) -> i32 {
        self.initial_balance - self.remaining_balance
    }

    pub fn group(&self, id: &str) -> Option<&GroupAllocation> {
        self.groups.iter().find(|group| group.group == id)
    }

    pub fn equipped_loadouts(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().flat_map(GroupAllocation::equipped)
    }

    pub fn under_covered_groups(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups
            .iter()
            .filter(|group| !group.is_covered())
            .map(|group| group.group.as_str())
    }

    /// Equipment slots claimed by more than one equipped loadout, in equip order.
    pub fn slot_conflicts(&self, catalog: &PrototypeCatalog) -> Vec<SlotConflict> {
        let mut claimed: HashMap<&str, &str> = HashMap::new();
        let mut conflicts = Vec::new();

        for loadout_id in self.equipped_loadouts() {
            let Some(loadout) = catalog.loadout(loadout_id) else {
                continue;
            };
            for slot in loadout.gear.equipment.keys() {
                if let Some(previous) = claimed.insert(slot.as_str(), loadout_id) {
                    conflicts.push(SlotConflict {
                        slot: slot.clone(),
                        replaced: previous.to_string(),
                        by: loadout_id.to_string(),
                    });
                }
            }
        }

        conflicts
    }
}

/// A later loadout taking over a slot an earlier one in the same plan filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub slot: String,
    pub replaced: String,
    pub by: String,
}

/// Decides which loadouts a character receives.
///
/// `selection` is the player's stored choice for `role_loadout_id`. It is pruned against
/// the catalog and profile before anything is bought, so picks outside a group, duplicates,
/// picks beyond `max_limit` and picks the profile fails are never charged. Without a stored
/// choice a default selection is built from the role loadout prototype. An unknown role
/// loadout yields an empty outcome.
pub fn plan_allocation(
    catalog: &PrototypeCatalog,
    role_loadout_id: &str,
    selection: Option<&RoleLoadout>,
    profile: &CharacterProfile,
    budget: Budget,
) -> AllocationOutcome {
    let initial_balance = budget.remaining();
    let Some(prototype) = catalog.role_loadout(role_loadout_id) else {
        debug!(target: "loadout", "No role loadout '{role_loadout_id}'; nothing to allocate");
        return AllocationOutcome::empty(initial_balance);
    };

    let selection = match selection {
        Some(stored) => {
            let mut accepted = stored.clone();
            accepted.retain_allowed(prototype, profile, catalog);
            accepted
        }
        None => RoleLoadout::default_for(prototype, profile, catalog),
    };

    let mut budget = budget;
    let mut groups = Vec::with_capacity(prototype.groups.len());

    for group_id in &prototype.groups {
        let Some(group) = catalog.loadout_group(group_id) else {
            warn!(target: "loadout", "Unknown loadout group '{group_id}' in {role_loadout_id}");
            continue;
        };

        let (allocation, remaining) =
            allocate_group(catalog, group, selection.selections(group_id), profile, budget);
        budget = remaining;
        groups.push(allocation);
    }

    AllocationOutcome {
        role_loadout: Some(prototype.id.clone()),
        groups,
        initial_balance,
        remaining_balance: budget.remaining(),
    }
}

fn allocate_group(
    catalog: &PrototypeCatalog,
    group: &LoadoutGroupPrototype,
    chosen: &[String],
    profile: &CharacterProfile,
    mut budget: Budget,
) -> (GroupAllocation, Budget) {
    let mut allocation = GroupAllocation::new(group);

    for loadout_id in chosen {
        let Some(loadout) = catalog.loadout(loadout_id) else {
            warn!(target: "loadout", "Unknown loadout '{loadout_id}' in group {}", group.id);
            continue;
        };

        // Unaffordable picks are routine and skipped without noise.
        if let Some(remaining) = budget.spend(loadout) {
            budget = remaining;
            allocation.purchased.push(loadout.id.clone());
        }
    }

    apply_fallbacks(catalog, group, profile, &mut allocation);
    (allocation, budget)
}

/// Fallbacks are validated against the profile but never priced.
fn apply_fallbacks(
    catalog: &PrototypeCatalog,
    group: &LoadoutGroupPrototype,
    profile: &CharacterProfile,
    allocation: &mut GroupAllocation,
) {
    for fallback_id in &group.fallbacks {
        if allocation.is_covered() {
            break;
        }
        if allocation.contains(fallback_id) {
            continue;
        }

        let Some(fallback) = catalog.loadout(fallback_id) else {
            warn!(target: "loadout", "Unknown fallback '{fallback_id}' in group {}", group.id);
            continue;
        };

        if let Err(reason) = fallback.validate(profile) {
            debug!(target: "loadout", "Fallback {fallback_id} rejected: {reason}");
            continue;
        }

        allocation.fallbacks.push(fallback.id.clone());
    }

    if !allocation.is_covered() {
        debug!(
            target: "loadout",
            "Group {} left at {}/{} after fallbacks",
            allocation.group,
            allocation.coverage(),
            allocation.minimum
        );
    }
}

/// Inputs for equipping one mob.
#[derive(Debug, Clone, Copy)]
pub struct AllocationRequest<'a> {
    pub entity: Entity,
    pub job: &'a JobPrototype,
    pub role_loadout_id: &'a str,
    pub profile: &'a CharacterProfile,
    pub budget: Budget,
    pub session: Option<SessionId>,
}

/// Plans and applies a role loadout, then equips the job's starting gear.
///
/// Items are final once equipped: a failed ledger withdrawal is logged and nothing is
/// taken back.
pub fn allocate(
    world: &mut World,
    catalog: &PrototypeCatalog,
    ledger: Option<&mut BankLedger>,
    request: AllocationRequest<'_>,
) -> AllocationOutcome {
    let outcome = plan_allocation(
        catalog,
        request.role_loadout_id,
        request.profile.loadout(request.role_loadout_id),
        request.profile,
        request.budget,
    );

    for conflict in outcome.slot_conflicts(catalog) {
        warn!(
            target: "loadout",
            "{} replaces {} in slot {} on {:?}",
            conflict.by,
            conflict.replaced,
            conflict.slot,
            request.entity
        );
    }

    for loadout_id in outcome.equipped_loadouts() {
        if let Some(loadout) = catalog.loadout(loadout_id) {
            equip_gear(world, catalog, request.entity, &loadout.gear, SlotPolicy::Replace);
        }
    }

    equip_starting_gear(world, catalog, request.entity, request.job);

    if request.budget.can_withdraw() {
        settle(ledger, request.session, outcome.amount_spent());
    }

    world.write_message(StartingGearEquipped {
        entity: request.entity,
        job: request.job.id.clone(),
        outcome: outcome.clone(),
    });

    outcome
}

fn equip_starting_gear(
    world: &mut World,
    catalog: &PrototypeCatalog,
    entity: Entity,
    job: &JobPrototype,
) {
    let Some(gear_id) = &job.starting_gear else {
        return;
    };

    match catalog.starting_gear(gear_id) {
        Some(starting_gear) => {
            equip_gear(world, catalog, entity, &starting_gear.gear, SlotPolicy::KeepExisting);
        }
        None => warn!(target: "loadout", "Unknown starting gear '{gear_id}' for job {}", job.id),
    }
}

fn settle(ledger: Option<&mut BankLedger>, session: Option<SessionId>, amount: i32) {
    let (Some(ledger), Some(session)) = (ledger, session) else {
        warn!(target: "loadout", "Cannot settle {amount} spent: no ledger account available");
        return;
    };

    match ledger.withdraw(session, amount) {
        Ok(balance) => debug!(target: "loadout", "Withdrew {amount} from {session}; {balance} left"),
        Err(error) => warn!(target: "loadout", "Failed to withdraw {amount} from {session}: {error}"),
    }
}
