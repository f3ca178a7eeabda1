//! Equipment slots on mobs and the item entities placed in them.
use std::collections::BTreeMap;

use bevy::{
    log::{debug, warn},
    prelude::*,
};

use crate::{
    access::credentials::{IdCard, Pda},
    prototypes::{CredentialKind, GearSet, PrototypeCatalog},
};

/// Slot checked first when looking for a mob's credential.
pub const ID_SLOT: &str = "id";

/// Worn items keyed by slot plus loose items in storage.
#[derive(Component, Debug, Clone, Default)]
pub struct Equipment {
    slots: BTreeMap<String, Entity>,
    storage: Vec<Entity>,
}

impl Equipment {
    pub fn slot(&self, slot: &str) -> Option<Entity> {
        self.slots.get(slot).copied()
    }

    pub fn storage(&self) -> &[Entity] {
        &self.storage
    }

    /// Worn items in slot order followed by stored items.
    pub fn items(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.values().copied().chain(self.storage.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.slots.len() + self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Places an item in a slot, returning whatever it displaced.
    pub fn occupy(&mut self, slot: impl Into<String>, item: Entity) -> Option<Entity> {
        self.slots.insert(slot.into(), item)
    }

    pub fn stash(&mut self, item: Entity) {
        self.storage.push(item);
    }
}

/// Spawned instance of an item prototype.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub prototype: String,
}

/// How gear treats a slot that is already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Loadout gear displaces and deletes the previous item.
    Replace,
    /// Starting gear only fills empty slots.
    KeepExisting,
}

/// Spawns an item from its prototype, including the card inside a PDA.
pub fn spawn_item(world: &mut World, catalog: &PrototypeCatalog, item_id: &str) -> Option<Entity> {
    let Some(prototype) = catalog.item(item_id) else {
        warn!(target: "loadout", "Unknown item prototype '{item_id}'; skipping");
        return None;
    };

    let item = world
        .spawn((
            Item {
                prototype: prototype.id.clone(),
            },
            Name::new(prototype.name.clone()),
        ))
        .id();

    match &prototype.credential {
        Some(CredentialKind::IdCard) => {
            world.entity_mut(item).insert(IdCard::default());
        }
        Some(CredentialKind::Pda { card }) => {
            let id_card = spawn_id_card(world, catalog, card);
            world.entity_mut(item).insert(Pda {
                id_card,
                owner_name: None,
            });
        }
        None => {}
    }

    Some(item)
}

fn spawn_id_card(world: &mut World, catalog: &PrototypeCatalog, card_id: &str) -> Option<Entity> {
    let Some(prototype) = catalog.item(card_id) else {
        warn!(target: "loadout", "Unknown ID card prototype '{card_id}'; PDA spawns empty");
        return None;
    };

    let card = world
        .spawn((
            Item {
                prototype: prototype.id.clone(),
            },
            Name::new(prototype.name.clone()),
            IdCard::default(),
        ))
        .id();
    Some(card)
}

/// Equips a gear set onto `wearer`, returning how many items were placed.
pub fn equip_gear(
    world: &mut World,
    catalog: &PrototypeCatalog,
    wearer: Entity,
    gear: &GearSet,
    policy: SlotPolicy,
) -> usize {
    if world.get::<Equipment>(wearer).is_none() {
        world.entity_mut(wearer).insert(Equipment::default());
    }

    let mut placed = 0;

    for (slot, item_id) in &gear.equipment {
        let occupied = world
            .get::<Equipment>(wearer)
            .and_then(|equipment| equipment.slot(slot));
        if occupied.is_some() && policy == SlotPolicy::KeepExisting {
            debug!(target: "loadout", "Slot {slot} already filled; keeping it over {item_id}");
            continue;
        }

        let Some(item) = spawn_item(world, catalog, item_id) else {
            continue;
        };

        let displaced = world
            .get_mut::<Equipment>(wearer)
            .and_then(|mut equipment| equipment.occupy(slot.clone(), item));
        if let Some(previous) = displaced {
            despawn_item(world, previous);
        }
        placed += 1;
    }

    for item_id in &gear.storage {
        let Some(item) = spawn_item(world, catalog, item_id) else {
            continue;
        };
        if let Some(mut equipment) = world.get_mut::<Equipment>(wearer) {
            equipment.stash(item);
        }
        placed += 1;
    }

    placed
}

fn despawn_item(world: &mut World, item: Entity) {
    let nested = world.get::<Pda>(item).and_then(|pda| pda.id_card);
    if let Some(card) = nested {
        world.despawn(card);
    }
    world.despawn(item);
}
