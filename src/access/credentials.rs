//! ID card and PDA credential provisioning for freshly spawned mobs.
use std::collections::BTreeSet;

use bevy::{
    log::debug,
    prelude::{Component, Entity, Name, World},
};

use crate::{
    loadout::equipment::{Equipment, ID_SLOT},
    prototypes::JobPrototype,
    spawning::components::Station,
};

/// Identity credential carried directly or inside a PDA.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct IdCard {
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub job_icon: Option<String>,
    pub access: BTreeSet<String>,
}

/// Personal device holding an ID card.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Pda {
    pub id_card: Option<Entity>,
    pub owner_name: Option<String>,
}

/// Where a mob's credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialLocation {
    pub card: Entity,
    pub pda: Option<Entity>,
}

/// Access granted to a job, including extended access when the station allows it.
pub fn job_access(job: &JobPrototype, extended: bool) -> BTreeSet<String> {
    let mut access: BTreeSet<String> = job.access.iter().cloned().collect();
    if extended {
        access.extend(job.extended_access.iter().cloned());
    }
    access
}

/// Looks for an ID card on the mob, checking the ID slot before other gear.
pub fn find_credential(world: &World, wearer: Entity) -> Option<CredentialLocation> {
    let equipment = world.get::<Equipment>(wearer)?;
    let id_slot = equipment.slot(ID_SLOT);

    id_slot
        .into_iter()
        .chain(equipment.items().filter(|item| Some(*item) != id_slot))
        .find_map(|item| credential_in(world, item))
}

fn credential_in(world: &World, item: Entity) -> Option<CredentialLocation> {
    if world.get::<IdCard>(item).is_some() {
        return Some(CredentialLocation {
            card: item,
            pda: None,
        });
    }

    let card = world.get::<Pda>(item)?.id_card?;
    world.get::<IdCard>(card).map(|_| CredentialLocation {
        card,
        pda: Some(item),
    })
}

/// Writes name, job and access onto the mob's credential. Returns `false` when the mob
/// carries none.
pub fn provision_credentials(
    world: &mut World,
    wearer: Entity,
    job: &JobPrototype,
    full_name: &str,
    station: Option<Entity>,
) -> bool {
    let Some(location) = find_credential(world, wearer) else {
        debug!(target: "spawning", "No credential found on {wearer:?}; skipping job card setup");
        return false;
    };

    let extended = station
        .and_then(|station| world.get::<Station>(station))
        .is_some_and(|station| station.extended_access);

    if let Some(mut card) = world.get_mut::<IdCard>(location.card) {
        card.full_name = Some(full_name.to_string());
        card.job_title = Some(job.name.clone());
        card.job_icon = (!job.icon.is_empty()).then(|| job.icon.clone());
        card.access = job_access(job, extended);
    }
    world
        .entity_mut(location.card)
        .insert(Name::new(format!("{full_name}'s ID card ({})", job.name)));

    if let Some(pda) = location.pda {
        if let Some(mut device) = world.get_mut::<Pda>(pda) {
            device.owner_name = Some(full_name.to_string());
        }
    }

    true
}
