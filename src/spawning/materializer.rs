//! Turns a job and character profile into an equipped mob in the world.
use bevy::{
    log::{debug, info, warn},
    prelude::*,
};
use rand::seq::SliceRandom;

use crate::{
    access::provision_credentials,
    economy::BankLedger,
    loadout::{allocate, AllocationOutcome, AllocationRequest, Budget},
    preferences::{CharacterProfile, SessionId},
    prototypes::{role_loadout_id, JobPrototype, JobSpecial, PrototypeCatalog, SpeciesPrototype},
};

use super::{
    components::{
        CharacterDetail, HumanoidAppearance, JobAssignment, JobTags, MobPrototype, OnStation,
        Sentient,
    },
    settings::{SpawnRng, SpawnSettings},
};

/// Everything needed to materialize one player mob.
#[derive(Debug, Clone, Default)]
pub struct MobSpawnParams {
    pub coordinates: Vec3,
    pub job: Option<String>,
    pub profile: Option<CharacterProfile>,
    pub station: Option<Entity>,
    /// Reuse this entity as the body instead of spawning a new one.
    pub existing: Option<Entity>,
    pub session: Option<SessionId>,
}

impl MobSpawnParams {
    pub fn at(coordinates: Vec3) -> Self {
        Self {
            coordinates,
            ..Self::default()
        }
    }

    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    pub fn with_profile(mut self, profile: CharacterProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn on_station(mut self, station: Entity) -> Self {
        self.station = Some(station);
        self
    }

    pub fn for_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }
}

/// Spawns and equips a player mob. Always produces an entity; missing prototypes only
/// drop the steps that need them.
pub fn spawn_player_mob(world: &mut World, params: MobSpawnParams) -> Entity {
    world.init_resource::<PrototypeCatalog>();
    world.init_resource::<SpawnRng>();
    let settings = world
        .get_resource::<SpawnSettings>()
        .cloned()
        .unwrap_or_default();

    world.resource_scope(|world, catalog: Mut<PrototypeCatalog>| {
        materialize(world, &catalog, &settings, params)
    })
}

fn materialize(
    world: &mut World,
    catalog: &PrototypeCatalog,
    settings: &SpawnSettings,
    params: MobSpawnParams,
) -> Entity {
    let job = params.job.as_deref().and_then(|id| {
        let job = catalog.job(id);
        if job.is_none() {
            warn!(target: "spawning", "Unknown job '{id}'; spawning without a job");
        }
        job
    });

    if let Some(job) = job {
        if let Some(job_entity) = &job.job_entity {
            return spawn_job_entity(world, job, job_entity, &params);
        }
    }

    let species = pick_species(world, catalog, settings, params.profile.as_ref());
    let profile = resolve_profile(world, species, settings, params.profile.clone());
    let transform = Transform::from_translation(params.coordinates);
    let entity = spawn_body(world, params.existing, &species.prototype, transform);

    if let Some(job) = job {
        let outcome = equip_job(world, catalog, entity, job, &profile, params.session);
        #[cfg(feature = "spawn_debug")]
        info!(target: "loadout", "Allocation for {entity:?} as {}: {outcome:?}", job.id);
        debug!(
            target: "loadout",
            "{} spent {} of {} on {} loadouts",
            profile.name,
            outcome.amount_spent(),
            outcome.initial_balance,
            outcome.equipped_loadouts().count()
        );
    }

    world.entity_mut(entity).insert((
        HumanoidAppearance {
            species: species.id.clone(),
            age: profile.age,
            sex: profile.sex,
            skin_tone: profile.skin_tone,
        },
        Name::new(profile.name.clone()),
        CharacterDetail {
            flavor_text: profile.flavor_text.clone(),
        },
    ));
    attach_identity(world, entity, &params);

    if let Some(job) = job {
        world.entity_mut(entity).insert(JobAssignment {
            job: job.id.clone(),
        });
        provision_credentials(world, entity, job, &profile.name, params.station);
        apply_job_specials(world, entity, job);
    }

    info!(
        target: "spawning",
        "Spawned {} ({}) as {} at {:?}",
        profile.name,
        species.name,
        job.map(|job| job.name.as_str()).unwrap_or("no job"),
        params.coordinates
    );
    entity
}

fn spawn_job_entity(
    world: &mut World,
    job: &JobPrototype,
    job_entity: &str,
    params: &MobSpawnParams,
) -> Entity {
    let transform = Transform::from_translation(params.coordinates);
    let entity = spawn_body(world, params.existing, job_entity, transform);

    world.entity_mut(entity).insert((
        Sentient,
        Name::new(job.name.clone()),
        JobAssignment {
            job: job.id.clone(),
        },
    ));
    attach_identity(world, entity, params);
    apply_job_specials(world, entity, job);

    info!(target: "spawning", "Spawned {job_entity} for job {}", job.id);
    entity
}

fn attach_identity(world: &mut World, entity: Entity, params: &MobSpawnParams) {
    let mut mob = world.entity_mut(entity);
    if let Some(station) = params.station {
        mob.insert(OnStation(station));
    }
    if let Some(session) = params.session {
        mob.insert(session);
    }
}

fn spawn_body(
    world: &mut World,
    existing: Option<Entity>,
    prototype: &str,
    transform: Transform,
) -> Entity {
    match existing {
        Some(entity) if world.get_entity(entity).is_ok() => entity,
        Some(entity) => {
            warn!(target: "spawning", "Supplied body {entity:?} no longer exists; spawning a new one");
            world
                .spawn((MobPrototype(prototype.to_string()), transform))
                .id()
        }
        None => world
            .spawn((MobPrototype(prototype.to_string()), transform))
            .id(),
    }
}

/// Random round-start species when characters are randomised, else the profile's
/// species, else the configured default.
fn pick_species<'a>(
    world: &mut World,
    catalog: &'a PrototypeCatalog,
    settings: &SpawnSettings,
    profile: Option<&CharacterProfile>,
) -> &'a SpeciesPrototype {
    let requested = if settings.randomize_characters {
        let pool = catalog.round_start_species();
        let mut rng = world.resource_mut::<SpawnRng>();
        pool.choose(&mut rng.0).map(|species| species.id.clone())
    } else {
        profile.map(|profile| profile.species.clone())
    };
    let requested = requested.unwrap_or_else(|| settings.default_species.clone());

    if let Some(species) = catalog.species(&requested) {
        return species;
    }

    warn!(
        target: "spawning",
        "Unknown species '{requested}'; using {}", settings.default_species
    );
    catalog
        .species(&settings.default_species)
        .unwrap_or_else(|| catalog.first_species())
}

fn resolve_profile(
    world: &mut World,
    species: &SpeciesPrototype,
    settings: &SpawnSettings,
    profile: Option<CharacterProfile>,
) -> CharacterProfile {
    match profile {
        _ if settings.randomize_characters => {
            let mut rng = world.resource_mut::<SpawnRng>();
            CharacterProfile::random_with_species(species.id.clone(), &mut rng.0)
        }
        Some(profile) => CharacterProfile {
            species: species.id.clone(),
            ..profile
        },
        None => CharacterProfile {
            skin_tone: species.default_skin_tone,
            ..CharacterProfile::with_species(species.id.clone())
        },
    }
}

/// Runs the allocator against the session's ledger account when one exists, otherwise
/// against the profile's cached balance with withdrawals disabled.
fn equip_job(
    world: &mut World,
    catalog: &PrototypeCatalog,
    entity: Entity,
    job: &JobPrototype,
    profile: &CharacterProfile,
    session: Option<SessionId>,
) -> AllocationOutcome {
    let account_balance = session.and_then(|session| {
        world
            .get_resource::<BankLedger>()
            .and_then(|ledger| ledger.balance(session))
    });
    let budget = match account_balance {
        Some(balance) => Budget::new(balance, true),
        None => Budget::new(profile.bank_balance, false),
    };

    let role_loadout = role_loadout_id(&job.id);
    let request = AllocationRequest {
        entity,
        job,
        role_loadout_id: &role_loadout,
        profile,
        budget,
        session,
    };

    world
        .try_resource_scope(|world, mut ledger: Mut<BankLedger>| {
            allocate(world, catalog, Some(&mut *ledger), request)
        })
        .unwrap_or_else(|| allocate(world, catalog, None, request))
}

/// Applies a job's post-equip hooks.
pub fn apply_job_specials(world: &mut World, entity: Entity, job: &JobPrototype) {
    for special in &job.special {
        match special {
            JobSpecial::AddTag { tag } => {
                let mut tags = world.get::<JobTags>(entity).cloned().unwrap_or_default();
                tags.insert(tag.clone());
                world.entity_mut(entity).insert(tags);
            }
            JobSpecial::GrantSentience => {
                world.entity_mut(entity).insert(Sentient);
            }
        }
    }
}
