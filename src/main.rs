use bevy::{log::LogPlugin, prelude::*};

use station_spawning::{
    economy::{BankLedger, InMemoryLedger},
    preferences::{CharacterProfile, RoleLoadout, SessionId, SpawnPriorityPreference},
    spawning::{
        spawn_player_character_on_station, spawn_player_mob, ArrivalsGate, CryoPod,
        MobSpawnParams, OnStation, PlacementKind, SpawnPoint, Station, SpawnTelemetry,
    },
    StationSpawningPlugin,
};

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), StationSpawningPlugin))
        .insert_resource(BankLedger::new(Box::new(
            InMemoryLedger::default()
                .with_account(SessionId::new(1), 150)
                .with_account(SessionId::new(2), 60)
                .with_account(SessionId::new(3), 35),
        )))
        .add_systems(Startup, spawn_demo_roster);

    app.update();

    let telemetry = app.world().resource::<SpawnTelemetry>();
    info!("Demo finished with {} equipped spawns", telemetry.len());
}

struct RosterEntry {
    job: &'static str,
    profile: CharacterProfile,
    session: Option<SessionId>,
    placement: PlacementKind,
}

fn spawn_demo_roster(world: &mut World) {
    let station = world
        .spawn((
            Station {
                name: "Outpost Kestrel".to_string(),
                extended_access: false,
            },
            Name::new("Outpost Kestrel"),
        ))
        .id();
    let derelict = world
        .spawn((
            Station {
                name: "Derelict Relay".to_string(),
                extended_access: true,
            },
            Name::new("Derelict Relay"),
        ))
        .id();

    for (at, point) in [
        (Vec3::new(0.0, 0.0, 4.0), SpawnPoint::for_job("Captain")),
        (Vec3::new(3.0, 0.0, -2.0), SpawnPoint::for_job("SecurityOfficer")),
        (Vec3::new(-6.0, 0.0, 0.0), SpawnPoint::late_join()),
    ] {
        world.spawn((point, Transform::from_translation(at), OnStation(station)));
    }
    world.spawn((
        ArrivalsGate,
        Transform::from_xyz(-12.0, 0.0, 0.0),
        OnStation(station),
    ));
    world.spawn((
        CryoPod::default(),
        Transform::from_xyz(8.0, 0.0, 8.0),
        OnStation(station),
    ));

    let mut captain_picks = RoleLoadout::new("JobCaptain");
    captain_picks.select("CaptainHead", "LoadoutCaptainHat");
    captain_picks.select("CaptainOuter", "LoadoutCaptainCarapace");
    captain_picks.select("Trinkets", "LoadoutSunglasses");
    captain_picks.select("Trinkets", "LoadoutCigar");

    let roster = [
        RosterEntry {
            job: "Captain",
            profile: CharacterProfile::new("Ada Hale", "Human")
                .with_age(52)
                .with_loadout(captain_picks),
            session: Some(SessionId::new(1)),
            placement: PlacementKind::RoundStart,
        },
        RosterEntry {
            job: "SecurityOfficer",
            profile: CharacterProfile::new("Bryn Drummond", "Dwarf"),
            session: Some(SessionId::new(2)),
            placement: PlacementKind::RoundStart,
        },
        RosterEntry {
            job: "Passenger",
            profile: CharacterProfile::new("Cedric Everly", "Moth")
                .with_spawn_priority(SpawnPriorityPreference::Cryosleep),
            session: Some(SessionId::new(3)),
            placement: PlacementKind::LateJoin,
        },
        RosterEntry {
            job: "Passenger",
            profile: CharacterProfile::new("Dana Garrick", "Human")
                .with_balance(300)
                .with_spawn_priority(SpawnPriorityPreference::Arrivals),
            session: None,
            placement: PlacementKind::LateJoin,
        },
    ];

    for entry in roster {
        place(world, station, entry);
    }

    place(
        world,
        derelict,
        RosterEntry {
            job: "StationAi",
            profile: CharacterProfile::default(),
            session: None,
            placement: PlacementKind::RoundStart,
        },
    );
}

fn place(world: &mut World, station: Entity, entry: RosterEntry) {
    let name = entry.profile.name.clone();
    let result = spawn_player_character_on_station(
        world,
        station,
        Some(entry.job.to_string()),
        Some(entry.profile.clone()),
        entry.session,
        entry.placement,
    );

    match result {
        Ok(Some(mob)) => info!("{name} placed as {mob:?}"),
        Ok(None) => {
            warn!("No spawn location for {name}; falling back to the map origin");
            let mut params = MobSpawnParams::at(Vec3::ZERO)
                .with_job(entry.job)
                .with_profile(entry.profile)
                .on_station(station);
            params.session = entry.session;
            spawn_player_mob(world, params);
        }
        Err(err) => error!("Could not spawn {name}: {err}"),
    }
}
