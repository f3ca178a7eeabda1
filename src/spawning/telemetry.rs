//! Spawn history: a rolling in-memory buffer plus an optional JSONL file.
use std::{
    collections::VecDeque,
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use bevy::{log::warn, prelude::*};
use serde::Serialize;

use crate::loadout::StartingGearEquipped;

/// Recent spawns, oldest first.
#[derive(Resource, Debug)]
pub struct SpawnTelemetry {
    capacity: usize,
    records: VecDeque<SpawnRecord>,
}

impl SpawnTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: SpawnRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &SpawnRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What one equipped spawn cost and received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnRecord {
    pub entity: String,
    pub job: String,
    pub role_loadout: Option<String>,
    pub initial_balance: i32,
    pub amount_spent: i32,
    pub equipped: Vec<String>,
    pub under_covered: Vec<String>,
}

impl From<&StartingGearEquipped> for SpawnRecord {
    fn from(message: &StartingGearEquipped) -> Self {
        let outcome = &message.outcome;
        Self {
            entity: format!("{:?}", message.entity),
            job: message.job.clone(),
            role_loadout: outcome.role_loadout.clone(),
            initial_balance: outcome.initial_balance,
            amount_spent: outcome.amount_spent(),
            equipped: outcome.equipped_loadouts().map(str::to_string).collect(),
            under_covered: outcome.under_covered_groups().map(str::to_string).collect(),
        }
    }
}

/// Pending records waiting to be appended to disk. A log without a path only drops them.
#[derive(Resource, Debug, Default)]
pub struct SpawnTelemetryLog {
    output_path: Option<PathBuf>,
    pending: Vec<SpawnRecord>,
}

impl SpawnTelemetryLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            output_path: path,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, record: &SpawnRecord) {
        if self.output_path.is_some() {
            self.pending.push(record.clone());
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        let Some(path) = self.output_path.as_deref() else {
            self.pending.clear();
            return Ok(());
        };
        if self.pending.is_empty() {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        for record in std::mem::take(&mut self.pending) {
            serde_json::to_writer(&mut file, &record)?;
            file.write_all(b"\n")?;
        }

        file.flush()
    }

    pub fn path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub fn record_spawn_telemetry(
    mut telemetry: ResMut<SpawnTelemetry>,
    mut log: ResMut<SpawnTelemetryLog>,
    mut equipped: MessageReader<StartingGearEquipped>,
) {
    for message in equipped.read() {
        let record = SpawnRecord::from(message);
        log.push(&record);
        telemetry.push(record);
    }
}

pub fn flush_spawn_telemetry_log(mut log: ResMut<SpawnTelemetryLog>) {
    if let Err(err) = log.flush() {
        warn!(
            target: "spawning",
            "Failed to persist spawn telemetry to {:?}: {}",
            log.path(),
            err
        );
    }
}
