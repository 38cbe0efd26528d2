//! Elite persistence: the healthiest agents saved to and restored from a
//! key-value store.
//!
//! The blob stored under [`ELITE_KEY`] is a JSON array of strings, each one
//! an agent blob produced by [`Agent::serialize`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use geo::Point;
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, InteractionKind};
use super::brain::{Brain, BrainError};
use super::geometric_utils::random_position;
use super::world::PhysicsWorld;

/// Key the elite blob is stored under.
pub const ELITE_KEY: &str = "top50HealthiestCreatures";

/// Persisted agent state, without a physical handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliteSnapshot {
    /// Health at save time.
    pub health: f32,
    /// Ecological role.
    pub interaction_kind: InteractionKind,
    /// Age at save time.
    pub age: u64,
    /// Children spawned before saving.
    pub children_spawned: u32,
    /// Complete brain, validated on load.
    pub brain: Brain,
}

/// Failure of the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Failure while saving or parsing elites.
#[derive(Debug, thiserror::Error)]
pub enum EliteError {
    /// Blob is not the expected JSON.
    #[error("malformed elite blob: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored brain is inconsistent.
    #[error("invalid stored brain: {0}")]
    Brain(#[from] BrainError),
    /// Store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Durable string-keyed blob storage.
pub trait KeyValueStore {
    /// Reads the blob under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `blob` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
}

/// In-memory store, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), blob.to_owned());
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), blob)?;
        Ok(())
    }
}

/// Saves the `k` healthiest agents under [`ELITE_KEY`]. Ties keep population
/// order. Returns how many agents were written.
///
/// Nothing is written if any selected brain fails validation.
pub fn save_top_k<S: KeyValueStore + ?Sized>(
    agents: &[Agent],
    k: usize,
    store: &mut S,
) -> Result<usize, EliteError> {
    let mut ranked: Vec<&Agent> = agents.iter().collect();
    ranked.sort_by(|a, b| b.health.total_cmp(&a.health));
    ranked.truncate(k);

    let mut entries = Vec::with_capacity(ranked.len());
    for agent in ranked {
        agent.brain.validate()?;
        entries.push(agent.serialize()?);
    }
    store.set(ELITE_KEY, &serde_json::to_string(&entries)?)?;

    info!("saved {} elite agents", entries.len());
    Ok(entries.len())
}

/// Parses an elite blob into snapshots, healthiest first as saved.
pub fn parse_elites(blob: &str) -> Result<Vec<EliteSnapshot>, EliteError> {
    let entries: Vec<String> = serde_json::from_str(blob)?;
    entries
        .iter()
        .map(|entry| Ok(serde_json::from_str::<EliteSnapshot>(entry)?))
        .collect()
}

/// Restores saved elites, each bound to a fresh body at a random position in
/// the square of side `2 * half_size`.
///
/// A missing, unreadable or corrupt blob yields an empty list. Nothing is
/// spawned unless every entry parses.
pub fn load_top_k<S, W, R>(
    store: &S,
    world: &mut W,
    half_size: f32,
    size: (f32, f32),
    rng: &mut R,
) -> Vec<Agent>
where
    S: KeyValueStore + ?Sized,
    W: PhysicsWorld + ?Sized,
    R: Rng + ?Sized,
{
    let blob = match store.get(ELITE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            warn!("no saved elites found");
            return Vec::new();
        }
        Err(e) => {
            warn!("could not read saved elites: {e}");
            return Vec::new();
        }
    };

    let snapshots = match parse_elites(&blob) {
        Ok(snapshots) => snapshots,
        Err(e) => {
            warn!("discarding saved elites: {e}");
            return Vec::new();
        }
    };

    let agents: Vec<Agent> = snapshots
        .into_iter()
        .map(|snapshot| {
            let pos: Point<f32> = random_position(half_size, rng);
            let handle = world.spawn_body(pos, size);
            Agent::from_snapshot(snapshot, 0, handle)
        })
        .collect();
    info!("loaded {} elite agents", agents.len());
    agents
}
