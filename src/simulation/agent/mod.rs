//! Agent record, sensory encoding and action decoding.
//!
//! An agent is plain data: a physical handle into the world, an owned
//! brain, vitals, and an interaction kind that selects its ecological role.

mod action;
mod sensory;

pub use action::{ImpulseStrengths, apply_actions};
pub use sensory::{Observation, encode_sensory, encode_vision, observe};

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::brain::{Brain, InheritanceParams};
use super::elite::EliteSnapshot;
use super::world::PhysicalHandle;

/// Ecological role of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Decays fast; prey for predators.
    Plant,
    /// Decays slowly; drains health from non-predators it touches.
    Predator,
    /// Decays slowly; restores health to plants it touches.
    Healer,
}

impl InteractionKind {
    /// Small integer code reported through vision.
    pub fn code(self) -> f32 {
        match self {
            InteractionKind::Plant => 0.0,
            InteractionKind::Predator => 1.0,
            InteractionKind::Healer => 2.0,
        }
    }

    /// Draws a kind for a fresh agent.
    pub fn random<R: Rng + ?Sized>(
        predator_probability: f32,
        healer_probability: f32,
        rng: &mut R,
    ) -> Self {
        let roll = rng.random::<f32>();
        if roll < predator_probability {
            InteractionKind::Predator
        } else if roll < predator_probability + healer_probability {
            InteractionKind::Healer
        } else {
            InteractionKind::Plant
        }
    }
}

/// A simulated agent.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique identifier within a run.
    pub id: u64,
    /// Body and collider owned in the physics world.
    pub handle: PhysicalHandle,
    /// Neural controller.
    pub brain: Brain,
    /// Current health. Written through the population manager.
    pub health: f32,
    /// Ticks lived, starting at 1.
    pub age: u64,
    /// Number of successful reproductions.
    pub children_spawned: u32,
    /// Ecological role.
    pub kind: InteractionKind,
    /// Raw brain output from the most recent tick.
    pub last_action: Array1<f32>,
}

impl Agent {
    /// Creates an agent with a fresh random brain.
    pub fn new_random<R: Rng + ?Sized>(
        id: u64,
        handle: PhysicalHandle,
        health: f32,
        kind: InteractionKind,
        params: &InheritanceParams,
        rng: &mut R,
    ) -> Self {
        Self::from_parts(id, handle, Brain::new_random(params, rng), health, kind)
    }

    /// Creates a child of `parent` with an inherited, mutated brain and the
    /// parent's interaction kind.
    pub fn new_child<R: Rng + ?Sized>(
        id: u64,
        handle: PhysicalHandle,
        parent: &Agent,
        health: f32,
        params: &InheritanceParams,
        rng: &mut R,
    ) -> Self {
        let brain = Brain::inherit(&parent.brain, params, rng);
        Self::from_parts(id, handle, brain, health, parent.kind)
    }

    fn from_parts(
        id: u64,
        handle: PhysicalHandle,
        brain: Brain,
        health: f32,
        kind: InteractionKind,
    ) -> Self {
        let outputs = brain.output_width();
        Self {
            id,
            handle,
            brain,
            health,
            age: 1,
            children_spawned: 0,
            kind,
            last_action: Array1::zeros(outputs),
        }
    }

    /// Persisted form of this agent, without its physical handle.
    pub fn snapshot(&self) -> EliteSnapshot {
        EliteSnapshot {
            health: self.health,
            interaction_kind: self.kind,
            age: self.age,
            children_spawned: self.children_spawned,
            brain: self.brain.clone(),
        }
    }

    /// Serializes [`Agent::snapshot`] to a JSON blob.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    /// Rebuilds an agent from a blob written by [`Agent::serialize`], bound
    /// to a new physical handle.
    pub fn reconstruct(
        blob: &str,
        id: u64,
        handle: PhysicalHandle,
    ) -> Result<Self, serde_json::Error> {
        let snapshot: EliteSnapshot = serde_json::from_str(blob)?;
        Ok(Self::from_snapshot(snapshot, id, handle))
    }

    /// Rebuilds an agent from an already-parsed snapshot.
    pub fn from_snapshot(snapshot: EliteSnapshot, id: u64, handle: PhysicalHandle) -> Self {
        let mut agent = Self::from_parts(
            id,
            handle,
            snapshot.brain,
            snapshot.health,
            snapshot.interaction_kind,
        );
        agent.age = snapshot.age;
        agent.children_spawned = snapshot.children_spawned;
        agent
    }
}
