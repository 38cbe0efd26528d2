#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use cuboids::simulation::agent::{Agent, InteractionKind};
use cuboids::simulation::brain::{ActionChannel, Brain, SensoryChannel};
use cuboids::simulation::numeric::FilterType;
use cuboids::simulation::params::Params;
use cuboids::simulation::simple_world::SimpleWorld;
use cuboids::simulation::world::{
    BodyHandle, ColliderHandle, NearbyBody, PhysicalHandle, PhysicsWorld, RayHit, Visuals,
};
use geo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Deterministic params with every source of drift switched off.
pub fn create_test_params() -> Params {
    Params {
        initial_population: 0,
        immigration_probability: 0.0,
        plant_decay: 0.0,
        predator_decay: 0.0,
        healer_decay: 0.0,
        seed: Some(7),
        ..Params::default()
    }
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Brain reading only health and driving only rotation.
pub fn health_brain(rng: &mut StdRng) -> Brain {
    Brain::with_random_weights(
        3,
        vec![SensoryChannel::Health],
        vec![ActionChannel::RotationalImpulse],
        FilterType::Tanh,
        FilterType::Tanh,
        0.5,
        rng,
    )
}

/// Spawns a body at `position` and wraps it in an agent.
pub fn agent_at<W: PhysicsWorld>(
    world: &mut W,
    position: Point<f32>,
    health: f32,
    kind: InteractionKind,
    rng: &mut StdRng,
) -> Agent {
    let handle = world.spawn_body(position, (1.0, 1.0));
    let mut agent = Agent::new_random(0, handle, health, kind, &Default::default(), rng);
    agent.brain = health_brain(rng);
    agent.last_action = ndarray::Array1::zeros(1);
    agent
}

/// Wraps [`SimpleWorld`] and records calls the population makes into it.
#[derive(Default)]
pub struct RecordingWorld {
    pub inner: SimpleWorld,
    pub removed_bodies: HashMap<BodyHandle, usize>,
    pub removed_colliders: HashMap<ColliderHandle, usize>,
    /// Call names in order.
    pub journal: RefCell<Vec<&'static str>>,
    /// Make every placement attempt fail.
    pub crowded: bool,
}

impl RecordingWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the first `name` call in the journal.
    pub fn first(&self, name: &str) -> Option<usize> {
        self.journal.borrow().iter().position(|c| *c == name)
    }

    /// Position of the last `name` call in the journal.
    pub fn last(&self, name: &str) -> Option<usize> {
        self.journal.borrow().iter().rposition(|c| *c == name)
    }

    pub fn body_removals(&self, handle: PhysicalHandle) -> usize {
        self.removed_bodies.get(&handle.body).copied().unwrap_or(0)
    }

    pub fn collider_removals(&self, handle: PhysicalHandle) -> usize {
        self.removed_colliders.get(&handle.collider).copied().unwrap_or(0)
    }
}

impl PhysicsWorld for RecordingWorld {
    fn spawn_body(&mut self, position: Point<f32>, size: (f32, f32)) -> PhysicalHandle {
        self.journal.borrow_mut().push("spawn_body");
        self.inner.spawn_body(position, size)
    }

    fn position(&self, body: BodyHandle) -> Point<f32> {
        self.inner.position(body)
    }

    fn velocity(&self, body: BodyHandle) -> Point<f32> {
        self.inner.velocity(body)
    }

    fn heading(&self, body: BodyHandle) -> f32 {
        self.inner.heading(body)
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Point<f32>) {
        self.journal.borrow_mut().push("apply_impulse");
        self.inner.apply_impulse(body, impulse);
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque: f32) {
        self.journal.borrow_mut().push("apply_torque_impulse");
        self.inner.apply_torque_impulse(body, torque);
    }

    fn cast_ray(
        &self,
        origin: Point<f32>,
        direction: Point<f32>,
        max_distance: f32,
        exclude: BodyHandle,
    ) -> Option<RayHit> {
        self.inner.cast_ray(origin, direction, max_distance, exclude)
    }

    fn query_nearby(&self, body: BodyHandle, radius: f32) -> Vec<NearbyBody> {
        self.journal.borrow_mut().push("query_nearby");
        self.inner.query_nearby(body, radius)
    }

    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle> {
        self.inner.contacts(body)
    }

    fn is_space_empty(&self, position: Point<f32>, size: (f32, f32), padding: f32) -> bool {
        !self.crowded && self.inner.is_space_empty(position, size, padding)
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.journal.borrow_mut().push("remove_body");
        *self.removed_bodies.entry(body).or_default() += 1;
        self.inner.remove_body(body);
    }

    fn remove_collider(&mut self, collider: ColliderHandle) {
        self.journal.borrow_mut().push("remove_collider");
        *self.removed_colliders.entry(collider).or_default() += 1;
        self.inner.remove_collider(collider);
    }
}

/// Visual collaborator that tracks which bodies are on screen.
#[derive(Default)]
pub struct RecordingVisuals {
    pub shown: HashMap<BodyHandle, InteractionKind>,
    pub removed: usize,
}

impl Visuals for RecordingVisuals {
    fn add_visual(&mut self, body: BodyHandle, kind: InteractionKind) {
        self.shown.insert(body, kind);
    }

    fn remove_visual(&mut self, body: BodyHandle) {
        self.shown.remove(&body);
        self.removed += 1;
    }
}
