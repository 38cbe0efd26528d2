//! Population lifecycle: cognition, environmental effects, reproduction,
//! death and immigration.
//!
//! The manager is the sole owner of the agent collection. Each tick it
//! reads the world once per agent, drives every brain, accounts for health,
//! and then applies the structural changes it buffered along the way.

use std::collections::HashMap;

use geo::Point;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::agent::{self, Agent, InteractionKind, Observation};
use super::brain::BrainError;
use super::elite::{self, EliteError, KeyValueStore};
use super::event_log::{EventKind, EventLog};
use super::events::{EventQueue, LifecycleEvent};
use super::geometric_utils::random_position_near;
use super::params::{Params, ReproductionPolicy};
use super::world::{BodyHandle, PhysicsWorld, Visuals};

/// A single health write made by the manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    /// Agent whose health changed.
    pub agent_id: u64,
    /// Health before the write.
    pub old: f32,
    /// Health after the write.
    pub new: f32,
}

/// Callback invoked on every health write.
pub type HealthObserver = Box<dyn FnMut(&HealthChange)>;

/// Fatal failures during a tick.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// An agent's brain could not run; it is corrupt.
    #[error("cognition failed for agent {agent_id}: {source}")]
    Cognition {
        /// Offending agent.
        agent_id: u64,
        /// Underlying brain failure.
        #[source]
        source: BrainError,
    },
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Children inserted.
    pub births: usize,
    /// Agents removed.
    pub deaths: usize,
    /// Random agents inserted by immigration.
    pub immigrants: usize,
    /// Spawns abandoned for lack of free space.
    pub skipped_spawns: usize,
}

/// Aggregate figures over the live population.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PopulationStats {
    /// Live agents.
    pub count: usize,
    /// Live plants.
    pub plants: usize,
    /// Live predators.
    pub predators: usize,
    /// Live healers.
    pub healers: usize,
    /// Mean health, zero when empty.
    pub mean_health: f32,
    /// Highest health, zero when empty.
    pub max_health: f32,
    /// Oldest age.
    pub max_age: u64,
    /// Children spawned by live agents.
    pub total_children: u64,
}

/// Owns and evolves the agent population.
pub struct PopulationManager {
    params: Params,
    agents: Vec<Agent>,
    registry: HashMap<BodyHandle, usize>,
    rng: StdRng,
    next_id: u64,
    tick: u64,
    event_log: EventLog,
    health_observer: Option<HealthObserver>,
}

impl PopulationManager {
    /// Creates an empty population.
    pub fn new(params: Params) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let event_log = EventLog::new(params.event_log_size);

        Self {
            params,
            agents: Vec::new(),
            registry: HashMap::new(),
            rng,
            next_id: 0,
            tick: 0,
            event_log,
            health_observer: None,
        }
    }

    /// Simulation parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Live agents in population order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of completed ticks.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Recent lifecycle events.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// The agent owning `body`, if any.
    pub fn agent_by_body(&self, body: BodyHandle) -> Option<&Agent> {
        self.registry.get(&body).map(|&i| &self.agents[i])
    }

    /// Installs a callback invoked on every health write.
    pub fn set_health_observer(&mut self, observer: HealthObserver) {
        self.health_observer = Some(observer);
    }

    /// Overwrites the health of the agent at `index`.
    ///
    /// Returns the recorded change, or `None` when no agent sits at `index`.
    pub fn set_health(&mut self, index: usize, health: f32) -> Option<HealthChange> {
        let agent = self.agents.get_mut(index)?;
        let change = HealthChange {
            agent_id: agent.id,
            old: agent.health,
            new: health,
        };
        agent.health = health;
        if let Some(observer) = self.health_observer.as_mut() {
            observer(&change);
        }
        Some(change)
    }

    fn adjust_health(&mut self, index: usize, delta: f32) {
        if delta != 0.0 {
            let current = self.agents[index].health;
            self.set_health(index, current + delta);
        }
    }

    /// Adds an existing agent, assigning it a fresh id. Returns its index.
    pub fn insert<V: Visuals + ?Sized>(&mut self, mut agent: Agent, visuals: &mut V) -> usize {
        agent.id = self.next_id;
        self.next_id += 1;
        visuals.add_visual(agent.handle.body, agent.kind);

        let index = self.agents.len();
        self.registry.insert(agent.handle.body, index);
        self.agents.push(agent);
        index
    }

    /// Seeds the population with `seeds`, then tops it up with random agents
    /// until `initial_population` is reached. Returns how many random agents
    /// were added.
    pub fn populate<W, V>(&mut self, world: &mut W, visuals: &mut V, seeds: Vec<Agent>) -> usize
    where
        W: PhysicsWorld + ?Sized,
        V: Visuals + ?Sized,
    {
        for seed in seeds {
            self.insert(seed, visuals);
        }

        let mut added = 0;
        let missing = self.params.initial_population.saturating_sub(self.agents.len());
        for _ in 0..missing {
            let half = self.params.world_half_size;
            if self.spawn_random(world, visuals, Point::new(0.0, 0.0), half).is_some() {
                added += 1;
            }
        }
        info!("populated {} agents ({} random)", self.agents.len(), added);
        added
    }

    /// Saves the `elite_count` healthiest agents to `store`.
    pub fn save_elites<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<usize, EliteError> {
        elite::save_top_k(&self.agents, self.params.elite_count, store)
    }

    /// Restores saved elites from `store` and tops the population up with
    /// random agents. Returns how many elites were restored.
    pub fn load_elites<S, W, V>(&mut self, store: &S, world: &mut W, visuals: &mut V) -> usize
    where
        S: KeyValueStore + ?Sized,
        W: PhysicsWorld + ?Sized,
        V: Visuals + ?Sized,
    {
        let seeds = elite::load_top_k(
            store,
            world,
            self.params.world_half_size,
            self.params.body_size(),
            &mut self.rng,
        );
        let restored = seeds.len();
        self.populate(world, visuals, seeds);
        restored
    }

    /// Inserts a fresh random agent at a free position within `radius` of
    /// `center`. Returns its index, or `None` if no free position was found.
    pub fn spawn_random<W, V>(
        &mut self,
        world: &mut W,
        visuals: &mut V,
        center: Point<f32>,
        radius: f32,
    ) -> Option<usize>
    where
        W: PhysicsWorld + ?Sized,
        V: Visuals + ?Sized,
    {
        let Some(pos) = self.find_free_position(&*world, center, radius) else {
            debug!("no free space for a random agent near {:?}", center);
            return None;
        };

        let handle = world.spawn_body(pos, self.params.body_size());
        let kind = InteractionKind::random(
            self.params.predator_probability,
            self.params.healer_probability,
            &mut self.rng,
        );
        let agent = Agent::new_random(
            0,
            handle,
            self.params.initial_health,
            kind,
            &self.params.inheritance,
            &mut self.rng,
        );
        Some(self.insert(agent, visuals))
    }

    fn find_free_position<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &W,
        center: Point<f32>,
        radius: f32,
    ) -> Option<Point<f32>> {
        let size = self.params.body_size();
        let padding = self.params.spawn_padding;
        (0..self.params.spawn_attempts)
            .map(|_| random_position_near(center, radius, &mut self.rng))
            .find(|pos| world.is_space_empty(*pos, size, padding))
    }

    /// Advances the population by one step.
    ///
    /// Order: contact effects, cognition, aging and decay, lifecycle
    /// evaluation, buffered structural changes, immigration. Every agent
    /// observes the world as it stood before any structural change of this
    /// tick.
    pub fn tick<W, V>(
        &mut self,
        world: &mut W,
        visuals: &mut V,
    ) -> Result<TickReport, PopulationError>
    where
        W: PhysicsWorld + ?Sized,
        V: Visuals + ?Sized,
    {
        self.tick += 1;
        let mut report = TickReport::default();

        self.apply_contact_effects(&*world);

        let observations: Vec<Observation> = self
            .agents
            .iter()
            .map(|agent| {
                agent::observe(
                    agent,
                    &*world,
                    self.params.eye_range,
                    self.params.vision_radius,
                    |body| self.kind_of(body),
                )
            })
            .collect();

        for (agent, observation) in self.agents.iter_mut().zip(&observations) {
            let agent_id = agent.id;
            let cognition_error = move |source| PopulationError::Cognition { agent_id, source };
            let action = agent
                .brain
                .react(&observation.sensory, &observation.vision)
                .map_err(cognition_error)?;
            agent::apply_actions(
                &agent.brain.action_channels,
                &action.to_vec(),
                agent.handle.body,
                self.params.impulses,
                &mut *world,
            )
            .map_err(cognition_error)?;
            agent.last_action = action;
        }

        for i in 0..self.agents.len() {
            self.agents[i].age += 1;
            let decay = self.params.decay_for(self.agents[i].kind);
            self.adjust_health(i, -decay);
        }

        let mut queue = EventQueue::new();
        for (index, agent) in self.agents.iter().enumerate() {
            if self.params.reproduction_policy == ReproductionPolicy::HealthOverflow
                && agent.health > self.params.reproduce_threshold
            {
                queue.push(LifecycleEvent::Reproduce { parent: index });
            }
            if agent.health < self.params.death_threshold {
                queue.push(LifecycleEvent::Died { index });
            }
        }

        self.apply_events(world, visuals, queue, &mut report);

        // ReplaceDead holds the population size fixed
        if self.params.reproduction_policy == ReproductionPolicy::HealthOverflow
            && self.rng.random::<f32>() < self.params.immigration_probability
        {
            let radius = self.params.immigration_radius;
            match self.spawn_random(world, visuals, Point::new(0.0, 0.0), radius) {
                Some(index) => {
                    report.immigrants += 1;
                    let id = self.agents[index].id;
                    self.event_log
                        .log(self.tick, format!("agent {} immigrated", id), EventKind::Immigration);
                }
                None => report.skipped_spawns += 1,
            }
        }

        if report.births + report.deaths + report.immigrants > 0 {
            debug!(
                "tick {}: {} births, {} deaths, {} immigrants, population {}",
                self.tick,
                report.births,
                report.deaths,
                report.immigrants,
                self.agents.len()
            );
        }
        Ok(report)
    }

    fn kind_of(&self, body: BodyHandle) -> Option<InteractionKind> {
        self.registry.get(&body).map(|&i| self.agents[i].kind)
    }

    /// Predation and healing from the contacts reported at the start of the tick.
    fn apply_contact_effects<W: PhysicsWorld + ?Sized>(&mut self, world: &W) {
        let mut deltas = vec![0.0_f32; self.agents.len()];

        for (i, agent) in self.agents.iter().enumerate() {
            if agent.kind == InteractionKind::Plant {
                continue;
            }
            for other in world.contacts(agent.handle.body) {
                let Some(&j) = self.registry.get(&other) else {
                    continue;
                };
                let victim = &self.agents[j];
                match (agent.kind, victim.kind) {
                    (InteractionKind::Predator, kind) if kind != InteractionKind::Predator => {
                        deltas[j] -= self.params.predation_damage;
                        deltas[i] += self.params.predation_gain;
                        self.event_log.log(
                            self.tick,
                            format!("agent {} fed on agent {}", agent.id, victim.id),
                            EventKind::Predation,
                        );
                    }
                    (InteractionKind::Healer, InteractionKind::Plant) => {
                        deltas[j] += self.params.heal_amount;
                        self.event_log.log(
                            self.tick,
                            format!("agent {} healed agent {}", agent.id, victim.id),
                            EventKind::Healing,
                        );
                    }
                    _ => {}
                }
            }
        }

        for (i, delta) in deltas.into_iter().enumerate() {
            self.adjust_health(i, delta);
        }
    }

    fn apply_events<W, V>(
        &mut self,
        world: &mut W,
        visuals: &mut V,
        mut queue: EventQueue,
        report: &mut TickReport,
    ) where
        W: PhysicsWorld + ?Sized,
        V: Visuals + ?Sized,
    {
        let mut parents = Vec::new();
        let mut dead = vec![false; self.agents.len()];
        for event in queue.drain() {
            match event {
                LifecycleEvent::Reproduce { parent } => parents.push(parent),
                LifecycleEvent::Died { index } => dead[index] = true,
            }
        }

        let mut newborns = Vec::new();
        for parent in parents {
            match self.spawn_child(&mut *world, parent) {
                Some(child) => newborns.push(child),
                None => {
                    debug!("no free space for a child of agent {}", self.agents[parent].id);
                    report.skipped_spawns += 1;
                }
            }
        }

        let mut replacements: Vec<Option<Agent>> = (0..self.agents.len()).map(|_| None).collect();
        for index in (0..self.agents.len()).filter(|&i| dead[i]) {
            let agent = &self.agents[index];
            world.remove_collider(agent.handle.collider);
            world.remove_body(agent.handle.body);
            visuals.remove_visual(agent.handle.body);
            self.event_log.log(
                self.tick,
                format!("agent {} died at age {}", agent.id, agent.age),
                EventKind::Death,
            );
            report.deaths += 1;

            if self.params.reproduction_policy == ReproductionPolicy::ReplaceDead {
                match self.spawn_replacement(&mut *world, &dead) {
                    Some(mut child) => {
                        child.id = self.next_id;
                        self.next_id += 1;
                        visuals.add_visual(child.handle.body, child.kind);
                        report.births += 1;
                        self.event_log.log(
                            self.tick,
                            format!("agent {} born into a free slot", child.id),
                            EventKind::Birth,
                        );
                        replacements[index] = Some(child);
                    }
                    None => report.skipped_spawns += 1,
                }
            }
        }

        if report.deaths > 0 {
            let previous = std::mem::take(&mut self.agents);
            self.agents = previous
                .into_iter()
                .zip(replacements)
                .enumerate()
                .filter_map(|(i, (agent, replacement))| {
                    if dead[i] { replacement } else { Some(agent) }
                })
                .collect();
            self.rebuild_registry();
        }

        for child in newborns {
            self.register_child(child, visuals, report);
        }
    }

    /// Places a child of `parent` next to it and debits the parent.
    fn spawn_child<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        parent: usize,
    ) -> Option<Agent> {
        let center = world.position(self.agents[parent].handle.body);
        let pos = self.find_free_position(&*world, center, self.params.spawn_offset)?;

        let handle = world.spawn_body(pos, self.params.body_size());
        let child = Agent::new_child(
            0,
            handle,
            &self.agents[parent],
            self.params.child_health,
            &self.params.inheritance,
            &mut self.rng,
        );
        self.adjust_health(parent, -self.params.reproduce_cost);
        self.agents[parent].children_spawned += 1;
        Some(child)
    }

    /// Builds a child of a random agent among the oldest survivors, placed
    /// anywhere free in the world.
    fn spawn_replacement<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        dead: &[bool],
    ) -> Option<Agent> {
        let mut survivors: Vec<usize> = (0..self.agents.len()).filter(|&i| !dead[i]).collect();
        if survivors.is_empty() {
            return None;
        }
        survivors.sort_by(|&a, &b| self.agents[b].age.cmp(&self.agents[a].age));
        let top = (survivors.len() / 10).max(1);
        let parent = survivors[self.rng.random_range(0..top)];

        let half = self.params.world_half_size;
        let pos = self.find_free_position(&*world, Point::new(0.0, 0.0), half)?;
        let handle = world.spawn_body(pos, self.params.body_size());
        let child = Agent::new_child(
            0,
            handle,
            &self.agents[parent],
            self.params.child_health,
            &self.params.inheritance,
            &mut self.rng,
        );
        self.agents[parent].children_spawned += 1;
        Some(child)
    }

    fn register_child<V: Visuals + ?Sized>(
        &mut self,
        child: Agent,
        visuals: &mut V,
        report: &mut TickReport,
    ) {
        let index = self.insert(child, visuals);
        report.births += 1;
        self.event_log.log(
            self.tick,
            format!("agent {} born", self.agents[index].id),
            EventKind::Birth,
        );
    }

    fn rebuild_registry(&mut self) {
        self.registry = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, agent)| (agent.handle.body, i))
            .collect();
    }

    /// Indices of agents sorted by health, highest first. Ties keep
    /// population order.
    pub fn ranked_by_health(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.sort_by(|&a, &b| self.agents[b].health.total_cmp(&self.agents[a].health));
        order
    }

    /// Aggregate figures over the live population.
    pub fn stats(&self) -> PopulationStats {
        let mut stats = PopulationStats {
            count: self.agents.len(),
            ..PopulationStats::default()
        };
        if self.agents.is_empty() {
            return stats;
        }

        let mut total_health = 0.0;
        stats.max_health = f32::MIN;
        for agent in &self.agents {
            match agent.kind {
                InteractionKind::Plant => stats.plants += 1,
                InteractionKind::Predator => stats.predators += 1,
                InteractionKind::Healer => stats.healers += 1,
            }
            total_health += agent.health;
            stats.max_health = stats.max_health.max(agent.health);
            stats.max_age = stats.max_age.max(agent.age);
            stats.total_children += u64::from(agent.children_spawned);
        }
        stats.mean_health = total_health / self.agents.len() as f32;
        stats
    }
}
