//! # Cuboids - Neuro-evolving Agents
//!
//! A population of box-shaped agents, each driven by a small neural network,
//! that live, feed on each other, reproduce and die in a 2D physics world.
//! There is no gradient learning: brains change only through copy-with-noise
//! inheritance when an agent reproduces.
//!
//! ## Features
//!
//! - One-hidden-layer brains with a variable topology per agent
//! - Per-agent sensory and action channel subsets
//! - Plant, predator and healer interaction kinds
//! - Health-driven reproduction, death and random immigration
//! - Elite persistence to a key-value store across sessions
//! - A small kinematic reference world and a macroquad viewer
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Neural controller, topology and inheritance
//! - [`simulation::agent`] - Agent record, sensory encoding, action decoding
//! - [`simulation::population`] - Per-tick lifecycle of the population
//! - [`simulation::elite`] - Saving and restoring the healthiest agents
//! - [`simulation::world`] - Physics and visual collaborator interfaces

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent record, sensory encoding and action decoding.
    pub mod agent;
    /// Neural controller for agents.
    pub mod brain;
    /// Elite persistence and key-value stores.
    pub mod elite;
    /// Bounded log of recent lifecycle events.
    pub mod event_log;
    /// Buffered structural changes applied after each tick's iteration.
    pub mod events;
    /// Geometric utility functions for distances and heading frames.
    pub mod geometric_utils;
    /// Minimal matrix operations and activation filters.
    pub mod numeric;
    /// Simulation parameters.
    pub mod params;
    /// Population lifecycle management.
    pub mod population;
    /// Kinematic reference implementation of the physics collaborator.
    pub mod simple_world;
    /// k-d tree index over body positions.
    pub mod spatial;
    /// Physics and visual collaborator interfaces.
    ///
    /// The core never steps physics itself. It reads positions, rays and
    /// contacts through [`world::PhysicsWorld`] and pushes impulses back.
    pub mod world;
}
