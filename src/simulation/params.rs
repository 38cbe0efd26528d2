use std::path::Path;

use serde::{Deserialize, Serialize};

use super::agent::{ImpulseStrengths, InteractionKind};
use super::brain::InheritanceParams;

/// How the population replaces and grows itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproductionPolicy {
    /// Agents whose health overflows the reproduce threshold clone
    /// themselves next to their body. Population size floats freely.
    HealthOverflow,
    /// Population size is fixed: every dead agent's slot is refilled in
    /// place by a child of a random agent among the oldest survivors.
    /// Immigration is disabled.
    ReplaceDead,
}

/// Simulation parameters that control population behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Half the side length of the square agents are scattered over.
    pub world_half_size: f32,
    /// Agent body width.
    pub body_width: f32,
    /// Agent body height.
    pub body_height: f32,
    /// Extra clearance required around a new body.
    pub spawn_padding: f32,
    /// Population size reached at initialization.
    pub initial_population: usize,
    /// Health of agents created at initialization or by immigration.
    pub initial_health: f32,
    /// Health of agents created by reproduction.
    pub child_health: f32,
    /// Health above which an agent reproduces.
    pub reproduce_threshold: f32,
    /// Health debited from a parent for each child.
    pub reproduce_cost: f32,
    /// Health below which an agent dies.
    pub death_threshold: f32,
    /// Per-tick chance that a fresh random agent immigrates.
    pub immigration_probability: f32,
    /// Immigrants appear within this distance of the origin along each axis.
    pub immigration_radius: f32,
    /// Children appear within this distance of their parent along each axis.
    pub spawn_offset: f32,
    /// Placement attempts before a spawn is skipped.
    pub spawn_attempts: usize,
    /// Health lost per tick by plants.
    pub plant_decay: f32,
    /// Health lost per tick by predators.
    pub predator_decay: f32,
    /// Health lost per tick by healers.
    pub healer_decay: f32,
    /// Health a predator removes from each non-predator it touches.
    pub predation_damage: f32,
    /// Health a predator gains from each non-predator it touches.
    pub predation_gain: f32,
    /// Health a healer gives each plant it touches.
    pub heal_amount: f32,
    /// Length of the eye ray.
    pub eye_range: f32,
    /// Radius of the vision query.
    pub vision_radius: f32,
    /// Action-to-impulse scaling.
    pub impulses: ImpulseStrengths,
    /// Chance that a fresh agent is a predator.
    pub predator_probability: f32,
    /// Chance that a fresh agent is a healer.
    pub healer_probability: f32,
    /// Replacement and growth policy.
    pub reproduction_policy: ReproductionPolicy,
    /// Brain construction and inheritance knobs.
    pub inheritance: InheritanceParams,
    /// Number of agents kept by elite persistence.
    pub elite_count: usize,
    /// Seed for the population's RNG; entropy when absent.
    pub seed: Option<u64>,
    /// Number of recent lifecycle events kept for display.
    pub event_log_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world_half_size: 150.0,
            body_width: 1.0,
            body_height: 1.0,
            spawn_padding: 0.1,
            initial_population: 150,
            initial_health: 100.0,
            child_health: 100.0,
            reproduce_threshold: 1000.0,
            reproduce_cost: 900.0,
            death_threshold: 0.0,
            immigration_probability: 0.05,
            immigration_radius: 50.0,
            spawn_offset: 3.0,
            spawn_attempts: 10,
            plant_decay: 1.0,
            predator_decay: 0.1,
            healer_decay: 0.1,
            predation_damage: 100.0,
            predation_gain: 50.0,
            heal_amount: 2.0,
            eye_range: 10.0,
            vision_radius: 3.5,
            impulses: ImpulseStrengths::default(),
            predator_probability: 0.3,
            healer_probability: 0.0,
            reproduction_policy: ReproductionPolicy::HealthOverflow,
            inheritance: InheritanceParams::default(),
            elite_count: 50,
            seed: None,
            event_log_size: 20,
        }
    }
}

/// Reasons a parameter set is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// Body dimensions must be positive.
    #[error("Body width and height must be positive")]
    InvalidBodySize,
    /// World must have positive extent.
    #[error("World half size must be positive")]
    InvalidWorldSize,
    /// A probability lies outside [0, 1].
    #[error("Probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
    /// Reproduction would leave the parent dead.
    #[error("Reproduce cost {cost} must leave the parent above the death threshold {death}")]
    CostExceedsThreshold {
        /// Configured cost.
        cost: f32,
        /// Configured death threshold.
        death: f32,
    },
    /// Non-negative quantities were negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),
    /// At least one placement attempt is needed.
    #[error("Spawn attempts must be at least 1")]
    NoSpawnAttempts,
}

/// Failure to load a parameter file.
#[derive(Debug, thiserror::Error)]
pub enum ParamsLoadError {
    /// The file could not be read.
    #[error("failed to read params: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for [`Params`].
    #[error("failed to parse params: {0}")]
    Json(#[from] serde_json::Error),
    /// The parsed values are inconsistent.
    #[error("invalid params: {0}")]
    Invalid(#[from] ParamsError),
}

impl Params {
    /// Checks that the parameters describe a runnable simulation.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.body_width <= 0.0 || self.body_height <= 0.0 {
            return Err(ParamsError::InvalidBodySize);
        }
        if self.world_half_size <= 0.0 {
            return Err(ParamsError::InvalidWorldSize);
        }

        let probabilities = [
            ("immigration_probability", self.immigration_probability),
            ("predator_probability", self.predator_probability),
            ("healer_probability", self.healer_probability),
            (
                "predator_probability + healer_probability",
                self.predator_probability + self.healer_probability,
            ),
            ("inheritance.mutation_rate", self.inheritance.mutation_rate),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::InvalidProbability { name, value });
            }
        }

        if self.reproduce_threshold - self.reproduce_cost < self.death_threshold {
            return Err(ParamsError::CostExceedsThreshold {
                cost: self.reproduce_cost,
                death: self.death_threshold,
            });
        }

        let non_negative = [
            ("spawn_padding", self.spawn_padding),
            ("eye_range", self.eye_range),
            ("vision_radius", self.vision_radius),
            ("inheritance.weight_noise", self.inheritance.weight_noise),
            ("inheritance.weight_init_scale", self.inheritance.weight_init_scale),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ParamsError::Negative(name));
            }
        }

        if self.spawn_attempts == 0 {
            return Err(ParamsError::NoSpawnAttempts);
        }
        Ok(())
    }

    /// Loads and validates parameters from a JSON file. Missing fields take
    /// their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParamsLoadError> {
        let json = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Body size as a (width, height) pair.
    pub fn body_size(&self) -> (f32, f32) {
        (self.body_width, self.body_height)
    }

    /// Per-tick health decay for `kind`.
    pub fn decay_for(&self, kind: InteractionKind) -> f32 {
        match kind {
            InteractionKind::Plant => self.plant_decay,
            InteractionKind::Predator => self.predator_decay,
            InteractionKind::Healer => self.healer_decay,
        }
    }
}
