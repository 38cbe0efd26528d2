//! Neural controller for agents.
//!
//! A brain is a single-hidden-layer network whose topology (which sensory
//! channels it reads, which actions it drives, hidden width and filters) is
//! itself inherited and mutated across generations.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::numeric::{self, FilterType, NumericError};

pub mod channels;
pub mod inheritance;

pub use channels::{ActionChannel, SensoryChannel};
pub use inheritance::InheritanceParams;

/// Length of the vision summary appended to every brain's sensory input.
pub const VISION_WIDTH: usize = 3;

/// Errors raised while building, validating or running a brain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrainError {
    /// A numeric operation failed.
    #[error(transparent)]
    Numeric(#[from] NumericError),
    /// A brain's matrices or the caller's vectors disagree with its declared channels.
    #[error("dimension mismatch for {context}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Which matrix or vector is wrong.
        context: &'static str,
        /// Shape implied by the brain's topology.
        expected: (usize, usize),
        /// Shape actually found.
        actual: (usize, usize),
    },
    /// A sensory tag outside the catalog.
    #[error("invalid sensory channel: {0}")]
    InvalidSensoryChannel(String),
    /// An action tag outside the catalog.
    #[error("invalid action channel: {0}")]
    InvalidActionChannel(String),
    /// Empty or duplicated channel lists, or a zero hidden size.
    #[error("inconsistent brain topology: {0}")]
    Inconsistent(String),
}

/// An agent's neural controller: topology plus weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BrainRecord")]
pub struct Brain {
    /// Width of the hidden layer.
    pub hidden_size: usize,
    /// Ordered sensory channels this brain reads.
    pub sensory_channels: Vec<SensoryChannel>,
    /// Ordered action channels this brain drives.
    pub action_channels: Vec<ActionChannel>,
    /// Filter applied after the input layer.
    pub filter1: FilterType,
    /// Filter applied after the output layer.
    pub filter2: FilterType,
    /// `hidden_size × input_width`.
    pub input_weights: Array2<f32>,
    /// `hidden_size × 1`.
    pub input_bias: Array2<f32>,
    /// `output_width × hidden_size`.
    pub output_weights: Array2<f32>,
    /// `output_width × 1`.
    pub output_bias: Array2<f32>,
}

/// Unvalidated wire form of a [`Brain`].
#[derive(Deserialize)]
struct BrainRecord {
    hidden_size: usize,
    sensory_channels: Vec<SensoryChannel>,
    action_channels: Vec<ActionChannel>,
    filter1: FilterType,
    filter2: FilterType,
    input_weights: Array2<f32>,
    input_bias: Array2<f32>,
    output_weights: Array2<f32>,
    output_bias: Array2<f32>,
}

impl TryFrom<BrainRecord> for Brain {
    type Error = BrainError;

    fn try_from(record: BrainRecord) -> Result<Self, Self::Error> {
        let brain = Brain {
            hidden_size: record.hidden_size,
            sensory_channels: record.sensory_channels,
            action_channels: record.action_channels,
            filter1: record.filter1,
            filter2: record.filter2,
            input_weights: record.input_weights,
            input_bias: record.input_bias,
            output_weights: record.output_weights,
            output_bias: record.output_bias,
        };
        brain.validate()?;
        Ok(brain)
    }
}

impl Brain {
    /// Creates a brain with random topology and random weights.
    pub fn new_random<R: Rng + ?Sized>(params: &InheritanceParams, rng: &mut R) -> Self {
        let sensory_channels = channels::random_subset(&SensoryChannel::ALL, rng);
        let action_channels = channels::random_subset(&ActionChannel::ALL, rng);
        let filter1 = FilterType::random(rng);
        let filter2 = FilterType::random(rng);
        let hidden_size = inheritance::random_hidden_size(rng);

        Self::with_random_weights(
            hidden_size,
            sensory_channels,
            action_channels,
            filter1,
            filter2,
            params.weight_init_scale,
            rng,
        )
    }

    /// Creates a brain with the given topology and freshly randomized weights.
    pub fn with_random_weights<R: Rng + ?Sized>(
        hidden_size: usize,
        sensory_channels: Vec<SensoryChannel>,
        action_channels: Vec<ActionChannel>,
        filter1: FilterType,
        filter2: FilterType,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        let input_width = sensory_channels.len() + VISION_WIDTH;
        let output_width = action_channels.len();

        Self {
            hidden_size,
            input_weights: numeric::random_uniform(hidden_size, input_width, 0.0, scale, rng),
            input_bias: numeric::random_uniform(hidden_size, 1, 0.0, scale, rng),
            output_weights: numeric::random_uniform(output_width, hidden_size, 0.0, scale, rng),
            output_bias: numeric::random_uniform(output_width, 1, 0.0, scale, rng),
            sensory_channels,
            action_channels,
            filter1,
            filter2,
        }
    }

    /// Number of inputs the first layer consumes.
    pub fn input_width(&self) -> usize {
        self.sensory_channels.len() + VISION_WIDTH
    }

    /// Number of outputs the second layer produces.
    pub fn output_width(&self) -> usize {
        self.action_channels.len()
    }

    /// Whether any declared sensory channel needs an eye-ray cast.
    pub fn uses_eye_ray(&self) -> bool {
        self.sensory_channels.iter().any(|c| c.needs_eye_ray())
    }

    /// Checks that channel lists are non-empty and duplicate-free and that
    /// every matrix agrees with them.
    pub fn validate(&self) -> Result<(), BrainError> {
        if self.hidden_size == 0 {
            return Err(BrainError::Inconsistent("hidden size is zero".into()));
        }
        if self.sensory_channels.is_empty() || self.action_channels.is_empty() {
            return Err(BrainError::Inconsistent("empty channel list".into()));
        }
        if has_duplicates(&self.sensory_channels) || has_duplicates(&self.action_channels) {
            return Err(BrainError::Inconsistent("duplicate channel".into()));
        }

        let h = self.hidden_size;
        let checks = [
            ("input_weights", (h, self.input_width()), self.input_weights.dim()),
            ("input_bias", (h, 1), self.input_bias.dim()),
            ("output_weights", (self.output_width(), h), self.output_weights.dim()),
            ("output_bias", (self.output_width(), 1), self.output_bias.dim()),
        ];
        for (context, expected, actual) in checks {
            if expected != actual {
                return Err(BrainError::DimensionMismatch {
                    context,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Runs one forward pass and returns the raw action vector.
    ///
    /// `sensory` must hold one value per declared sensory channel, in order.
    /// The result has one value per declared action channel.
    pub fn react(
        &self,
        sensory: &[f32],
        vision: &[f32; VISION_WIDTH],
    ) -> Result<Array1<f32>, BrainError> {
        if sensory.len() != self.sensory_channels.len() {
            return Err(BrainError::DimensionMismatch {
                context: "sensory vector",
                expected: (self.sensory_channels.len(), 1),
                actual: (sensory.len(), 1),
            });
        }

        let input = Array2::from_shape_fn((self.input_width(), 1), |(i, _)| {
            if i < sensory.len() {
                sensory[i]
            } else {
                vision[i - sensory.len()]
            }
        });

        let a1 = numeric::add_broadcast_column(
            &numeric::multiply(&self.input_weights, &input)?,
            &self.input_bias,
        )?;
        let hidden = numeric::apply_filter(&a1, self.filter1);
        let a2 = numeric::add_broadcast_column(
            &numeric::multiply(&self.output_weights, &hidden)?,
            &self.output_bias,
        )?;
        let output = numeric::apply_filter(&a2, self.filter2);

        Ok(output.column(0).to_owned())
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.input_weights.len()
            + self.input_bias.len()
            + self.output_weights.len()
            + self.output_bias.len()
    }
}

fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, a)| items[i + 1..].contains(a))
}
