//! Brain inheritance: topology mutation and copy-with-noise weight transfer.

use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use super::channels::{self, SensoryChannel};
use super::Brain;

/// Knobs for fresh-brain construction and inheritance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceParams {
    /// Per-facet probability that a topology facet changes.
    pub mutation_rate: f32,
    /// Standard deviation of the noise added to copied weights.
    pub weight_noise: f32,
    /// Half-width of the uniform range for freshly drawn weights.
    pub weight_init_scale: f32,
    /// Re-roll the hidden size every generation instead of keeping the parent's.
    pub reroll_hidden_size: bool,
}

impl Default for InheritanceParams {
    fn default() -> Self {
        Self {
            mutation_rate: 0.005,
            weight_noise: 0.05,
            weight_init_scale: 0.5,
            reroll_hidden_size: true,
        }
    }
}

/// Draws a hidden-layer width: `max(1, round(U*20 + U*3 - 1.5))`.
pub fn random_hidden_size<R: Rng + ?Sized>(rng: &mut R) -> usize {
    let raw = rng.random::<f32>() * 20.0 + rng.random::<f32>() * 3.0 - 1.5;
    raw.round().max(1.0) as usize
}

/// Builds a `rows × cols` matrix from `parent`.
///
/// Coordinates inside both shapes are copied with added Gaussian noise of
/// standard deviation `noise`; coordinates the parent lacks are drawn fresh
/// from `[-init_scale, init_scale)`. Parent entries outside the new shape are
/// dropped.
pub fn copy_with_noise<R: Rng + ?Sized>(
    parent: &Array2<f32>,
    rows: usize,
    cols: usize,
    noise: f32,
    init_scale: f32,
    rng: &mut R,
) -> Array2<f32> {
    let (parent_rows, parent_cols) = parent.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        if r < parent_rows && c < parent_cols {
            let perturbation: f32 = rng.sample(StandardNormal);
            parent[[r, c]] + perturbation * noise
        } else {
            (rng.random::<f32>() * 2.0 - 1.0) * init_scale
        }
    })
}

/// Inherits the parent's sensory channels, possibly mutated.
///
/// With probability `rate` the set is resampled outright. Otherwise it is
/// copied, then with probability `rate` one channel is removed (never the
/// last one), or else with probability `rate` one missing channel is added.
pub fn inherit_sensory_channels<R: Rng + ?Sized>(
    parent: &[SensoryChannel],
    rate: f32,
    rng: &mut R,
) -> Vec<SensoryChannel> {
    if rng.random::<f32>() < rate {
        return channels::random_subset(&SensoryChannel::ALL, rng);
    }

    let mut inherited = parent.to_vec();
    if rng.random::<f32>() < rate && inherited.len() > 1 {
        let idx = rng.random_range(0..inherited.len());
        inherited.remove(idx);
    } else if rng.random::<f32>() < rate && inherited.len() < SensoryChannel::ALL.len() {
        let missing: Vec<SensoryChannel> = SensoryChannel::ALL
            .into_iter()
            .filter(|c| !inherited.contains(c))
            .collect();
        inherited.push(missing[rng.random_range(0..missing.len())]);
    }
    inherited
}

impl Brain {
    /// Creates a child brain from `parent`.
    ///
    /// Action channels and both filters are copied verbatim; sensory
    /// channels may mutate; weights are resized to the child's topology via
    /// [`copy_with_noise`].
    pub fn inherit<R: Rng + ?Sized>(
        parent: &Brain,
        params: &InheritanceParams,
        rng: &mut R,
    ) -> Self {
        let hidden_size = if params.reroll_hidden_size {
            random_hidden_size(rng)
        } else {
            parent.hidden_size
        };
        let sensory_channels =
            inherit_sensory_channels(&parent.sensory_channels, params.mutation_rate, rng);
        let action_channels = parent.action_channels.clone();

        let input_width = sensory_channels.len() + super::VISION_WIDTH;
        let output_width = action_channels.len();
        let noise = params.weight_noise;
        let scale = params.weight_init_scale;

        Self {
            input_weights: copy_with_noise(
                &parent.input_weights,
                hidden_size,
                input_width,
                noise,
                scale,
                rng,
            ),
            input_bias: copy_with_noise(&parent.input_bias, hidden_size, 1, noise, scale, rng),
            output_weights: copy_with_noise(
                &parent.output_weights,
                output_width,
                hidden_size,
                noise,
                scale,
                rng,
            ),
            output_bias: copy_with_noise(&parent.output_bias, output_width, 1, noise, scale, rng),
            hidden_size,
            sensory_channels,
            action_channels,
            filter1: parent.filter1,
            filter2: parent.filter2,
        }
    }
}
