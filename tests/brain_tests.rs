#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

mod common;

use common::{health_brain, seeded_rng};
use cuboids::simulation::brain::inheritance::{copy_with_noise, inherit_sensory_channels};
use cuboids::simulation::brain::{
    ActionChannel, Brain, BrainError, InheritanceParams, SensoryChannel, VISION_WIDTH,
};
use cuboids::simulation::numeric::{self, FilterType};
use ndarray::array;
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

/// Replays a fixed sequence of words, then repeats `fallback`.
struct ScriptedRng {
    words: Vec<u32>,
    fallback: u32,
}

impl ScriptedRng {
    fn new(words: &[u32], fallback: u32) -> Self {
        let mut words = words.to_vec();
        words.reverse();
        Self { words, fallback }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.words.pop().unwrap_or(self.fallback)
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

// draws below 0.5 trigger a facet, draws near 1.0 skip it
const HIT: u32 = 0;
const MISS: u32 = u32::MAX;

fn frozen_params() -> InheritanceParams {
    InheritanceParams {
        mutation_rate: 0.0,
        reroll_hidden_size: false,
        ..InheritanceParams::default()
    }
}

#[test]
fn test_health_brain_reacts_within_tanh_range() {
    let mut rng = seeded_rng();
    let brain = health_brain(&mut rng);

    let output = brain.react(&[50.0], &[0.0, 0.0, 0.0]).unwrap();

    assert_eq!(output.len(), 1);
    assert!((-1.0..=1.0).contains(&output[0]));
    // 3x4 + 3 input side, 1x3 + 1 output side
    assert_eq!(brain.parameter_count(), 19);
}

#[test]
fn test_react_rejects_wrong_sensory_length() {
    let mut rng = seeded_rng();
    let brain = health_brain(&mut rng);

    let result = brain.react(&[1.0, 2.0], &[0.0; VISION_WIDTH]);

    assert!(matches!(
        result,
        Err(BrainError::DimensionMismatch { context: "sensory vector", .. })
    ));
}

#[test]
fn test_react_with_known_weights() {
    // one sensory input plus three vision inputs, hidden width 2, one output
    let brain = Brain {
        hidden_size: 2,
        sensory_channels: vec![SensoryChannel::Health],
        action_channels: vec![ActionChannel::AbsoluteImpulseX],
        filter1: FilterType::Relu,
        filter2: FilterType::Relu,
        input_weights: array![[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
        input_bias: array![[0.0], [-1.0]],
        output_weights: array![[2.0, 3.0]],
        output_bias: array![[0.5]],
    };
    brain.validate().unwrap();

    let output = brain.react(&[2.0], &[4.0, 9.0, 9.0]).unwrap();

    // hidden = relu([2, 3]) = [2, 3]; out = 2*2 + 3*3 + 0.5
    assert_eq!(output[0], 13.5);
}

#[test]
fn test_corrupt_weights_fail_validation_and_react() {
    let mut rng = seeded_rng();
    let mut brain = health_brain(&mut rng);
    brain.output_weights = numeric::zeros(1, 5);

    assert!(matches!(
        brain.validate(),
        Err(BrainError::DimensionMismatch { context: "output_weights", .. })
    ));
    assert!(matches!(
        brain.react(&[1.0], &[0.0; VISION_WIDTH]),
        Err(BrainError::Numeric(_))
    ));
}

#[test]
fn test_zero_mutation_preserves_topology() {
    let mut rng = seeded_rng();
    let parent = Brain::new_random(&InheritanceParams::default(), &mut rng);

    for _ in 0..20 {
        let child = Brain::inherit(&parent, &frozen_params(), &mut rng);

        assert_eq!(child.sensory_channels, parent.sensory_channels);
        assert_eq!(child.action_channels, parent.action_channels);
        assert_eq!(child.filter1, parent.filter1);
        assert_eq!(child.filter2, parent.filter2);
        assert_eq!(child.hidden_size, parent.hidden_size);
        assert_eq!(child.input_weights.dim(), parent.input_weights.dim());
        assert_eq!(child.output_weights.dim(), parent.output_weights.dim());
        assert_eq!(child.parameter_count(), parent.parameter_count());
        child.validate().unwrap();
    }
}

#[test]
fn test_inheritance_without_noise_copies_weights() {
    let mut rng = seeded_rng();
    let parent = Brain::new_random(&InheritanceParams::default(), &mut rng);
    let params = InheritanceParams {
        weight_noise: 0.0,
        ..frozen_params()
    };

    let child = Brain::inherit(&parent, &params, &mut rng);

    assert_eq!(child, parent);
}

#[test]
fn test_rerolled_hidden_size_keeps_brain_consistent() {
    let mut rng = seeded_rng();
    let mut brain = Brain::new_random(&InheritanceParams::default(), &mut rng);

    for _ in 0..50 {
        brain = Brain::inherit(&brain, &InheritanceParams::default(), &mut rng);
        brain.validate().unwrap();
        assert!(brain.hidden_size >= 1);
    }
}

#[test]
fn test_copy_with_noise_resize_policy() {
    let mut rng = seeded_rng();
    let parent = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

    let grown = copy_with_noise(&parent, 3, 4, 0.0, 0.5, &mut rng);
    assert_eq!(grown.dim(), (3, 4));
    for r in 0..2 {
        for c in 0..3 {
            assert_eq!(grown[[r, c]], parent[[r, c]]);
        }
    }
    assert!(grown.row(2).iter().all(|v| (-0.5..0.5).contains(v)));
    assert!(grown.column(3).iter().all(|v| (-0.5..0.5).contains(v)));

    let shrunk = copy_with_noise(&parent, 1, 2, 0.0, 0.5, &mut rng);
    assert_eq!(shrunk, array![[1.0, 2.0]]);
}

#[test]
fn test_copy_with_noise_perturbs_overlap() {
    let mut rng = seeded_rng();
    let parent = numeric::zeros(10, 10);

    let child = copy_with_noise(&parent, 10, 10, 0.05, 0.5, &mut rng);

    assert!(child.iter().any(|v| *v != 0.0));
    assert!(child.iter().all(|v| v.abs() < 0.5));
}

#[test]
fn test_full_mutation_rate_still_yields_valid_channels() {
    let mut rng = seeded_rng();
    let parent = vec![SensoryChannel::Health];

    for _ in 0..100 {
        let channels = inherit_sensory_channels(&parent, 1.0, &mut rng);
        assert!(!channels.is_empty());
        assert!(channels.len() <= SensoryChannel::ALL.len());
        for (i, c) in channels.iter().enumerate() {
            assert!(!channels[i + 1..].contains(c), "Duplicate channel {c}");
        }
    }
}

#[test]
fn test_mutation_removes_one_parent_channel() {
    let parent = vec![SensoryChannel::Health, SensoryChannel::Age, SensoryChannel::PositionX];
    let mut rng = ScriptedRng::new(&[MISS, HIT], HIT);

    let channels = inherit_sensory_channels(&parent, 0.5, &mut rng);

    assert_eq!(channels.len(), parent.len() - 1);
    assert!(channels.iter().all(|c| parent.contains(c)));
    assert_ne!(channels[0], channels[1]);
}

#[test]
fn test_mutation_never_removes_last_channel() {
    let parent = vec![SensoryChannel::Health];
    let mut rng = ScriptedRng::new(&[MISS, HIT], MISS);

    let channels = inherit_sensory_channels(&parent, 0.5, &mut rng);

    assert_eq!(channels, parent);
}

#[test]
fn test_mutation_adds_one_missing_channel() {
    let parent = vec![SensoryChannel::Health, SensoryChannel::Age];
    let mut rng = ScriptedRng::new(&[MISS, MISS, HIT], HIT);

    let channels = inherit_sensory_channels(&parent, 0.5, &mut rng);

    assert_eq!(channels.len(), 3);
    assert_eq!(&channels[..2], parent.as_slice());
    assert!(!parent.contains(&channels[2]));
}

#[test]
fn test_channel_tags_round_trip() {
    for channel in SensoryChannel::ALL {
        assert_eq!(channel.to_string().parse::<SensoryChannel>().unwrap(), channel);
    }
    for channel in ActionChannel::ALL {
        assert_eq!(channel.to_string().parse::<ActionChannel>().unwrap(), channel);
    }
    assert_eq!(
        "sixth_sense".parse::<SensoryChannel>(),
        Err(BrainError::InvalidSensoryChannel("sixth_sense".to_string()))
    );
    assert_eq!(
        "teleport".parse::<ActionChannel>(),
        Err(BrainError::InvalidActionChannel("teleport".to_string()))
    );
}

#[test]
fn test_deserialize_rejects_unknown_tags_and_bad_shapes() {
    let mut rng = seeded_rng();
    let brain = health_brain(&mut rng);
    let json = serde_json::to_string(&brain).unwrap();

    let bad_tag = json.replace("\"health\"", "\"sixth_sense\"");
    assert!(serde_json::from_str::<Brain>(&bad_tag).is_err());

    let bad_filter = json.replacen("\"tanh\"", "\"softmax\"", 1);
    assert!(serde_json::from_str::<Brain>(&bad_filter).is_err());

    let mut wrong = brain.clone();
    wrong.hidden_size = 4;
    let bad_shape = serde_json::to_string(&wrong).unwrap();
    assert!(serde_json::from_str::<Brain>(&bad_shape).is_err());

    let restored: Brain = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, brain);
}

proptest! {
    #[test]
    fn prop_fresh_brain_bounds(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let brain = Brain::new_random(&InheritanceParams::default(), &mut rng);

        prop_assert!(brain.hidden_size >= 1);
        prop_assert!((1..=SensoryChannel::ALL.len()).contains(&brain.sensory_channels.len()));
        prop_assert!((1..=ActionChannel::ALL.len()).contains(&brain.action_channels.len()));
        prop_assert!(brain.validate().is_ok());
    }

    #[test]
    fn prop_output_length_matches_action_channels(
        seed in any::<u64>(),
        inputs in prop::collection::vec(-1000.0f32..1000.0, SensoryChannel::ALL.len()),
        vision in prop::array::uniform3(-100.0f32..100.0),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let brain = Brain::new_random(&InheritanceParams::default(), &mut rng);
        let sensory = &inputs[..brain.sensory_channels.len()];

        let output = brain.react(sensory, &vision).unwrap();

        prop_assert_eq!(output.len(), brain.action_channels.len());
        prop_assert!(output.iter().all(|v| v.is_finite()));
    }
}
