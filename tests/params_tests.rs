#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::io::Write;

use cuboids::simulation::agent::InteractionKind;
use cuboids::simulation::params::{Params, ParamsError, ParamsLoadError, ReproductionPolicy};

#[test]
fn test_defaults_are_canonical_and_valid() {
    let params = Params::default();
    params.validate().unwrap();

    assert_eq!(params.world_half_size, 150.0);
    assert_eq!(params.initial_population, 150);
    assert_eq!(params.reproduce_threshold, 1000.0);
    assert_eq!(params.reproduce_cost, 900.0);
    assert_eq!(params.death_threshold, 0.0);
    assert_eq!(params.immigration_probability, 0.05);
    assert_eq!(params.elite_count, 50);
    assert_eq!(params.inheritance.mutation_rate, 0.005);
    assert_eq!(params.reproduction_policy, ReproductionPolicy::HealthOverflow);
    assert_eq!(params.decay_for(InteractionKind::Plant), 1.0);
    assert_eq!(params.decay_for(InteractionKind::Predator), 0.1);
}

#[test]
fn test_validate_rejects_bad_values() {
    let bad_body = Params {
        body_width: 0.0,
        ..Params::default()
    };
    assert!(matches!(bad_body.validate(), Err(ParamsError::InvalidBodySize)));

    let bad_probability = Params {
        immigration_probability: 1.5,
        ..Params::default()
    };
    assert!(matches!(
        bad_probability.validate(),
        Err(ParamsError::InvalidProbability { name: "immigration_probability", .. })
    ));

    let bad_kinds = Params {
        predator_probability: 0.7,
        healer_probability: 0.5,
        ..Params::default()
    };
    assert!(matches!(bad_kinds.validate(), Err(ParamsError::InvalidProbability { .. })));

    let bad_cost = Params {
        reproduce_cost: 1200.0,
        ..Params::default()
    };
    assert!(matches!(bad_cost.validate(), Err(ParamsError::CostExceedsThreshold { .. })));

    let bad_attempts = Params {
        spawn_attempts: 0,
        ..Params::default()
    };
    assert!(matches!(bad_attempts.validate(), Err(ParamsError::NoSpawnAttempts)));

    let bad_range = Params {
        eye_range: -1.0,
        ..Params::default()
    };
    assert!(matches!(bad_range.validate(), Err(ParamsError::Negative("eye_range"))));
}

#[test]
fn test_from_file_fills_missing_fields_with_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "initial_population": 12, "seed": 3, "reproduction_policy": "ReplaceDead" }}"#
    )
    .unwrap();

    let params = Params::from_file(file.path()).unwrap();

    assert_eq!(params.initial_population, 12);
    assert_eq!(params.seed, Some(3));
    assert_eq!(params.reproduction_policy, ReproductionPolicy::ReplaceDead);
    assert_eq!(params.reproduce_threshold, 1000.0);
}

#[test]
fn test_from_file_reports_each_failure() {
    let missing = Params::from_file("/definitely/not/here.json");
    assert!(matches!(missing, Err(ParamsLoadError::Io(_))));

    let mut malformed = tempfile::NamedTempFile::new().unwrap();
    write!(malformed, "{{ not json").unwrap();
    assert!(matches!(Params::from_file(malformed.path()), Err(ParamsLoadError::Json(_))));

    let mut invalid = tempfile::NamedTempFile::new().unwrap();
    write!(invalid, r#"{{ "spawn_attempts": 0 }}"#).unwrap();
    assert!(matches!(
        Params::from_file(invalid.path()),
        Err(ParamsLoadError::Invalid(ParamsError::NoSpawnAttempts))
    ));
}

#[test]
fn test_params_json_round_trip() {
    let params = Params {
        seed: Some(11),
        healer_probability: 0.2,
        ..Params::default()
    };

    let json = serde_json::to_string_pretty(&params).unwrap();
    let restored: Params = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.seed, Some(11));
    assert_eq!(restored.healer_probability, 0.2);
    restored.validate().unwrap();
}
