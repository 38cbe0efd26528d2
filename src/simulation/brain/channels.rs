//! Sensory and action channel catalogs.
//!
//! A brain declares an ordered, duplicate-free subset of each catalog. The
//! string tags are what ends up in persisted elites.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::BrainError;

/// One scalar a brain can observe about its own agent or its eye ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SensoryChannel {
    /// World x coordinate.
    PositionX,
    /// World y coordinate.
    PositionY,
    /// Linear velocity along x.
    VelocityX,
    /// Linear velocity along y.
    VelocityY,
    /// Current health.
    Health,
    /// Ticks lived.
    Age,
    /// Eye-ray hit offset along world x.
    AbsoluteEyeSightX,
    /// Eye-ray hit offset along world y.
    AbsoluteEyeSightY,
    /// Eye-ray hit offset along the agent's heading.
    RelativeEyeSightX,
    /// Eye-ray hit offset perpendicular to the agent's heading.
    RelativeEyeSightY,
    /// Interaction-kind code of whatever the eye ray hit.
    WitnessedCreatureType,
}

impl SensoryChannel {
    /// The full sensory catalog, in canonical order.
    pub const ALL: [SensoryChannel; 11] = [
        SensoryChannel::PositionX,
        SensoryChannel::PositionY,
        SensoryChannel::VelocityX,
        SensoryChannel::VelocityY,
        SensoryChannel::Health,
        SensoryChannel::Age,
        SensoryChannel::AbsoluteEyeSightX,
        SensoryChannel::AbsoluteEyeSightY,
        SensoryChannel::RelativeEyeSightX,
        SensoryChannel::RelativeEyeSightY,
        SensoryChannel::WitnessedCreatureType,
    ];

    /// Stable string tag.
    pub fn as_str(self) -> &'static str {
        match self {
            SensoryChannel::PositionX => "position.x",
            SensoryChannel::PositionY => "position.y",
            SensoryChannel::VelocityX => "velocity.x",
            SensoryChannel::VelocityY => "velocity.y",
            SensoryChannel::Health => "health",
            SensoryChannel::Age => "age",
            SensoryChannel::AbsoluteEyeSightX => "absolute_eye_sight.x",
            SensoryChannel::AbsoluteEyeSightY => "absolute_eye_sight.y",
            SensoryChannel::RelativeEyeSightX => "relative_eye_sight.x",
            SensoryChannel::RelativeEyeSightY => "relative_eye_sight.y",
            SensoryChannel::WitnessedCreatureType => "witnessed_creature_type",
        }
    }

    /// Whether reading this channel requires an eye-ray cast.
    pub fn needs_eye_ray(self) -> bool {
        matches!(
            self,
            SensoryChannel::AbsoluteEyeSightX
                | SensoryChannel::AbsoluteEyeSightY
                | SensoryChannel::RelativeEyeSightX
                | SensoryChannel::RelativeEyeSightY
                | SensoryChannel::WitnessedCreatureType
        )
    }
}

/// One physical impulse a brain can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionChannel {
    /// Impulse along world x.
    AbsoluteImpulseX,
    /// Impulse along world y.
    AbsoluteImpulseY,
    /// Impulse along the agent's heading.
    RelativeImpulseX,
    /// Impulse perpendicular to the agent's heading.
    RelativeImpulseY,
    /// Torque impulse.
    RotationalImpulse,
}

impl ActionChannel {
    /// The full action catalog, in canonical order.
    pub const ALL: [ActionChannel; 5] = [
        ActionChannel::AbsoluteImpulseX,
        ActionChannel::AbsoluteImpulseY,
        ActionChannel::RelativeImpulseX,
        ActionChannel::RelativeImpulseY,
        ActionChannel::RotationalImpulse,
    ];

    /// Stable string tag.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionChannel::AbsoluteImpulseX => "absolute_impulse.x",
            ActionChannel::AbsoluteImpulseY => "absolute_impulse.y",
            ActionChannel::RelativeImpulseX => "relative_impulse.x",
            ActionChannel::RelativeImpulseY => "relative_impulse.y",
            ActionChannel::RotationalImpulse => "rotational_impulse",
        }
    }
}

macro_rules! string_tagged {
    ($ty:ident, $err:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = BrainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|channel| channel.as_str() == s)
                    .ok_or_else(|| BrainError::$err(s.to_string()))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = BrainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(channel: $ty) -> Self {
                channel.as_str().to_string()
            }
        }
    };
}

string_tagged!(SensoryChannel, InvalidSensoryChannel);
string_tagged!(ActionChannel, InvalidActionChannel);

/// Picks a random non-empty subset of `catalog`.
///
/// The catalog is shuffled (Fisher-Yates) and the first `k` entries kept,
/// with `k = floor(U * (len - 1)) + 1`. A catalog of one yields itself.
pub fn random_subset<T: Copy, R: Rng + ?Sized>(catalog: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = catalog.to_vec();
    shuffled.shuffle(rng);
    let span = catalog.len().saturating_sub(1) as f32;
    let k = ((rng.random::<f32>() * span).floor() as usize + 1).min(catalog.len());
    shuffled.truncate(k);
    shuffled
}
