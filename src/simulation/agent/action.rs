//! Action decoding: raw brain outputs in, impulses on the agent's body out.

use geo::Point;
use serde::{Deserialize, Serialize};

use super::super::brain::{ActionChannel, BrainError};
use super::super::geometric_utils::from_heading_frame;
use super::super::world::{BodyHandle, PhysicsWorld};

/// Scales applied to brain outputs before they reach the physics world.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpulseStrengths {
    /// Multiplier for linear impulse channels.
    pub linear: f32,
    /// Multiplier for the rotational impulse channel.
    pub rotational: f32,
}

impl Default for ImpulseStrengths {
    fn default() -> Self {
        Self {
            linear: 0.5,
            rotational: 0.05,
        }
    }
}

/// Applies one impulse per action channel to `body`.
///
/// Absolute channels push along world axes; relative channels are rotated
/// by the body's current heading first.
pub fn apply_actions<W: PhysicsWorld + ?Sized>(
    channels: &[ActionChannel],
    outputs: &[f32],
    body: BodyHandle,
    strengths: ImpulseStrengths,
    world: &mut W,
) -> Result<(), BrainError> {
    if channels.len() != outputs.len() {
        return Err(BrainError::DimensionMismatch {
            context: "action vector",
            expected: (channels.len(), 1),
            actual: (outputs.len(), 1),
        });
    }

    let heading = world.heading(body);
    for (channel, &value) in channels.iter().zip(outputs) {
        let push = value * strengths.linear;
        match channel {
            ActionChannel::AbsoluteImpulseX => world.apply_impulse(body, Point::new(push, 0.0)),
            ActionChannel::AbsoluteImpulseY => world.apply_impulse(body, Point::new(0.0, push)),
            ActionChannel::RelativeImpulseX => {
                world.apply_impulse(body, from_heading_frame(Point::new(push, 0.0), heading));
            }
            ActionChannel::RelativeImpulseY => {
                world.apply_impulse(body, from_heading_frame(Point::new(0.0, push), heading));
            }
            ActionChannel::RotationalImpulse => {
                world.apply_torque_impulse(body, value * strengths.rotational);
            }
        }
    }
    Ok(())
}
