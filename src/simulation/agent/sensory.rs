//! Sensory encoding: world state in, brain input vectors out.

use geo::Point;

use super::super::brain::{SensoryChannel, VISION_WIDTH};
use super::super::geometric_utils::{heading_vector, into_heading_frame};
use super::super::world::{BodyHandle, NearbyBody, PhysicsWorld};
use super::{Agent, InteractionKind};

/// Both input vectors for one agent's forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// One value per declared sensory channel, in declared order.
    pub sensory: Vec<f32>,
    /// Fixed-width summary of the nearest detected body.
    pub vision: [f32; VISION_WIDTH],
}

/// Encodes one value per sensory channel of `agent`'s brain.
///
/// Eye-sight channels read a ray cast of length `eye_range` along the
/// agent's heading; with no hit they read `0.0`. `kind_of` resolves a body
/// handle to the interaction kind of the agent that owns it, if any.
pub fn encode_sensory<W, K>(agent: &Agent, world: &W, eye_range: f32, kind_of: K) -> Vec<f32>
where
    W: PhysicsWorld + ?Sized,
    K: Fn(BodyHandle) -> Option<InteractionKind>,
{
    let body = agent.handle.body;
    let pos = world.position(body);
    let heading = world.heading(body);

    let hit = if agent.brain.uses_eye_ray() {
        world.cast_ray(pos, heading_vector(heading), eye_range, body)
    } else {
        None
    };
    let sight = hit.map(|h| h.point - pos);
    let relative_sight = sight.map(|offset| into_heading_frame(offset, heading));

    agent
        .brain
        .sensory_channels
        .iter()
        .map(|channel| match channel {
            SensoryChannel::PositionX => pos.x(),
            SensoryChannel::PositionY => pos.y(),
            SensoryChannel::VelocityX => world.velocity(body).x(),
            SensoryChannel::VelocityY => world.velocity(body).y(),
            SensoryChannel::Health => agent.health,
            SensoryChannel::Age => agent.age as f32,
            SensoryChannel::AbsoluteEyeSightX => sight.map_or(0.0, |s| s.x()),
            SensoryChannel::AbsoluteEyeSightY => sight.map_or(0.0, |s| s.y()),
            SensoryChannel::RelativeEyeSightX => relative_sight.map_or(0.0, |s| s.x()),
            SensoryChannel::RelativeEyeSightY => relative_sight.map_or(0.0, |s| s.y()),
            SensoryChannel::WitnessedCreatureType => hit
                .and_then(|h| kind_of(h.body))
                .map_or(0.0, InteractionKind::code),
        })
        .collect()
}

/// Builds the vision summary from bodies found around `own_position`.
///
/// Each agent body contributes its offset and kind code; any other body
/// contributes three zeros. Only the first [`VISION_WIDTH`] scalars are kept,
/// and missing ones are zero.
pub fn encode_vision<K>(
    own_position: Point<f32>,
    nearby: &[NearbyBody],
    kind_of: K,
) -> [f32; VISION_WIDTH]
where
    K: Fn(BodyHandle) -> Option<InteractionKind>,
{
    let scalars = nearby.iter().flat_map(|other| match kind_of(other.body) {
        Some(kind) => {
            let offset = other.position - own_position;
            [offset.x(), offset.y(), kind.code()]
        }
        None => [0.0; 3],
    });

    let mut vision = [0.0; VISION_WIDTH];
    for (slot, value) in vision.iter_mut().zip(scalars) {
        *slot = value;
    }
    vision
}

/// Gathers the full [`Observation`] for `agent`.
pub fn observe<W, K>(
    agent: &Agent,
    world: &W,
    eye_range: f32,
    vision_radius: f32,
    kind_of: K,
) -> Observation
where
    W: PhysicsWorld + ?Sized,
    K: Fn(BodyHandle) -> Option<InteractionKind>,
{
    let sensory = encode_sensory(agent, world, eye_range, &kind_of);
    let nearby = world.query_nearby(agent.handle.body, vision_radius);
    let vision = encode_vision(world.position(agent.handle.body), &nearby, &kind_of);
    Observation { sensory, vision }
}
