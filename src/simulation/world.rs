//! Boundary to the physics and rendering collaborators.
//!
//! The population core never owns rigid bodies; it holds opaque handles and
//! talks to whatever implements these traits. [`super::simple_world`]
//! provides a small in-crate implementation.

use geo::Point;
use serde::{Deserialize, Serialize};

use super::agent::InteractionKind;

/// Opaque rigid-body handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Opaque collider handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderHandle(pub u64);

/// The pair of handles an agent owns in the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalHandle {
    /// Rigid body carrying position, velocity and heading.
    pub body: BodyHandle,
    /// Collider attached to the body.
    pub collider: ColliderHandle,
}

/// Result of an eye-ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Point<f32>,
    /// Body that was hit.
    pub body: BodyHandle,
}

/// A body found by a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyBody {
    /// Handle of the body.
    pub body: BodyHandle,
    /// Its world position.
    pub position: Point<f32>,
}

/// Physics collaborator consumed by the population core.
///
/// Queries are synchronous and always return, possibly with empty results.
/// Unknown handles read as a body at rest at the origin.
pub trait PhysicsWorld {
    /// Creates a dynamic body with an attached box collider of `size` (width, height).
    fn spawn_body(&mut self, position: Point<f32>, size: (f32, f32)) -> PhysicalHandle;

    /// World position of `body`.
    fn position(&self, body: BodyHandle) -> Point<f32>;

    /// Linear velocity of `body`.
    fn velocity(&self, body: BodyHandle) -> Point<f32>;

    /// Heading of `body` in radians.
    fn heading(&self, body: BodyHandle) -> f32;

    /// Applies a linear impulse to `body`.
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Point<f32>);

    /// Applies a torque impulse to `body`.
    fn apply_torque_impulse(&mut self, body: BodyHandle, torque: f32);

    /// Casts a ray from `origin` along `direction` (unit vector), ignoring `exclude`.
    fn cast_ray(
        &self,
        origin: Point<f32>,
        direction: Point<f32>,
        max_distance: f32,
        exclude: BodyHandle,
    ) -> Option<RayHit>;

    /// Bodies within `radius` of `body`, nearest first, excluding `body` itself.
    fn query_nearby(&self, body: BodyHandle, radius: f32) -> Vec<NearbyBody>;

    /// Bodies whose colliders currently touch `body`'s collider.
    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle>;

    /// Whether a box of `size` at `position` would overlap nothing, with `padding` slack.
    fn is_space_empty(&self, position: Point<f32>, size: (f32, f32), padding: f32) -> bool;

    /// Releases a rigid body.
    fn remove_body(&mut self, body: BodyHandle);

    /// Releases a collider.
    fn remove_collider(&mut self, collider: ColliderHandle);
}

/// Rendering collaborator. Purely presentational.
pub trait Visuals {
    /// Registers a visual for a newly created agent body.
    fn add_visual(&mut self, body: BodyHandle, kind: InteractionKind);

    /// Drops the visual of a released agent body.
    fn remove_visual(&mut self, body: BodyHandle);
}

/// Headless [`Visuals`] that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVisuals;

impl Visuals for NoVisuals {
    fn add_visual(&mut self, _body: BodyHandle, _kind: InteractionKind) {}

    fn remove_visual(&mut self, _body: BodyHandle) {}
}
