//! Minimal kinematic world implementing [`PhysicsWorld`].
//!
//! Bodies are boxes that integrate velocity and spin with damping. There is
//! no collision response; overlaps are only reported through
//! [`PhysicsWorld::contacts`] and [`PhysicsWorld::is_space_empty`].

use std::collections::HashMap;

use geo::Point;
use log::warn;

use super::geometric_utils::segment_point_distance;
use super::spatial::SpatialIndex;
use super::world::{BodyHandle, ColliderHandle, NearbyBody, PhysicalHandle, PhysicsWorld, RayHit};

#[derive(Debug, Clone)]
struct Body {
    pos: Point<f32>,
    vel: Point<f32>,
    heading: f32,
    angular_velocity: f32,
    half_extents: (f32, f32),
    inv_mass: f32,
    inv_inertia: f32,
    collider: Option<ColliderHandle>,
}

impl Body {
    fn radius(&self) -> f32 {
        self.half_extents.0.max(self.half_extents.1)
    }

    fn is_fixed(&self) -> bool {
        self.inv_mass == 0.0
    }
}

/// Small in-process physics world backed by a k-d tree.
pub struct SimpleWorld {
    bodies: HashMap<BodyHandle, Body>,
    colliders: HashMap<ColliderHandle, BodyHandle>,
    index: SpatialIndex,
    next_id: u64,
    max_radius: f32,
    /// Fraction of linear velocity lost per second.
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second.
    pub angular_damping: f32,
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleWorld {
    /// Creates an empty world with mild damping.
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            colliders: HashMap::new(),
            index: SpatialIndex::default(),
            next_id: 0,
            max_radius: 0.0,
            linear_damping: 0.5,
            angular_damping: 0.5,
        }
    }

    /// Adds an immovable obstacle. Impulses applied to it are ignored.
    pub fn add_obstacle(&mut self, position: Point<f32>, size: (f32, f32)) -> PhysicalHandle {
        self.insert(position, size, true)
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Whether `body` is still present.
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    /// Whether `collider` is still present.
    pub fn contains_collider(&self, collider: ColliderHandle) -> bool {
        self.colliders.contains_key(&collider)
    }

    /// Moves a body directly, bypassing impulses.
    pub fn set_position(&mut self, body: BodyHandle, position: Point<f32>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.pos = position;
        }
        self.reindex();
    }

    /// Rotates a body directly.
    pub fn set_heading(&mut self, body: BodyHandle, heading: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.heading = heading;
        }
    }

    /// Integrates all dynamic bodies forward by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let linear_keep = (1.0 - self.linear_damping * dt).max(0.0);
        let angular_keep = (1.0 - self.angular_damping * dt).max(0.0);

        for body in self.bodies.values_mut().filter(|b| !b.is_fixed()) {
            body.pos = body.pos + body.vel * dt;
            body.heading += body.angular_velocity * dt;
            body.vel = body.vel * linear_keep;
            body.angular_velocity *= angular_keep;
        }
        self.reindex();
    }

    fn insert(&mut self, position: Point<f32>, size: (f32, f32), fixed: bool) -> PhysicalHandle {
        let body = BodyHandle(self.next_id);
        let collider = ColliderHandle(self.next_id);
        self.next_id += 1;

        let (w, h) = size;
        let mass = (w * h).max(f32::EPSILON);
        let inertia = mass * (w * w + h * h) / 12.0;
        let (inv_mass, inv_inertia) = if fixed {
            (0.0, 0.0)
        } else {
            (1.0 / mass, 1.0 / inertia.max(f32::EPSILON))
        };

        self.bodies.insert(
            body,
            Body {
                pos: position,
                vel: Point::new(0.0, 0.0),
                heading: 0.0,
                angular_velocity: 0.0,
                half_extents: (w / 2.0, h / 2.0),
                inv_mass,
                inv_inertia,
                collider: Some(collider),
            },
        );
        self.colliders.insert(collider, body);
        self.max_radius = self.max_radius.max(w.max(h) / 2.0);
        self.reindex();

        PhysicalHandle { body, collider }
    }

    fn reindex(&mut self) {
        let positions = self
            .bodies
            .iter()
            .filter(|(_, b)| b.pos.x().is_finite() && b.pos.y().is_finite())
            .map(|(handle, b)| (*handle, b.pos));

        self.index = SpatialIndex::build(positions).unwrap_or_else(|e| {
            warn!("failed to rebuild spatial index: {:?}", e);
            SpatialIndex::default()
        });
    }

    fn solid(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle).filter(|b| b.collider.is_some())
    }
}

impl PhysicsWorld for SimpleWorld {
    fn spawn_body(&mut self, position: Point<f32>, size: (f32, f32)) -> PhysicalHandle {
        self.insert(position, size, false)
    }

    fn position(&self, body: BodyHandle) -> Point<f32> {
        self.bodies
            .get(&body)
            .map_or(Point::new(0.0, 0.0), |b| b.pos)
    }

    fn velocity(&self, body: BodyHandle) -> Point<f32> {
        self.bodies
            .get(&body)
            .map_or(Point::new(0.0, 0.0), |b| b.vel)
    }

    fn heading(&self, body: BodyHandle) -> f32 {
        self.bodies.get(&body).map_or(0.0, |b| b.heading)
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Point<f32>) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.vel = b.vel + impulse * b.inv_mass;
        }
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, torque: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.angular_velocity += torque * b.inv_inertia;
        }
    }

    fn cast_ray(
        &self,
        origin: Point<f32>,
        direction: Point<f32>,
        max_distance: f32,
        exclude: BodyHandle,
    ) -> Option<RayHit> {
        let end = origin + direction * max_distance;
        let mut best: Option<(f32, RayHit)> = None;

        for (_, handle) in self.index.query(origin, max_distance + self.max_radius) {
            if handle == exclude {
                continue;
            }
            let Some(body) = self.solid(handle) else {
                continue;
            };

            let radius = body.radius();
            let miss = segment_point_distance(origin, end, body.pos);
            if miss > radius {
                continue;
            }

            // Distance along the ray to the first crossing of the body's circle.
            let to_center = body.pos - origin;
            let along = to_center.x() * direction.x() + to_center.y() * direction.y();
            let toi =
                (along - (radius * radius - miss * miss).max(0.0).sqrt()).clamp(0.0, max_distance);

            if best.as_ref().is_none_or(|(t, _)| toi < *t) {
                best = Some((
                    toi,
                    RayHit {
                        point: origin + direction * toi,
                        body: handle,
                    },
                ));
            }
        }

        best.map(|(_, hit)| hit)
    }

    fn query_nearby(&self, body: BodyHandle, radius: f32) -> Vec<NearbyBody> {
        let Some(center) = self.bodies.get(&body).map(|b| b.pos) else {
            return Vec::new();
        };

        let mut found = self.index.query(center, radius);
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found
            .into_iter()
            .filter(|(_, handle)| *handle != body)
            .filter_map(|(_, handle)| {
                self.bodies.get(&handle).map(|b| NearbyBody {
                    body: handle,
                    position: b.pos,
                })
            })
            .collect()
    }

    fn contacts(&self, body: BodyHandle) -> Vec<BodyHandle> {
        let Some(me) = self.solid(body) else {
            return Vec::new();
        };

        let reach = (me.radius() + self.max_radius) * std::f32::consts::SQRT_2;
        self.index
            .query(me.pos, reach)
            .into_iter()
            .filter(|(_, handle)| *handle != body)
            .filter(|(_, handle)| {
                self.solid(*handle).is_some_and(|other| {
                    let d = other.pos - me.pos;
                    d.x().abs() <= me.half_extents.0 + other.half_extents.0
                        && d.y().abs() <= me.half_extents.1 + other.half_extents.1
                })
            })
            .map(|(_, handle)| handle)
            .collect()
    }

    fn is_space_empty(&self, position: Point<f32>, size: (f32, f32), padding: f32) -> bool {
        let half = (size.0 / 2.0, size.1 / 2.0);
        let reach = (half.0.max(half.1) + self.max_radius + padding) * std::f32::consts::SQRT_2;

        !self.index.query(position, reach).into_iter().any(|(_, handle)| {
            self.solid(handle).is_some_and(|other| {
                let d = other.pos - position;
                d.x().abs() < half.0 + other.half_extents.0 + padding
                    && d.y().abs() < half.1 + other.half_extents.1 + padding
            })
        })
    }

    fn remove_body(&mut self, body: BodyHandle) {
        if self.bodies.remove(&body).is_some() {
            self.reindex();
        }
    }

    fn remove_collider(&mut self, collider: ColliderHandle) {
        if let Some(owner) = self.colliders.remove(&collider) {
            if let Some(b) = self.bodies.get_mut(&owner) {
                b.collider = None;
            }
        }
    }
}
