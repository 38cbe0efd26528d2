//! Geometric utility functions for distance calculations and spatial operations.

use geo::algorithm::Distance;
use geo::{Euclidean, Line, Point};
use rand::Rng;

/// Calculates the minimum distance between a line segment and a point.
///
/// # Arguments
///
/// * `line_start` - Starting point of the line segment
/// * `line_end` - Ending point of the line segment
/// * `center` - The point to measure from
///
/// # Returns
///
/// The minimum Euclidean distance from `center` to the line segment.
pub fn segment_point_distance(
    line_start: Point<f32>,
    line_end: Point<f32>,
    center: Point<f32>,
) -> f32 {
    let line = Line::new(line_start, line_end);
    Euclidean.distance(&center, &line)
}

/// Unit vector pointing along `heading`.
pub fn heading_vector(heading: f32) -> Point<f32> {
    Point::new(heading.cos(), heading.sin())
}

/// Expresses a world-frame offset in the frame of an agent facing `heading`.
pub fn into_heading_frame(offset: Point<f32>, heading: f32) -> Point<f32> {
    let (sin, cos) = (-heading).sin_cos();
    Point::new(
        offset.x() * cos - offset.y() * sin,
        offset.x() * sin + offset.y() * cos,
    )
}

/// Expresses an agent-frame vector in world coordinates.
pub fn from_heading_frame(local: Point<f32>, heading: f32) -> Point<f32> {
    let (sin, cos) = heading.sin_cos();
    Point::new(
        local.x() * cos - local.y() * sin,
        local.x() * sin + local.y() * cos,
    )
}

/// Uniform random position in the square `[-half_size, half_size]²`.
pub fn random_position<R: Rng + ?Sized>(half_size: f32, rng: &mut R) -> Point<f32> {
    Point::new(
        (rng.random::<f32>() * 2.0 - 1.0) * half_size,
        (rng.random::<f32>() * 2.0 - 1.0) * half_size,
    )
}

/// Uniform random position within `distance` of `center` along each axis.
pub fn random_position_near<R: Rng + ?Sized>(
    center: Point<f32>,
    distance: f32,
    rng: &mut R,
) -> Point<f32> {
    center + random_position(distance, rng)
}
