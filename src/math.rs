/*
 * Math Module
 *
 * Geometry helpers shared by the grid, the steering functions and the
 * physics world. Vector algebra itself comes from glam; this module adds
 * the axis-aligned bounding box, NaN-free angle helpers and the few Vec3
 * utilities the game uses for camera paths.
 */

use glam::{Vec2, Vec3};

// Screen-space "up" (y grows downwards), used as the zero-rotation heading
pub const UP: Vec2 = Vec2::new(0.0, -1.0);

// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    // Build a box from two corners in any order, so min <= max always holds
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    // Box whose top-left corner is `position`
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, position + size)
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        let half_extents = half_extents.abs();
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    // Bounding box of a circle
    pub fn around_point(center: Vec2, radius: f32) -> Self {
        Self::from_center_half_extents(center, Vec2::splat(radius))
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    // Touching edges count as an intersection
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    // Wrap a point around the box edges (leaving one side re-enters on the other)
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        let mut wrapped = point;

        if wrapped.x > self.max.x {
            wrapped.x = self.min.x;
        } else if wrapped.x < self.min.x {
            wrapped.x = self.max.x;
        }

        if wrapped.y > self.max.y {
            wrapped.y = self.min.y;
        } else if wrapped.y < self.min.y {
            wrapped.y = self.max.y;
        }

        wrapped
    }
}

// Unsigned angle between two vectors in [0, PI], None when either is zero-length
pub fn angle_between(a: Vec2, b: Vec2) -> Option<f32> {
    signed_angle(a, b).map(f32::abs)
}

// Signed angle rotating `from` onto `to` in (-PI, PI], None when either is zero-length
pub fn signed_angle(from: Vec2, to: Vec2) -> Option<f32> {
    if from.length_squared() == 0.0 || to.length_squared() == 0.0 {
        return None;
    }
    let angle = from.perp_dot(to).atan2(from.dot(to));
    if angle.is_nan() {
        None
    } else {
        Some(angle)
    }
}

// Heading of a velocity relative to UP, 0.0 for a degenerate velocity
pub fn heading(velocity: Vec2) -> f32 {
    signed_angle(UP, velocity).unwrap_or(0.0)
}

pub fn distance_manhattan(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()
}

// Cubic Bezier via repeated lerp (de Casteljau)
pub fn bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    let d = a.lerp(b, t);
    let e = b.lerp(c, t);
    d.lerp(e, t)
}
