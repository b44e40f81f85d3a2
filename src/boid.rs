/*
 * Boid Module
 *
 * This module defines the Boid struct and the steering rules that drive it.
 * Each rule looks at a candidate list of other boids (the whole flock, or the
 * spatial grid's broad-phase result resolved to boid records) and returns a
 * steering vector:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 * 4. Seek: Steer towards a goal
 * 5. Deflect: Steer away from repulsion points
 *
 * A boid only perceives what lies inside its field of view, a cone centred on
 * its current velocity.
 */

use std::f32::consts::TAU;

use glam::Vec2;

use crate::math::{angle_between, heading};

pub const BOID_COLOR: [u8; 3] = [220, 220, 220];

#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub id: u32,
    pub position: Vec2,
    pub previous_position: Vec2,
    pub velocity: Vec2,
    // Full perception cone angle in radians
    pub fov: f32,
    pub rotation: f32,
    pub color: [u8; 3],
}

// A transient repulsion point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deflector {
    pub position: Vec2,
    pub radius: f32,
    pub strength: f32,
}

impl Boid {
    pub fn new(id: u32, position: Vec2, velocity: Vec2, fov: f32) -> Self {
        Self {
            id,
            position,
            previous_position: position,
            velocity,
            fov,
            rotation: heading(velocity),
            color: BOID_COLOR,
        }
    }

    // Remember where we were before this tick, for render interpolation
    pub fn store_previous_state(&mut self) {
        self.previous_position = self.position;
    }

    // Fold a steering force into the velocity, clamp the speed and advance
    pub fn integrate(&mut self, force: Vec2, max_velocity: f32) {
        self.velocity += force;

        if !self.velocity.is_finite() {
            self.velocity = Vec2::ZERO;
        }

        let max_velocity = max_velocity.max(0.0);
        if self.velocity.length_squared() > max_velocity * max_velocity {
            self.velocity = self.velocity.normalize_or_zero() * max_velocity;
        }

        self.position += self.velocity;
        self.rotation = heading(self.velocity);
    }
}

// Whether `target` lies inside the boid's view cone.
// A boid at rest has no heading and sees in every direction; so does any boid
// whose cone is a full turn, and a target sitting exactly on the boid.
pub fn is_in_fov(boid: &Boid, target: Vec2) -> bool {
    if boid.fov >= TAU {
        return true;
    }

    match angle_between(boid.velocity, target - boid.position) {
        Some(angle) => angle < boid.fov / 2.0,
        None => true,
    }
}

// Average of the unit vectors pointing away from each visible neighbor,
// each divided by the distance to that neighbor
pub fn separation<'a>(me: &Boid, others: impl IntoIterator<Item = &'a Boid>, distance: f32) -> Vec2 {
    let mut steer = Vec2::ZERO;
    let mut count = 0;

    for other in others {
        if other.id == me.id {
            continue;
        }

        let dist = me.position.distance(other.position);
        // Coincident neighbors give no direction to flee in
        if dist > 0.0 && dist < distance && is_in_fov(me, other.position) {
            let away = (me.position - other.position).normalize_or_zero();
            steer += away / dist;
            count += 1;
        }
    }

    if count > 0 {
        steer /= count as f32;
    }

    steer
}

// Normalized average heading of the visible neighbors
pub fn alignment<'a>(me: &Boid, others: impl IntoIterator<Item = &'a Boid>, distance: f32) -> Vec2 {
    let mut average_velocity = Vec2::ZERO;
    let mut count = 0;

    for other in others {
        if other.id == me.id {
            continue;
        }

        let dist = me.position.distance(other.position);
        if dist < distance && is_in_fov(me, other.position) {
            average_velocity += other.velocity;
            count += 1;
        }
    }

    if count > 0 {
        average_velocity /= count as f32;
        return average_velocity.normalize_or_zero();
    }

    Vec2::ZERO
}

// Normalized direction to the visible neighbors' center of mass
pub fn cohesion<'a>(me: &Boid, others: impl IntoIterator<Item = &'a Boid>, distance: f32) -> Vec2 {
    let mut center_of_mass = Vec2::ZERO;
    let mut count = 0;

    for other in others {
        if other.id == me.id {
            continue;
        }

        let dist = me.position.distance(other.position);
        if dist < distance && is_in_fov(me, other.position) {
            center_of_mass += other.position;
            count += 1;
        }
    }

    if count > 0 {
        center_of_mass /= count as f32;
        return (center_of_mass - me.position).normalize_or_zero();
    }

    Vec2::ZERO
}

pub fn seek(me: &Boid, goal: Vec2, distance: f32) -> Vec2 {
    let dist = me.position.distance(goal);
    if dist < distance && is_in_fov(me, goal) {
        return (goal - me.position).normalize_or_zero();
    }
    Vec2::ZERO
}

// Push away from every deflector whose radius we are inside.
// The strength scales the running sum, not just the newest term, so several
// overlapping deflectors compound.
pub fn deflect(me: &Boid, deflectors: &[Deflector]) -> Vec2 {
    let mut steer = Vec2::ZERO;

    for deflector in deflectors {
        let dist = me.position.distance(deflector.position);
        if dist > 0.0 && dist < deflector.radius {
            let away = (me.position - deflector.position).normalize_or_zero();
            steer += away / dist;
            steer *= deflector.strength;
        }
    }

    steer
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn boid(id: u32, x: f32, y: f32, vx: f32, vy: f32) -> Boid {
        Boid::new(id, Vec2::new(x, y), Vec2::new(vx, vy), TAU * 0.75)
    }

    #[test]
    fn rules_ignore_self() {
        let me = boid(0, 10.0, 10.0, 1.0, 0.0);
        let only_me = [me.clone()];
        assert_eq!(separation(&me, &only_me, 100.0), Vec2::ZERO);
        assert_eq!(alignment(&me, &only_me, 100.0), Vec2::ZERO);
        assert_eq!(cohesion(&me, &only_me, 100.0), Vec2::ZERO);
    }

    #[test]
    fn neighbor_directly_behind_is_invisible() {
        let mut me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let behind = boid(1, -10.0, 0.0, 1.0, 0.0);
        let flock = [me.clone(), behind.clone()];

        me.fov = TAU - 0.01;
        assert!(!is_in_fov(&me, behind.position));
        assert_eq!(separation(&me, &flock, 100.0), Vec2::ZERO);
        assert_eq!(cohesion(&me, &flock, 100.0), Vec2::ZERO);

        me.fov = TAU;
        assert!(is_in_fov(&me, behind.position));
        assert!(separation(&me, &flock, 100.0).x > 0.0);
    }

    #[test]
    fn fov_edges() {
        let mut me = boid(0, 0.0, 0.0, 1.0, 0.0);
        me.fov = PI;
        // 45 degrees off heading is inside a 180 degree cone, 135 degrees is not
        assert!(is_in_fov(&me, Vec2::new(1.0, 1.0)));
        assert!(!is_in_fov(&me, Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn resting_boid_sees_everything() {
        let mut me = boid(0, 0.0, 0.0, 0.0, 0.0);
        me.fov = 0.1;
        assert!(is_in_fov(&me, Vec2::new(-5.0, 0.0)));
        assert!(is_in_fov(&me, me.position));
    }

    #[test]
    fn separation_is_weighted_by_inverse_distance() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let near = [boid(1, 10.0, 0.0, 0.0, 0.0)];
        let far = [boid(1, 50.0, 0.0, 0.0, 0.0)];

        let near_force = separation(&me, &near, 100.0);
        let far_force = separation(&me, &far, 100.0);
        assert_relative_eq!(near_force.x, -0.1);
        assert_relative_eq!(far_force.x, -0.02);
        assert_eq!(near_force.y, 0.0);
    }

    #[test]
    fn separation_skips_coincident_neighbor() {
        let me = boid(0, 5.0, 5.0, 1.0, 0.0);
        let twin = [boid(1, 5.0, 5.0, 1.0, 0.0)];
        let force = separation(&me, &twin, 100.0);
        assert_eq!(force, Vec2::ZERO);
        assert!(force.is_finite());
    }

    #[test]
    fn alignment_returns_unit_average_heading() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let others = [boid(1, 5.0, 0.0, 0.0, 3.0), boid(2, 5.0, 5.0, 0.0, 1.0)];
        let force = alignment(&me, &others, 30.0);
        assert_relative_eq!(force.x, 0.0);
        assert_relative_eq!(force.y, 1.0);
    }

    #[test]
    fn cohesion_points_to_center_of_mass() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let others = [boid(1, 10.0, 10.0, 0.0, 0.0), boid(2, 10.0, -10.0, 0.0, 0.0)];
        let force = cohesion(&me, &others, 100.0);
        assert_relative_eq!(force.x, 1.0);
        assert_relative_eq!(force.y, 0.0);
    }

    #[test]
    fn seek_respects_range_and_fov() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        assert_eq!(seek(&me, Vec2::new(10.0, 0.0), 5.0), Vec2::ZERO);
        assert_relative_eq!(seek(&me, Vec2::new(0.0, 20.0), 100.0).y, 1.0);
        assert_eq!(seek(&me, Vec2::new(-20.0, 0.0), 100.0), Vec2::ZERO);
    }

    #[test]
    fn deflect_pushes_away_and_compounds_strength() {
        let me = boid(0, 0.0, 0.0, 1.0, 0.0);
        let single = [Deflector {
            position: Vec2::new(10.0, 0.0),
            radius: 50.0,
            strength: 2.0,
        }];
        let force = deflect(&me, &single);
        assert_relative_eq!(force.x, -0.2, epsilon = 1e-6);

        // The second deflector rescales the first one's contribution as well
        let pair = [
            single[0],
            Deflector {
                position: Vec2::new(0.0, 10.0),
                radius: 50.0,
                strength: 3.0,
            },
        ];
        let force = deflect(&me, &pair);
        assert_relative_eq!(force.x, -0.6, epsilon = 1e-6);
        assert_relative_eq!(force.y, -0.3, epsilon = 1e-6);

        let outside = [Deflector {
            position: Vec2::new(100.0, 0.0),
            radius: 50.0,
            strength: 2.0,
        }];
        assert_eq!(deflect(&me, &outside), Vec2::ZERO);
    }

    #[test]
    fn integrate_clamps_speed_and_tracks_heading() {
        let mut me = boid(0, 0.0, 0.0, 0.0, 0.0);
        me.integrate(Vec2::new(30.0, 40.0), 10.0);
        assert_relative_eq!(me.velocity.length(), 10.0, epsilon = 1e-5);
        assert_relative_eq!(me.position.x, 6.0, epsilon = 1e-5);
        assert_relative_eq!(me.position.y, 8.0, epsilon = 1e-5);

        let mut still = boid(1, 0.0, 0.0, 0.0, 0.0);
        still.integrate(Vec2::ZERO, 10.0);
        assert_eq!(still.rotation, 0.0);
    }
}
