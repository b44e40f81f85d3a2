/*
 * Camera Module
 *
 * This module defines the Camera struct a scene uses to frame its world.
 * It eases towards a wanted position every tick and provides the coordinate
 * transformations between world space and screen space. Screen space has its
 * origin in the top-left corner of the viewport.
 *
 * Screen shake is driven by the scene's trauma: each tick the camera draws a
 * translational and a rotational offset from an rng seeded with the game
 * time, scaled by the shake amount and the limits in Settings. The same game
 * time always produces the same offset.
 */

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // World position of the viewport's top-left corner
    pub position: Vec2,
    pub wanted_position: Vec2,
    pub viewport: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    // Fraction of the remaining distance covered per tick, per axis
    pub follow_speed: Vec2,
    pub shake_seed: u64,
    // Offsets of the last tick, applied on top of `position`
    pub shake_offset: Vec2,
    // Radians about the viewport center
    pub shake_angle: f32,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            wanted_position: Vec2::ZERO,
            viewport,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            follow_speed: Vec2::ONE,
            shake_seed: 0,
            shake_offset: Vec2::ZERO,
            shake_angle: 0.0,
        }
    }

    // World-space point at the middle of the viewport
    pub fn center(&self) -> Vec2 {
        self.position + self.viewport * 0.5 / self.zoom
    }

    // Ask the camera to center on `target`
    pub fn follow(&mut self, target: Vec2) {
        self.wanted_position = target - self.viewport * 0.5 / self.zoom;
    }

    // Ease towards the wanted position and shake by `shake` in [0, 1]
    pub fn tick(&mut self, game_time: f64, shake: f32, settings: &Settings) {
        let speed = self.follow_speed.clamp(Vec2::ZERO, Vec2::ONE);
        self.position += (self.wanted_position - self.position) * speed;

        if !(shake > 0.0) {
            self.shake_offset = Vec2::ZERO;
            self.shake_angle = 0.0;
            return;
        }

        let shake = shake.min(1.0);
        let mut rng = SmallRng::seed_from_u64(self.shake_seed ^ game_time.to_bits());
        let mut unit = || rng.gen_range(-1.0f32..=1.0);

        self.shake_angle = settings.max_rotational_shake * shake * unit();
        self.shake_offset = Vec2::new(unit(), unit()) * settings.max_translational_shake * shake;
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        (point - self.position - self.shake_offset) * self.zoom
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2) -> Vec2 {
        point / self.zoom + self.position + self.shake_offset
    }

    // Zoom by a scroll amount, keeping the world point under the cursor fixed
    pub fn zoom_at(&mut self, scroll: f32, cursor: Vec2) {
        let cursor_world_before = self.screen_to_world(cursor);

        let zoom_factor = 1.0 + scroll * 0.1;
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);

        let cursor_world_after = self.screen_to_world(cursor);
        let shift = cursor_world_before - cursor_world_after;
        self.position += shift;
        self.wanted_position += shift;
    }
}
