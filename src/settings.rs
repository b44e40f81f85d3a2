/*
 * Settings Module
 *
 * This module defines the Settings struct holding every tunable of the
 * simulation. The core only reads it at tick time; the embedding layer may
 * swap in a new copy between frames (hot reload, debug sliders). Settings
 * files are JSON and any missing field falls back to its default.
 */

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timestep::MAX_TICKS_PER_FRAME;

// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Invalid(&'static str),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

// How the flock gathers neighbor candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    // Grid once the flock reaches `grid_threshold` boids, brute force below
    Auto,
    Grid,
    BruteForce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Milliseconds per simulation step
    pub fixed_delta_time: f64,
    pub time_scale: f64,
    // Frame deltas longer than this (ms) are dropped instead of simulated
    pub stale_frame_threshold: f64,

    pub separation_distance: f32,
    pub separation_weight: f32,
    pub alignment_distance: f32,
    pub alignment_weight: f32,
    pub cohesion_distance: f32,
    pub cohesion_weight: f32,
    pub seek_distance: f32,
    pub seek_weight: f32,
    pub deflect_weight: f32,
    pub max_velocity: f32,

    pub neighbor_search: NeighborSearch,
    pub grid_threshold: usize,
    pub grid_cell_size: f32,

    pub seed: u64,
    pub boid_count: usize,
    pub boid_fov: f32,

    // Player tunables, per millisecond of simulated time
    pub player_acceleration: f32,
    pub player_friction: f32,
    pub player_max_speed: f32,
    pub player_deflect_radius: f32,
    pub player_deflect_strength: f32,

    // Camera shake at full trauma: radians, world units
    pub max_rotational_shake: f32,
    pub max_translational_shake: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fixed_delta_time: 1000.0 / 60.0,
            time_scale: 1.0,
            stale_frame_threshold: 1000.0,
            separation_distance: 100.0,
            separation_weight: 200.0,
            alignment_distance: 30.0,
            alignment_weight: 4.0,
            cohesion_distance: 100.0,
            cohesion_weight: 1.0,
            seek_distance: 1000.0,
            seek_weight: 1.0,
            deflect_weight: 1.0,
            max_velocity: 10.0,
            neighbor_search: NeighborSearch::Auto,
            grid_threshold: 32,
            grid_cell_size: 50.0,
            seed: 1337,
            boid_count: 64,
            boid_fov: TAU * 0.75,
            player_acceleration: 0.01,
            player_friction: 0.005,
            player_max_speed: 0.6,
            player_deflect_radius: 150.0,
            player_deflect_strength: 200.0,
            max_rotational_shake: TAU * 0.1,
            max_translational_shake: 25.0,
        }
    }
}

impl Settings {
    // Parse a JSON settings document and validate it
    pub fn from_json_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // Reject values the loop or the grid cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.fixed_delta_time > 0.0) || !self.fixed_delta_time.is_finite() {
            return Err(SettingsError::Invalid("fixed_delta_time must be positive"));
        }
        if !(self.time_scale >= 0.0) || !self.time_scale.is_finite() {
            return Err(SettingsError::Invalid("time_scale must be non-negative"));
        }
        if !(self.stale_frame_threshold > self.fixed_delta_time) {
            return Err(SettingsError::Invalid(
                "stale_frame_threshold must exceed fixed_delta_time",
            ));
        }
        // The stale guard is what bounds the catch-up burst of a single frame
        if self.stale_frame_threshold / self.fixed_delta_time > f64::from(MAX_TICKS_PER_FRAME) {
            return Err(SettingsError::Invalid(
                "stale_frame_threshold allows too many ticks per frame",
            ));
        }
        if !(self.grid_cell_size > 0.0) {
            return Err(SettingsError::Invalid("grid_cell_size must be positive"));
        }
        if !(self.max_velocity >= 0.0) {
            return Err(SettingsError::Invalid("max_velocity must be non-negative"));
        }

        let distances = [
            self.separation_distance,
            self.alignment_distance,
            self.cohesion_distance,
            self.seek_distance,
        ];
        if distances.iter().any(|distance| !(*distance >= 0.0)) {
            return Err(SettingsError::Invalid("perception distances must be non-negative"));
        }

        if !(self.max_rotational_shake >= 0.0) || !(self.max_translational_shake >= 0.0) {
            return Err(SettingsError::Invalid("shake limits must be non-negative"));
        }

        if !(self.boid_fov > 0.0) {
            return Err(SettingsError::Invalid("boid_fov must be positive"));
        }

        Ok(())
    }

    // Simulated milliseconds advanced by one tick
    pub fn tick_dt(&self) -> f64 {
        self.fixed_delta_time * self.time_scale
    }

    // Largest perception radius, used to size neighbor queries
    pub fn neighbor_radius(&self) -> f32 {
        self.separation_distance
            .max(self.alignment_distance)
            .max(self.cohesion_distance)
    }
}
