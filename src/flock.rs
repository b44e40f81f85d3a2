/*
 * Flock Module
 *
 * This module owns a set of boids together with the spatial grid indexing
 * them, and advances the whole flock one fixed tick at a time.
 *
 * Each tick runs in two passes:
 * - Compute the weighted steering force of every boid from the pre-tick state
 * - Integrate every boid and push its new bounds back into the grid
 *
 * Neighbor candidates come either from the grid or from a brute-force scan of
 * the whole flock; the brute-force path is cheaper for small flocks.
 */

use std::collections::HashMap;

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::boid::{self, Boid, Deflector};
use crate::math::Aabb;
use crate::settings::{NeighborSearch, Settings};
use crate::spatial_grid::{ClientId, SpatialHashGrid};

// Half extent of the box a boid occupies in the grid
pub const BOID_RADIUS: f32 = 6.0;

const SPAWN_SPEED: f32 = 2.0;

// The five weighted steering contributions for one boid
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringForces {
    pub separation: Vec2,
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub seek: Vec2,
    pub deflect: Vec2,
}

impl SteeringForces {
    pub fn total(&self) -> Vec2 {
        self.separation + self.alignment + self.cohesion + self.seek + self.deflect
    }
}

// Evaluate every steering rule for `me` and scale each by its weight
pub fn steering_forces<'a, I>(
    me: &Boid,
    others: I,
    settings: &Settings,
    goal: Option<Vec2>,
    deflectors: &[Deflector],
) -> SteeringForces
where
    I: IntoIterator<Item = &'a Boid> + Clone,
{
    let seek = match goal {
        Some(goal) => boid::seek(me, goal, settings.seek_distance) * settings.seek_weight,
        None => Vec2::ZERO,
    };

    SteeringForces {
        separation: boid::separation(me, others.clone(), settings.separation_distance)
            * settings.separation_weight,
        alignment: boid::alignment(me, others.clone(), settings.alignment_distance)
            * settings.alignment_weight,
        cohesion: boid::cohesion(me, others, settings.cohesion_distance) * settings.cohesion_weight,
        seek,
        deflect: boid::deflect(me, deflectors) * settings.deflect_weight,
    }
}

pub struct Flock {
    boids: Vec<Boid>,
    // Grid handle of each boid, parallel to `boids`
    clients: Vec<ClientId>,
    index_of: HashMap<u32, usize>,
    grid: SpatialHashGrid,
    next_id: u32,
    pub wrap_edges: bool,
    // Scratch buffers reused every tick
    candidates: Vec<ClientId>,
    neighbors: Vec<usize>,
    forces: Vec<Vec2>,
}

impl Flock {
    pub fn new(bounds: Aabb, cell_size: f32) -> Self {
        Self {
            boids: Vec::new(),
            clients: Vec::new(),
            index_of: HashMap::new(),
            grid: SpatialHashGrid::new(bounds, Vec2::splat(cell_size)),
            next_id: 0,
            wrap_edges: true,
            candidates: Vec::new(),
            neighbors: Vec::new(),
            forces: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.grid.bounds()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Boid> {
        self.index_of.get(&id).map(|&index| &self.boids[index])
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    // Add a boid and return its id
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2, fov: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let client = self
            .grid
            .new_client(id, Aabb::around_point(position, BOID_RADIUS));
        self.index_of.insert(id, self.boids.len());
        self.boids.push(Boid::new(id, position, velocity, fov));
        self.clients.push(client);

        id
    }

    // Scatter `count` boids uniformly over the bounds with random headings
    pub fn spawn_scattered<R: Rng>(&mut self, count: usize, fov: f32, rng: &mut R) {
        let bounds = self.bounds();
        self.boids.reserve(count);

        for _ in 0..count {
            let position = Vec2::new(
                rng.gen_range(bounds.min.x..=bounds.max.x),
                rng.gen_range(bounds.min.y..=bounds.max.y),
            );
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            self.spawn(position, Vec2::from_angle(angle) * SPAWN_SPEED, fov);
        }

        debug!("spawned {count} boids, flock size {}", self.boids.len());
    }

    pub fn despawn(&mut self, id: u32) -> Option<Boid> {
        let index = self.index_of.remove(&id)?;

        let client = self.clients.swap_remove(index);
        self.grid.remove(client);
        let removed = self.boids.swap_remove(index);

        // Re-point the boid that was moved into the freed slot
        if let Some(moved) = self.boids.get(index) {
            self.index_of.insert(moved.id, index);
        }

        Some(removed)
    }

    pub fn uses_grid(&self, settings: &Settings) -> bool {
        match settings.neighbor_search {
            NeighborSearch::Grid => true,
            NeighborSearch::BruteForce => false,
            NeighborSearch::Auto => self.boids.len() >= settings.grid_threshold,
        }
    }

    // Advance every boid by one fixed tick
    pub fn tick(&mut self, settings: &Settings, goal: Option<Vec2>, deflectors: &[Deflector]) {
        let use_grid = self.uses_grid(settings);
        let radius = settings.neighbor_radius();

        // First pass: forces from the pre-tick state
        self.forces.clear();
        for me in &self.boids {
            let forces = if use_grid {
                self.grid
                    .find_within_radius_into(me.position, radius, &[me.id], &mut self.candidates);

                // Ids the grid knows but the flock no longer does are dropped
                self.neighbors.clear();
                for &candidate in &self.candidates {
                    if let Some(client) = self.grid.client(candidate) {
                        if let Some(&index) = self.index_of.get(&client.entity_id) {
                            self.neighbors.push(index);
                        }
                    }
                }

                let boids = &self.boids;
                let others = self.neighbors.iter().map(|&index| &boids[index]);
                steering_forces(me, others, settings, goal, deflectors)
            } else {
                steering_forces(me, self.boids.iter(), settings, goal, deflectors)
            };

            self.forces.push(forces.total());
        }

        // Second pass: integrate and refresh grid membership
        let bounds = self.grid.bounds();
        for (index, boid) in self.boids.iter_mut().enumerate() {
            boid.store_previous_state();
            boid.integrate(self.forces[index], settings.max_velocity);

            if self.wrap_edges {
                let wrapped = bounds.wrap(boid.position);
                if wrapped != boid.position {
                    // Do not interpolate across the whole world
                    boid.position = wrapped;
                    boid.previous_position = wrapped;
                }
            }

            self.grid
                .update_client(self.clients[index], Aabb::around_point(boid.position, BOID_RADIUS));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::f32::consts::TAU;

    fn bounds() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(1280.0, 800.0))
    }

    fn only_separation() -> Settings {
        Settings {
            separation_distance: 100.0,
            separation_weight: 200.0,
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            seek_weight: 0.0,
            deflect_weight: 0.0,
            ..Settings::default()
        }
    }

    #[test]
    fn separation_pushes_boid_away_from_neighbor() {
        let settings = only_separation();
        let mut flock = Flock::new(bounds(), settings.grid_cell_size);
        let me = flock.spawn(Vec2::new(400.0, 400.0), Vec2::ZERO, TAU);
        flock.spawn(Vec2::new(450.0, 400.0), Vec2::ZERO, TAU);

        flock.tick(&settings, None, &[]);

        let boid = flock.get(me).unwrap();
        assert!(boid.velocity.x < 0.0);
        assert!(boid.velocity.length() <= settings.max_velocity + 1e-4);
    }

    #[test]
    fn grid_and_brute_force_agree() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut grid_flock = Flock::new(bounds(), 50.0);
        grid_flock.spawn_scattered(80, TAU * 0.75, &mut rng);

        let mut rng = SmallRng::seed_from_u64(42);
        let mut brute_flock = Flock::new(bounds(), 50.0);
        brute_flock.spawn_scattered(80, TAU * 0.75, &mut rng);

        let mut grid_settings = Settings::default();
        grid_settings.neighbor_search = NeighborSearch::Grid;
        let mut brute_settings = Settings::default();
        brute_settings.neighbor_search = NeighborSearch::BruteForce;

        // Only summation order differs between the two paths, so keep the run short
        let goal = Some(Vec2::new(640.0, 400.0));
        for _ in 0..3 {
            grid_flock.tick(&grid_settings, goal, &[]);
            brute_flock.tick(&brute_settings, goal, &[]);
        }

        for (a, b) in grid_flock.boids().iter().zip(brute_flock.boids()) {
            assert!(a.position.distance(b.position) < 1e-2, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn auto_search_switches_at_threshold() {
        let settings = Settings {
            grid_threshold: 3,
            ..Settings::default()
        };
        let mut flock = Flock::new(bounds(), 50.0);
        flock.spawn(Vec2::new(10.0, 10.0), Vec2::X, TAU);
        flock.spawn(Vec2::new(20.0, 10.0), Vec2::X, TAU);
        assert!(!flock.uses_grid(&settings));
        flock.spawn(Vec2::new(30.0, 10.0), Vec2::X, TAU);
        assert!(flock.uses_grid(&settings));
    }

    #[test]
    fn speed_never_exceeds_clamp() {
        let mut rng = SmallRng::seed_from_u64(7);
        let settings = Settings::default();
        let mut flock = Flock::new(bounds(), settings.grid_cell_size);
        flock.spawn_scattered(100, settings.boid_fov, &mut rng);

        let deflectors = [Deflector {
            position: Vec2::new(640.0, 400.0),
            radius: 300.0,
            strength: 50.0,
        }];
        for _ in 0..60 {
            flock.tick(&settings, Some(Vec2::new(100.0, 100.0)), &deflectors);
            for boid in flock.boids() {
                assert!(boid.velocity.length() <= settings.max_velocity * (1.0 + 1e-5));
                assert!(boid.position.is_finite());
            }
        }
    }

    #[test]
    fn despawn_keeps_lookup_consistent() {
        let mut flock = Flock::new(bounds(), 50.0);
        let a = flock.spawn(Vec2::new(10.0, 10.0), Vec2::X, TAU);
        let b = flock.spawn(Vec2::new(20.0, 10.0), Vec2::X, TAU);
        let c = flock.spawn(Vec2::new(30.0, 10.0), Vec2::X, TAU);

        assert_eq!(flock.despawn(a).map(|boid| boid.id), Some(a));
        assert!(flock.despawn(a).is_none());
        assert_eq!(flock.get(c).unwrap().position, Vec2::new(30.0, 10.0));
        assert_eq!(flock.get(b).unwrap().position, Vec2::new(20.0, 10.0));
        assert_eq!(flock.grid().len(), 2);
    }

    #[test]
    fn boids_wrap_around_bounds() {
        let settings = Settings {
            separation_weight: 0.0,
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            ..Settings::default()
        };
        let mut flock = Flock::new(bounds(), 50.0);
        let id = flock.spawn(Vec2::new(1279.0, 400.0), Vec2::new(5.0, 0.0), TAU);

        flock.tick(&settings, None, &[]);

        let boid = flock.get(id).unwrap();
        assert_eq!(boid.position.x, 0.0);
        assert_eq!(boid.previous_position, boid.position);
    }
}
