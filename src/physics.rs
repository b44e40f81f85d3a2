/*
 * Physics Module
 *
 * This module owns the dynamic rigid bodies of a scene and integrates them
 * with explicit Euler steps of a fixed size. Every body is indexed in a
 * spatial hash grid so each tick can run a broad-phase query for it.
 *
 * The narrow phase is not implemented: broad-phase candidates are observed
 * (logged and counted) but produce no collision response yet.
 */

use std::collections::HashMap;

use glam::Vec2;
use log::trace;
use slotmap::{new_key_type, SlotMap};

use crate::math::Aabb;
use crate::settings::Settings;
use crate::spatial_grid::{ClientId, SpatialHashGrid};

// Cell size of the physics broad-phase grid
pub const PHYSICS_CELL_SIZE: Vec2 = Vec2::new(50.0, 50.0);

new_key_type! {
    // Handle to a body owned by a PhysicsWorld
    pub struct BodyId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub id: u32,
    // Top-left corner of the collider
    pub position: Vec2,
    pub previous_position: Vec2,
    pub size: Vec2,
    pub acceleration: Vec2,
    pub velocity: Vec2,
    pub collider: Aabb,
    pub client: Option<ClientId>,
    pub color: [u8; 3],
}

impl RigidBody {
    pub fn new(id: u32, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            position,
            previous_position: position,
            size,
            acceleration: Vec2::ZERO,
            velocity: Vec2::ZERO,
            collider: Aabb::from_position_size(position, size),
            client: None,
            color: [255, 255, 255],
        }
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

// What the last tick observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    pub bodies: usize,
    pub broad_phase_candidates: usize,
}

pub struct PhysicsWorld {
    grid: SpatialHashGrid,
    bodies: SlotMap<BodyId, RigidBody>,
    // Tick order, insertion order
    order: Vec<BodyId>,
    by_entity: HashMap<u32, BodyId>,
    // Scratch buffers reused every tick
    candidates: Vec<ClientId>,
    broad: Vec<BodyId>,
}

impl PhysicsWorld {
    pub fn new(bounds: Aabb) -> Self {
        Self {
            grid: SpatialHashGrid::new(bounds, PHYSICS_CELL_SIZE),
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            by_entity: HashMap::new(),
            candidates: Vec::new(),
            broad: Vec::new(),
        }
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    // Bodies in tick order
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.order.iter().filter_map(|&id| self.bodies.get(id))
    }

    // Take ownership of a body and register it with the broad phase
    pub fn add(&mut self, mut body: RigidBody) -> BodyId {
        body.collider = Aabb::from_position_size(body.position, body.size);
        body.client = Some(self.grid.new_client(body.id, body.collider));

        let entity_id = body.id;
        let id = self.bodies.insert(body);
        self.order.push(id);
        self.by_entity.insert(entity_id, id);
        id
    }

    // Deregister a body and hand it back with its grid handle cleared
    pub fn remove(&mut self, id: BodyId) -> Option<RigidBody> {
        let mut body = self.bodies.remove(id)?;

        if let Some(client) = body.client.take() {
            self.grid.remove(client);
        }
        self.order.retain(|&other| other != id);
        if self.by_entity.get(&body.id) == Some(&id) {
            self.by_entity.remove(&body.id);
        }

        Some(body)
    }

    // Teleport a body, keeping its collider and grid cells in step
    pub fn set_position(&mut self, id: BodyId, position: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(id) else {
            return false;
        };

        body.position = position;
        body.collider = Aabb::from_position_size(position, body.size);
        if let Some(client) = body.client {
            self.grid.update_client(client, body.collider);
        }
        true
    }

    // Candidates sharing grid cells with the body, resolved to body handles.
    // Entity ids with no live body behind them are skipped.
    fn broad_phase(&mut self, id: BodyId) {
        self.broad.clear();
        let Some(body) = self.bodies.get(id) else {
            return;
        };

        self.grid
            .find_near_into(&body.collider, &[body.id], &mut self.candidates);
        for &candidate in &self.candidates {
            let Some(client) = self.grid.client(candidate) else {
                continue;
            };
            if let Some(&other) = self.by_entity.get(&client.entity_id) {
                if self.bodies.contains_key(other) {
                    self.broad.push(other);
                }
            }
        }
    }

    // Advance every body by one fixed step of `fixed_delta_time * time_scale` ms
    pub fn tick(&mut self, gravity: Vec2, settings: &Settings) -> PhysicsStats {
        let dt = settings.tick_dt() as f32;
        let mut stats = PhysicsStats {
            bodies: self.order.len(),
            broad_phase_candidates: 0,
        };

        for index in 0..self.order.len() {
            let id = self.order[index];

            self.broad_phase(id);
            stats.broad_phase_candidates += self.broad.len();

            let Some(body) = self.bodies.get_mut(id) else {
                continue;
            };

            // Narrow phase goes here; candidates are only observed for now
            for &candidate in &self.broad {
                trace!("body {} overlaps cells with {:?}", body.id, candidate);
            }

            let acceleration = body.acceleration + gravity;
            body.previous_position = body.position;
            body.velocity += acceleration * dt;
            body.position += body.velocity * dt;
            body.collider = Aabb::from_position_size(body.position, body.size);

            if let Some(client) = body.client {
                self.grid.update_client(client, body.collider);
            }
        }

        stats
    }
}
