/*
 * Flock Core - Module Definitions
 *
 * Deterministic core of a small herding game: a fixed-timestep loop, a
 * spatial hash grid, a steering engine for boids and a minimal rigid-body
 * world, driven through a stack of scenes. Rendering and device input live
 * outside the core (see the `viewer` feature).
 */

// Re-export key components for easier access
pub use boid::{Boid, Deflector};
pub use camera::Camera;
pub use debug::DebugInfo;
pub use flock::{Flock, SteeringForces};
pub use game::Game;
pub use gameplay::GameplayScene;
pub use input::{InputSnapshot, Key, KeyboardState};
pub use math::Aabb;
pub use menu::MenuScene;
pub use physics::{BodyId, PhysicsWorld, RigidBody};
pub use scene::{Drawable, DrawableKind, Scene, SceneCommand, SceneStack, TickContext};
pub use settings::{NeighborSearch, Settings, SettingsError};
pub use spatial_grid::{ClientId, SpatialHashGrid};
pub use timestep::{Clock, FixedTimestep, FramePlan, SystemClock};

// Define modules
pub mod boid;
pub mod camera;
pub mod debug;
pub mod flock;
pub mod game;
pub mod gameplay;
pub mod input;
pub mod math;
pub mod menu;
pub mod physics;
pub mod scene;
pub mod settings;
pub mod spatial_grid;
pub mod timestep;

// Size of the playing field in world units
pub const VIEWPORT: glam::Vec2 = glam::Vec2::new(1280.0, 800.0);
