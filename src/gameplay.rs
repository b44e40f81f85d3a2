/*
 * Gameplay Scene
 *
 * The herding field. The player is a rigid body steered by the held arrow
 * keys; the flock seeks the pen (the goal) and scatters away from the player,
 * so the player herds boids by walking around them.
 *
 * Per tick:
 * 1. Input sets the player's acceleration, friction bleeds off velocity
 * 2. The flock steers and moves, deflected by the player's pre-tick position
 * 3. The physics world integrates the player and refreshes its grid cells
 * 4. The player is kept inside the field and the camera follows it
 * 5. Trauma decays and the camera shakes by its square
 *
 * Running into the edge of the field faster than half the player's top speed
 * adds trauma.
 */

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::boid::Deflector;
use crate::camera::Camera;
use crate::flock::{Flock, BOID_RADIUS};
use crate::input::{self, Key};
use crate::math::Aabb;
use crate::physics::{BodyId, PhysicsWorld, RigidBody};
use crate::scene::{Drawable, DrawableKind, Scene, SceneCommand, TickContext};
use crate::settings::Settings;
use crate::VIEWPORT;

pub const PLAYER_ID: u32 = 0;
pub const PLAYER_SIZE: Vec2 = Vec2::new(32.0, 64.0);
pub const PLAYER_COLOR: [u8; 3] = [255, 0, 0];
pub const GOAL_RADIUS: f32 = 80.0;
pub const GOAL_COLOR: [u8; 3] = [38, 92, 76];

// Top-down field, nothing falls
const GRAVITY: Vec2 = Vec2::ZERO;

pub const BUMP_TRAUMA: f32 = 0.5;
const TRAUMA_DAMPENING: f32 = 0.02;

pub struct GameplayScene {
    pub bounds: Aabb,
    // Shake amount in [0, 1] and its decay per tick
    pub trauma: f32,
    pub trauma_dampening: f32,
    camera: Camera,
    physics: PhysicsWorld,
    player: BodyId,
    flock: Flock,
    goal: Vec2,
    deflectors: Vec<Deflector>,
    scene_time: f64,
}

impl GameplayScene {
    pub fn new(settings: &Settings) -> Self {
        let bounds = Aabb::new(Vec2::ZERO, VIEWPORT);

        let mut physics = PhysicsWorld::new(bounds);
        let mut body = RigidBody::new(PLAYER_ID, bounds.center() - PLAYER_SIZE * 0.5, PLAYER_SIZE);
        body.color = PLAYER_COLOR;
        let player = physics.add(body);

        let mut flock = Flock::new(bounds, settings.grid_cell_size);
        let mut rng = SmallRng::seed_from_u64(settings.seed);
        flock.spawn_scattered(settings.boid_count, settings.boid_fov, &mut rng);

        let mut camera = Camera::new(VIEWPORT);
        camera.follow_speed = Vec2::new(0.3, 0.3);
        camera.follow(bounds.center());
        camera.position = camera.wanted_position;
        camera.shake_seed = settings.seed;

        Self {
            bounds,
            trauma: 0.0,
            trauma_dampening: TRAUMA_DAMPENING,
            camera,
            physics,
            player,
            flock,
            goal: Vec2::new(bounds.max.x * 0.85, bounds.center().y),
            deflectors: Vec::with_capacity(1),
            scene_time: 0.0,
        }
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    pub fn flock_mut(&mut self) -> &mut Flock {
        &mut self.flock
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn player(&self) -> Option<&RigidBody> {
        self.physics.body(self.player)
    }

    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).clamp(0.0, 1.0);
    }

    // Boids currently inside the pen
    pub fn herded_count(&self) -> usize {
        self.flock
            .boids()
            .iter()
            .filter(|boid| boid.position.distance(self.goal) < GOAL_RADIUS)
            .count()
    }

    fn steer_player(&mut self, ctx: &TickContext) {
        let settings = ctx.settings;
        let Some(body) = self.physics.body_mut(self.player) else {
            return;
        };

        body.acceleration = input::direction(ctx.input) * settings.player_acceleration;
        body.velocity.x = approach_zero(body.velocity.x, settings.player_friction);
        body.velocity.y = approach_zero(body.velocity.y, settings.player_friction);
    }

    // Clamp the player's speed and keep it inside the field
    fn confine_player(&mut self, settings: &Settings) {
        let Some(body) = self.physics.body_mut(self.player) else {
            return;
        };

        body.velocity = body.velocity.clamp_length_max(settings.player_max_speed.max(0.0));

        let max = (self.bounds.max - body.size).max(self.bounds.min);
        let confined = body.position.clamp(self.bounds.min, max);
        if confined == body.position {
            return;
        }

        let mut impact = 0.0f32;
        if confined.x != body.position.x {
            impact = impact.max(body.velocity.x.abs());
            body.velocity.x = 0.0;
        }
        if confined.y != body.position.y {
            impact = impact.max(body.velocity.y.abs());
            body.velocity.y = 0.0;
        }
        self.physics.set_position(self.player, confined);

        if impact > settings.player_max_speed * 0.5 {
            self.add_trauma(BUMP_TRAUMA);
        }
    }
}

// Move `value` towards zero by `amount` without crossing it
fn approach_zero(value: f32, amount: f32) -> f32 {
    if value.abs() <= amount {
        0.0
    } else {
        value - amount * value.signum()
    }
}

impl Scene for GameplayScene {
    fn name(&self) -> &str {
        "base scene"
    }

    fn on_push(&mut self) {
        self.scene_time = 0.0;
    }

    fn on_pop(&mut self) {}

    fn tick(&mut self, ctx: &TickContext) -> SceneCommand {
        let settings = ctx.settings;

        self.steer_player(ctx);

        self.deflectors.clear();
        if let Some(player) = self.player() {
            self.deflectors.push(Deflector {
                position: player.center(),
                radius: settings.player_deflect_radius,
                strength: settings.player_deflect_strength,
            });
        }
        self.flock.tick(settings, Some(self.goal), &self.deflectors);

        self.physics.tick(GRAVITY, settings);
        self.confine_player(settings);

        if let Some(center) = self.player().map(RigidBody::center) {
            self.camera.follow(center);
        }
        self.trauma = (self.trauma - self.trauma_dampening).clamp(0.0, 1.0);
        self.camera.tick(ctx.game_time, self.trauma * self.trauma, settings);

        self.scene_time += settings.tick_dt();

        if ctx.input.was_released(Key::Cancel) {
            return SceneCommand::Pop;
        }

        SceneCommand::None
    }

    fn drawables(&self, out: &mut Vec<Drawable>) {
        out.reserve(self.flock.len() + 2);

        out.push(Drawable {
            kind: DrawableKind::Goal,
            id: 0,
            position: self.goal,
            previous_position: self.goal,
            rotation: 0.0,
            color: GOAL_COLOR,
            size: Vec2::splat(GOAL_RADIUS * 2.0),
        });

        for boid in self.flock.boids() {
            out.push(Drawable {
                kind: DrawableKind::Boid,
                id: boid.id,
                position: boid.position,
                previous_position: boid.previous_position,
                rotation: boid.rotation,
                color: boid.color,
                size: Vec2::splat(BOID_RADIUS * 2.0),
            });
        }

        if let Some(player) = self.player() {
            let half = player.size * 0.5;
            out.push(Drawable {
                kind: DrawableKind::Player,
                id: player.id,
                position: player.position + half,
                previous_position: player.previous_position + half,
                rotation: 0.0,
                color: player.color,
                size: player.size,
            });
        }
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn scene_time(&self) -> f64 {
        self.scene_time
    }
}
