/*
 * Menu Scene
 *
 * Title screen. Releasing Confirm starts a new herding field on top of it;
 * popping the field returns here. Title text is drawn by the renderer, so the
 * scene contributes no drawables of its own.
 *
 * The menu opens with full trauma that is gone after the first tick.
 */

use glam::Vec2;

use crate::camera::Camera;
use crate::gameplay::GameplayScene;
use crate::input::Key;
use crate::math::Aabb;
use crate::scene::{Drawable, Scene, SceneCommand, TickContext};
use crate::VIEWPORT;

pub struct MenuScene {
    pub bounds: Aabb,
    // Shake amount in [0, 1] and its decay per tick
    pub trauma: f32,
    pub trauma_dampening: f32,
    camera: Camera,
    scene_time: f64,
}

impl MenuScene {
    pub fn new() -> Self {
        Self {
            bounds: Aabb::new(Vec2::ZERO, VIEWPORT),
            trauma: 1.0,
            trauma_dampening: 1.0,
            camera: Camera::new(VIEWPORT),
            scene_time: 0.0,
        }
    }
}

impl Default for MenuScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for MenuScene {
    fn name(&self) -> &str {
        "main menu"
    }

    fn on_push(&mut self) {
        self.scene_time = 0.0;
    }

    fn on_pop(&mut self) {}

    fn tick(&mut self, ctx: &TickContext) -> SceneCommand {
        self.trauma = (self.trauma - self.trauma_dampening).clamp(0.0, 1.0);
        self.camera.tick(ctx.game_time, self.trauma * self.trauma, ctx.settings);
        self.scene_time += ctx.settings.tick_dt();

        if ctx.input.was_released(Key::Confirm) {
            return SceneCommand::Push(Box::new(GameplayScene::new(ctx.settings)));
        }

        SceneCommand::None
    }

    fn drawables(&self, _out: &mut Vec<Drawable>) {}

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn scene_time(&self) -> f64 {
        self.scene_time
    }
}
