/*
 * Scene Module
 *
 * Scenes are the unit of game state the loop drives: the menu, the herding
 * field. They live on an explicit stack; only the top scene ticks. A tick
 * receives everything it may read (input, settings) through TickContext and
 * answers with a SceneCommand the stack applies once the tick is over.
 */

use glam::Vec2;
use log::debug;

use crate::camera::Camera;
use crate::input::InputSnapshot;
use crate::settings::Settings;

// Read-only inputs of one fixed tick
pub struct TickContext<'a> {
    pub input: &'a dyn InputSnapshot,
    pub settings: &'a Settings,
    // Simulated milliseconds before this tick
    pub game_time: f64,
}

pub enum SceneCommand {
    None,
    Push(Box<dyn Scene>),
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    Player,
    Boid,
    Goal,
}

// What the renderer needs to draw one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub kind: DrawableKind,
    pub id: u32,
    // Center of the entity, before and after the last tick
    pub position: Vec2,
    pub previous_position: Vec2,
    pub rotation: f32,
    pub color: [u8; 3],
    pub size: Vec2,
}

impl Drawable {
    // Blend between the last two simulated states
    pub fn interpolated_position(&self, alpha: f32) -> Vec2 {
        self.previous_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }
}

pub trait Scene {
    fn name(&self) -> &str;

    fn on_push(&mut self);

    fn on_pop(&mut self);

    fn tick(&mut self, ctx: &TickContext) -> SceneCommand;

    // Append this scene's drawables to `out`
    fn drawables(&self, out: &mut Vec<Drawable>);

    fn camera(&self) -> &Camera;

    // Simulated milliseconds since the scene was pushed
    fn scene_time(&self) -> f64;
}

#[derive(Default)]
pub struct SceneStack {
    scenes: Vec<Box<dyn Scene>>,
}

impl SceneStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn push(&mut self, mut scene: Box<dyn Scene>) {
        debug!("pushed scene: {}", scene.name());
        scene.on_push();
        self.scenes.push(scene);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Scene>> {
        let mut scene = self.scenes.pop()?;
        scene.on_pop();
        debug!("scene {} ran for {:.0}ms", scene.name(), scene.scene_time());
        Some(scene)
    }

    pub fn current(&self) -> Option<&dyn Scene> {
        self.scenes.last().map(|scene| &**scene)
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn Scene + 'static)> {
        self.scenes.last_mut().map(|scene| &mut **scene)
    }

    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::None => {}
            SceneCommand::Push(scene) => self.push(scene),
            SceneCommand::Pop => {
                self.pop();
            }
        }
    }
}
