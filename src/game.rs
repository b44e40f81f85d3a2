/*
 * Game Module
 *
 * This module defines the Game driver the platform layer calls once per
 * presentation frame. It owns the settings, the fixed-timestep accumulator,
 * the keyboard snapshot and the scene stack.
 *
 * A frame:
 * 1. Measures the wall-clock delta and turns it into whole fixed ticks
 * 2. Runs each tick on the top scene, then applies the scene's command
 * 3. Clears the released keys after every tick so a release fires once
 * 4. Publishes the interpolation alpha for rendering between ticks
 */

use log::info;

use crate::debug::DebugInfo;
use crate::input::KeyboardState;
use crate::menu::MenuScene;
use crate::scene::{Drawable, Scene, SceneStack, TickContext};
use crate::settings::{Settings, SettingsError};
use crate::timestep::{Clock, FixedTimestep, FramePlan};

pub struct Game {
    settings: Settings,
    timestep: FixedTimestep,
    keyboard: KeyboardState,
    scenes: SceneStack,
    // Simulated milliseconds since the game started
    game_time: f64,
    debug_info: DebugInfo,
}

impl Game {
    // Start at the main menu
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        Self::with_scene(settings, Box::new(MenuScene::new()))
    }

    pub fn with_scene(settings: Settings, scene: Box<dyn Scene>) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut scenes = SceneStack::new();
        scenes.push(scene);

        Ok(Self {
            timestep: FixedTimestep::new(settings.stale_frame_threshold),
            settings,
            keyboard: KeyboardState::new(),
            scenes,
            game_time: 0.0,
            debug_info: DebugInfo::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // Swap in new settings between frames
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        info!(
            "settings replaced: step {:.2}ms, time scale {}",
            settings.fixed_delta_time, settings.time_scale
        );
        self.timestep.set_stale_threshold(settings.stale_frame_threshold);
        self.settings = settings;
        Ok(())
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    pub fn scenes(&self) -> &SceneStack {
        &self.scenes
    }

    pub fn is_paused(&self) -> bool {
        self.timestep.is_paused()
    }

    pub fn pause(&mut self) {
        self.timestep.pause();
    }

    pub fn resume(&mut self) {
        self.timestep.resume();
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn interpolation_alpha(&self) -> f32 {
        self.debug_info.interpolation_alpha
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    // Run the frame presented at `now` (ms)
    pub fn frame(&mut self, now: f64) -> FramePlan {
        let plan = self.timestep.advance(now, self.settings.fixed_delta_time);

        if plan == FramePlan::Discarded {
            self.debug_info.discarded_frames += 1;
        }

        for _ in 0..plan.ticks() {
            self.tick();
        }

        self.debug_info.ticks_last_frame = plan.ticks();
        self.debug_info.interpolation_alpha = self.timestep.alpha(self.settings.fixed_delta_time);
        self.debug_info.game_time = self.game_time;
        plan
    }

    pub fn frame_with_clock(&mut self, clock: &dyn Clock) -> FramePlan {
        self.frame(clock.now_ms())
    }

    // One fixed step of the top scene
    pub fn tick(&mut self) {
        if let Some(scene) = self.scenes.current_mut() {
            let ctx = TickContext {
                input: &self.keyboard,
                settings: &self.settings,
                game_time: self.game_time,
            };
            let command = scene.tick(&ctx);
            self.scenes.apply(command);
        }

        self.keyboard.clear();
        self.game_time += self.settings.tick_dt();
        self.debug_info.total_ticks += 1;
    }

    // Drawables of the top scene, replacing the contents of `out`
    pub fn drawables(&self, out: &mut Vec<Drawable>) {
        out.clear();
        if let Some(scene) = self.scenes.current() {
            scene.drawables(out);
        }
    }
}
