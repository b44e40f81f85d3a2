/*
 * Flock Viewer
 *
 * Desktop front end for the flock core, built with `--features viewer`.
 * Window events become logical keys on the game's KeyboardState; every
 * nannou update runs one game frame against the wall clock, and the view
 * draws the top scene's drawables blended by the interpolation alpha.
 *
 * Controls:
 * - Arrow keys move the herder
 * - Enter starts a field from the menu, Escape leaves it
 * - Space pauses and resumes
 *
 * An optional first argument names a JSON settings file.
 */

use ::glam::Vec2 as WorldVec2;
use flock_core::{Camera, Drawable, DrawableKind, Game, Key as GameKey, Settings, SystemClock};
use log::{debug, error, info, warn};
use nannou::prelude::*;

const WINDOW_TITLE: &str = "Flock Herding";

struct Model {
    game: Game,
    clock: SystemClock,
    // Last frame's tick count, logged when it changes
    last_ticks: u32,
}

fn main() {
    env_logger::init();
    nannou::app(model).update(update).run();
}

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(source) => match Settings::from_json_str(&source) {
            Ok(settings) => {
                info!("loaded settings from {path}");
                settings
            }
            Err(err) => {
                warn!("{path}: {err}, using defaults");
                Settings::default()
            }
        },
        Err(err) => {
            warn!("could not read {path}: {err}, using defaults");
            Settings::default()
        }
    }
}

fn model(app: &App) -> Model {
    let window = app
        .new_window()
        .title(WINDOW_TITLE)
        .size(flock_core::VIEWPORT.x as u32, flock_core::VIEWPORT.y as u32)
        .view(view)
        .key_pressed(key_pressed)
        .key_released(key_released)
        .unfocused(unfocused)
        .build();
    if let Err(err) = window {
        error!("failed to open window: {err:?}");
        std::process::exit(1);
    }

    let game = match Game::new(load_settings()) {
        Ok(game) => game,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    Model {
        game,
        clock: SystemClock::new(),
        last_ticks: 0,
    }
}

fn map_key(key: Key) -> Option<GameKey> {
    match key {
        Key::Up => Some(GameKey::Up),
        Key::Down => Some(GameKey::Down),
        Key::Left => Some(GameKey::Left),
        Key::Right => Some(GameKey::Right),
        Key::Return => Some(GameKey::Confirm),
        Key::Escape => Some(GameKey::Cancel),
        _ => None,
    }
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if key == Key::Space {
        if model.game.is_paused() {
            model.game.resume();
        } else {
            model.game.pause();
        }
        return;
    }

    if let Some(key) = map_key(key) {
        model.game.keyboard_mut().key_down(key);
    }
}

fn key_released(_app: &App, model: &mut Model, key: Key) {
    if let Some(key) = map_key(key) {
        model.game.keyboard_mut().key_up(key);
    }
}

// Keys released while unfocused never reach us
fn unfocused(_app: &App, model: &mut Model) {
    model.game.keyboard_mut().reset();
}

fn update(app: &App, model: &mut Model, _update: Update) {
    let plan = model.game.frame_with_clock(&model.clock);

    if plan.ticks() != model.last_ticks {
        model.last_ticks = plan.ticks();
        debug!("{} (fps {:.0})", model.game.debug_info(), app.fps());
    }
}

// World space (y down, origin top-left) to nannou space (y up, origin centered)
fn to_screen(camera: &Camera, win: Rect, point: WorldVec2) -> Point2 {
    let screen = camera.world_to_screen(point);
    pt2(win.left() + screen.x, win.top() - screen.y)
}

fn draw_boid(draw: &Draw, camera: &Camera, win: Rect, drawable: &Drawable, center: WorldVec2) {
    let forward = WorldVec2::from_angle(drawable.rotation).rotate(flock_core::math::UP);
    let right = forward.perp();
    let size = drawable.size.x * 0.5;

    let points = [
        center + forward * size,
        center - forward * size + right * size * 0.5,
        center - forward * size - right * size * 0.5,
    ]
    .map(|point| to_screen(camera, win, point));

    let [r, g, b] = drawable.color;
    draw.polygon().color(rgb(r, g, b)).points(points);
}

fn draw_drawable(draw: &Draw, camera: &Camera, win: Rect, drawable: &Drawable, alpha: f32) {
    let center = drawable.interpolated_position(alpha);
    let [r, g, b] = drawable.color;

    match drawable.kind {
        DrawableKind::Boid => draw_boid(draw, camera, win, drawable, center),
        DrawableKind::Player => {
            let size = drawable.size * camera.zoom;
            draw.rect()
                .xy(to_screen(camera, win, center))
                .w_h(size.x, size.y)
                .color(rgb(r, g, b));
        }
        DrawableKind::Goal => {
            draw.ellipse()
                .xy(to_screen(camera, win, center))
                .radius(drawable.size.x * 0.5 * camera.zoom)
                .no_fill()
                .stroke(rgb(r, g, b))
                .stroke_weight(3.0);
        }
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let win = app.window_rect();
    draw.background().color(BLACK);

    if let Some(scene) = model.game.scenes().current() {
        let mut drawables = Vec::new();
        model.game.drawables(&mut drawables);

        // The menu has nothing to draw but its title
        if drawables.is_empty() {
            draw.text(&format!("{}\n\nEnter to start, Escape to return", scene.name()))
                .xy(win.xy())
                .color(WHITE)
                .font_size(24);
        }

        let alpha = model.game.interpolation_alpha();
        let camera = scene.camera();
        // The window origin is the viewport center, which the shake turns about
        let shaken = draw.rotate(camera.shake_angle);
        for drawable in &drawables {
            draw_drawable(&shaken, camera, win, drawable, alpha);
        }
    }

    if model.game.is_paused() {
        draw.text("paused")
            .x_y(0.0, win.top() - 20.0)
            .color(WHITE)
            .font_size(16);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!("failed to draw frame: {err:?}");
    }
}
