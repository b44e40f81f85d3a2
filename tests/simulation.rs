use std::f32::consts::TAU;

use flock_core::{
    Aabb, Drawable, DrawableKind, FixedTimestep, Flock, FramePlan, Game, Key, NeighborSearch,
    Settings,
};
use glam::Vec2;

// Frame timestamps of a ~60Hz display with jitter
fn timestamps(frames: usize) -> Vec<f64> {
    (1..=frames).map(|frame| (frame as f64 * 50.0 / 3.0).floor()).collect()
}

fn start_field(game: &mut Game) {
    game.keyboard_mut().key_down(Key::Confirm);
    game.keyboard_mut().key_up(Key::Confirm);
}

// Play a fixed script and record what would be drawn after every frame
fn scripted_run(settings: &Settings) -> Vec<Vec<Drawable>> {
    let mut game = Game::new(settings.clone()).unwrap();
    start_field(&mut game);

    let mut trace = Vec::new();
    for (frame, now) in timestamps(180).into_iter().enumerate() {
        match frame {
            20 => game.keyboard_mut().key_down(Key::Right),
            90 => game.keyboard_mut().key_down(Key::Up),
            120 => {
                game.keyboard_mut().key_up(Key::Right);
                game.keyboard_mut().key_up(Key::Up);
            }
            _ => {}
        }

        game.frame(now);
        let mut drawables = Vec::new();
        game.drawables(&mut drawables);
        trace.push(drawables);
    }
    trace
}

#[test]
fn identical_inputs_replay_identically() {
    let settings = Settings::default();
    let first = scripted_run(&settings);
    let second = scripted_run(&settings);

    assert_eq!(first.len(), 180);
    assert!(first.last().unwrap().iter().any(|d| d.kind == DrawableKind::Boid));
    assert_eq!(first, second);
}

#[test]
fn seed_changes_the_flock() {
    let settings = Settings::default();
    let other = Settings {
        seed: settings.seed + 1,
        ..Settings::default()
    };
    assert_ne!(scripted_run(&settings).last(), scripted_run(&other).last());
}

#[test]
fn stale_frame_is_dropped_and_baseline_resyncs() {
    let step = 1000.0 / 60.0;
    let mut timestep = FixedTimestep::new(1000.0);
    assert_eq!(timestep.advance(10.0, step), FramePlan::Run { ticks: 0 });
    let accumulator = timestep.accumulator();

    assert_eq!(timestep.advance(2010.0, step), FramePlan::Discarded);
    assert_eq!(timestep.accumulator(), accumulator);
    assert_eq!(timestep.baseline(), 2010.0);

    // Picks up normally from the resynced baseline
    assert_eq!(timestep.advance(2010.0 + step + 1.0, step), FramePlan::Run { ticks: 1 });
}

#[test]
fn long_stall_does_not_advance_the_game() {
    let mut game = Game::new(Settings::default()).unwrap();
    game.frame(100.0);
    let before = game.game_time();

    assert_eq!(game.frame(2100.0), FramePlan::Discarded);
    assert_eq!(game.game_time(), before);
    assert_eq!(game.debug_info().discarded_frames, 1);
}

#[test]
fn lone_neighbor_pushes_boid_away() {
    let settings = Settings {
        separation_distance: 100.0,
        separation_weight: 200.0,
        alignment_weight: 0.0,
        cohesion_weight: 0.0,
        seek_weight: 0.0,
        deflect_weight: 0.0,
        ..Settings::default()
    };

    for search in [NeighborSearch::Grid, NeighborSearch::BruteForce] {
        let settings = Settings {
            neighbor_search: search,
            ..settings.clone()
        };
        let mut flock = Flock::new(Aabb::new(Vec2::ZERO, Vec2::new(1280.0, 800.0)), 50.0);
        let me = flock.spawn(Vec2::new(500.0, 300.0), Vec2::ZERO, TAU);
        flock.spawn(Vec2::new(500.0, 350.0), Vec2::ZERO, TAU);

        flock.tick(&settings, None, &[]);

        let boid = flock.get(me).unwrap();
        assert!(boid.velocity.y < 0.0, "{search:?}: {:?}", boid.velocity);
        assert!(boid.velocity.x.abs() < 1e-6);
        assert!(boid.velocity.length() <= settings.max_velocity + 1e-4);
    }
}

#[test]
fn menu_and_field_round_trip() {
    let mut game = Game::new(Settings::default()).unwrap();
    let mut now = 0.0;
    let mut next_frame = |game: &mut Game| {
        now += 20.0;
        game.frame(now);
    };

    next_frame(&mut game);
    assert_eq!(game.scenes().len(), 1);

    start_field(&mut game);
    next_frame(&mut game);
    assert_eq!(game.scenes().len(), 2);
    assert_eq!(game.scenes().current().map(|s| s.name()), Some("base scene"));

    // Holding Cancel does nothing until it is let go
    game.keyboard_mut().key_down(Key::Cancel);
    next_frame(&mut game);
    assert_eq!(game.scenes().len(), 2);

    game.keyboard_mut().key_up(Key::Cancel);
    next_frame(&mut game);
    assert_eq!(game.scenes().current().map(|s| s.name()), Some("main menu"));

    let mut drawables = Vec::new();
    game.drawables(&mut drawables);
    assert!(drawables.is_empty());
}

#[test]
fn field_respects_speed_clamp() {
    let settings = Settings {
        max_velocity: 4.0,
        boid_count: 120,
        ..Settings::default()
    };
    let mut game = Game::new(settings.clone()).unwrap();
    start_field(&mut game);
    game.keyboard_mut().key_down(Key::Left);

    let mut drawables = Vec::new();
    for now in timestamps(120) {
        game.frame(now);
        game.drawables(&mut drawables);
        for drawable in drawables.iter().filter(|d| d.kind == DrawableKind::Boid) {
            // Wrapping resets previous_position, so edge crossings show no jump
            let step = drawable.position.distance(drawable.previous_position);
            assert!(step <= settings.max_velocity + 1e-3, "{drawable:?}");
            assert!(drawable.position.is_finite());
        }
    }
}

#[test]
fn settings_file_configures_the_game() {
    let settings = Settings::from_json_str(r#"{ "boid_count": 5, "time_scale": 0.5 }"#).unwrap();
    let mut game = Game::new(settings).unwrap();
    start_field(&mut game);
    game.frame(20.0);

    let mut drawables = Vec::new();
    game.drawables(&mut drawables);
    let boids = drawables.iter().filter(|d| d.kind == DrawableKind::Boid).count();
    assert_eq!(boids, 5);
    assert!((game.game_time() - 1000.0 / 120.0).abs() < 1e-9);
}
