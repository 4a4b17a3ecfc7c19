use space_defender::config::GameConfig;
use space_defender::engine::Engine;
use space_defender::entities::{Entity, PlayerSlot};
use space_defender::error::EngineError;
use space_defender::input::{InputProvider, InputSnapshot, PlayerInput, ScriptedInput};
use space_defender::render::{RecordingRenderer, SpriteKind};
use space_defender::session::SessionState;
use space_defender::store::MemoryStore;

use rand::rngs::StdRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn engine_with(cfg: &GameConfig, store: MemoryStore) -> Engine<MemoryStore> {
    Engine::with_rng(cfg, store, StdRng::seed_from_u64(7))
}

fn started(store: MemoryStore) -> Engine<MemoryStore> {
    let mut engine = engine_with(&GameConfig::default(), store);
    let frame = engine.tick(DT, &InputSnapshot::confirm());
    assert_eq!(frame.transition, Some(SessionState::Playing));
    engine
}

/// Put the only ship on its last life and park an enemy on it.
fn doom_player(engine: &mut Engine<MemoryStore>) {
    let session = engine.session_mut();
    session.player_mut(PlayerSlot(0)).expect("player").lives = 1;
    let r = session.players()[0].bounds();
    session.spawn_enemy_at(r.x + 5.0, r.y + 5.0, 20.0, 0.0);
}

// ── Time ──────────────────────────────────────────────────────────────────────

#[test]
fn dt_is_sanitised() {
    let cfg = GameConfig::default();
    let engine = engine_with(&cfg, MemoryStore::default());
    assert_eq!(engine.clamp_dt(f32::NAN), 0.0);
    assert_eq!(engine.clamp_dt(f32::INFINITY), 0.0);
    assert_eq!(engine.clamp_dt(-0.5), 0.0);
    assert_eq!(engine.clamp_dt(0.01), 0.01);
    assert_eq!(engine.clamp_dt(10.0), cfg.screen.max_step);
}

#[test]
fn long_stall_advances_only_one_max_step() {
    let mut engine = started(MemoryStore::default());
    let before = engine.session().elapsed();
    engine.tick(30.0, &InputSnapshot::default());
    let advanced = engine.session().elapsed() - before;
    assert!((advanced - engine.session().config().screen.max_step).abs() < 1e-6);
}

#[test]
fn bad_dt_freezes_the_world() {
    let mut engine = started(MemoryStore::default());
    let before = engine.snapshot();
    engine.tick(f32::NAN, &InputSnapshot::default());
    engine.tick(-1.0, &InputSnapshot::default());
    assert_eq!(engine.snapshot(), before);
}

// ── Frames ────────────────────────────────────────────────────────────────────

#[test]
fn snapshot_shows_the_playing_world() {
    let mut engine = started(MemoryStore::with_value(120));
    let shoot = InputSnapshot::single(PlayerInput {
        shoot: true,
        ..PlayerInput::default()
    });
    let frame = engine.tick(DT, &shoot);
    let snap = frame.snapshot;

    assert_eq!(snap.state, SessionState::Playing);
    assert_eq!(snap.high_score, 120);
    assert_eq!(snap.lives(), 3);
    assert_eq!(snap.count(SpriteKind::Player), 1);
    assert_eq!(snap.count(SpriteKind::Projectile), 1);
    assert_eq!(snap.sprites[0].kind, SpriteKind::Player);
    assert!(!frame.quit);
}

#[test]
fn pause_is_reported_as_a_transition() {
    let mut engine = started(MemoryStore::default());
    let frame = engine.tick(DT, &InputSnapshot::pause());
    assert_eq!(frame.transition, Some(SessionState::Paused));
    assert_eq!(frame.snapshot.state, SessionState::Paused);
    let frame = engine.tick(DT, &InputSnapshot::default());
    assert_eq!(frame.transition, None);
}

#[test]
fn same_seed_same_game() {
    let cfg = GameConfig {
        seed: Some(1234),
        ..GameConfig::default()
    };
    let play = || {
        let mut engine = Engine::new(&cfg, MemoryStore::default());
        engine.tick(DT, &InputSnapshot::confirm());
        let held = InputSnapshot::single(PlayerInput {
            move_left: false,
            move_right: true,
            shoot: true,
        });
        let mut frames = Vec::new();
        for i in 0..900 {
            let input = if i % 120 < 60 { held.clone() } else { InputSnapshot::default() };
            frames.push(engine.tick(DT, &input).snapshot);
        }
        frames
    };
    let (a, b) = (play(), play());
    assert_eq!(a, b);
    assert!(a.iter().any(|s| s.count(SpriteKind::Enemy) > 0));
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[test]
fn high_score_is_loaded_at_startup() {
    let engine = engine_with(&GameConfig::default(), MemoryStore::with_value(99));
    assert_eq!(engine.session().ledger().high_score(), 99);
    assert_eq!(engine.session().state(), SessionState::Menu);
}

#[test]
fn game_over_saves_the_high_score() {
    let mut engine = started(MemoryStore::default());
    engine.session_mut().ledger_mut().add_points(30);
    doom_player(&mut engine);

    let frame = engine.tick(DT, &InputSnapshot::default());

    assert!(frame.report.game_over);
    assert_eq!(frame.transition, Some(SessionState::GameOver));
    assert!(frame.snapshot.new_high_score);
    assert_eq!(engine.store().saves(), 1);
    assert_eq!(engine.store().value(), Some(30));
    assert!(!engine.session().ledger().needs_save());

    // Nothing new to flush on quit
    let frame = engine.tick(DT, &InputSnapshot::quit());
    assert!(frame.quit);
    assert_eq!(engine.store().saves(), 1);
}

#[test]
fn quitting_mid_game_flushes_a_beaten_high_score() {
    let mut engine = started(MemoryStore::with_value(10));
    engine.session_mut().ledger_mut().add_points(20);
    engine.tick(DT, &InputSnapshot::quit());
    assert_eq!(engine.store().saves(), 1);
    assert_eq!(engine.store().value(), Some(20));
}

#[test]
fn quitting_without_a_new_best_writes_nothing() {
    let mut engine = started(MemoryStore::with_value(500));
    engine.session_mut().ledger_mut().add_points(20);
    engine.tick(DT, &InputSnapshot::quit());
    assert_eq!(engine.store().saves(), 0);
}

#[test]
fn failed_save_is_survivable_and_retried_on_quit() {
    let mut engine = started(MemoryStore::failing());
    engine.session_mut().ledger_mut().add_points(40);
    doom_player(&mut engine);

    let frame = engine.tick(DT, &InputSnapshot::default());
    assert_eq!(frame.snapshot.state, SessionState::GameOver);
    assert_eq!(engine.store().saves(), 1);
    assert!(engine.session().ledger().needs_save());

    // The session keeps going after the failure
    let frame = engine.tick(DT, &InputSnapshot::confirm());
    assert_eq!(frame.transition, Some(SessionState::Playing));
    assert_eq!(frame.snapshot.high_score, 40);

    engine.tick(DT, &InputSnapshot::quit());
    assert_eq!(engine.store().saves(), 2);
}

// ── Real-time loop ────────────────────────────────────────────────────────────

fn fast_config() -> GameConfig {
    let mut cfg = GameConfig::default();
    cfg.screen.fps = 1000;
    cfg
}

#[test]
fn run_renders_every_frame_until_quit() {
    let cfg = fast_config();
    let mut engine = engine_with(&cfg, MemoryStore::default());
    let mut script = vec![InputSnapshot::confirm()];
    script.extend(std::iter::repeat(InputSnapshot::default()).take(9));
    let mut input = ScriptedInput::new(script);
    let mut renderer = RecordingRenderer::default();

    engine.run(&mut input, &mut renderer).expect("clean exit");

    assert_eq!(renderer.frames, 10);
    let last = renderer.last.expect("rendered");
    assert_eq!(last.state, SessionState::Playing);
}

struct Unplugged;

impl InputProvider for Unplugged {
    fn poll(&mut self) -> std::io::Result<InputSnapshot> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "keyboard gone"))
    }
}

#[test]
fn input_failure_ends_the_loop_and_flushes() {
    let cfg = fast_config();
    let mut engine = engine_with(&cfg, MemoryStore::default());
    engine.tick(DT, &InputSnapshot::confirm());
    engine.session_mut().ledger_mut().add_points(10);
    let mut renderer = RecordingRenderer::default();

    let result = engine.run(&mut Unplugged, &mut renderer);

    assert!(matches!(result, Err(EngineError::Input(_))));
    assert_eq!(renderer.frames, 0);
    assert_eq!(engine.store().value(), Some(10));
}
