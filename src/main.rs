mod display;

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{self, stdout, BufWriter};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Mutex;
use std::thread;

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use space_defender::config::{GameConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use space_defender::engine::Engine;
use space_defender::input::{InputProvider, InputSnapshot, PlayerInput};
use space_defender::store::JsonFileStore;

use display::TerminalRenderer;

const LOG_PATH_ENV: &str = "SPACE_DEFENDER_LOG";

/// A key counts as held if its last press/repeat event arrived within this
/// many polls.  Covers terminals that never send key-release events: OS key
/// repeat runs at 15 Hz or more, so 8 polls at 60 FPS (≈133 ms) is always
/// refreshed before it expires.
const HOLD_WINDOW: u64 = 8;

// ── Keyboard input ────────────────────────────────────────────────────────────

/// Turns the raw crossterm event stream into per-tick snapshots.
///
/// Movement and shooting come from a `key_frame` map holding the poll number
/// at which each key was last seen; commands fire once per press.  On
/// keyboard-enhancement terminals (kitty protocol) keys are dropped on
/// release, elsewhere they expire after `HOLD_WINDOW` polls of silence.
struct KeyboardInput {
    rx: mpsc::Receiver<Event>,
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
}

impl KeyboardInput {
    fn new(rx: mpsc::Receiver<Event>) -> Self {
        Self {
            rx,
            key_frame: HashMap::new(),
            frame: 0,
        }
    }

    fn is_held(&self, key: KeyCode) -> bool {
        self.key_frame
            .get(&key)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&k| self.is_held(k))
    }
}

impl InputProvider for KeyboardInput {
    fn poll(&mut self) -> io::Result<InputSnapshot> {
        self.frame += 1;
        let mut snapshot = InputSnapshot::default();

        loop {
            let ev = match self.rx.try_recv() {
                Ok(ev) => ev,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(io::Error::new(
                        io::ErrorKind::BrokenPipe,
                        "keyboard reader stopped",
                    ));
                }
            };
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = ev
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    self.key_frame.insert(code, self.frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            snapshot.quit = true;
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            snapshot.quit = true;
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => snapshot.pause = true,
                        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                            snapshot.confirm = true;
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => snapshot.menu = true,
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    self.key_frame.insert(code, self.frame);
                }
                KeyEventKind::Release => {
                    self.key_frame.remove(&code);
                }
            }
        }

        snapshot.players = vec![PlayerInput {
            move_left: self.any_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            move_right: self.any_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            shoot: self.is_held(KeyCode::Char(' ')),
        }];
        Ok(snapshot)
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Logs go to a file: anything written to the terminal would tear the frame.
fn init_logging() -> anyhow::Result<PathBuf> {
    let path = env::var(LOG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("space_defender.log"));
    let file = File::create(&path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    let log_path = init_logging()?;

    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = GameConfig::load(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    let store = JsonFileStore::new(JsonFileStore::default_path());
    info!(log = %log_path.display(), scores = %store.path().display(), "starting");
    let mut engine = Engine::new(&cfg, store);

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release (and repeat) events.  Terminals without the kitty
    // protocol reject this and fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the loop never waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped, program exiting
            }
        }
    });

    let result = {
        let mut input = KeyboardInput::new(rx);
        let mut renderer = TerminalRenderer::new(&mut out);
        engine.run(&mut input, &mut renderer)
    };

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("game loop failed")?;
    info!("clean exit");
    Ok(())
}
