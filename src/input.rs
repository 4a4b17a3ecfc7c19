//! Per-tick input snapshots and the provider contract.
//!
//! Movement and shooting are level-triggered (true for as long as the key
//! is held).  `pause`, `confirm`, `menu` and `quit` are edge-triggered: the
//! provider reports them on exactly one snapshot per key press.

/// Controls belonging to one ship.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub move_left: bool,
    pub move_right: bool,
    pub shoot: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// One entry per player slot.  Missing entries read as idle.
    pub players: Vec<PlayerInput>,
    pub pause: bool,
    pub confirm: bool,
    pub menu: bool,
    pub quit: bool,
}

impl InputSnapshot {
    /// Snapshot driving only the first player.
    pub fn single(player: PlayerInput) -> Self {
        Self {
            players: vec![player],
            ..Self::default()
        }
    }

    pub fn confirm() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    pub fn pause() -> Self {
        Self {
            pause: true,
            ..Self::default()
        }
    }

    pub fn menu() -> Self {
        Self {
            menu: true,
            ..Self::default()
        }
    }

    pub fn quit() -> Self {
        Self {
            quit: true,
            ..Self::default()
        }
    }

    pub fn player(&self, slot: usize) -> PlayerInput {
        self.players.get(slot).copied().unwrap_or_default()
    }
}

/// Source of input snapshots, polled once per tick by the engine loop.
pub trait InputProvider {
    fn poll(&mut self) -> std::io::Result<InputSnapshot>;
}

/// Replays a fixed list of snapshots, then reports quit.  Handy for headless
/// runs and tests.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputProvider for ScriptedInput {
    fn poll(&mut self) -> std::io::Result<InputSnapshot> {
        Ok(self.frames.pop_front().unwrap_or_else(InputSnapshot::quit))
    }
}
