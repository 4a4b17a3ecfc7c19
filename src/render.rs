//! Render snapshot handed to the front-end once per tick.
//!
//! The snapshot is a plain copy of what is visible.  Renderers never get a
//! handle back into the session.

use crate::entities::{Entity, EntityId, Rect};
use crate::session::{Session, SessionState};
use crate::spawner::DifficultyCurve;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    Enemy,
    Projectile,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub id: EntityId,
    pub kind: SpriteKind,
    pub rect: Rect,
    /// False on the "off" half of the invulnerability blink.
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerHud {
    pub lives: u32,
    pub score: u32,
    pub invulnerable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    pub state: SessionState,
    pub width: f32,
    pub height: f32,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub players: Vec<PlayerHud>,
    /// Active entities only, players first, then enemies, then projectiles.
    pub sprites: Vec<Sprite>,
    pub difficulty: f32,
    pub elapsed: f32,
}

impl RenderSnapshot {
    pub fn capture<C: DifficultyCurve>(session: &Session<C>) -> Self {
        let mut sprites = Vec::new();
        for p in session.players().iter().filter(|p| p.is_active()) {
            sprites.push(Sprite {
                id: p.id(),
                kind: SpriteKind::Player,
                rect: p.bounds(),
                visible: p.flash_visible(),
            });
        }
        for e in session.enemies().values().filter(|e| e.is_active()) {
            sprites.push(Sprite {
                id: e.id(),
                kind: SpriteKind::Enemy,
                rect: e.bounds(),
                visible: true,
            });
        }
        for p in session.projectiles().values().filter(|p| p.is_active()) {
            sprites.push(Sprite {
                id: p.id(),
                kind: SpriteKind::Projectile,
                rect: p.bounds(),
                visible: true,
            });
        }

        let ledger = session.ledger();
        Self {
            state: session.state(),
            width: session.config().screen.width,
            height: session.config().screen.height,
            score: ledger.score(),
            high_score: ledger.high_score(),
            new_high_score: ledger.is_new_high_score(),
            players: session
                .players()
                .iter()
                .map(|p| PlayerHud {
                    lives: p.lives,
                    score: p.score,
                    invulnerable: p.is_invulnerable(),
                })
                .collect(),
            sprites,
            difficulty: session.spawner().factor(),
            elapsed: session.elapsed(),
        }
    }

    /// Lives of the first ship, for single-player HUDs.
    pub fn lives(&self) -> u32 {
        self.players.first().map(|p| p.lives).unwrap_or(0)
    }

    pub fn count(&self, kind: SpriteKind) -> usize {
        self.sprites.iter().filter(|s| s.kind == kind).count()
    }
}

/// Consumer of render snapshots.
pub trait Renderer {
    fn render(&mut self, snapshot: &RenderSnapshot) -> std::io::Result<()>;
}

/// Keeps the latest snapshot.  For headless runs and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub frames: usize,
    pub last: Option<RenderSnapshot>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &RenderSnapshot) -> std::io::Result<()> {
        self.frames += 1;
        self.last = Some(snapshot.clone());
        Ok(())
    }
}
