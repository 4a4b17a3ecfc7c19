//! Game entities: the player ship, falling enemies and player projectiles.
//!
//! Every entity implements [`Entity`], the shared update/collision contract.
//! Entities are never removed in place: they are marked inactive and the
//! session purges them once per frame after collisions are resolved.

use std::collections::BTreeMap;

use crate::config::{GameConfig, ProjectileConfig};
use crate::input::PlayerInput;

// ── Identity ──────────────────────────────────────────────────────────────────

/// Stable identifier handed out by [`IdAllocator`].  Ids are never reused
/// within a session, so they stay valid as map keys after mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Index of a player within the session.  Projectiles keep one to credit
/// hits to whoever fired them; it identifies, it does not own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerSlot(pub usize);

/// Id-ordered storage.  Iteration order is creation order, which keeps
/// collision results and rendering deterministic.
pub type Arena<T> = BTreeMap<EntityId, T>;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `(x, y)` is the top-left corner, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Half-open overlap test: rectangles that only share an edge do not
    /// intersect.  Symmetric in its arguments.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    fn translate(&mut self, d: Vec2) {
        self.x += d.x;
        self.y += d.y;
    }
}

// ── Shared contract ───────────────────────────────────────────────────────────

pub trait Entity {
    fn id(&self) -> EntityId;

    fn bounds(&self) -> Rect;

    fn is_active(&self) -> bool;

    fn deactivate(&mut self);

    /// Step the entity forward by `dt` seconds.  Only the player reads `input`.
    fn advance(&mut self, dt: f32, input: &PlayerInput);
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    id: EntityId,
    slot: PlayerSlot,
    rect: Rect,
    active: bool,
    speed: f32,
    field_width: f32,
    invulnerability: f32,
    shoot_cooldown: f32,
    pub lives: u32,
    /// Seconds of damage immunity left.
    pub invulnerable_timer: f32,
    /// Seconds until the next shot is allowed.
    pub cooldown_timer: f32,
    /// Points credited to this player's projectiles.
    pub score: u32,
}

impl Player {
    /// A fresh ship centred on `(cx, cy)` with the configured lives.
    pub fn spawn(id: EntityId, slot: PlayerSlot, cx: f32, cy: f32, cfg: &GameConfig) -> Self {
        let p = &cfg.player;
        Self {
            id,
            slot,
            rect: Rect::from_center(cx, cy, p.width, p.height),
            active: true,
            speed: p.speed,
            field_width: cfg.screen.width,
            invulnerability: p.invulnerability,
            shoot_cooldown: p.shoot_cooldown,
            lives: p.starting_lives,
            invulnerable_timer: 0.0,
            cooldown_timer: 0.0,
            score: 0,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn can_shoot(&self) -> bool {
        self.active && self.cooldown_timer <= 0.0
    }

    /// Fire a projectile from the ship's nose, or `None` while on cooldown.
    pub fn shoot(&mut self, id: EntityId, cfg: &ProjectileConfig) -> Option<Projectile> {
        if !self.can_shoot() {
            return None;
        }
        self.cooldown_timer = self.shoot_cooldown;
        Some(Projectile::new(
            id,
            self.slot,
            self.rect.center_x(),
            self.rect.top(),
            Vec2::new(0.0, -cfg.speed),
            cfg,
        ))
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    /// Apply one point of contact damage.  Ignored while invulnerable;
    /// otherwise costs a life and restarts the invulnerability window.
    /// Returns whether the hit landed.
    pub fn take_hit(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.lose_life();
        self.invulnerable_timer = self.invulnerability;
        true
    }

    /// Floored at zero.
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn is_out(&self) -> bool {
        self.lives == 0
    }

    /// Blink at 10 Hz while invulnerable.
    pub fn flash_visible(&self) -> bool {
        !self.is_invulnerable() || (self.invulnerable_timer * 10.0) as u32 % 2 == 1
    }
}

impl Entity for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn advance(&mut self, dt: f32, input: &PlayerInput) {
        let mut dx = 0.0;
        if input.move_left {
            dx -= self.speed * dt;
        }
        if input.move_right {
            dx += self.speed * dt;
        }
        let max_x = (self.field_width - self.rect.w).max(0.0);
        self.rect.x = (self.rect.x + dx).clamp(0.0, max_x);

        self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
        self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
    }
}

// ── Enemy ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    id: EntityId,
    rect: Rect,
    active: bool,
    /// Downward speed in px/s.
    pub speed: f32,
    pub points: u32,
}

impl Enemy {
    /// A square enemy of side `size` whose top-left corner is `(x, y)`.
    pub fn new(id: EntityId, x: f32, y: f32, size: f32, speed: f32, points: u32) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, size, size),
            active: true,
            speed,
            points,
        }
    }
}

impl Entity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn advance(&mut self, dt: f32, _input: &PlayerInput) {
        self.rect.y += self.speed * dt;
    }
}

// ── Projectile ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Projectile {
    id: EntityId,
    rect: Rect,
    active: bool,
    pub velocity: Vec2,
    pub owner: PlayerSlot,
}

impl Projectile {
    /// Centred horizontally on `cx` with its middle at `cy`.
    pub fn new(
        id: EntityId,
        owner: PlayerSlot,
        cx: f32,
        cy: f32,
        velocity: Vec2,
        cfg: &ProjectileConfig,
    ) -> Self {
        Self {
            id,
            rect: Rect::from_center(cx, cy, cfg.width, cfg.height),
            active: true,
            velocity,
            owner,
        }
    }
}

impl Entity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn deactivate(&mut self) {
        self.active = false;
    }

    fn advance(&mut self, dt: f32, _input: &PlayerInput) {
        self.rect.translate(Vec2::new(self.velocity.x * dt, self.velocity.y * dt));
    }
}
