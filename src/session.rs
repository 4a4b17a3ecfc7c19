//! Game session: the MENU / PLAYING / PAUSED / GAME_OVER state machine and
//! the world it owns.
//!
//! All world mutation happens in [`Session::update`], and only while
//! PLAYING.  The session never reads a clock: time arrives as `dt`.

use rand::Rng;
use tracing::info;

use crate::collision::{collisions_with, group_collisions, is_out_of_bounds};
use crate::config::GameConfig;
use crate::entities::{
    Arena, Enemy, Entity, EntityId, IdAllocator, Player, PlayerSlot, Projectile,
};
use crate::input::{InputSnapshot, PlayerInput};
use crate::score::Ledger;
use crate::spawner::{DifficultyCurve, Spawner, StepCurve};

/// Bound on substeps per update, for configs with extreme speeds.
const MAX_SUBSTEPS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// A projectile destroying an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub owner: PlayerSlot,
    pub enemy: EntityId,
    pub points: u32,
}

/// What one PLAYING update did, across all its substeps, for the engine to
/// react to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub hits: Vec<Hit>,
    pub damaged: Vec<PlayerSlot>,
    pub spawned: Vec<EntityId>,
    pub game_over: bool,
}

#[derive(Clone, Debug)]
pub struct Session<C = StepCurve> {
    cfg: GameConfig,
    state: SessionState,
    player_count: usize,
    players: Vec<Player>,
    enemies: Arena<Enemy>,
    projectiles: Arena<Projectile>,
    ledger: Ledger,
    spawner: Spawner<C>,
    ids: IdAllocator,
    elapsed: f32,
}

impl Session<StepCurve> {
    /// Single-player session sitting in the menu.
    pub fn new(cfg: &GameConfig, high_score: u32) -> Self {
        Self::with_spawner(cfg, high_score, 1, Spawner::new(cfg))
    }
}

impl<C: DifficultyCurve> Session<C> {
    pub fn with_spawner(
        cfg: &GameConfig,
        high_score: u32,
        player_count: usize,
        spawner: Spawner<C>,
    ) -> Self {
        Self {
            cfg: cfg.clone(),
            state: SessionState::Menu,
            player_count: player_count.max(1),
            players: Vec::new(),
            enemies: Arena::new(),
            projectiles: Arena::new(),
            ledger: Ledger::new(high_score),
            spawner,
            ids: IdAllocator::default(),
            elapsed: 0.0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> Option<&mut Player> {
        self.players.get_mut(slot.0)
    }

    pub fn enemies(&self) -> &Arena<Enemy> {
        &self.enemies
    }

    pub fn projectiles(&self) -> &Arena<Projectile> {
        &self.projectiles
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn spawner(&self) -> &Spawner<C> {
        &self.spawner
    }

    /// Seconds spent PLAYING since the last reset.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Every ship is out of lives.
    pub fn is_session_over(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(Player::is_out)
    }

    // ── State machine ─────────────────────────────────────────────────────────

    /// Apply the edge-triggered commands in `input`.  Returns the new state
    /// when a transition happened.
    pub fn handle_commands(&mut self, input: &InputSnapshot) -> Option<SessionState> {
        let next = match self.state {
            SessionState::Menu if input.confirm => {
                self.reset();
                SessionState::Playing
            }
            SessionState::Playing if input.pause => SessionState::Paused,
            SessionState::Paused if input.pause => SessionState::Playing,
            SessionState::GameOver if input.confirm => {
                self.reset();
                SessionState::Playing
            }
            SessionState::GameOver if input.menu => SessionState::Menu,
            _ => return None,
        };
        info!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
        Some(next)
    }

    /// Fresh ships, empty world, zero score, opening spawn pace.  The high
    /// score survives.
    pub fn reset(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
        self.ledger.reset_score();
        self.spawner.reset();
        self.elapsed = 0.0;

        let cy = self.cfg.screen.height * self.cfg.player.start_y_ratio;
        let n = self.player_count;
        self.players = (0..n)
            .map(|i| {
                let cx = if n == 1 {
                    self.cfg.screen.width * self.cfg.player.start_x_ratio
                } else {
                    self.cfg.screen.width * (i + 1) as f32 / (n + 1) as f32
                };
                Player::spawn(self.ids.allocate(), PlayerSlot(i), cx, cy, &self.cfg)
            })
            .collect();
        info!(players = n, high_score = self.ledger.high_score(), "session reset");
    }

    // ── World ─────────────────────────────────────────────────────────────────

    /// Insert an enemy with its top-left corner at `(x, y)`.
    pub fn spawn_enemy_at(&mut self, x: f32, y: f32, size: f32, speed: f32) -> EntityId {
        let enemy = Enemy::new(self.ids.allocate(), x, y, size, speed, self.cfg.enemy.points);
        let id = enemy.id();
        self.enemies.insert(id, enemy);
        id
    }

    /// Fire from `slot` if its cooldown allows.
    pub fn fire(&mut self, slot: PlayerSlot) -> Option<EntityId> {
        let id = self.ids.allocate();
        let projectile = self.players.get_mut(slot.0)?.shoot(id, &self.cfg.projectile)?;
        self.projectiles.insert(id, projectile);
        Some(id)
    }

    /// Negative, NaN and infinite steps count as no time; long stalls are
    /// cut to `screen.max_step`.
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            0.0
        } else {
            dt.min(self.cfg.screen.max_step)
        }
    }

    /// Longest substep for which the fastest projectile and the fastest
    /// enemy cannot pass through each other: their closing distance stays
    /// under half of the smallest combined vertical extent.
    pub fn max_substep(&self) -> f32 {
        let closing = self.cfg.projectile.speed + self.cfg.spawn.max_enemy_speed;
        let overlap = self.cfg.projectile.height + self.cfg.enemy.size.min;
        if closing > 0.0 && overlap > 0.0 {
            0.5 * overlap / closing
        } else {
            self.cfg.screen.max_step
        }
    }

    /// Advance the world by `dt` seconds.  A no-op outside PLAYING.
    ///
    /// `dt` is clamped first, then split into equal substeps no longer than
    /// [`Session::max_substep`].
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, rng: &mut impl Rng) -> StepReport {
        let mut report = StepReport::default();
        if self.state != SessionState::Playing {
            return report;
        }
        let dt = self.clamp_dt(dt);
        let substeps = ((dt / self.max_substep()).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let step = dt / substeps as f32;
        for _ in 0..substeps {
            self.step(step, input, rng, &mut report);
            if report.game_over {
                break;
            }
        }
        report
    }

    fn step(&mut self, dt: f32, input: &InputSnapshot, rng: &mut impl Rng, report: &mut StepReport) {
        self.elapsed += dt;

        for i in 0..self.players.len() {
            let controls = input.player(i);
            let player = &mut self.players[i];
            if !player.is_active() {
                continue;
            }
            player.advance(dt, &controls);
            if controls.shoot {
                self.fire(PlayerSlot(i));
            }
        }

        let idle = PlayerInput::default();
        for enemy in self.enemies.values_mut().filter(|e| e.is_active()) {
            enemy.advance(dt, &idle);
        }
        for projectile in self.projectiles.values_mut().filter(|p| p.is_active()) {
            projectile.advance(dt, &idle);
        }

        if let Some(enemy) =
            self.spawner
                .update(dt, self.elapsed, self.ledger.score(), &mut self.ids, rng)
        {
            report.spawned.push(enemy.id());
            self.enemies.insert(enemy.id(), enemy);
        }

        self.resolve_projectile_hits(report);
        self.resolve_player_contacts(report);
        self.cleanup();

        if self.is_session_over() {
            info!(score = self.ledger.score(), high_score = self.ledger.high_score(), "game over");
            self.state = SessionState::GameOver;
            report.game_over = true;
        }
    }

    /// Each projectile destroys at most one enemy per step: the first one it
    /// overlaps that is still alive.
    fn resolve_projectile_hits(&mut self, report: &mut StepReport) {
        let hits = group_collisions(self.projectiles.values(), self.enemies.values());
        for (projectile_id, enemy_ids) in hits {
            let target = enemy_ids
                .iter()
                .copied()
                .find(|id| self.enemies.get(id).is_some_and(|e| e.is_active()));
            let (Some(enemy_id), Some(projectile)) = (target, self.projectiles.get_mut(&projectile_id))
            else {
                continue;
            };
            projectile.deactivate();
            let owner = projectile.owner;

            let Some(enemy) = self.enemies.get_mut(&enemy_id) else {
                continue;
            };
            enemy.deactivate();
            let points = enemy.points;

            self.ledger.add_points(points);
            if let Some(player) = self.players.get_mut(owner.0) {
                player.score = player.score.saturating_add(points);
            }
            report.hits.push(Hit {
                owner,
                enemy: enemy_id,
                points,
            });
        }
    }

    /// Enemies ramming a vulnerable ship are destroyed and cost it one life,
    /// however many arrive on the same step.
    fn resolve_player_contacts(&mut self, report: &mut StepReport) {
        for player in self.players.iter_mut().filter(|p| p.is_active()) {
            if player.is_invulnerable() {
                continue;
            }
            let contacts = collisions_with(&*player, self.enemies.values());
            if contacts.is_empty() {
                continue;
            }
            for id in &contacts {
                if let Some(enemy) = self.enemies.get_mut(id) {
                    enemy.deactivate();
                }
            }
            player.take_hit();
            info!(slot = player.slot().0, lives = player.lives, "player hit");
            if player.is_out() {
                player.deactivate();
            }
            report.damaged.push(player.slot());
        }
    }

    /// Retire anything that drifted off the playfield, then drop every
    /// inactive enemy and projectile.
    fn cleanup(&mut self) {
        let (w, h) = (self.cfg.screen.width, self.cfg.screen.height);
        let margin = self.cfg.screen.offscreen_margin;
        for enemy in self.enemies.values_mut() {
            if is_out_of_bounds(&enemy.bounds(), w, h, margin) {
                enemy.deactivate();
            }
        }
        for projectile in self.projectiles.values_mut() {
            if is_out_of_bounds(&projectile.bounds(), w, h, margin) {
                projectile.deactivate();
            }
        }
        self.enemies.retain(|_, e| e.is_active());
        self.projectiles.retain(|_, p| p.is_active());
    }
}
