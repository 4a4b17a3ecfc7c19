//! Enemy spawning and difficulty scaling.
//!
//! A countdown timer drops one enemy per expiry.  After each spawn the timer
//! is re-armed with `base_interval / difficulty_factor`, floored at the
//! configured minimum, and new enemies get a speed range scaled by the same
//! factor, capped at the configured ceiling.

use rand::Rng;
use tracing::debug;

use crate::config::{DifficultyConfig, GameConfig, Range};
use crate::entities::{Enemy, IdAllocator};

/// Upper bound on any factor a curve may report.  Keeps the arithmetic
/// finite; the floor and ceiling already bind long before this.
const MAX_FACTOR: f32 = 1.0e6;

/// Difficulty policy.  Implementations must be non-decreasing in both
/// arguments and return at least 1.0.
pub trait DifficultyCurve {
    fn difficulty_factor(&self, elapsed: f32, score: u32) -> f32;
}

/// One step per `points_per_step` points plus one per `seconds_per_step`
/// seconds of play; each step multiplies the factor by `step_factor`.
#[derive(Clone, Debug, PartialEq)]
pub struct StepCurve {
    pub points_per_step: u32,
    pub seconds_per_step: f32,
    pub step_factor: f32,
}

impl StepCurve {
    pub fn from_config(cfg: &DifficultyConfig) -> Self {
        Self {
            points_per_step: cfg.points_per_step,
            seconds_per_step: cfg.seconds_per_step,
            step_factor: cfg.step_factor,
        }
    }

    pub fn steps(&self, elapsed: f32, score: u32) -> u32 {
        let by_score = score.checked_div(self.points_per_step).unwrap_or(0);
        let by_time = if self.seconds_per_step > 0.0 && elapsed > 0.0 {
            (elapsed / self.seconds_per_step) as u32
        } else {
            0
        };
        by_score.saturating_add(by_time)
    }
}

impl DifficultyCurve for StepCurve {
    fn difficulty_factor(&self, elapsed: f32, score: u32) -> f32 {
        let steps = self.steps(elapsed, score).min(i32::MAX as u32) as i32;
        self.step_factor.powi(steps).clamp(1.0, MAX_FACTOR)
    }
}

#[derive(Clone, Debug)]
pub struct Spawner<C = StepCurve> {
    curve: C,
    timer: f32,
    factor: f32,
    base_interval: f32,
    min_interval: f32,
    max_enemy_speed: f32,
    size: Range,
    speed: Range,
    points: u32,
    field_width: f32,
}

impl Spawner<StepCurve> {
    pub fn new(cfg: &GameConfig) -> Self {
        Self::with_curve(cfg, StepCurve::from_config(&cfg.difficulty))
    }
}

impl<C: DifficultyCurve> Spawner<C> {
    pub fn with_curve(cfg: &GameConfig, curve: C) -> Self {
        Self {
            curve,
            timer: cfg.spawn.base_interval,
            factor: 1.0,
            base_interval: cfg.spawn.base_interval,
            min_interval: cfg.spawn.min_interval,
            max_enemy_speed: cfg.spawn.max_enemy_speed,
            size: cfg.enemy.size.clone(),
            speed: cfg.enemy.speed.clone(),
            points: cfg.enemy.points,
            field_width: cfg.screen.width,
        }
    }

    /// Back to the opening pace.
    pub fn reset(&mut self) {
        self.timer = self.base_interval;
        self.factor = 1.0;
    }

    /// Seconds until the next spawn.
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Factor as of the last update.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Policy output clamped to `[1, MAX_FACTOR]`, so a misbehaving curve
    /// cannot make the game easier or push the math to infinity.
    pub fn factor_at(&self, elapsed: f32, score: u32) -> f32 {
        let f = self.curve.difficulty_factor(elapsed, score);
        if f.is_finite() {
            f.clamp(1.0, MAX_FACTOR)
        } else {
            MAX_FACTOR
        }
    }

    pub fn interval_for(&self, factor: f32) -> f32 {
        (self.base_interval / factor).max(self.min_interval)
    }

    pub fn speed_range_for(&self, factor: f32) -> Range {
        Range::new(
            (self.speed.min * factor).min(self.max_enemy_speed),
            (self.speed.max * factor).min(self.max_enemy_speed),
        )
    }

    /// Advance the countdown.  Returns the enemy to insert when it expires.
    pub fn update(
        &mut self,
        dt: f32,
        elapsed: f32,
        score: u32,
        ids: &mut IdAllocator,
        rng: &mut impl Rng,
    ) -> Option<Enemy> {
        let factor = self.factor_at(elapsed, score);
        if factor > self.factor {
            debug!(factor, interval = self.interval_for(factor), "difficulty increased");
        }
        self.factor = self.factor.max(factor);

        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.timer = self.interval_for(self.factor);
        Some(self.spawn(ids, rng))
    }

    fn spawn(&self, ids: &mut IdAllocator, rng: &mut impl Rng) -> Enemy {
        let size = rng.gen_range(self.size.min..=self.size.max);
        let max_x = (self.field_width - size).max(0.0);
        let x = rng.gen_range(0.0..=max_x);
        let speeds = self.speed_range_for(self.factor);
        let speed = rng.gen_range(speeds.min..=speeds.max);
        let enemy = Enemy::new(ids.allocate(), x, -size, size, speed, self.points);
        debug!(x, size, speed, "spawned enemy");
        enemy
    }
}
