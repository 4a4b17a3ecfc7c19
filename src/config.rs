//! Static game tuning.
//!
//! Every knob the simulation reads lives in [`GameConfig`].  It is built once
//! at startup (defaults, optionally overridden by a TOML file), validated,
//! and then handed by reference to every component that needs it.  Nothing
//! mutates it after that.
//!
//! Units: distances are playfield pixels, speeds are pixels per second,
//! durations are seconds.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "SPACE_DEFENDER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "space_defender.toml";

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
    /// How far past the edge an entity may drift before it is retired.
    pub offscreen_margin: f32,
    /// Logical cadence of the real-time loop.
    pub fps: u32,
    /// Upper bound on a single simulation step.  Longer stalls are clamped
    /// so fast entities cannot tunnel through each other.
    pub max_step: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            offscreen_margin: 100.0,
            fps: 60,
            max_step: 1.0 / 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    /// Spawn point as a fraction of the screen (0.0 = left/top).
    pub start_x_ratio: f32,
    pub start_y_ratio: f32,
    pub starting_lives: u32,
    pub invulnerability: f32,
    pub shoot_cooldown: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 40.0,
            speed: 300.0,
            start_x_ratio: 0.5,
            start_y_ratio: 0.85,
            starting_lives: 3,
            invulnerability: 2.0,
            shoot_cooldown: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProjectileConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 12.0,
            speed: 480.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub size: Range,
    pub speed: Range,
    pub points: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            size: Range::new(20.0, 40.0),
            speed: Range::new(60.0, 180.0),
            points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    pub base_interval: f32,
    /// The spawn interval never drops below this, however hard the game gets.
    pub min_interval: f32,
    /// Enemy speed never exceeds this, however hard the game gets.
    pub max_enemy_speed: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            base_interval: 1.5,
            min_interval: 0.25,
            max_enemy_speed: 480.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DifficultyConfig {
    /// One difficulty step per this many points.  0 disables score scaling.
    pub points_per_step: u32,
    /// One difficulty step per this many seconds of play.  0 disables time scaling.
    pub seconds_per_step: f32,
    /// Factor applied per step.  Must be >= 1.
    pub step_factor: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            points_per_step: 100,
            seconds_per_step: 30.0,
            step_factor: 1.0 / 0.9,
        }
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub projectile: ProjectileConfig,
    pub enemy: EnemyConfig,
    pub spawn: SpawnConfig,
    pub difficulty: DifficultyConfig,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let cfg: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate `path`.  A missing file is not an error: the
    /// built-in defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let cfg = Self::from_toml_str(&text, path)?;
                info!(path = %path.display(), "loaded config");
                Ok(cfg)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                let cfg = Self::default();
                cfg.validate()?;
                Ok(cfg)
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reject values that would make the simulation meaningless or unplayable.
    /// All problems are collected so the user sees them in one go.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        fn positive(problems: &mut Vec<String>, label: &str, v: f32) {
            if !v.is_finite() || v <= 0.0 {
                problems.push(format!("{label} must be a positive number (got {v})"));
            }
        }
        fn range(problems: &mut Vec<String>, label: &str, r: &Range) {
            positive(problems, &format!("{label}.min"), r.min);
            positive(problems, &format!("{label}.max"), r.max);
            if r.min > r.max {
                problems.push(format!(
                    "{label}.min ({}) greater than {label}.max ({})",
                    r.min, r.max
                ));
            }
        }

        positive(&mut problems, "screen.width", self.screen.width);
        positive(&mut problems, "screen.height", self.screen.height);
        positive(&mut problems, "screen.max_step", self.screen.max_step);
        if !self.screen.offscreen_margin.is_finite() || self.screen.offscreen_margin < 0.0 {
            problems.push("screen.offscreen_margin must be >= 0".into());
        }
        if self.screen.fps == 0 {
            problems.push("screen.fps must be > 0".into());
        }

        positive(&mut problems, "player.width", self.player.width);
        positive(&mut problems, "player.height", self.player.height);
        positive(&mut problems, "player.speed", self.player.speed);
        positive(&mut problems, "player.invulnerability", self.player.invulnerability);
        positive(&mut problems, "player.shoot_cooldown", self.player.shoot_cooldown);
        for (label, v) in [
            ("player.start_x_ratio", self.player.start_x_ratio),
            ("player.start_y_ratio", self.player.start_y_ratio),
        ] {
            if !(0.0..=1.0).contains(&v) {
                problems.push(format!("{label} must be within 0..=1 (got {v})"));
            }
        }
        if self.player.starting_lives == 0 {
            problems.push("player.starting_lives must be > 0".into());
        }

        positive(&mut problems, "projectile.width", self.projectile.width);
        positive(&mut problems, "projectile.height", self.projectile.height);
        positive(&mut problems, "projectile.speed", self.projectile.speed);

        range(&mut problems, "enemy.size", &self.enemy.size);
        range(&mut problems, "enemy.speed", &self.enemy.speed);
        if self.enemy.size.max > self.screen.width {
            problems.push(format!(
                "enemy.size.max ({}) does not fit the screen width ({})",
                self.enemy.size.max, self.screen.width
            ));
        }

        positive(&mut problems, "spawn.base_interval", self.spawn.base_interval);
        positive(&mut problems, "spawn.min_interval", self.spawn.min_interval);
        if self.spawn.min_interval > self.spawn.base_interval {
            problems.push("spawn.min_interval must not exceed spawn.base_interval".into());
        }
        if self.spawn.max_enemy_speed < self.enemy.speed.max {
            problems.push("spawn.max_enemy_speed must be >= enemy.speed.max".into());
        }

        if !self.difficulty.step_factor.is_finite() || self.difficulty.step_factor < 1.0 {
            problems.push("difficulty.step_factor must be >= 1".into());
        }
        if !self.difficulty.seconds_per_step.is_finite() || self.difficulty.seconds_per_step < 0.0 {
            problems.push("difficulty.seconds_per_step must be >= 0".into());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let text = r#"
            seed = 7

            [screen]
            width = 640.0

            [player]
            starting_lives = 5
        "#;
        let cfg = GameConfig::from_toml_str(text, Path::new("inline.toml")).expect("parse");
        assert_eq!(cfg.screen.width, 640.0);
        assert_eq!(cfg.screen.height, ScreenConfig::default().height);
        assert_eq!(cfg.player.starting_lives, 5);
        assert_eq!(cfg.player.speed, PlayerConfig::default().speed);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn invalid_values_are_all_reported() {
        let mut cfg = GameConfig::default();
        cfg.screen.width = 0.0;
        cfg.player.starting_lives = 0;
        cfg.spawn.min_interval = 10.0;
        cfg.enemy.speed = Range::new(5.0, 1.0);

        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("screen.width"), "{err}");
        assert!(err.contains("starting_lives"), "{err}");
        assert!(err.contains("spawn.min_interval"), "{err}");
        assert!(err.contains("enemy.speed.min"), "{err}");
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[screen\nwidth = ").unwrap();
        let err = GameConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err =
            GameConfig::from_toml_str("[player]\nstarting_lives = \"three\"", Path::new("x"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = GameConfig::load("this/file/does/not/exist.toml").expect("defaults");
        assert_eq!(cfg, GameConfig::default());
    }
}
