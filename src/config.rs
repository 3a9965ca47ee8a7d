use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{physics, ship};
use crate::game::state::ShipId;
use crate::game::systems::ai::{AiTuning, Difficulty};
use crate::game::systems::arena::ArenaShape;
use crate::util::vec2::Vec2;

/// Configuration rejected at construction time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Arena radius must be positive and finite, got {0}")]
    InvalidArenaRadius(f32),
    #[error("Gravitational constant must be positive and finite, got {0}")]
    InvalidGravity(f32),
    #[error("Mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("Radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("Sun radius {sun} does not fit inside arena radius {arena}")]
    SunTooLarge { sun: f32, arena: f32 },
    #[error("Sun radius {sun} reaches the ship start positions at distance {start}")]
    SunCoversStart { sun: f32, start: f32 },
    #[error("Lives must be at least 1")]
    NoLives,
    #[error("Unknown difficulty '{0}' (expected easy, normal or hard)")]
    UnknownDifficulty(String),
    #[error("Unknown arena shape '{0}' (expected circular or rectangular)")]
    UnknownArenaShape(String),
    #[error("Invalid AI tuning: {0}")]
    InvalidAiTuning(String),
}

/// Match configuration, fixed for the duration of a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Center of the play area (the sun sits here)
    pub arena_center: Vec2,
    /// Radius of the play area
    pub arena_radius: f32,
    /// Circular arena or the legacy rectangular one
    pub arena_shape: ArenaShape,
    /// Gravitational constant
    pub gravitational_constant: f32,
    pub sun_mass: f32,
    pub sun_radius: f32,
    /// Spawn asteroids
    pub hazards_enabled: bool,
    /// Gate thrust and rotation on fuel, spawn fuel canisters
    pub fuel_enabled: bool,
    /// Difficulty for every computer-controlled ship
    pub ai_difficulty: Difficulty,
    /// Which ships are driven by the decision agent (index 0 = ship 1)
    pub computer_controlled: [bool; 2],
    /// Starting lives per ship
    pub lives: u32,
    /// Reset the shooter to its start position when it scores a kill
    pub round_reset_on_kill: bool,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub ai_tuning: AiTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            arena_center: Vec2::ZERO,
            arena_radius: physics::ARENA_RADIUS,
            arena_shape: ArenaShape::Circular,
            gravitational_constant: physics::G,
            sun_mass: physics::SUN_MASS,
            sun_radius: physics::SUN_RADIUS,
            hazards_enabled: false,
            fuel_enabled: false,
            ai_difficulty: Difficulty::Normal,
            computer_controlled: [false, true],
            lives: ship::LIVES,
            round_reset_on_kill: false,
            seed: None,
            ai_tuning: AiTuning::default(),
        }
    }
}

impl MatchConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(radius) = env_parse::<f32>("ARENA_RADIUS") {
            if radius > 0.0 {
                config.arena_radius = radius;
            } else {
                tracing::warn!("ARENA_RADIUS must be > 0, using default");
            }
        }

        if let Some(shape) = env_parse::<ArenaShape>("ARENA_SHAPE") {
            config.arena_shape = shape;
        }

        if let Some(g) = env_parse::<f32>("GRAVITY") {
            if g > 0.0 {
                config.gravitational_constant = g;
            } else {
                tracing::warn!("GRAVITY must be > 0, using default");
            }
        }

        if let Some(mass) = env_parse::<f32>("SUN_MASS") {
            config.sun_mass = mass;
        }

        if let Some(radius) = env_parse::<f32>("SUN_RADIUS") {
            config.sun_radius = radius;
        }

        if let Some(enabled) = env_flag("HAZARDS") {
            config.hazards_enabled = enabled;
        }

        if let Some(enabled) = env_flag("FUEL") {
            config.fuel_enabled = enabled;
        }

        if let Some(difficulty) = env_parse::<Difficulty>("AI_DIFFICULTY") {
            config.ai_difficulty = difficulty;
        }

        if let Ok(players) = std::env::var("AI_PLAYERS") {
            match players.trim().to_ascii_lowercase().as_str() {
                "none" => config.computer_controlled = [false, false],
                "two" | "2" => config.computer_controlled = [false, true],
                "both" => config.computer_controlled = [true, true],
                other => tracing::warn!("Invalid AI_PLAYERS '{}', using default", other),
            }
        }

        if let Some(lives) = env_parse::<u32>("LIVES") {
            if lives > 0 && lives <= 99 {
                config.lives = lives;
            } else {
                tracing::warn!("LIVES must be 1-99, using default");
            }
        }

        if let Some(enabled) = env_flag("ROUND_RESET") {
            config.round_reset_on_kill = enabled;
        }

        if let Some(seed) = env_parse::<u64>("SEED") {
            config.seed = Some(seed);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_radius.is_finite() && self.arena_radius > 0.0) {
            return Err(ConfigError::InvalidArenaRadius(self.arena_radius));
        }
        if !(self.gravitational_constant.is_finite() && self.gravitational_constant > 0.0) {
            return Err(ConfigError::InvalidGravity(self.gravitational_constant));
        }
        if !(self.sun_mass.is_finite() && self.sun_mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.sun_mass));
        }
        if !(self.sun_radius.is_finite() && self.sun_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.sun_radius));
        }
        if self.sun_radius >= self.arena_radius {
            return Err(ConfigError::SunTooLarge {
                sun: self.sun_radius,
                arena: self.arena_radius,
            });
        }
        let start = self.arena_radius * ship::START_DISTANCE_FRACTION;
        if self.sun_radius + ship::RADIUS >= start {
            return Err(ConfigError::SunCoversStart {
                sun: self.sun_radius,
                start,
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        self.ai_tuning.validate()
    }

    /// Whether the given ship is driven by the decision agent
    pub fn is_computer(&self, id: ShipId) -> bool {
        self.computer_controlled[id.index()]
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Invalid {} '{}', expected true/false", key, raw);
            None
        }
    }
}
