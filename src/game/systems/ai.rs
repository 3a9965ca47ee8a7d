//! Computer opponent
//!
//! The agent re-plans only every `think_interval` ticks (its reaction time) but
//! steers toward the last planned heading every tick, so its turning stays
//! smooth between evaluations. It produces the same [`ControlCommand`] a human
//! input source does.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::game::constants::ai::*;
use crate::game::input::ControlCommand;
use crate::game::ship::Ship;
use crate::game::state::ShipId;
use crate::game::systems::gravity::GravitySource;
use crate::util::vec2::angle_difference;

/// Named difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                accuracy: 0.5,
                think_interval: 30,
                shoot_probability: 0.2,
                fire_tolerance: 0.35,
            },
            Difficulty::Normal => DifficultyProfile {
                accuracy: 0.75,
                think_interval: 15,
                shoot_probability: 0.4,
                fire_tolerance: 0.2,
            },
            Difficulty::Hard => DifficultyProfile {
                accuracy: 0.95,
                think_interval: 6,
                shoot_probability: 0.7,
                fire_tolerance: 0.1,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// The four independent knobs a difficulty preset sets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// 0.0-1.0; scales down the random aim error
    pub accuracy: f32,
    /// Ticks between strategic re-evaluations
    pub think_interval: u32,
    /// Chance of firing on an evaluation where the aim is good enough
    pub shoot_probability: f64,
    /// Heading error (radians) under which the agent may fire
    pub fire_tolerance: f32,
}

/// Sun-avoidance thresholds, shared by every agent in a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiTuning {
    /// Always flee the sun inside this distance
    pub safe_distance_from_sun: f32,
    /// Flee inside this distance when falling toward the sun
    pub critical_distance_from_sun: f32,
    /// Request hyperspace inside this distance
    pub hyperspace_distance_from_sun: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            safe_distance_from_sun: SAFE_DISTANCE_FROM_SUN,
            critical_distance_from_sun: CRITICAL_DISTANCE_FROM_SUN,
            hyperspace_distance_from_sun: HYPERSPACE_DISTANCE_FROM_SUN,
        }
    }
}

impl AiTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            self.hyperspace_distance_from_sun,
            self.safe_distance_from_sun,
            self.critical_distance_from_sun,
        ];
        if distances.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(ConfigError::InvalidAiTuning(
                "sun distances must be positive".into(),
            ));
        }
        if self.hyperspace_distance_from_sun > self.safe_distance_from_sun {
            return Err(ConfigError::InvalidAiTuning(
                "hyperspace distance exceeds safe distance".into(),
            ));
        }
        if self.critical_distance_from_sun < self.safe_distance_from_sun {
            return Err(ConfigError::InvalidAiTuning(
                "critical distance is below safe distance".into(),
            ));
        }
        Ok(())
    }
}

/// What the agent decided on its last evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiBehavior {
    /// Nothing planned yet
    Idle,
    /// Running away from the sun
    AvoidSun,
    /// Fighting the opponent
    Engage,
}

/// Scripted controller for one ship
#[derive(Debug, Clone)]
pub struct DecisionAgent {
    ship: ShipId,
    profile: DifficultyProfile,
    tuning: AiTuning,
    /// Ticks until the next evaluation
    think_counter: u32,
    behavior: AiBehavior,
    target_angle: Option<f32>,
    wants_thrust: bool,
    wants_shoot: bool,
    wants_shield: bool,
    wants_hyperspace: bool,
}

impl DecisionAgent {
    pub fn new(ship: ShipId, difficulty: Difficulty, tuning: AiTuning) -> Self {
        Self::with_profile(ship, difficulty.profile(), tuning)
    }

    pub fn with_profile(ship: ShipId, profile: DifficultyProfile, tuning: AiTuning) -> Self {
        Self {
            ship,
            profile,
            tuning,
            think_counter: 0,
            behavior: AiBehavior::Idle,
            target_angle: None,
            wants_thrust: false,
            wants_shoot: false,
            wants_shield: false,
            wants_hyperspace: false,
        }
    }

    pub fn ship(&self) -> ShipId {
        self.ship
    }

    pub fn behavior(&self) -> AiBehavior {
        self.behavior
    }

    pub fn target_angle(&self) -> Option<f32> {
        self.target_angle
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Forget the current plan; the next update evaluates immediately
    pub fn reset(&mut self) {
        *self = Self::with_profile(self.ship, self.profile, self.tuning);
    }

    /// Produce this tick's command
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        me: &Ship,
        opponent: &Ship,
        sun: &GravitySource,
        rng: &mut R,
    ) -> ControlCommand {
        if !me.is_active() || !opponent.is_active() {
            return ControlCommand::IDLE;
        }

        if self.think_counter == 0 {
            self.evaluate(me, opponent, sun, rng);
            self.think_counter = self.profile.think_interval.max(1);
        }
        self.think_counter -= 1;

        self.motor_output(me)
    }

    fn evaluate<R: Rng + ?Sized>(&mut self, me: &Ship, opponent: &Ship, sun: &GravitySource, rng: &mut R) {
        let to_sun = sun.position() - me.position;
        let sun_distance = to_sun.length();
        let falling_in = me.velocity.dot(to_sun) > 0.0;

        self.wants_hyperspace = false;

        if sun_distance < self.tuning.safe_distance_from_sun
            || (sun_distance < self.tuning.critical_distance_from_sun && falling_in)
        {
            self.behavior = AiBehavior::AvoidSun;
            self.target_angle = Some((-to_sun).angle());
            self.wants_thrust = true;
            self.wants_shoot = false;
            self.wants_shield = false;
            if sun_distance < self.tuning.hyperspace_distance_from_sun {
                self.wants_hyperspace = true;
                tracing::debug!(ship = %self.ship, sun_distance, "agent requesting emergency hyperspace");
            }
            return;
        }

        self.wants_shield = under_threat(me, opponent);
        self.engage(me, opponent, rng);
    }

    fn engage<R: Rng + ?Sized>(&mut self, me: &Ship, opponent: &Ship, rng: &mut R) {
        self.behavior = AiBehavior::Engage;

        let intercept = opponent.position + opponent.velocity * PREDICTION_TICKS;
        let aim_error = (1.0 - self.profile.accuracy) * AIM_ERROR_SCALE * rng.gen_range(-1.0f32..=1.0);
        let target = (intercept - me.position).angle() + aim_error;
        self.target_angle = Some(target);

        let heading_error = angle_difference(target, me.angle).abs();
        let distance = me.position.distance_to(opponent.position);

        self.wants_thrust = if distance > FAR_DISTANCE {
            rng.gen_bool(APPROACH_THRUST_CHANCE)
        } else if distance < CLOSE_DISTANCE {
            // Only back off when not pointed at the opponent
            heading_error > FACING_TOLERANCE
        } else {
            rng.gen_bool(LOITER_THRUST_CHANCE)
        };

        self.wants_shoot = heading_error < self.profile.fire_tolerance
            && rng.gen_bool(self.profile.shoot_probability.clamp(0.0, 1.0));
    }

    fn motor_output(&self, me: &Ship) -> ControlCommand {
        let mut command = ControlCommand {
            thrust: self.wants_thrust,
            shoot: self.wants_shoot,
            shield: self.wants_shield,
            hyperspace: self.wants_hyperspace,
            ..ControlCommand::IDLE
        };

        if let Some(target) = self.target_angle {
            let diff = angle_difference(target, me.angle);
            if diff > ROTATION_DEAD_ZONE {
                command.rotate_right = true;
            } else if diff < -ROTATION_DEAD_ZONE {
                command.rotate_left = true;
            }
        }

        command
    }
}

/// Opponent is close and pointing at us
fn under_threat(me: &Ship, opponent: &Ship) -> bool {
    let offset = me.position - opponent.position;
    offset.length() < SHIELD_THREAT_DISTANCE
        && angle_difference(offset.angle(), opponent.angle).abs() < SHIELD_FACING_TOLERANCE
}
