//! Game events and the audio hook
//!
//! Every tick the simulation reports what happened as [`GameEvent`]s. Events
//! with a sound are forwarded to the injected [`AudioSink`]; nothing the sink
//! does can feed back into simulation state.

use serde::{Deserialize, Serialize};

use crate::game::state::ShipId;
use crate::util::vec2::Vec2;

/// Sounds the core asks the audio collaborator to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    ShotFired,
    Explosion,
    ShieldBlock,
    Hyperspace,
    Pickup,
}

impl SoundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEvent::ShotFired => "shoot",
            SoundEvent::Explosion => "explosion",
            SoundEvent::ShieldBlock => "shield",
            SoundEvent::Hyperspace => "hyperspace",
            SoundEvent::Pickup => "pickup",
        }
    }
}

/// Fire-and-forget audio hook. Implementations must swallow their own failures.
pub trait AudioSink {
    fn play(&mut self, event: SoundEvent);
}

/// Audio sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: SoundEvent) {}
}

/// Audio sink that only logs, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceAudio;

impl AudioSink for TraceAudio {
    fn play(&mut self, event: SoundEvent) {
        tracing::trace!(sound = event.name(), "play");
    }
}

/// What destroyed a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Projectile { shooter: ShipId },
    Sun,
    /// Rammed the other ship
    Collision,
    Asteroid,
    HyperspaceMalfunction,
}

/// What the shield stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockedThreat {
    Projectile,
    Asteroid,
}

/// Something that happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired {
        ship: ShipId,
        position: Vec2,
    },
    ShieldBlocked {
        ship: ShipId,
        threat: BlockedThreat,
    },
    HyperspaceJump {
        ship: ShipId,
        from: Vec2,
        to: Vec2,
    },
    ShipDestroyed {
        ship: ShipId,
        cause: DeathCause,
        position: Vec2,
        lives_left: u32,
    },
    ShipRespawned {
        ship: ShipId,
    },
    AsteroidDestroyed {
        position: Vec2,
        /// Shooter, if a projectile broke it
        by: Option<ShipId>,
    },
    FuelCollected {
        ship: ShipId,
        amount: f32,
    },
    MatchOver {
        /// `None` for a draw
        winner: Option<ShipId>,
    },
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn sound(&self) -> Option<SoundEvent> {
        match self {
            GameEvent::ShotFired { .. } => Some(SoundEvent::ShotFired),
            GameEvent::ShieldBlocked { .. } => Some(SoundEvent::ShieldBlock),
            GameEvent::HyperspaceJump { .. } => Some(SoundEvent::Hyperspace),
            GameEvent::ShipDestroyed { .. } | GameEvent::AsteroidDestroyed { .. } => {
                Some(SoundEvent::Explosion)
            }
            GameEvent::FuelCollected { .. } => Some(SoundEvent::Pickup),
            GameEvent::ShipRespawned { .. } | GameEvent::MatchOver { .. } => None,
        }
    }
}
