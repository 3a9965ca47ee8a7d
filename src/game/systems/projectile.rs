//! Projectile system
//!
//! Shots inherit the firing ship's velocity plus a fixed muzzle speed along
//! the firing angle. Human and computer ships fire through the same path.

use serde::{Deserialize, Serialize};

use crate::game::constants::weapon::{
    MUZZLE_SPEED, PROJECTILE_LIFETIME, PROJECTILE_MASS, PROJECTILE_RADIUS,
};
use crate::game::state::ShipId;
use crate::game::systems::arena::{Arena, BodyKind, BoundaryMode};
use crate::game::systems::gravity::GravitySource;
use crate::util::vec2::Vec2;

/// Why a projectile left play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireReason {
    Expired,
    LeftArena,
    HitSun,
    /// Struck a ship, shield or asteroid
    Impact,
    /// Owner was destroyed
    OwnerDestroyed,
}

/// A ballistic shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: ShipId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub radius: f32,
    /// Ticks left before the shot fizzles
    pub lifetime: u32,
    pub active: bool,
}

impl Projectile {
    /// Fire from `origin` along `angle`, inheriting the firer's velocity
    pub fn spawn(origin: Vec2, angle: f32, inherited_velocity: Vec2, owner: ShipId) -> Self {
        Self {
            owner,
            position: origin,
            velocity: inherited_velocity + Vec2::from_angle(angle) * MUZZLE_SPEED,
            mass: PROJECTILE_MASS,
            radius: PROJECTILE_RADIUS,
            lifetime: PROJECTILE_LIFETIME,
            active: true,
        }
    }

    /// Semi-implicit Euler: velocity += force / mass
    pub fn apply_force(&mut self, force: Vec2) {
        if self.active {
            self.velocity += force / self.mass;
        }
    }

    /// Advance one tick. Returns the reason if the shot retired this tick.
    pub fn step(&mut self, arena: &Arena, sun: &GravitySource) -> Option<RetireReason> {
        if !self.active {
            return None;
        }

        self.position += self.velocity;
        self.lifetime = self.lifetime.saturating_sub(1);

        if self.lifetime == 0 {
            return Some(self.retire(RetireReason::Expired));
        }

        let outcome = arena.apply(BodyKind::Projectile, self.position, self.velocity);
        if outcome.exited && arena.policy.mode(BodyKind::Projectile) == BoundaryMode::Despawn {
            return Some(self.retire(RetireReason::LeftArena));
        }
        self.position = outcome.position;
        self.velocity = outcome.velocity;

        if sun.is_colliding(self.position, self.radius) {
            return Some(self.retire(RetireReason::HitSun));
        }

        None
    }

    /// Circle-circle overlap test; never true once retired
    pub fn check_collision(&self, target_position: Vec2, target_radius: f32) -> bool {
        if !self.active {
            return false;
        }
        let reach = self.radius + target_radius;
        self.position.distance_sq_to(target_position) < reach * reach
    }

    pub fn retire(&mut self, reason: RetireReason) -> RetireReason {
        self.active = false;
        reason
    }
}
