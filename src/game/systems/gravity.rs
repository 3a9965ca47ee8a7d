//! Gravity system for orbital mechanics
//!
//! The sun is a single fixed point mass with a soft core: inside its radius
//! the force is zero instead of growing without bound.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

/// The central massive body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravitySource {
    position: Vec2,
    mass: f32,
    radius: f32,
}

impl GravitySource {
    pub fn new(position: Vec2, mass: f32, radius: f32) -> Result<Self, ConfigError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(ConfigError::InvalidMass(mass));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        Ok(Self {
            position,
            mass,
            radius,
        })
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Newtonian force on a body of mass `mass` at `position`.
    ///
    /// Magnitude is `G * M * m / d^2` toward the sun for `d >= radius`, and
    /// exactly zero inside the sun.
    pub fn force_on(&self, position: Vec2, mass: f32, g: f32) -> Vec2 {
        let delta = self.position - position;
        let (direction, distance) = delta.direction_and_length();

        if distance < self.radius {
            return Vec2::ZERO;
        }

        direction * (g * self.mass * mass / (distance * distance))
    }

    /// True iff the circles overlap (center distance < sum of radii)
    pub fn is_colliding(&self, position: Vec2, radius: f32) -> bool {
        let reach = self.radius + radius;
        self.position.distance_sq_to(position) < reach * reach
    }
}

/// Apply the sun's pull to every gravity-affected body in the world.
///
/// Ships only while active; projectiles only while active; the death
/// particles each ship sheds are incidental bodies and are pulled too.
pub fn apply(state: &mut GameState, g: f32) {
    let sun = state.sun;

    for ship in state.ships.iter_mut().filter(|s| s.is_active()) {
        let force = sun.force_on(ship.position, ship.mass, g);
        ship.apply_force(force);
    }

    for projectile in state.projectiles.iter_mut().filter(|p| p.active) {
        let force = sun.force_on(projectile.position, projectile.mass, g);
        projectile.apply_force(force);
    }

    apply_to_particles(state, g);
}

/// Pull only the gravity-affected cosmetic particles
pub fn apply_to_particles(state: &mut GameState, g: f32) {
    let sun = state.sun;
    for ship in state.ships.iter_mut() {
        for particle in ship.particles_mut().iter_mut().filter(|p| p.gravity_affected) {
            let force = sun.force_on(particle.position, particle.mass, g);
            particle.apply_force(force);
        }
    }
}
