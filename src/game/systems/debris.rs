//! Cosmetic debris particles
//!
//! Explosion, hyperspace and asteroid break-up bursts. Particles never
//! collide with anything; some are light enough to be pulled by the sun.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::particles::*;
use crate::util::vec2::Vec2;

/// A short-lived decorative particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life in [0, 1]; rendered as alpha
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
    pub mass: f32,
    /// Pulled by the sun each tick
    pub gravity_affected: bool,
}

impl Particle {
    pub fn apply_force(&mut self, force: Vec2) {
        self.velocity += force / self.mass;
    }

    /// Advance one tick. Returns false once the particle has faded.
    pub fn step(&mut self) -> bool {
        self.position += self.velocity;
        self.life = (self.life - self.decay).max(0.0);
        self.is_alive()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Burst styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstKind {
    /// Ship destroyed; inherits the wreck's velocity and feels gravity
    Explosion,
    /// Arrival flash after a hyperspace jump
    Hyperspace,
    /// Asteroid break-up; purely kinematic
    AsteroidDebris,
}

impl BurstKind {
    fn count(self) -> usize {
        match self {
            BurstKind::Explosion => EXPLOSION_COUNT,
            BurstKind::Hyperspace => HYPERSPACE_COUNT,
            BurstKind::AsteroidDebris => crate::game::constants::asteroid::DEBRIS_COUNT,
        }
    }

    fn speed(self) -> f32 {
        match self {
            BurstKind::Explosion | BurstKind::AsteroidDebris => EXPLOSION_SPEED,
            BurstKind::Hyperspace => HYPERSPACE_SPEED,
        }
    }
}

/// Emit a radial burst of particles at `origin`
pub fn burst<R: Rng + ?Sized>(
    rng: &mut R,
    kind: BurstKind,
    origin: Vec2,
    base_velocity: Vec2,
) -> Vec<Particle> {
    let speed = kind.speed();
    (0..kind.count())
        .map(|_| {
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            let velocity = match kind {
                // Hyperspace flash rings outward evenly
                BurstKind::Hyperspace => direction * speed,
                _ => base_velocity + direction * (speed * rng.gen_range(0.2..1.0)),
            };
            Particle {
                position: origin,
                velocity,
                life: 1.0,
                decay: rng.gen_range(DECAY_MIN..DECAY_MAX),
                mass: MASS,
                gravity_affected: kind == BurstKind::Explosion,
            }
        })
        .collect()
}

/// Step every particle and drop the faded ones
pub fn update(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| p.step());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_burst_counts_and_flags() {
        let mut rng = StdRng::seed_from_u64(1);
        let explosion = burst(&mut rng, BurstKind::Explosion, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(explosion.len(), EXPLOSION_COUNT);
        assert!(explosion.iter().all(|p| p.gravity_affected));

        let debris = burst(&mut rng, BurstKind::AsteroidDebris, Vec2::ZERO, Vec2::ZERO);
        assert!(debris.iter().all(|p| !p.gravity_affected));

        let flash = burst(&mut rng, BurstKind::Hyperspace, Vec2::ZERO, Vec2::new(9.0, 9.0));
        assert_eq!(flash.len(), HYPERSPACE_COUNT);
        for p in &flash {
            assert!((p.velocity.length() - HYPERSPACE_SPEED).abs() < 1e-4);
        }
    }

    #[test]
    fn test_particles_fade_out() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut particles = burst(&mut rng, BurstKind::Explosion, Vec2::ZERO, Vec2::ZERO);
        let max_ticks = (1.0 / DECAY_MIN).ceil() as usize + 1;
        for _ in 0..max_ticks {
            update(&mut particles);
        }
        assert!(particles.is_empty());
    }

    #[test]
    fn test_step_moves_particle() {
        let mut p = Particle {
            position: Vec2::ZERO,
            velocity: Vec2::new(1.0, 2.0),
            life: 1.0,
            decay: 0.5,
            mass: MASS,
            gravity_affected: false,
        };
        assert!(p.step());
        assert_eq!(p.position, Vec2::new(1.0, 2.0));
        assert!(!p.step());
        assert_eq!(p.life, 0.0);
    }
}
