//! Arena geometry and boundary policy
//!
//! One boundary contract covers every body in the game. Each entity kind is
//! assigned a [`BoundaryMode`] once per arena; bodies call [`Arena::apply`]
//! after integrating their position each tick.

use std::f32::consts::TAU;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::game::constants::physics::WRAP_REENTRY_FRACTION;
use crate::util::vec2::Vec2;

/// Overall arena layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaShape {
    /// Circular play area around the sun
    Circular,
    /// Legacy square canvas (side = 2 * radius) with toroidal wrap
    Rectangular,
}

impl FromStr for ArenaShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circular" | "circle" => Ok(ArenaShape::Circular),
            "rectangular" | "rect" | "legacy" => Ok(ArenaShape::Rectangular),
            other => Err(ConfigError::UnknownArenaShape(other.to_string())),
        }
    }
}

/// What happens to a body that leaves the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Teleport to the antipodal point at 90% of the play radius
    WrapThroughCenter,
    /// Specular bounce off the rim, position clamped to the radius
    Reflect,
    /// Independent x/y wrap to the opposite edge of the square canvas
    RectangularWrap,
    /// Leave the body where it is and report the exit so the owner retires it
    Despawn,
}

/// Kinds of body subject to a boundary policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Ship,
    Projectile,
    Asteroid,
    Canister,
}

/// Boundary mode per entity kind, fixed per arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPolicy {
    pub ship: BoundaryMode,
    pub projectile: BoundaryMode,
    pub asteroid: BoundaryMode,
    pub canister: BoundaryMode,
}

impl BoundaryPolicy {
    pub fn for_shape(shape: ArenaShape) -> Self {
        match shape {
            ArenaShape::Circular => Self {
                ship: BoundaryMode::WrapThroughCenter,
                projectile: BoundaryMode::Despawn,
                asteroid: BoundaryMode::WrapThroughCenter,
                canister: BoundaryMode::Reflect,
            },
            ArenaShape::Rectangular => Self {
                ship: BoundaryMode::RectangularWrap,
                projectile: BoundaryMode::RectangularWrap,
                asteroid: BoundaryMode::RectangularWrap,
                canister: BoundaryMode::RectangularWrap,
            },
        }
    }

    pub fn mode(&self, kind: BodyKind) -> BoundaryMode {
        match kind {
            BodyKind::Ship => self.ship,
            BodyKind::Projectile => self.projectile,
            BodyKind::Asteroid => self.asteroid,
            BodyKind::Canister => self.canister,
        }
    }
}

/// Result of a boundary check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryOutcome {
    pub position: Vec2,
    pub velocity: Vec2,
    /// The body was outside the play area before the policy ran
    pub exited: bool,
}

/// Apply one boundary mode to a body.
///
/// `Despawn` and the circular modes test against the circle of `radius`
/// around `center`; `RectangularWrap` tests against the square of half-side
/// `radius`.
pub fn apply_boundary(
    mode: BoundaryMode,
    position: Vec2,
    velocity: Vec2,
    center: Vec2,
    radius: f32,
) -> BoundaryOutcome {
    let unchanged = BoundaryOutcome {
        position,
        velocity,
        exited: false,
    };

    match mode {
        BoundaryMode::RectangularWrap => {
            let min = center - Vec2::new(radius, radius);
            let max = center + Vec2::new(radius, radius);
            let side = radius * 2.0;
            let mut wrapped = position;

            if wrapped.x < min.x {
                wrapped.x += side;
            } else if wrapped.x > max.x {
                wrapped.x -= side;
            }
            if wrapped.y < min.y {
                wrapped.y += side;
            } else if wrapped.y > max.y {
                wrapped.y -= side;
            }

            BoundaryOutcome {
                position: wrapped,
                velocity,
                exited: wrapped != position,
            }
        }
        circular => {
            let offset = position - center;
            let (normal, distance) = offset.direction_and_length();
            if distance <= radius {
                return unchanged;
            }

            match circular {
                BoundaryMode::WrapThroughCenter => BoundaryOutcome {
                    position: center - normal * (radius * WRAP_REENTRY_FRACTION),
                    velocity,
                    exited: true,
                },
                BoundaryMode::Reflect => {
                    // Only flip the outward component; a body already heading
                    // back in keeps its velocity
                    let velocity = if velocity.dot(normal) > 0.0 {
                        velocity.reflect(normal)
                    } else {
                        velocity
                    };
                    BoundaryOutcome {
                        position: center + normal * radius,
                        velocity,
                        exited: true,
                    }
                }
                _ => BoundaryOutcome {
                    exited: true,
                    ..unchanged
                },
            }
        }
    }
}

/// Play-area geometry, read-only for the whole match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub center: Vec2,
    pub radius: f32,
    pub shape: ArenaShape,
    pub policy: BoundaryPolicy,
}

impl Arena {
    pub fn new(center: Vec2, radius: f32, shape: ArenaShape) -> Result<Self, ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::InvalidArenaRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            shape,
            policy: BoundaryPolicy::for_shape(shape),
        })
    }

    /// Run the boundary policy for `kind` on a body
    pub fn apply(&self, kind: BodyKind, position: Vec2, velocity: Vec2) -> BoundaryOutcome {
        apply_boundary(self.policy.mode(kind), position, velocity, self.center, self.radius)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        let offset = position - self.center;
        match self.shape {
            ArenaShape::Circular => offset.length_sq() <= self.radius * self.radius,
            ArenaShape::Rectangular => offset.x.abs() <= self.radius && offset.y.abs() <= self.radius,
        }
    }

    /// Uniformly random point within `fraction` of the play area
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R, fraction: f32) -> Vec2 {
        let extent = self.radius * fraction;
        match self.shape {
            ArenaShape::Circular => {
                let angle = rng.gen_range(0.0..TAU);
                // sqrt keeps the density uniform over the disk
                let distance = extent * rng.gen::<f32>().sqrt();
                self.center + Vec2::from_angle(angle) * distance
            }
            ArenaShape::Rectangular => {
                self.center
                    + Vec2::new(
                        rng.gen_range(-extent..=extent),
                        rng.gen_range(-extent..=extent),
                    )
            }
        }
    }

    /// Random point on the rim (scaled by `fraction`), with its outward normal
    pub fn random_rim_point<R: Rng + ?Sized>(&self, rng: &mut R, fraction: f32) -> (Vec2, Vec2) {
        let normal = Vec2::from_angle(rng.gen_range(0.0..TAU));
        (self.center + normal * (self.radius * fraction), normal)
    }
}
