//! Game state definitions and structures
//!
//! Contains all entities (ships, projectiles, hazards, particles) and the
//! read-only snapshot handed to renderers once per frame.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, MatchConfig};
use crate::game::constants::ship::START_DISTANCE_FRACTION;
use crate::game::ship::Ship;
use crate::game::systems::arena::Arena;
use crate::game::systems::debris::Particle;
use crate::game::systems::gravity::GravitySource;
use crate::game::systems::hazards::{Asteroid, FuelCanister, Outline};
use crate::game::systems::projectile::{Projectile, RetireReason};
use crate::util::vec2::Vec2;

/// Identity of one of the two ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipId {
    One,
    Two,
}

impl ShipId {
    pub const ALL: [ShipId; 2] = [ShipId::One, ShipId::Two];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            ShipId::One => 0,
            ShipId::Two => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> ShipId {
        match self {
            ShipId::One => ShipId::Two,
            ShipId::Two => ShipId::One,
        }
    }

    /// Player number as shown to humans (1 or 2)
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

impl std::fmt::Display for ShipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ship {}", self.number())
    }
}

/// Start position and heading: ship one on the left pointing up the screen,
/// ship two on the right pointing down, so both begin broadside to the sun.
pub fn start_pose(arena: &Arena, id: ShipId) -> (Vec2, f32) {
    let offset = arena.radius * START_DISTANCE_FRACTION;
    match id {
        ShipId::One => (
            arena.center - Vec2::new(offset, 0.0),
            -std::f32::consts::FRAC_PI_2,
        ),
        ShipId::Two => (
            arena.center + Vec2::new(offset, 0.0),
            std::f32::consts::FRAC_PI_2,
        ),
    }
}

/// Everything in the world
#[derive(Debug, Clone)]
pub struct GameState {
    /// Ticks simulated since the match started
    pub tick: u64,
    pub arena: Arena,
    pub sun: GravitySource,
    pub ships: [Ship; 2],
    pub projectiles: Vec<Projectile>,
    pub asteroids: Vec<Asteroid>,
    pub canisters: Vec<FuelCanister>,
    /// Asteroid break-up particles
    pub debris: Vec<Particle>,
}

impl GameState {
    pub fn new(config: &MatchConfig) -> Result<Self, ConfigError> {
        let arena = Arena::new(config.arena_center, config.arena_radius, config.arena_shape)?;
        let sun = GravitySource::new(config.arena_center, config.sun_mass, config.sun_radius)?;

        let ships = ShipId::ALL.map(|id| {
            let (position, angle) = start_pose(&arena, id);
            Ship::new(id, position, angle, config.lives, config.fuel_enabled)
        });

        Ok(Self {
            tick: 0,
            arena,
            sun,
            ships,
            projectiles: Vec::new(),
            asteroids: Vec::new(),
            canisters: Vec::new(),
            debris: Vec::new(),
        })
    }

    #[inline]
    pub fn ship(&self, id: ShipId) -> &Ship {
        &self.ships[id.index()]
    }

    #[inline]
    pub fn ship_mut(&mut self, id: ShipId) -> &mut Ship {
        &mut self.ships[id.index()]
    }

    /// Retire every in-flight shot fired by `owner`. Returns how many.
    pub fn retire_projectiles_of(&mut self, owner: ShipId) -> usize {
        let mut retired = 0;
        for projectile in self.projectiles.iter_mut().filter(|p| p.active && p.owner == owner) {
            projectile.retire(RetireReason::OwnerDestroyed);
            retired += 1;
        }
        retired
    }

    /// Drop retired projectiles, asteroids and canisters
    pub fn prune(&mut self) {
        self.projectiles.retain(|p| p.active);
        self.asteroids.retain(|a| a.active);
        self.canisters.retain(|c| c.active);
    }

    /// Clear the field and restore both ships for a new match
    pub fn reset(&mut self, lives: u32) {
        self.tick = 0;
        for ship in self.ships.iter_mut() {
            ship.reset_for_match(lives);
        }
        self.projectiles.clear();
        self.asteroids.clear();
        self.canisters.clear();
        self.debris.clear();
    }

    /// Read-only view for the rendering collaborator
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            tick: self.tick,
            sun: BodySnapshot {
                position: self.sun.position(),
                radius: self.sun.radius(),
            },
            arena_radius: self.arena.radius,
            ships: [
                ShipSnapshot::from(&self.ships[0]),
                ShipSnapshot::from(&self.ships[1]),
            ],
            projectiles: self
                .projectiles
                .iter()
                .filter(|p| p.active)
                .map(|p| ProjectileSnapshot {
                    owner: p.owner,
                    position: p.position,
                })
                .collect(),
            asteroids: self
                .asteroids
                .iter()
                .filter(|a| a.active)
                .map(|a| AsteroidSnapshot {
                    position: a.position,
                    radius: a.radius,
                    outline: a.world_outline(),
                })
                .collect(),
            canisters: self
                .canisters
                .iter()
                .filter(|c| c.active)
                .map(|c| BodySnapshot {
                    position: c.position,
                    radius: c.radius,
                })
                .collect(),
            particles: self
                .ships
                .iter()
                .flat_map(|s| s.particles().iter())
                .chain(self.debris.iter())
                .map(|p| ParticleSnapshot {
                    position: p.position,
                    alpha: p.life,
                })
                .collect(),
        }
    }
}

/// Per-frame render view of the whole world
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub sun: BodySnapshot,
    pub arena_radius: f32,
    pub ships: [ShipSnapshot; 2],
    pub projectiles: Vec<ProjectileSnapshot>,
    pub asteroids: Vec<AsteroidSnapshot>,
    pub canisters: Vec<BodySnapshot>,
    pub particles: Vec<ParticleSnapshot>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ShipSnapshot {
    pub id: ShipId,
    pub position: Vec2,
    pub angle: f32,
    pub active: bool,
    pub shield_active: bool,
    pub thrusting: bool,
    pub lives: u32,
    pub energy_ratio: f32,
    pub fuel_ratio: f32,
    pub hyperspace_charges: u32,
    /// Ticks until respawn while destroyed
    pub respawn_timer: Option<u32>,
}

impl From<&Ship> for ShipSnapshot {
    fn from(ship: &Ship) -> Self {
        Self {
            id: ship.id,
            position: ship.position,
            angle: ship.angle,
            active: ship.is_active(),
            shield_active: ship.shield_active(),
            thrusting: ship.is_thrusting(),
            lives: ship.lives,
            energy_ratio: ship.energy_ratio(),
            fuel_ratio: ship.fuel_ratio(),
            hyperspace_charges: ship.hyperspace_charges(),
            respawn_timer: ship.respawn_timer(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectileSnapshot {
    pub owner: ShipId,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize)]
pub struct AsteroidSnapshot {
    pub position: Vec2,
    pub radius: f32,
    pub outline: Outline,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParticleSnapshot {
    pub position: Vec2,
    pub alpha: f32,
}
