//! Tuning tables for the duel.
//!
//! All time-based values are expressed in ticks (one simulation step per
//! rendered frame); distances in world units.

/// Physics constants
pub mod physics {
    /// Default gravitational constant
    pub const G: f32 = 1.0;
    /// Mass of the central sun
    pub const SUN_MASS: f32 = 1_000.0;
    /// Collision radius of the sun (also the soft-core cutoff)
    pub const SUN_RADIUS: f32 = 30.0;
    /// Default play-area radius
    pub const ARENA_RADIUS: f32 = 400.0;
    /// Fraction of the play radius a wrapped body re-enters at
    pub const WRAP_REENTRY_FRACTION: f32 = 0.9;
}

/// Ship (combatant) constants
pub mod ship {
    pub const MASS: f32 = 10.0;
    pub const RADIUS: f32 = 10.0;
    /// Radians turned per rotate call
    pub const ROTATION_SPEED: f32 = 0.08;
    /// Velocity added per thrust call
    pub const THRUST_POWER: f32 = 0.12;
    /// Hard speed cap applied after thrust
    pub const MAX_SPEED: f32 = 5.0;
    /// Starting lives per ship
    pub const LIVES: u32 = 3;
    /// Distance of the start positions from the arena center, as a fraction of its radius
    pub const START_DISTANCE_FRACTION: f32 = 0.6;
}

/// Weapon constants
pub mod weapon {
    /// Ticks between shots
    pub const COOLDOWN: u32 = 15;
    /// Speed added along the firing angle on top of the ship's velocity
    pub const MUZZLE_SPEED: f32 = 6.0;
    pub const PROJECTILE_MASS: f32 = 0.1;
    pub const PROJECTILE_RADIUS: f32 = 2.0;
    /// Projectile lifetime in ticks
    pub const PROJECTILE_LIFETIME: u32 = 120;
}

/// Shield / energy constants
pub mod shield {
    pub const MAX_ENERGY: f32 = 100.0;
    /// Energy drained per tick while the shield is up
    pub const DRAIN_RATE: f32 = 0.5;
    /// Energy regenerated per tick while the shield is down
    pub const REGEN_RATE: f32 = 0.1;
    /// Shield cannot be raised at or below this energy
    pub const MIN_ENERGY_TO_RAISE: f32 = 10.0;
}

/// Fuel subsystem constants
pub mod fuel {
    pub const MAX_FUEL: f32 = 100.0;
    pub const THRUST_COST: f32 = 0.2;
    pub const ROTATE_COST: f32 = 0.05;
}

/// Hyperspace constants
pub mod hyperspace {
    pub const CHARGES: u32 = 3;
    /// Mandatory cooldown after a jump attempt (ticks)
    pub const COOLDOWN: u32 = 60;
    /// Probability that a jump destroys the ship instead
    pub const MALFUNCTION_CHANCE: f64 = 0.1;
    /// Jumps never land inside this multiple of the sun radius
    pub const SUN_CLEARANCE_MULTIPLIER: f32 = 3.0;
    /// Attempts to find a destination clear of the sun before accepting any
    pub const MAX_DESTINATION_ATTEMPTS: u32 = 20;
}

/// Respawn constants
pub mod respawn {
    /// Ticks a destroyed ship waits before respawning
    pub const DELAY: u32 = 120;
}

/// Decision agent constants
pub mod ai {
    /// Below this distance from the sun the agent always flees it
    pub const SAFE_DISTANCE_FROM_SUN: f32 = 150.0;
    /// Below this distance the agent flees the sun if it is falling toward it
    pub const CRITICAL_DISTANCE_FROM_SUN: f32 = 250.0;
    /// Below this distance the agent requests an emergency hyperspace jump
    pub const HYPERSPACE_DISTANCE_FROM_SUN: f32 = 50.0;
    /// Opponent closer than this is considered a threat for shielding
    pub const SHIELD_THREAT_DISTANCE: f32 = 120.0;
    /// Opponent heading must be within this of the bearing to us to raise the shield
    pub const SHIELD_FACING_TOLERANCE: f32 = 0.3;
    /// Ticks of linear extrapolation when leading the opponent
    pub const PREDICTION_TICKS: f32 = 20.0;
    /// Maximum aim error (radians) at zero accuracy
    pub const AIM_ERROR_SCALE: f32 = 0.5;
    /// Beyond this distance the agent approaches
    pub const FAR_DISTANCE: f32 = 300.0;
    /// Within this distance the agent backs off
    pub const CLOSE_DISTANCE: f32 = 120.0;
    /// Chance of thrusting per evaluation when far away
    pub const APPROACH_THRUST_CHANCE: f64 = 0.7;
    /// Chance of thrusting per evaluation in the medium band
    pub const LOITER_THRUST_CHANCE: f64 = 0.15;
    /// Heading error under which the agent counts as facing its target
    pub const FACING_TOLERANCE: f32 = 0.5;
    /// Heading error under which the motor stage stops turning
    pub const ROTATION_DEAD_ZONE: f32 = 0.05;
}

/// Asteroid hazard constants
pub mod asteroid {
    pub const MAX_COUNT: usize = 6;
    pub const MIN_RADIUS: f32 = 10.0;
    pub const MAX_RADIUS: f32 = 25.0;
    pub const MIN_SPEED: f32 = 0.5;
    pub const MAX_SPEED: f32 = 1.5;
    /// Maximum spin in radians per tick
    pub const MAX_SPIN: f32 = 0.03;
    /// Ticks between spawn attempts (randomized within this range)
    pub const SPAWN_INTERVAL_MIN: u32 = 180;
    pub const SPAWN_INTERVAL_MAX: u32 = 420;
    /// Vertices in the cosmetic outline
    pub const OUTLINE_VERTICES: usize = 10;
    /// Radial jitter of outline vertices as a fraction of the radius
    pub const OUTLINE_JAGGEDNESS: f32 = 0.35;
    /// Debris particles emitted on break-up
    pub const DEBRIS_COUNT: usize = 12;
}

/// Fuel canister constants
pub mod canister {
    pub const MAX_COUNT: usize = 2;
    pub const RADIUS: f32 = 8.0;
    pub const FUEL_PAYLOAD: f32 = 40.0;
    pub const DRIFT_SPEED: f32 = 0.6;
    /// Ticks before an uncollected canister disappears
    pub const LIFETIME: u32 = 900;
    pub const SPAWN_INTERVAL_MIN: u32 = 300;
    pub const SPAWN_INTERVAL_MAX: u32 = 600;
    /// Canisters spawn within this fraction of the arena radius
    pub const SPAWN_RADIUS_FRACTION: f32 = 0.7;
    /// Minimum spawn distance from the sun, in sun radii
    pub const SUN_CLEARANCE_MULTIPLIER: f32 = 3.0;
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 20;
}

/// Cosmetic particle constants
pub mod particles {
    pub const EXPLOSION_COUNT: usize = 24;
    pub const EXPLOSION_SPEED: f32 = 3.0;
    pub const HYPERSPACE_COUNT: usize = 16;
    pub const HYPERSPACE_SPEED: f32 = 2.0;
    /// Life lost per tick, per particle (randomized within this range)
    pub const DECAY_MIN: f32 = 0.01;
    pub const DECAY_MAX: f32 = 0.03;
    pub const MASS: f32 = 0.05;
}
