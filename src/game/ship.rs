//! Combatant state machine
//!
//! A ship is either `Active` (flies, collides, acts) or `Inactive` (wreck
//! playing out its explosion while a respawn timer counts down). A ship that
//! is inactive with zero lives is eliminated and never respawns.
//!
//! Every action is a silent no-op on an inactive ship; callers inspect the
//! return value instead of handling errors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::{fuel, hyperspace, physics, respawn, shield, ship, weapon};
use crate::game::state::ShipId;
use crate::game::systems::arena::{Arena, BodyKind};
use crate::game::systems::debris::{self, BurstKind, Particle};
use crate::game::systems::gravity::GravitySource;
use crate::game::systems::projectile::Projectile;
use crate::util::vec2::Vec2;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipState {
    Active,
    /// Destroyed; counts down to respawn while lives remain
    Inactive { respawn_timer: u32 },
}

/// Outcome of a hyperspace request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HyperspaceResult {
    /// Inactive, on cooldown, or out of charges; nothing changed
    Refused,
    Jumped { from: Vec2, to: Vec2 },
    /// The drive failed and destroyed the ship
    Malfunction,
}

impl HyperspaceResult {
    pub fn jumped(&self) -> bool {
        matches!(self, HyperspaceResult::Jumped { .. })
    }

    pub fn self_destructed(&self) -> bool {
        matches!(self, HyperspaceResult::Malfunction)
    }
}

/// What happened to a ship during [`Ship::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipUpdate {
    pub respawned: bool,
    /// Shield dropped because energy ran out this tick
    pub shield_depleted: bool,
}

/// A player- or computer-controlled ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading in radians, any winding
    pub angle: f32,
    pub mass: f32,
    pub radius: f32,
    pub lives: u32,
    /// Probability a hyperspace jump destroys the ship
    pub malfunction_chance: f64,

    state: ShipState,
    energy: f32,
    shield_active: bool,
    fuel_enabled: bool,
    fuel: f32,
    hyperspace_charges: u32,
    weapon_cooldown: u32,
    hyperspace_cooldown: u32,
    thrusting: bool,

    start_position: Vec2,
    start_angle: f32,

    particles: Vec<Particle>,

    pub deaths: u32,
    pub shots_fired: u32,
    /// Shots that destroyed the opponent
    pub hits: u32,
}

impl Ship {
    pub fn new(id: ShipId, start_position: Vec2, start_angle: f32, lives: u32, fuel_enabled: bool) -> Self {
        Self {
            id,
            position: start_position,
            velocity: Vec2::ZERO,
            angle: start_angle,
            mass: ship::MASS,
            radius: ship::RADIUS,
            lives,
            malfunction_chance: hyperspace::MALFUNCTION_CHANCE,
            state: ShipState::Active,
            energy: shield::MAX_ENERGY,
            shield_active: false,
            fuel_enabled,
            fuel: fuel::MAX_FUEL,
            hyperspace_charges: hyperspace::CHARGES,
            weapon_cooldown: 0,
            hyperspace_cooldown: 0,
            thrusting: false,
            start_position,
            start_angle,
            particles: Vec::new(),
            deaths: 0,
            shots_fired: 0,
            hits: 0,
        }
    }

    // === State queries ===

    #[inline]
    pub fn state(&self) -> ShipState {
        self.state
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == ShipState::Active
    }

    /// Out of lives; terminal
    pub fn is_eliminated(&self) -> bool {
        !self.is_active() && self.lives == 0
    }

    pub fn respawn_timer(&self) -> Option<u32> {
        match self.state {
            ShipState::Active => None,
            ShipState::Inactive { respawn_timer } => Some(respawn_timer),
        }
    }

    #[inline]
    pub fn energy(&self) -> f32 {
        self.energy
    }

    #[inline]
    pub fn shield_active(&self) -> bool {
        self.shield_active
    }

    #[inline]
    pub fn fuel(&self) -> f32 {
        self.fuel
    }

    #[inline]
    pub fn fuel_enabled(&self) -> bool {
        self.fuel_enabled
    }

    #[inline]
    pub fn hyperspace_charges(&self) -> u32 {
        self.hyperspace_charges
    }

    #[inline]
    pub fn weapon_cooldown(&self) -> u32 {
        self.weapon_cooldown
    }

    #[inline]
    pub fn hyperspace_cooldown(&self) -> u32 {
        self.hyperspace_cooldown
    }

    #[inline]
    pub fn is_thrusting(&self) -> bool {
        self.thrusting
    }

    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    // === Controls ===

    /// Clear per-frame cosmetic flags before new commands are applied
    pub fn begin_tick(&mut self) {
        self.thrusting = false;
    }

    /// Turn by one step in `direction` (-1 left, +1 right). Returns whether it turned.
    pub fn rotate(&mut self, direction: i8) -> bool {
        if !self.is_active() || direction == 0 {
            return false;
        }
        if !self.burn_fuel(fuel::ROTATE_COST) {
            return false;
        }
        self.angle += f32::from(direction.signum()) * ship::ROTATION_SPEED;
        true
    }

    /// Accelerate along the heading, capping speed. Returns whether it fired the engine.
    pub fn thrust(&mut self) -> bool {
        if !self.is_active() || !self.burn_fuel(fuel::THRUST_COST) {
            return false;
        }
        self.velocity += self.heading() * ship::THRUST_POWER;
        self.velocity = self.velocity.clamp_length(ship::MAX_SPEED);
        self.thrusting = true;
        true
    }

    /// Debit fuel when the subsystem is enabled; refuses on an empty tank
    fn burn_fuel(&mut self, cost: f32) -> bool {
        if !self.fuel_enabled {
            return true;
        }
        if self.fuel <= 0.0 {
            return false;
        }
        self.fuel = (self.fuel - cost).max(0.0);
        true
    }

    /// Semi-implicit Euler: velocity += force / mass
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_active() {
            self.velocity += force / self.mass;
        }
    }

    /// Fire a projectile from the nose if the weapon is ready
    pub fn shoot(&mut self) -> Option<Projectile> {
        if !self.is_active() || self.weapon_cooldown > 0 {
            return None;
        }
        self.weapon_cooldown = weapon::COOLDOWN;
        self.shots_fired += 1;

        let nose = self.position + self.heading() * (self.radius + weapon::PROJECTILE_RADIUS + 1.0);
        Some(Projectile::spawn(nose, self.angle, self.velocity, self.id))
    }

    /// Raise or lower the shield. Returns the resulting shield state.
    pub fn set_shield(&mut self, want_active: bool) -> bool {
        if !want_active {
            self.shield_active = false;
        } else if !self.shield_active
            && self.is_active()
            && self.energy > shield::MIN_ENERGY_TO_RAISE
        {
            self.shield_active = true;
        }
        self.shield_active
    }

    /// Attempt a hyperspace jump to a random point in the arena
    pub fn hyperspace<R: Rng + ?Sized>(
        &mut self,
        arena: &Arena,
        sun: &GravitySource,
        rng: &mut R,
    ) -> HyperspaceResult {
        if !self.is_active() || self.hyperspace_cooldown > 0 || self.hyperspace_charges == 0 {
            return HyperspaceResult::Refused;
        }
        self.hyperspace_charges -= 1;
        self.hyperspace_cooldown = hyperspace::COOLDOWN;

        if rng.gen_bool(self.malfunction_chance.clamp(0.0, 1.0)) {
            self.die(rng);
            return HyperspaceResult::Malfunction;
        }

        let from = self.position;
        let to = jump_destination(arena, sun, rng);
        self.position = to;
        self.velocity = Vec2::ZERO;
        self.particles
            .extend(debris::burst(rng, BurstKind::Hyperspace, to, Vec2::ZERO));

        HyperspaceResult::Jumped { from, to }
    }

    /// Destroy the ship. Returns false (and changes nothing) if already inactive.
    pub fn die<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.is_active() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.deaths += 1;
        self.state = ShipState::Inactive {
            respawn_timer: respawn::DELAY,
        };
        self.shield_active = false;
        self.energy = shield::MAX_ENERGY;
        self.thrusting = false;
        self.particles
            .extend(debris::burst(rng, BurstKind::Explosion, self.position, self.velocity));
        self.velocity = Vec2::ZERO;
        true
    }

    /// Advance one tick: cooldowns, energy, particles, then either the
    /// respawn countdown (inactive) or position integration (active).
    pub fn update(&mut self, arena: &Arena) -> ShipUpdate {
        let mut result = ShipUpdate::default();

        self.weapon_cooldown = self.weapon_cooldown.saturating_sub(1);
        self.hyperspace_cooldown = self.hyperspace_cooldown.saturating_sub(1);

        if self.shield_active {
            self.energy = (self.energy - shield::DRAIN_RATE).max(0.0);
            if self.energy <= 0.0 {
                self.shield_active = false;
                result.shield_depleted = true;
            }
        } else {
            self.energy = (self.energy + shield::REGEN_RATE).min(shield::MAX_ENERGY);
        }

        debris::update(&mut self.particles);

        if let ShipState::Inactive { respawn_timer } = self.state {
            if self.lives > 0 {
                let remaining = respawn_timer.saturating_sub(1);
                if remaining == 0 {
                    self.respawn();
                    result.respawned = true;
                } else {
                    self.state = ShipState::Inactive {
                        respawn_timer: remaining,
                    };
                }
            }
            return result;
        }

        self.position += self.velocity;
        let outcome = arena.apply(BodyKind::Ship, self.position, self.velocity);
        self.position = outcome.position;
        self.velocity = outcome.velocity;

        result
    }

    /// Bring a destroyed ship back at its start pose
    pub fn respawn(&mut self) {
        self.reset_to_start();
        self.state = ShipState::Active;
    }

    /// Restore start pose and full resources without touching lives or state
    pub fn reset_to_start(&mut self) {
        self.position = self.start_position;
        self.angle = self.start_angle;
        self.velocity = Vec2::ZERO;
        self.energy = shield::MAX_ENERGY;
        self.shield_active = false;
        self.fuel = fuel::MAX_FUEL;
        self.hyperspace_charges = hyperspace::CHARGES;
        self.weapon_cooldown = 0;
        self.hyperspace_cooldown = 0;
        self.thrusting = false;
        self.particles.clear();
    }

    /// Add collected fuel, capped at the tank size. Returns the amount taken.
    pub fn add_fuel(&mut self, amount: f32) -> f32 {
        let before = self.fuel;
        self.fuel = (self.fuel + amount).min(fuel::MAX_FUEL);
        self.fuel - before
    }

    /// Fresh ship for a new match
    pub fn reset_for_match(&mut self, lives: u32) {
        self.lives = lives;
        self.deaths = 0;
        self.shots_fired = 0;
        self.hits = 0;
        self.respawn();
    }

    pub fn energy_ratio(&self) -> f32 {
        self.energy / shield::MAX_ENERGY
    }

    pub fn fuel_ratio(&self) -> f32 {
        self.fuel / fuel::MAX_FUEL
    }
}

/// Uniform point in the arena, retried a few times to avoid landing on the sun
fn jump_destination<R: Rng + ?Sized>(arena: &Arena, sun: &GravitySource, rng: &mut R) -> Vec2 {
    let clearance = sun.radius() * hyperspace::SUN_CLEARANCE_MULTIPLIER;
    let mut candidate = arena.random_position(rng, physics::WRAP_REENTRY_FRACTION);
    for _ in 1..hyperspace::MAX_DESTINATION_ATTEMPTS {
        if candidate.distance_sq_to(sun.position()) >= clearance * clearance {
            break;
        }
        candidate = arena.random_position(rng, physics::WRAP_REENTRY_FRACTION);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::arena::ArenaShape;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arena() -> Arena {
        Arena::new(Vec2::ZERO, 400.0, ArenaShape::Circular).unwrap()
    }

    fn sun() -> GravitySource {
        GravitySource::new(Vec2::ZERO, 1000.0, 30.0).unwrap()
    }

    fn create_ship() -> Ship {
        Ship::new(ShipId::One, Vec2::new(-240.0, 0.0), 0.0, 3, false)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_new_ship_is_active_and_full() {
        let ship = create_ship();
        assert!(ship.is_active());
        assert!(!ship.is_eliminated());
        assert_eq!(ship.energy(), shield::MAX_ENERGY);
        assert_eq!(ship.hyperspace_charges(), hyperspace::CHARGES);
        assert_eq!(ship.respawn_timer(), None);
    }

    #[test]
    fn test_rotate() {
        let mut ship = create_ship();
        assert!(ship.rotate(1));
        assert!((ship.angle - ship::ROTATION_SPEED).abs() < 1e-6);
        assert!(ship.rotate(-1));
        assert!(ship.rotate(-1));
        assert!((ship.angle + ship::ROTATION_SPEED).abs() < 1e-6);
        assert!(!ship.rotate(0));
    }

    #[test]
    fn test_thrust_along_heading() {
        let mut ship = create_ship();
        ship.angle = std::f32::consts::FRAC_PI_2;
        assert!(ship.thrust());
        assert!(ship.velocity.x.abs() < 1e-6);
        assert!((ship.velocity.y - ship::THRUST_POWER).abs() < 1e-6);
        assert!(ship.is_thrusting());
        ship.begin_tick();
        assert!(!ship.is_thrusting());
    }

    #[test]
    fn test_fuel_gates_thrust_and_rotation() {
        let mut ship = Ship::new(ShipId::One, Vec2::ZERO, 0.0, 3, true);
        assert!(ship.thrust());
        assert!((ship.fuel() - (fuel::MAX_FUEL - fuel::THRUST_COST)).abs() < 1e-4);
        assert!(ship.rotate(1));

        ship.fuel = 0.0;
        let velocity = ship.velocity;
        let angle = ship.angle;
        assert!(!ship.thrust());
        assert!(!ship.rotate(1));
        assert_eq!(ship.velocity, velocity);
        assert_eq!(ship.angle, angle);
    }

    #[test]
    fn test_fuel_never_negative() {
        let mut ship = Ship::new(ShipId::One, Vec2::ZERO, 0.0, 3, true);
        ship.fuel = 0.1;
        assert!(ship.thrust());
        assert_eq!(ship.fuel(), 0.0);
        assert!(!ship.thrust());
    }

    #[test]
    fn test_add_fuel_caps() {
        let mut ship = Ship::new(ShipId::One, Vec2::ZERO, 0.0, 3, true);
        ship.fuel = 90.0;
        let taken = ship.add_fuel(40.0);
        assert!((taken - 10.0).abs() < 1e-4);
        assert_eq!(ship.fuel(), fuel::MAX_FUEL);
    }

    #[test]
    fn test_shoot_respects_cooldown() {
        let mut ship = create_ship();
        let arena = arena();

        let first = ship.shoot();
        assert!(first.is_some());
        assert!(ship.shoot().is_none());

        for _ in 0..weapon::COOLDOWN - 1 {
            ship.update(&arena);
            assert!(ship.shoot().is_none());
        }
        ship.update(&arena);
        assert!(ship.shoot().is_some());
        assert_eq!(ship.shots_fired, 2);
    }

    #[test]
    fn test_shot_spawns_ahead_with_owner() {
        let mut ship = create_ship();
        ship.velocity = Vec2::new(1.0, 0.0);
        let shot = ship.shoot().unwrap();
        assert_eq!(shot.owner, ShipId::One);
        assert!(shot.position.x > ship.position.x + ship.radius);
        assert!((shot.velocity.x - (1.0 + weapon::MUZZLE_SPEED)).abs() < 1e-4);
        assert!(!shot.check_collision(ship.position, ship.radius));
    }

    #[test]
    fn test_shield_raise_and_drain() {
        let mut ship = create_ship();
        let arena = arena();
        assert!(ship.set_shield(true));

        ship.update(&arena);
        assert!((ship.energy() - (shield::MAX_ENERGY - shield::DRAIN_RATE)).abs() < 1e-4);

        assert!(!ship.set_shield(false));
        let before = ship.energy();
        ship.update(&arena);
        assert!((ship.energy() - (before + shield::REGEN_RATE)).abs() < 1e-4);
    }

    #[test]
    fn test_shield_auto_lowers_when_empty() {
        let mut ship = create_ship();
        let arena = arena();
        ship.set_shield(true);
        ship.energy = shield::DRAIN_RATE;

        let update = ship.update(&arena);

        assert!(update.shield_depleted);
        assert!(!ship.shield_active());
        assert_eq!(ship.energy(), 0.0);
    }

    #[test]
    fn test_shield_refused_at_low_energy() {
        let mut ship = create_ship();
        ship.energy = shield::MIN_ENERGY_TO_RAISE;
        assert!(!ship.set_shield(true));
        ship.energy = shield::MIN_ENERGY_TO_RAISE + 0.5;
        assert!(ship.set_shield(true));
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut ship = create_ship();
        let mut rng = rng();
        ship.set_shield(true);
        ship.energy = 50.0;

        assert!(ship.die(&mut rng));
        assert_eq!(ship.lives, 2);
        assert!(!ship.is_active());
        assert!(!ship.shield_active());
        assert_eq!(ship.energy(), shield::MAX_ENERGY);
        assert_eq!(ship.respawn_timer(), Some(respawn::DELAY));
        assert!(!ship.particles().is_empty());

        assert!(!ship.die(&mut rng));
        assert!(!ship.die(&mut rng));
        assert_eq!(ship.lives, 2);
        assert_eq!(ship.deaths, 1);
    }

    #[test]
    fn test_inactive_ship_ignores_controls() {
        let mut ship = create_ship();
        ship.die(&mut rng());
        let pos = ship.position;

        assert!(!ship.rotate(1));
        assert!(!ship.thrust());
        assert!(ship.shoot().is_none());
        assert!(!ship.set_shield(true));
        assert_eq!(ship.hyperspace(&arena(), &sun(), &mut rng()), HyperspaceResult::Refused);
        ship.apply_force(Vec2::new(100.0, 0.0));
        assert_eq!(ship.velocity, Vec2::ZERO);

        ship.update(&arena());
        assert_eq!(ship.position, pos);
    }

    #[test]
    fn test_respawn_after_delay() {
        let mut ship = create_ship();
        let arena = arena();
        ship.position = Vec2::new(100.0, 100.0);
        ship.angle = 2.0;
        ship.hyperspace_charges = 0;
        ship.die(&mut rng());

        for _ in 0..respawn::DELAY - 1 {
            assert!(!ship.update(&arena).respawned);
        }
        assert!(ship.update(&arena).respawned);
        assert!(ship.is_active());
        assert_eq!(ship.position, Vec2::new(-240.0, 0.0));
        assert_eq!(ship.angle, 0.0);
        assert_eq!(ship.velocity, Vec2::ZERO);
        assert_eq!(ship.hyperspace_charges(), hyperspace::CHARGES);
        assert!(ship.particles().is_empty());
    }

    #[test]
    fn test_no_respawn_without_lives() {
        let mut ship = create_ship();
        ship.lives = 1;
        ship.die(&mut rng());
        assert!(ship.is_eliminated());

        for _ in 0..respawn::DELAY * 3 {
            assert!(!ship.update(&arena()).respawned);
        }
        assert!(!ship.is_active());
        assert_eq!(ship.lives, 0);
    }

    #[test]
    fn test_update_integrates_and_wraps() {
        let mut ship = create_ship();
        ship.position = Vec2::new(0.0, 100.0);
        ship.velocity = Vec2::new(2.0, 0.0);
        ship.update(&arena());
        assert_eq!(ship.position, Vec2::new(2.0, 100.0));

        ship.position = Vec2::new(399.0, 0.0);
        ship.update(&arena());
        assert!(ship.position.x < 0.0);
        assert_eq!(ship.velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_hyperspace_without_charges() {
        let mut ship = create_ship();
        ship.hyperspace_charges = 0;
        let pos = ship.position;

        let result = ship.hyperspace(&arena(), &sun(), &mut rng());

        assert!(!result.jumped());
        assert!(!result.self_destructed());
        assert_eq!(ship.position, pos);
        assert!(ship.is_active());
    }

    #[test]
    fn test_hyperspace_jump() {
        let mut ship = create_ship();
        ship.malfunction_chance = 0.0;
        ship.velocity = Vec2::new(3.0, 1.0);
        let arena = arena();

        let result = ship.hyperspace(&arena, &sun(), &mut rng());

        assert!(result.jumped());
        assert!(arena.contains(ship.position));
        assert_eq!(ship.velocity, Vec2::ZERO);
        assert_eq!(ship.hyperspace_charges(), hyperspace::CHARGES - 1);
        assert_eq!(ship.hyperspace_cooldown(), hyperspace::COOLDOWN);
        assert!(!ship.particles().is_empty());

        // Cooldown blocks an immediate second jump
        assert_eq!(ship.hyperspace(&arena, &sun(), &mut rng()), HyperspaceResult::Refused);
        assert_eq!(ship.hyperspace_charges(), hyperspace::CHARGES - 1);
    }

    #[test]
    fn test_hyperspace_malfunction_kills() {
        let mut ship = create_ship();
        ship.malfunction_chance = 1.0;

        let result = ship.hyperspace(&arena(), &sun(), &mut rng());

        assert!(result.self_destructed());
        assert!(!ship.is_active());
        assert_eq!(ship.lives, 2);
        assert_eq!(ship.hyperspace_charges(), hyperspace::CHARGES - 1);
    }

    #[test]
    fn test_reset_to_start_keeps_state_and_lives() {
        let mut ship = create_ship();
        ship.die(&mut rng());
        ship.reset_to_start();
        assert!(!ship.is_active());
        assert_eq!(ship.lives, 2);

        ship.reset_for_match(3);
        assert!(ship.is_active());
        assert_eq!(ship.lives, 3);
        assert_eq!(ship.deaths, 0);
    }

    proptest! {
        #[test]
        fn thrust_never_exceeds_max_speed(
            angles in proptest::collection::vec(-10.0f32..10.0, 1..200),
            vx in -5.0f32..5.0,
            vy in -5.0f32..5.0,
        ) {
            let mut ship = create_ship();
            ship.velocity = Vec2::new(vx, vy).clamp_length(ship::MAX_SPEED);
            for angle in angles {
                ship.angle = angle;
                ship.thrust();
                prop_assert!(ship.velocity.length() <= ship::MAX_SPEED + 1e-4);
            }
        }

        #[test]
        fn energy_stays_in_bounds(toggles in proptest::collection::vec(any::<bool>(), 1..600)) {
            let mut ship = create_ship();
            let arena = arena();
            for want in toggles {
                let was_up = ship.shield_active();
                let energy_before = ship.energy();
                let up = ship.set_shield(want);
                if up && !was_up {
                    prop_assert!(energy_before > shield::MIN_ENERGY_TO_RAISE);
                }
                ship.update(&arena);
                prop_assert!(ship.energy() >= 0.0 && ship.energy() <= shield::MAX_ENERGY);
                if ship.energy() <= 0.0 {
                    prop_assert!(!ship.shield_active());
                }
            }
        }

        #[test]
        fn lives_drop_once_per_activation(hits in 1usize..10) {
            let mut ship = create_ship();
            let mut rng = rng();
            for _ in 0..hits {
                ship.die(&mut rng);
            }
            prop_assert_eq!(ship.lives, 2);
            prop_assert_eq!(ship.deaths, 1);
        }
    }
}
