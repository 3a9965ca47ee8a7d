//! Asteroids and fuel canisters
//!
//! Both are simple kinematic bodies: no gravity, their own boundary mode, and
//! spawned on randomized tick intervals up to a population cap.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::constants::{asteroid, canister};
use crate::game::state::GameState;
use crate::game::systems::arena::{Arena, BodyKind, BoundaryMode};
use crate::game::systems::gravity::GravitySource;
use crate::util::vec2::Vec2;

/// Polygon outline, relative to the asteroid center at angle 0
pub type Outline = SmallVec<[Vec2; asteroid::OUTLINE_VERTICES]>;

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Cosmetic rotation
    pub angle: f32,
    pub spin: f32,
    pub radius: f32,
    pub outline: Outline,
    pub active: bool,
}

impl Asteroid {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            angle: 0.0,
            spin: rng.gen_range(-asteroid::MAX_SPIN..=asteroid::MAX_SPIN),
            radius,
            outline: jagged_outline(rng, radius),
            active: true,
        }
    }

    /// Enter just inside the rim, heading roughly toward the middle
    pub fn random<R: Rng + ?Sized>(rng: &mut R, arena: &Arena) -> Self {
        let (position, normal) = arena.random_rim_point(rng, 0.9);
        let deviation = rng.gen_range(-0.6..0.6);
        let speed = rng.gen_range(asteroid::MIN_SPEED..asteroid::MAX_SPEED);
        let velocity = (-normal).rotate(deviation) * speed;
        let radius = rng.gen_range(asteroid::MIN_RADIUS..asteroid::MAX_RADIUS);
        Self::new(rng, position, velocity, radius)
    }

    pub fn step(&mut self, arena: &Arena) {
        if !self.active {
            return;
        }
        self.position += self.velocity;
        self.angle += self.spin;

        let outcome = arena.apply(BodyKind::Asteroid, self.position, self.velocity);
        if outcome.exited && arena.policy.mode(BodyKind::Asteroid) == BoundaryMode::Despawn {
            self.active = false;
            return;
        }
        self.position = outcome.position;
        self.velocity = outcome.velocity;
    }

    pub fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        let reach = self.radius + radius;
        self.active && self.position.distance_sq_to(position) < reach * reach
    }

    /// Outline in world coordinates, for renderers
    pub fn world_outline(&self) -> Outline {
        self.outline
            .iter()
            .map(|v| self.position + v.rotate(self.angle))
            .collect()
    }
}

fn jagged_outline<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Outline {
    let step = TAU / asteroid::OUTLINE_VERTICES as f32;
    (0..asteroid::OUTLINE_VERTICES)
        .map(|i| {
            let jitter = rng.gen_range(-asteroid::OUTLINE_JAGGEDNESS..asteroid::OUTLINE_JAGGEDNESS);
            Vec2::from_angle(i as f32 * step) * (radius * (1.0 + jitter))
        })
        .collect()
}

/// A drifting fuel pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelCanister {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub payload: f32,
    /// Ticks until it disappears uncollected
    pub lifetime: u32,
    pub active: bool,
}

impl FuelCanister {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            radius: canister::RADIUS,
            payload: canister::FUEL_PAYLOAD,
            lifetime: canister::LIFETIME,
            active: true,
        }
    }

    /// Somewhere in the inner arena clear of the sun, drifting in a random direction
    pub fn random<R: Rng + ?Sized>(rng: &mut R, arena: &Arena, sun: &GravitySource) -> Self {
        let clearance = sun.radius() * canister::SUN_CLEARANCE_MULTIPLIER;
        let mut position = arena.random_position(rng, canister::SPAWN_RADIUS_FRACTION);
        for _ in 0..canister::MAX_PLACEMENT_ATTEMPTS {
            if position.distance_sq_to(sun.position()) >= clearance * clearance {
                break;
            }
            position = arena.random_position(rng, canister::SPAWN_RADIUS_FRACTION);
        }
        let velocity = Vec2::from_angle(rng.gen_range(0.0..TAU)) * canister::DRIFT_SPEED;
        Self::new(position, velocity)
    }

    pub fn step(&mut self, arena: &Arena) {
        if !self.active {
            return;
        }
        self.position += self.velocity;
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.active = false;
            return;
        }

        let outcome = arena.apply(BodyKind::Canister, self.position, self.velocity);
        if outcome.exited && arena.policy.mode(BodyKind::Canister) == BoundaryMode::Despawn {
            self.active = false;
            return;
        }
        self.position = outcome.position;
        self.velocity = outcome.velocity;
    }

    pub fn overlaps(&self, position: Vec2, radius: f32) -> bool {
        let reach = self.radius + radius;
        self.active && self.position.distance_sq_to(position) < reach * reach
    }
}

/// Countdown that fires at a random interval and re-arms itself
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    remaining: u32,
    min: u32,
    max: u32,
}

impl SpawnTimer {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> Self {
        Self {
            remaining: rng.gen_range(min..=max),
            min,
            max,
        }
    }

    /// Advance one tick; true on the tick the timer fires
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = rng.gen_range(self.min..=self.max);
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Spawn scheduling for asteroids and canisters
#[derive(Debug, Clone)]
pub struct HazardSpawner {
    asteroids: SpawnTimer,
    canisters: SpawnTimer,
}

impl HazardSpawner {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            asteroids: SpawnTimer::new(rng, asteroid::SPAWN_INTERVAL_MIN, asteroid::SPAWN_INTERVAL_MAX),
            canisters: SpawnTimer::new(rng, canister::SPAWN_INTERVAL_MIN, canister::SPAWN_INTERVAL_MAX),
        }
    }

    /// Spawn an asteroid when due and under the cap, then advance all asteroids.
    /// Returns whether one spawned.
    pub fn update_asteroids<R: Rng + ?Sized>(&mut self, state: &mut GameState, rng: &mut R) -> bool {
        let due = self.asteroids.tick(rng);
        let spawned = due && state.asteroids.len() < asteroid::MAX_COUNT;
        if spawned {
            let rock = Asteroid::random(rng, &state.arena);
            tracing::debug!(x = rock.position.x, y = rock.position.y, radius = rock.radius, "asteroid spawned");
            state.asteroids.push(rock);
        }

        let arena = state.arena;
        for rock in state.asteroids.iter_mut() {
            rock.step(&arena);
        }
        state.asteroids.retain(|a| a.active);
        spawned
    }

    /// Spawn a canister when due and under the cap, then advance all canisters.
    /// Returns whether one spawned.
    pub fn update_canisters<R: Rng + ?Sized>(&mut self, state: &mut GameState, rng: &mut R) -> bool {
        let due = self.canisters.tick(rng);
        let spawned = due && state.canisters.len() < canister::MAX_COUNT;
        if spawned {
            let can = FuelCanister::random(rng, &state.arena, &state.sun);
            tracing::debug!(x = can.position.x, y = can.position.y, "fuel canister spawned");
            state.canisters.push(can);
        }

        let arena = state.arena;
        for can in state.canisters.iter_mut() {
            can.step(&arena);
        }
        state.canisters.retain(|c| c.active);
        spawned
    }
}
