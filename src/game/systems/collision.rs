//! Collision resolution
//!
//! Each resolver reads post-integration positions and reports what happened as
//! [`GameEvent`]s. Ship deaths always go through [`kill`], which relies on
//! [`Ship::die`](crate::game::ship::Ship::die) refusing an already-destroyed
//! ship, so a ship caught by two hazards in one tick loses a single life.

use rand::Rng;

use crate::game::events::{BlockedThreat, DeathCause, GameEvent};
use crate::game::state::{GameState, ShipId};
use crate::game::systems::debris::{self, BurstKind};
use crate::game::systems::projectile::RetireReason;

/// Destroy a ship and report it. Returns false if it was already down.
pub fn kill<R: Rng + ?Sized>(
    state: &mut GameState,
    id: ShipId,
    cause: DeathCause,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !state.ship_mut(id).die(rng) {
        return false;
    }
    on_destroyed(state, id, cause, events);
    true
}

/// Report a ship that has just been destroyed
pub fn on_destroyed(state: &GameState, id: ShipId, cause: DeathCause, events: &mut Vec<GameEvent>) {
    let ship = state.ship(id);
    tracing::debug!(ship = %id, ?cause, lives_left = ship.lives, "ship destroyed");
    events.push(GameEvent::ShipDestroyed {
        ship: id,
        cause,
        position: ship.position,
        lives_left: ship.lives,
    });
}

/// Retire the in-flight shots of every ship destroyed in `events`.
///
/// Runs after all collision passes so shots already fired by a ship that dies
/// in the same tick as its target still count.
pub fn retire_fallen_owners(state: &mut GameState, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::ShipDestroyed { ship, .. } = event {
            state.retire_projectiles_of(*ship);
        }
    }
}

/// Projectiles vs ships. A shot never hits its owner; a raised shield absorbs it.
pub fn resolve_projectile_hits<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    round_reset_on_kill: bool,
) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for i in 0..state.projectiles.len() {
        if !state.projectiles[i].active {
            continue;
        }
        let owner = state.projectiles[i].owner;

        for target in ShipId::ALL {
            if target == owner {
                continue;
            }
            let ship = state.ship(target);
            if !ship.is_active() || !state.projectiles[i].check_collision(ship.position, ship.radius) {
                continue;
            }
            let shielded = ship.shield_active();

            state.projectiles[i].retire(RetireReason::Impact);

            if shielded {
                events.push(GameEvent::ShieldBlocked {
                    ship: target,
                    threat: BlockedThreat::Projectile,
                });
            } else if kill(state, target, DeathCause::Projectile { shooter: owner }, rng, &mut events) {
                let shooter = state.ship_mut(owner);
                shooter.hits += 1;
                if round_reset_on_kill && shooter.is_active() {
                    shooter.reset_to_start();
                }
            }
            break;
        }
    }

    events
}

/// Ships inside the sun die. Shields do not help.
pub fn resolve_ship_sun<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for id in ShipId::ALL {
        let ship = state.ship(id);
        if ship.is_active() && state.sun.is_colliding(ship.position, ship.radius) {
            kill(state, id, DeathCause::Sun, rng, &mut events);
        }
    }
    events
}

/// Overlapping ships both die. Shields do not help.
pub fn resolve_ship_ship<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let [one, two] = &state.ships;
    if !one.is_active() || !two.is_active() {
        return events;
    }

    let reach = one.radius + two.radius;
    if one.position.distance_sq_to(two.position) < reach * reach {
        for id in ShipId::ALL {
            kill(state, id, DeathCause::Collision, rng, &mut events);
        }
    }
    events
}

/// Asteroids vs sun, ships and projectiles.
///
/// The sun swallows asteroids silently. Every ship touching an asteroid dies
/// unless its shield is up; the asteroid breaks up either way. Projectiles are
/// only tested against asteroids no ship touched. A projectile and the
/// asteroid it hits are both destroyed.
pub fn resolve_asteroids<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for i in 0..state.asteroids.len() {
        let (position, velocity, radius) = {
            let rock = &state.asteroids[i];
            if !rock.active {
                continue;
            }
            (rock.position, rock.velocity, rock.radius)
        };

        if state.sun.is_colliding(position, radius) {
            state.asteroids[i].active = false;
            continue;
        }

        let mut broken = false;
        let mut by = None;

        for id in ShipId::ALL {
            let ship = state.ship(id);
            if !ship.is_active() || !state.asteroids[i].overlaps(ship.position, ship.radius) {
                continue;
            }
            if ship.shield_active() {
                events.push(GameEvent::ShieldBlocked {
                    ship: id,
                    threat: BlockedThreat::Asteroid,
                });
            } else {
                kill(state, id, DeathCause::Asteroid, rng, &mut events);
            }
            broken = true;
        }

        if !broken {
            let rock = &state.asteroids[i];
            if let Some(shot) = state
                .projectiles
                .iter_mut()
                .find(|p| p.active && rock.overlaps(p.position, p.radius))
            {
                shot.retire(RetireReason::Impact);
                broken = true;
                by = Some(shot.owner);
            }
        }

        if broken {
            state.asteroids[i].active = false;
            state
                .debris
                .extend(debris::burst(rng, BurstKind::AsteroidDebris, position, velocity));
            tracing::debug!(x = position.x, y = position.y, ?by, "asteroid destroyed");
            events.push(GameEvent::AsteroidDestroyed { position, by });
        }
    }

    state.asteroids.retain(|a| a.active);
    events
}

/// Ships collect overlapping fuel canisters
pub fn resolve_pickups(state: &mut GameState) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for can in state.canisters.iter_mut().filter(|c| c.active) {
        for ship in state.ships.iter_mut() {
            if !ship.is_active() || !ship.fuel_enabled() || !can.overlaps(ship.position, ship.radius) {
                continue;
            }
            let amount = ship.add_fuel(can.payload);
            can.active = false;
            tracing::debug!(ship = %ship.id, amount, "fuel collected");
            events.push(GameEvent::FuelCollected { ship: ship.id, amount });
            break;
        }
    }

    state.canisters.retain(|c| c.active);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::systems::hazards::{Asteroid, FuelCanister};
    use crate::game::systems::projectile::Projectile;
    use crate::util::vec2::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_state() -> GameState {
        GameState::new(&MatchConfig {
            fuel_enabled: true,
            ..Default::default()
        })
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn shot_at(state: &GameState, owner: ShipId, target: ShipId) -> Projectile {
        let mut shot = Projectile::spawn(Vec2::ZERO, 0.0, Vec2::ZERO, owner);
        shot.position = state.ship(target).position;
        shot
    }

    #[test]
    fn test_owner_is_immune_to_own_shot() {
        let mut state = create_test_state();
        let shot = shot_at(&state, ShipId::One, ShipId::One);
        state.projectiles.push(shot);

        let events = resolve_projectile_hits(&mut state, &mut rng(), false);

        assert!(events.is_empty());
        assert!(state.ship(ShipId::One).is_active());
        assert!(state.projectiles[0].active);
    }

    #[test]
    fn test_shot_kills_unshielded_opponent() {
        let mut state = create_test_state();
        let shot = shot_at(&state, ShipId::One, ShipId::Two);
        state.projectiles.push(shot);

        let events = resolve_projectile_hits(&mut state, &mut rng(), false);

        assert!(!state.ship(ShipId::Two).is_active());
        assert_eq!(state.ship(ShipId::Two).lives, 2);
        assert_eq!(state.ship(ShipId::One).hits, 1);
        assert!(!state.projectiles[0].active);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::ShipDestroyed {
                ship: ShipId::Two,
                cause: DeathCause::Projectile { shooter: ShipId::One },
                ..
            }]
        ));
    }

    #[test]
    fn test_shield_absorbs_shot() {
        let mut state = create_test_state();
        state.ship_mut(ShipId::Two).set_shield(true);
        let shot = shot_at(&state, ShipId::One, ShipId::Two);
        state.projectiles.push(shot);

        let events = resolve_projectile_hits(&mut state, &mut rng(), false);

        assert!(state.ship(ShipId::Two).is_active());
        assert_eq!(state.ship(ShipId::Two).lives, 3);
        assert!(!state.projectiles[0].active);
        assert_eq!(
            events,
            vec![GameEvent::ShieldBlocked {
                ship: ShipId::Two,
                threat: BlockedThreat::Projectile,
            }]
        );
    }

    #[test]
    fn test_two_shots_same_tick_cost_one_life() {
        let mut state = create_test_state();
        let shot = shot_at(&state, ShipId::One, ShipId::Two);
        state.projectiles.push(shot.clone());
        state.projectiles.push(shot);

        let events = resolve_projectile_hits(&mut state, &mut rng(), false);

        assert_eq!(events.len(), 1);
        assert_eq!(state.ship(ShipId::Two).lives, 2);
        // Second shot found no live target and keeps flying
        assert!(state.projectiles[1].active);
    }

    #[test]
    fn test_round_reset_sends_shooter_home() {
        let mut state = create_test_state();
        let home = state.ship(ShipId::One).position;
        state.ship_mut(ShipId::One).position = Vec2::new(0.0, 200.0);
        state.ship_mut(ShipId::One).velocity = Vec2::new(2.0, 0.0);
        let shot = shot_at(&state, ShipId::One, ShipId::Two);
        state.projectiles.push(shot);

        resolve_projectile_hits(&mut state, &mut rng(), true);

        assert_eq!(state.ship(ShipId::One).position, home);
        assert_eq!(state.ship(ShipId::One).velocity, Vec2::ZERO);
    }

    #[test]
    fn test_mutual_kill_keeps_both_shots() {
        let mut state = create_test_state();
        let a = shot_at(&state, ShipId::One, ShipId::Two);
        let b = shot_at(&state, ShipId::Two, ShipId::One);
        state.projectiles.push(a);
        state.projectiles.push(b);

        let events = resolve_projectile_hits(&mut state, &mut rng(), false);
        retire_fallen_owners(&mut state, &events);

        assert_eq!(events.len(), 2);
        assert!(!state.ship(ShipId::One).is_active());
        assert!(!state.ship(ShipId::Two).is_active());
    }

    #[test]
    fn test_fallen_owner_shots_retired() {
        let mut state = create_test_state();
        state.projectiles.push(Projectile::spawn(Vec2::new(0.0, 300.0), 0.0, Vec2::ZERO, ShipId::Two));
        let mut events = Vec::new();
        kill(&mut state, ShipId::Two, DeathCause::Sun, &mut rng(), &mut events);

        retire_fallen_owners(&mut state, &events);

        assert!(!state.projectiles[0].active);
    }

    #[test]
    fn test_overlapping_ships_both_die_once() {
        let mut state = create_test_state();
        let position = Vec2::new(0.0, 200.0);
        state.ship_mut(ShipId::One).position = position;
        state.ship_mut(ShipId::Two).position = position;
        state.ship_mut(ShipId::Two).set_shield(true);

        let events = resolve_ship_ship(&mut state, &mut rng());

        assert_eq!(events.len(), 2);
        for id in ShipId::ALL {
            assert!(!state.ship(id).is_active());
            assert_eq!(state.ship(id).lives, 2);
        }

        // A second pass in the same tick changes nothing
        assert!(resolve_ship_ship(&mut state, &mut rng()).is_empty());
        assert!(resolve_ship_sun(&mut state, &mut rng()).is_empty());
        assert_eq!(state.ship(ShipId::One).lives, 2);
    }

    #[test]
    fn test_sun_ignores_shield() {
        let mut state = create_test_state();
        state.ship_mut(ShipId::One).position = Vec2::new(5.0, 0.0);
        state.ship_mut(ShipId::One).set_shield(true);

        let events = resolve_ship_sun(&mut state, &mut rng());

        assert_eq!(events.len(), 1);
        assert!(!state.ship(ShipId::One).is_active());
        assert!(state.ship(ShipId::Two).is_active());
    }

    #[test]
    fn test_asteroid_into_sun_vanishes() {
        let mut state = create_test_state();
        let mut rng = rng();
        let rock = Asteroid::new(&mut rng, Vec2::new(20.0, 0.0), Vec2::ZERO, 15.0);
        state.asteroids.push(rock);

        let events = resolve_asteroids(&mut state, &mut rng);

        assert!(events.is_empty());
        assert!(state.asteroids.is_empty());
        assert!(state.debris.is_empty());
    }

    #[test]
    fn test_asteroid_kills_unshielded_ship() {
        let mut state = create_test_state();
        let mut rng = rng();
        let position = state.ship(ShipId::Two).position;
        let rock = Asteroid::new(&mut rng, position, Vec2::ZERO, 15.0);
        state.asteroids.push(rock);

        let events = resolve_asteroids(&mut state, &mut rng);

        assert!(!state.ship(ShipId::Two).is_active());
        assert!(state.asteroids.is_empty());
        assert!(!state.debris.is_empty());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::ShipDestroyed { cause: DeathCause::Asteroid, .. }
        )));
    }

    #[test]
    fn test_shield_stops_asteroid() {
        let mut state = create_test_state();
        let mut rng = rng();
        state.ship_mut(ShipId::Two).set_shield(true);
        let position = state.ship(ShipId::Two).position;
        let rock = Asteroid::new(&mut rng, position, Vec2::ZERO, 15.0);
        state.asteroids.push(rock);

        let events = resolve_asteroids(&mut state, &mut rng);

        assert!(state.ship(ShipId::Two).is_active());
        assert!(state.asteroids.is_empty());
        assert!(events.contains(&GameEvent::ShieldBlocked {
            ship: ShipId::Two,
            threat: BlockedThreat::Asteroid,
        }));
    }

    #[test]
    fn test_asteroid_hits_both_overlapping_ships() {
        let mut state = create_test_state();
        let mut rng = rng();
        let position = Vec2::new(0.0, 200.0);
        state.ship_mut(ShipId::One).position = position;
        state.ship_mut(ShipId::Two).position = position;
        state.ship_mut(ShipId::Two).set_shield(true);
        let rock = Asteroid::new(&mut rng, position, Vec2::ZERO, 15.0);
        state.asteroids.push(rock);

        let events = resolve_asteroids(&mut state, &mut rng);

        assert!(!state.ship(ShipId::One).is_active());
        assert!(state.ship(ShipId::Two).is_active());
        assert!(events.contains(&GameEvent::ShieldBlocked {
            ship: ShipId::Two,
            threat: BlockedThreat::Asteroid,
        }));
        let broken = events
            .iter()
            .filter(|e| matches!(e, GameEvent::AsteroidDestroyed { .. }))
            .count();
        assert_eq!(broken, 1);
        assert!(state.asteroids.is_empty());
    }

    #[test]
    fn test_projectile_breaks_asteroid() {
        let mut state = create_test_state();
        let mut rng = rng();
        let position = Vec2::new(0.0, 250.0);
        let rock = Asteroid::new(&mut rng, position, Vec2::ZERO, 15.0);
        state.asteroids.push(rock);
        let mut shot = Projectile::spawn(Vec2::ZERO, 0.0, Vec2::ZERO, ShipId::One);
        shot.position = position + Vec2::new(10.0, 0.0);
        state.projectiles.push(shot);

        let events = resolve_asteroids(&mut state, &mut rng);

        assert!(state.asteroids.is_empty());
        assert!(!state.projectiles[0].active);
        assert_eq!(
            events,
            vec![GameEvent::AsteroidDestroyed {
                position,
                by: Some(ShipId::One),
            }]
        );
    }

    #[test]
    fn test_pickup_refuels() {
        let mut state = create_test_state();
        state.ship_mut(ShipId::One).add_fuel(-50.0);
        let position = state.ship(ShipId::One).position;
        state.canisters.push(FuelCanister::new(position, Vec2::ZERO));

        let events = resolve_pickups(&mut state);

        assert!(state.canisters.is_empty());
        assert!(matches!(
            events.as_slice(),
            [GameEvent::FuelCollected { ship: ShipId::One, .. }]
        ));
        assert!(state.ship(ShipId::One).fuel() > 50.0);
    }
}
