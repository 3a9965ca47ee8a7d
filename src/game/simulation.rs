//! Simulation step
//!
//! One call to [`Simulation::step`] advances the world by one tick, in a fixed
//! order: commands, shots, gravity, projectile flight, projectile hits, ship
//! integration, sun and ramming collisions, hazards, pickups. Gravity sees this
//! tick's thrust and every collision pass sees post-integration positions.
//!
//! Input, audio and randomness are injected at construction.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ConfigError, MatchConfig};
use crate::game::events::{AudioSink, DeathCause, GameEvent};
use crate::game::input::{ControlCommand, InputSnapshot, InputSource};
use crate::game::match_result::{self, MatchResult};
use crate::game::ship::HyperspaceResult;
use crate::game::state::{FrameSnapshot, GameState, ShipId};
use crate::game::systems::ai::DecisionAgent;
use crate::game::systems::collision;
use crate::game::systems::debris;
use crate::game::systems::gravity;
use crate::game::systems::hazards::HazardSpawner;

/// A running two-ship match
pub struct Simulation {
    config: MatchConfig,
    state: GameState,
    /// Decision agent for each computer-controlled side
    agents: [Option<DecisionAgent>; 2],
    spawner: HazardSpawner,
    rng: StdRng,
    input: Box<dyn InputSource>,
    audio: Box<dyn AudioSink>,
    result: Option<MatchResult>,
}

impl Simulation {
    pub fn new(
        config: MatchConfig,
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(&config)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let agents = ShipId::ALL.map(|id| {
            config
                .is_computer(id)
                .then(|| DecisionAgent::new(id, config.ai_difficulty, config.ai_tuning))
        });
        let spawner = HazardSpawner::new(&mut rng);

        tracing::info!(
            arena_radius = config.arena_radius,
            shape = ?config.arena_shape,
            difficulty = %config.ai_difficulty,
            hazards = config.hazards_enabled,
            fuel = config.fuel_enabled,
            lives = config.lives,
            "match started"
        );

        Ok(Self {
            config,
            state,
            agents,
            spawner,
            rng,
            input,
            audio,
            result: None,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct world access for scripted setups
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.state.snapshot()
    }

    pub fn is_match_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    /// Poll the input source once and advance one tick
    pub fn advance(&mut self) -> Vec<GameEvent> {
        let input = self.input.poll(self.state.tick);
        self.step(&input)
    }

    /// Advance until the match ends or `max_ticks` more ticks have run
    pub fn run(&mut self, max_ticks: u64) -> Option<&MatchResult> {
        for _ in 0..max_ticks {
            if self.is_match_over() {
                break;
            }
            self.advance();
        }
        self.result.as_ref()
    }

    /// Advance one tick with the given human input. Returns what happened.
    pub fn step(&mut self, input: &InputSnapshot) -> Vec<GameEvent> {
        if self.result.is_some() {
            self.advance_cosmetics();
            return Vec::new();
        }

        let mut events = Vec::new();

        let commands = self.gather_commands(input);
        self.apply_controls(&commands, &mut events);
        self.fire(&commands, &mut events);

        gravity::apply(&mut self.state, self.config.gravitational_constant);
        self.advance_projectiles();

        events.extend(collision::resolve_projectile_hits(
            &mut self.state,
            &mut self.rng,
            self.config.round_reset_on_kill,
        ));

        self.advance_ships(&mut events);

        events.extend(collision::resolve_ship_sun(&mut self.state, &mut self.rng));
        events.extend(collision::resolve_ship_ship(&mut self.state, &mut self.rng));

        if self.config.hazards_enabled {
            self.spawner.update_asteroids(&mut self.state, &mut self.rng);
            events.extend(collision::resolve_asteroids(&mut self.state, &mut self.rng));
        }

        if self.config.fuel_enabled {
            self.spawner.update_canisters(&mut self.state, &mut self.rng);
            events.extend(collision::resolve_pickups(&mut self.state));
        }

        collision::retire_fallen_owners(&mut self.state, &events);
        self.state.prune();
        debris::update(&mut self.state.debris);
        self.state.tick += 1;

        if let Some(result) = match_result::determine_result(&self.state) {
            tracing::info!(winner = ?result.winner, ticks = result.ticks, "match over");
            events.push(GameEvent::MatchOver {
                winner: result.winner,
            });
            self.result = Some(result);
        }

        for sound in events.iter().filter_map(GameEvent::sound) {
            self.audio.play(sound);
        }

        events
    }

    /// Start over with full lives and an empty field, keeping the configuration
    pub fn reset_match(&mut self) {
        self.state.reset(self.config.lives);
        for agent in self.agents.iter_mut().flatten() {
            agent.reset();
        }
        self.spawner = HazardSpawner::new(&mut self.rng);
        self.result = None;
        tracing::info!("match reset");
    }

    /// Human commands pass through; computer sides ask their agent
    fn gather_commands(&mut self, input: &InputSnapshot) -> [ControlCommand; 2] {
        let mut commands = input.commands;
        for id in ShipId::ALL {
            if let Some(agent) = self.agents[id.index()].as_mut() {
                commands[id.index()] = agent.update(
                    self.state.ship(id),
                    self.state.ship(id.opponent()),
                    &self.state.sun,
                    &mut self.rng,
                );
            }
        }
        commands
    }

    fn apply_controls(&mut self, commands: &[ControlCommand; 2], events: &mut Vec<GameEvent>) {
        let arena = self.state.arena;
        let sun = self.state.sun;

        for id in ShipId::ALL {
            let command = commands[id.index()];
            let ship = self.state.ship_mut(id);

            ship.begin_tick();
            ship.rotate(command.rotation());
            if command.thrust {
                ship.thrust();
            }
            let jump = if command.hyperspace {
                ship.hyperspace(&arena, &sun, &mut self.rng)
            } else {
                HyperspaceResult::Refused
            };
            ship.set_shield(command.shield);

            match jump {
                HyperspaceResult::Jumped { from, to } => {
                    tracing::debug!(ship = %id, to_x = to.x, to_y = to.y, "hyperspace jump");
                    events.push(GameEvent::HyperspaceJump { ship: id, from, to });
                }
                HyperspaceResult::Malfunction => {
                    collision::on_destroyed(&self.state, id, DeathCause::HyperspaceMalfunction, events);
                }
                HyperspaceResult::Refused => {}
            }
        }
    }

    fn fire(&mut self, commands: &[ControlCommand; 2], events: &mut Vec<GameEvent>) {
        for id in ShipId::ALL {
            if !commands[id.index()].shoot {
                continue;
            }
            if let Some(projectile) = self.state.ship_mut(id).shoot() {
                events.push(GameEvent::ShotFired {
                    ship: id,
                    position: projectile.position,
                });
                self.state.projectiles.push(projectile);
            }
        }
    }

    fn advance_projectiles(&mut self) {
        let arena = self.state.arena;
        let sun = self.state.sun;
        for projectile in self.state.projectiles.iter_mut() {
            if let Some(reason) = projectile.step(&arena, &sun) {
                tracing::trace!(owner = %projectile.owner, ?reason, "projectile retired");
            }
        }
        self.state.projectiles.retain(|p| p.active);
    }

    fn advance_ships(&mut self, events: &mut Vec<GameEvent>) {
        let arena = self.state.arena;
        for id in ShipId::ALL {
            let update = self.state.ship_mut(id).update(&arena);
            if update.shield_depleted {
                tracing::trace!(ship = %id, "shield depleted");
            }
            if update.respawned {
                tracing::debug!(ship = %id, lives = self.state.ship(id).lives, "ship respawned");
                if let Some(agent) = self.agents[id.index()].as_mut() {
                    agent.reset();
                }
                events.push(GameEvent::ShipRespawned { ship: id });
            }
        }
    }

    /// Only particles keep moving once the match is decided
    fn advance_cosmetics(&mut self) {
        gravity::apply_to_particles(&mut self.state, self.config.gravitational_constant);
        for ship in self.state.ships.iter_mut() {
            debris::update(ship.particles_mut());
        }
        debris::update(&mut self.state.debris);
    }
}
