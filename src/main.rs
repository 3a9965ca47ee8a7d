use orbit_duel::config::MatchConfig;
use orbit_duel::game::events::TraceAudio;
use orbit_duel::game::input::IdleInput;
use orbit_duel::game::simulation::Simulation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stop a stalemate after ten minutes of game time at 60 ticks per second
const MAX_TICKS: u64 = 60 * 60 * 10;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Orbit Duel v{}", env!("CARGO_PKG_VERSION"));

    // Headless runs always pit two agents against each other
    let mut config = MatchConfig::load_or_default();
    config.computer_controlled = [true, true];
    config.validate()?;

    let mut sim = Simulation::new(config, Box::new(IdleInput), Box::new(TraceAudio))?;

    sim.run(MAX_TICKS);
    match sim.result() {
        Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
        None => {
            warn!(ticks = sim.tick(), "no winner before the tick limit");
            println!("{}", serde_json::to_string_pretty(&sim.snapshot().ships)?);
        }
    }

    Ok(())
}
