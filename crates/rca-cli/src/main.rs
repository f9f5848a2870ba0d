//! Batch driver: run a simulation described by a JSON file, print the history
//! and optionally write it as a PNG.

mod telemetry;

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rca_core::{Lattice, RunConfig};
use rca_engine::{render_ascii, render_png, History, Simulation};
use rca_rules::random_lattice;
use std::path::{Path, PathBuf};
use tracing::info;

const USAGE: &str = "usage: rca <run.json> [output.png]";

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let output = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!(USAGE);
    }

    let config = load_config(&config_path)?;
    let (history, states) = execute(&config)?;

    print!("{}", render_ascii(&history.raster(), &config.render));

    if let Some(path) = output {
        let bytes = render_png(&history.raster(), states, &config.render)?;
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Starting lattice: explicit cells, else a seeded random lattice, else a single centered 1
fn initial_state(config: &RunConfig) -> Result<Lattice> {
    let size = config.simulation.size;
    if let Some(state) = &config.initial_state {
        return Ok(state.clone());
    }
    match &config.random_initial {
        Some(random) => {
            let mut rng = ChaCha8Rng::seed_from_u64(random.seed);
            Ok(random_lattice(size, config.simulation.states, random.density, &mut rng)?)
        }
        None => Ok(Lattice::single_seed(size, 1)),
    }
}

/// Run the configured simulation from an empty history
fn execute(config: &RunConfig) -> Result<(History, u32)> {
    let simulation = Simulation::from_config(&config.simulation, &config.rule)?;
    let initial = initial_state(config)?;

    let mut history = History::new();
    simulation.run(&mut history, &initial, config.simulation.steps)?;

    Ok((history, config.simulation.states))
}
