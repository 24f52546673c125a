use anyhow::Result;
use clap::Parser;
use observer_reality_lib::app::{run_headless, run_realtime, ShutdownManager};
use observer_reality_lib::model::metrics::init_logging;
use observer_reality_lib::model::{EngineConfig, ObserverEngine, ObserverMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How ticks are scheduled
    #[arg(short, long, value_enum, default_value = "headless")]
    mode: Mode,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Observer mode (quantum, classical, social, conscious, ai,
    /// thermodynamic, relativistic, probabilistic)
    #[arg(short, long)]
    observer: Option<String>,

    /// Number of particles
    #[arg(short, long)]
    population: Option<usize>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 300)]
    ticks: u64,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Target frame rate in realtime mode
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Computational budget in [0, 100]
    #[arg(long)]
    budget: Option<f64>,

    /// Evolution speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Keep forces frozen (render and telemetry only)
    #[arg(long)]
    paused: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Mode {
    Headless,
    Realtime,
}

fn apply_overrides(config: &mut EngineConfig, args: &Args) -> Result<()> {
    if let Some(name) = &args.observer {
        config.simulation.observer_type = name.parse::<ObserverMode>()?;
    }
    if let Some(population) = args.population {
        config.simulation.population_size = population;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }
    if let Some(budget) = args.budget {
        config.simulation.computational_budget = budget;
    }
    if let Some(speed) = args.speed {
        config.simulation.evolution_speed = speed;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = EngineConfig::load(&args.config)?;
    apply_overrides(&mut config, &args)?;
    let mut engine = ObserverEngine::new(config)?;
    if !args.paused {
        engine.play();
    }

    let summary = match args.mode {
        Mode::Headless => run_headless(&mut engine, args.ticks),
        Mode::Realtime => {
            let shutdown = ShutdownManager::new();
            shutdown.listen_for_ctrl_c();
            run_realtime(&mut engine, args.ticks, args.fps, &shutdown).await
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
