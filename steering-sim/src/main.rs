use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use steering_shared::{ModeName, PolicyName, SimSettings};
use steering_sim::{load_settings, Simulation};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless steering behaviors simulation", long_about = None)]
struct Args {
    /// JSON settings file; missing fields use the built-in defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Behavior to run: seek, flee, pursuit, evade, arrival, circuit, oneway or twoway
    #[arg(short, long)]
    mode: Option<ModeName>,

    /// Number of ticks to simulate
    #[arg(short, long)]
    ticks: Option<u64>,

    /// How steering is applied: 'direct' (instant heading) or 'force' (bounded acceleration)
    #[arg(short, long)]
    policy: Option<PolicyName>,

    /// Write one JSON frame snapshot per tick to stdout
    #[arg(long)]
    trace: bool,

    /// Pace the loop at 60 ticks per second
    #[arg(long)]
    realtime: bool,

    /// Spawn the target at a random spot and drag it along a random walk seeded with this value
    #[arg(long)]
    random_target: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut settings = match &args.config {
        Some(path) => {
            log::info!("Loading settings from {}", path.display());
            load_settings(path)?
        }
        None => SimSettings::default(),
    };
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(ticks) = args.ticks {
        settings.ticks = ticks;
    }
    if let Some(policy) = args.policy {
        settings.policy = policy;
    }

    log::info!("Steering simulation starting...");
    log::info!("Mode: {}", settings.mode);
    log::info!("Policy: {:?}", settings.policy);

    let mut sim = Simulation::new(&settings).context("Failed to initialize simulation")?;
    if let Some(seed) = args.random_target {
        log::info!("Random target walk with seed {}", seed);
        sim = sim.with_random_target(seed);
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let trace = if args.trace { Some(&mut out) } else { None };
    let summary = sim
        .run(settings.ticks, trace, args.realtime)
        .context("Simulation error")?;

    serde_json::to_writer(&mut out, &summary).context("Failed to write summary")?;
    writeln!(out).context("Failed to write summary")?;
    out.flush()?;

    log::info!(
        "Finished after {} ticks at ({:.1}, {:.1}), {} waypoints reached",
        summary.ticks,
        summary.agent_position.x,
        summary.agent_position.y,
        summary.waypoints_reached
    );

    Ok(())
}
