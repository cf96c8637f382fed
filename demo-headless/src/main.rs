use anyhow::Context;
use clap::Parser;
use reactor_sim_core::{
    ReactorConfig, ReactorSimulation, RodAction, RodClass, RodCommand, RodTarget,
};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reactor core simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "reactor-sim-demo")]
#[command(about = "Headless reactor core simulation", long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,

    /// Random seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Reactor configuration as RON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Slow neutrons seeded at startup (overrides the config file)
    #[arg(short, long)]
    neutrons: Option<usize>,

    /// Retract every control rod at this tick
    #[arg(long)]
    retract_control_at: Option<u64>,

    /// Retract every moderator rod at this tick
    #[arg(long)]
    retract_moderators_at: Option<u64>,

    /// Re-insert every control rod at this tick (SCRAM)
    #[arg(long)]
    scram_at: Option<u64>,

    /// Spread meltdown from every breached chamber each tick
    #[arg(long)]
    auto_spread: bool,

    /// Disable smoke and spark effects
    #[arg(long)]
    no_effects: bool,

    /// Replay rod commands from a JSON file instead of the schedule flags
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Report interval in ticks
    #[arg(short, long, default_value_t = 100)]
    report_every: u64,

    /// Write the final snapshot as JSON
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Write the rod command history as JSON
    #[arg(long)]
    commands_out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    println!("=== Reactor Simulation Demo ===\n");

    let config = build_config(&args)?;
    println!(
        "Seed: {:#x}, initial neutrons: {}, auto spread: {}, effects: {}",
        config.seed,
        config.initial_neutrons,
        config.auto_spread_meltdown,
        config.emit_meltdown_effects
    );

    let schedule = match &args.replay {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading commands from {}", path.display()))?;
            let mut commands: Vec<RodCommand> =
                serde_json::from_str(&text).context("parsing rod commands")?;
            commands.sort_by_key(|command| command.tick);
            println!("Replaying {} rod commands", commands.len());
            commands
        }
        None => schedule_from_flags(&args),
    };

    let mut sim = ReactorSimulation::new(config)?;
    let grid = sim.grid();
    println!(
        "Core: {}x{} chambers, {} control rods, {} moderator rods\n",
        grid.cols(),
        grid.rows(),
        sim.rods(RodClass::Control).len(),
        sim.rods(RodClass::Moderator).len()
    );

    println!("  Tick | Core T | Neutrons | Fast | Smoke | Sparks | Wet | Ctrl in | Breached");
    println!("-------|--------|----------|------|-------|--------|-----|---------|---------");

    let mut pending = schedule.into_iter().peekable();
    let mut peak_temperature = sim.core_temperature();
    let mut first_breach = None;
    let mut went_critical = None;

    for _ in 0..args.ticks {
        let now = sim.tick_count();
        while let Some(command) = pending.next_if(|command| command.tick <= now) {
            sim.apply_rod_command(command.class, command.target, command.action)?;
        }

        sim.tick()?;

        let stats = sim.stats();
        peak_temperature = peak_temperature.max(stats.core_temperature);
        if stats.meltdown_in_progress && first_breach.is_none() {
            first_breach = Some(stats.tick);
        }
        if stats.critical && went_critical.is_none() {
            went_critical = Some(stats.tick);
        }

        if args.report_every > 0 && stats.tick % args.report_every == 0 {
            println!(
                "{:6} | {:6.1} | {:8} | {:4} | {:5} | {:6} | {:3} | {:3}/{:<3} | {:8}",
                stats.tick,
                stats.core_temperature,
                stats.neutrons,
                stats.fast_neutrons,
                stats.smoke,
                stats.sparks,
                stats.chambers_with_water,
                stats.inserted_control_rods,
                stats.total_control_rods,
                stats.melted_elements
            );
        }
    }

    let stats = sim.stats();
    println!("\n=== Simulation Complete ===");
    println!("Ticks: {}", stats.tick);
    println!("Final core temperature: {:.1}", stats.core_temperature);
    println!("Peak core temperature: {:.1}", peak_temperature);
    println!("Live particles: {}", stats.particles());
    println!(
        "Chambers with water: {}/{}",
        stats.chambers_with_water, stats.total_chambers
    );
    match went_critical {
        Some(tick) => println!("Core went critical at tick {}", tick),
        None => println!("Core never went critical"),
    }
    match first_breach {
        Some(tick) => println!(
            "First breach at tick {}, {} chambers breached",
            tick, stats.melted_elements
        ),
        None => println!("No chamber breached"),
    }

    if let Some(path) = &args.snapshot_out {
        let json = serde_json::to_string_pretty(&sim.snapshot())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Snapshot written to {}", path.display());
    }

    if let Some(path) = &args.commands_out {
        let json = serde_json::to_string_pretty(&sim.command_history())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Command history written to {}", path.display());
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<ReactorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            ron::from_str(&text).context("parsing reactor config")?
        }
        None => ReactorConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(neutrons) = args.neutrons {
        config.initial_neutrons = neutrons;
    }
    if args.auto_spread {
        config.auto_spread_meltdown = true;
    }
    if args.no_effects {
        config.emit_meltdown_effects = false;
    }

    config.validate()?;
    Ok(config)
}

fn schedule_from_flags(args: &Args) -> Vec<RodCommand> {
    let mut schedule = Vec::new();
    if let Some(tick) = args.retract_control_at {
        schedule.push(RodCommand::new(
            tick,
            RodClass::Control,
            RodTarget::All,
            RodAction::Retract,
        ));
    }
    if let Some(tick) = args.retract_moderators_at {
        schedule.push(RodCommand::new(
            tick,
            RodClass::Moderator,
            RodTarget::All,
            RodAction::Retract,
        ));
    }
    if let Some(tick) = args.scram_at {
        schedule.push(RodCommand::new(
            tick,
            RodClass::Control,
            RodTarget::All,
            RodAction::Insert,
        ));
    }
    schedule.sort_by_key(|command| command.tick);
    schedule
}
