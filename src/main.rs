use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tombo_calc::{Config, ForceHistory, Loads, NoObserver, Simulation};

mod output;

use output::SnapshotWriter;

#[derive(Parser, Debug)]
#[command(version, about = "Tandem flapping-wing vortex-lattice simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a simulation and write its results
    Sim {
        /// TOML configuration; built-in hovering defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output folder, overriding the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip per-step circulation and wake files
        #[arg(long)]
        no_snapshots: bool,
    },
    /// Validate a configuration and print the derived solver parameters
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => {
            info!("no configuration given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Creates the output folder, wiping it first when asked to.
fn prepare_folder(folder: &Path, flush: bool) -> Result<()> {
    if flush && folder.exists() {
        info!(folder = %folder.display(), "flushing output folder");
        fs::remove_dir_all(folder).with_context(|| format!("removing {}", folder.display()))?;
    }
    fs::create_dir_all(folder).with_context(|| format!("creating {}", folder.display()))
}

fn print_parameters(simulation: &Simulation) {
    let summary = simulation.params().summary();
    let mut keys: Vec<_> = summary.keys().copied().collect();
    keys.sort_unstable();
    println!("solver parameters:");
    for key in keys {
        println!("  {key:<16} {:.6}", summary[key]);
    }
}

fn print_loads(si: &ForceHistory) {
    let n = si.len() as f64;
    let mean = |get: fn(&Loads) -> f64| si.total.iter().map(get).sum::<f64>() / n;
    println!("mean loads over {} steps:", si.len());
    println!("  thrust (-fx) {:+.6e} N", -mean(|l| l.force.x));
    println!("  lift   (fz)  {:+.6e} N", mean(|l| l.force.z));
    println!("  pitch  (my)  {:+.6e} N m", mean(|l| l.moment.y));
}

fn check(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let (simulation, scales) = Simulation::from_config(&config)?;
    print_parameters(&simulation);
    println!(
        "scales: length {:.4e} m, time {:.4e} s, velocity {:.4e} m/s",
        scales.length, scales.time, scales.velocity
    );
    println!("configuration ok");
    Ok(())
}

fn sim(path: Option<&Path>, folder: Option<PathBuf>, no_snapshots: bool) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(folder) = folder {
        config.output.folder = folder;
    }
    if no_snapshots {
        config.output.save_snapshots = false;
    }

    let (simulation, scales) = Simulation::from_config(&config)?;
    print_parameters(&simulation);

    let folder = config.output.folder.clone();
    prepare_folder(&folder, config.output.flush)?;
    fs::write(folder.join("config.toml"), config.to_toml_string()?)
        .context("saving configuration")?;

    let run = if config.output.save_snapshots {
        let mut writer = SnapshotWriter::spawn(&folder)?;
        let run = simulation.run(&mut writer)?;
        let written = writer.finish()?;
        info!(written, "snapshots saved");
        run
    } else {
        simulation.run(&mut NoObserver)?
    };

    match run.forces {
        Some(forces) => {
            let si = forces.to_dimensional(&scales);
            let paths = output::write_forces(&folder, &forces, &si)?;
            info!(path = %paths[1].display(), "forces saved");
            print_loads(&si);
        }
        None => warn!(
            steps = run.state.step,
            "too few steps for force evaluation, no forces written"
        ),
    }
    println!("results in {}", folder.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Sim {
            config,
            output,
            no_snapshots,
        } => sim(config.as_deref(), output, no_snapshots),
        Command::Check { config } => check(config.as_deref()),
    }
}
