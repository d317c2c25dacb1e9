//! Command-line interface for bo-testability
//!
//! # Usage Examples
//!
//! ## Generate objects
//! ```bash
//! # Three valid Invoice objects, one JSON object per line
//! bo-testability generate --class-defs model.yaml --class Invoice --count 3
//!
//! # Saved objects with a fixed seed and generator overrides
//! bo-testability generate --class-defs model.yaml --class Invoice \
//!   --saved --seed 7 --config testability.toml
//! ```
//!
//! ## Check definitions
//! ```bash
//! bo-testability check --class-defs model.yaml
//! ```
//!
//! Set `RUST_LOG=debug` to see every generated value.

use anyhow::Context;
use bo_core::ClassDefCol;
use bo_generator::ValidValueGeneratorRegistry;
use bo_testability::TestabilityConfig;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "bo-testability")]
#[command(about = "Generate valid business objects and check class definitions")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print valid objects of one class as JSON lines
    Generate {
        /// YAML file with the class definitions
        #[arg(long, value_name = "PATH", env = "BO_CLASS_DEFS")]
        class_defs: PathBuf,

        /// Class to generate
        #[arg(long)]
        class: String,

        /// Number of objects to generate
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Random seed for values and ids (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Save every object, and everything it references, before printing
        #[arg(long)]
        saved: bool,

        /// TOML configuration file
        #[arg(long, value_name = "PATH", env = "BO_TESTABILITY_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Report problems in a class definition file
    Check {
        /// YAML file with the class definitions
        #[arg(long, value_name = "PATH", env = "BO_CLASS_DEFS")]
        class_defs: PathBuf,
    },

    /// List the generator names usable in the [generators] config table
    Generators,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            class_defs,
            class,
            count,
            seed,
            saved,
            config,
        } => {
            let mut config = match config {
                Some(path) => TestabilityConfig::from_file(path)?,
                None => TestabilityConfig::default(),
            };
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            run_generate(&class_defs, &class, count, saved, &config)
        }
        Commands::Check { class_defs } => run_check(&class_defs),
        Commands::Generators => {
            for name in ValidValueGeneratorRegistry::new().generator_names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_class_defs(path: &Path) -> anyhow::Result<ClassDefCol> {
    ClassDefCol::from_file(path)
        .with_context(|| format!("Failed to load class definitions from {}", path.display()))
}

fn run_generate(
    class_defs: &Path,
    class: &str,
    count: usize,
    saved: bool,
    config: &TestabilityConfig,
) -> anyhow::Result<()> {
    let mut ctx = config.build_context(load_class_defs(class_defs)?)?;
    info!(
        "Generating {} '{}' object(s) with seed {}",
        count, class, config.factory.seed
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for _ in 0..count {
        let bo = if saved {
            ctx.create_saved(class)
        } else {
            ctx.create_valid(class)
        }
        .with_context(|| format!("Failed to create a valid '{class}'"))?;
        serde_json::to_writer(&mut out, &bo)?;
        writeln!(out)?;
    }
    Ok(())
}

fn run_check(class_defs: &Path) -> anyhow::Result<()> {
    let class_defs = load_class_defs(class_defs)?;
    let problems = class_defs.check();
    if problems.is_empty() {
        println!("{} class definition(s) OK", class_defs.len());
        return Ok(());
    }
    for problem in &problems {
        println!("{problem}");
    }
    anyhow::bail!("{} problem(s) found in class definitions", problems.len())
}
