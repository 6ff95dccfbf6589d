#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strokes_core::{GestureRegistry, RecognizerConfig, Sensitivity};

use crate::error::{CliError, Result};
use crate::inspect::{
    MatchArgs, ThresholdsArgs, ValidateArgs, run_demo_registry, run_match, run_thresholds,
    run_validate,
};
use crate::replay::{ReplayArgs, run_replay};

#[derive(Debug, Parser)]
#[command(
    name = "strokes",
    about = "Replay and inspect directional stroke gesture recognition",
    version
)]
pub struct Cli {
    /// Log as JSON on stderr (filter with RUST_LOG).
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Feed a recorded pointer trace through a capture session.
    Replay(ReplayArgs),

    /// Match a pattern given as direction vectors.
    Match(MatchArgs),

    /// Show the thresholds a sensitivity maps to.
    Thresholds(ThresholdsArgs),

    /// Check a gesture registry for entries that can never match.
    Validate(ValidateArgs),

    /// Print the built-in demo registry as JSON.
    #[command(name = "demo-registry")]
    DemoRegistry,
}

/// Registry and configuration sources shared by subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct RecognizerArgs {
    /// Gesture registry: JSON array or host response. Defaults to the demo set.
    #[arg(long)]
    pub gestures: Option<PathBuf>,

    /// Recognizer config file (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sensitivity override in [-3, 3].
    #[arg(long, allow_negative_numbers = true)]
    pub sensitivity: Option<f64>,

    /// Acceptance threshold override.
    #[arg(long)]
    pub threshold: Option<f64>,
}

impl RecognizerArgs {
    pub fn registry(&self) -> Result<GestureRegistry> {
        let registry = match &self.gestures {
            Some(path) => GestureRegistry::from_json_file(path)?,
            None => GestureRegistry::demo(),
        };
        for problem in registry.validate() {
            tracing::warn!(%problem, "gesture will never match");
        }
        Ok(registry)
    }

    pub fn config(&self) -> Result<RecognizerConfig> {
        let mut config = match &self.config {
            Some(path) => RecognizerConfig::load(path)?,
            None => RecognizerConfig::default(),
        };
        if let Some(s) = self.sensitivity {
            if !(Sensitivity::MIN..=Sensitivity::MAX).contains(&s) {
                return Err(CliError::invalid(format!(
                    "sensitivity must be within [{}, {}], got {s}",
                    Sensitivity::MIN,
                    Sensitivity::MAX
                )));
            }
            config.sensitivity = Sensitivity::new(s);
        }
        if let Some(t) = self.threshold {
            config.acceptance_threshold = t;
        }
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(CliError::invalid(errors.join("; ")));
        }
        Ok(config)
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.log_json);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(args, out),
        Commands::Match(args) => run_match(args, out),
        Commands::Thresholds(args) => run_thresholds(args, out),
        Commands::Validate(args) => run_validate(args, out),
        Commands::DemoRegistry => run_demo_registry(out),
    }
}
