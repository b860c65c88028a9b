#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use toggleview_core::PanelConfig;

use crate::error::Result;
use crate::replay::{DEFAULT_FPS, FrameClock};
use crate::scenario::{DEFAULT_MAX_FRAMES, Scenario, run_scenario};

#[derive(Debug, Parser)]
#[command(
    name = "toggleview-harness",
    about = "Deterministic gesture replay for the toggleview panel controller",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a named scenario and print its JSONL transcript.
    Run(RunArgs),

    /// Print built-in scenario names.
    List,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario name (see `list`).
    pub scenario: String,

    /// Panel config file (TOML, or JSON with a `.json` extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Seed for the `storm` scenario.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Give up if still settling after this many frames.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    pub max_frames: usize,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_replay(&args, out),
        Commands::List => {
            for scenario in Scenario::ALL {
                writeln!(out, "{:<14} {}", scenario.name(), scenario.description())?;
            }
            Ok(())
        }
    }
}

fn run_replay<W: Write>(args: &RunArgs, out: &mut W) -> Result<()> {
    let scenario: Scenario = args.scenario.parse()?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PanelConfig::default(),
    };
    let clock = FrameClock::from_fps(args.fps)?;
    let transcript = run_scenario(scenario, config, clock, args.seed, args.max_frames)?;
    transcript.write_jsonl(&mut *out)?;
    out.flush()?;
    Ok(())
}

fn load_config(path: &Path) -> Result<PanelConfig> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        PanelConfig::from_json_file(path)?
    } else {
        PanelConfig::from_toml_file(path)?
    };
    Ok(config)
}
