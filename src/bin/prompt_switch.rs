//! Prompt Switch CLI
//!
//! Runs the buffer operators over text files and the trigger engine over a JSON
//! workspace (`[{"label": ..., "buffer": ..., "muted": false}]`).
//!
//! Usage:
//!   cargo run --features cli --bin prompt-switch -- render prompts.txt --prefix "masterpiece"
//!   cargo run --features cli --bin prompt-switch -- random prompts.txt --tags "/R1-3" --stdout
//!   cargo run --features cli --bin prompt-switch -- --seed 7 trigger workspace.json

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use prompt_switch::directives::{self, random_pickup, SelectionRange};
use prompt_switch::{
    assemble_prompt, ConfigLoader, DeactivateOutcome, Diagnostic, Engine, TagSet, Workspace,
};

#[derive(Parser)]
#[command(name = "prompt-switch")]
#[command(version)]
#[command(about = "Tag-directed prompt line activation over plain-text prompt buffers")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Fixed RNG seed (overrides the config file)
    #[arg(long, global = true, env = "PROMPT_SWITCH_SEED")]
    seed: Option<u64>,

    /// Config file (default: $PROMPT_SWITCH_CONFIG, then ./prompt-switch.yaml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Print diagnostics and summaries as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the assembled prompt for a buffer
    Render {
        file: PathBuf,

        /// Line emitted before the prompt
        #[arg(long, short = 'p')]
        prefix: Option<String>,
    },

    /// Deactivate every line if any is active, otherwise activate every line
    Toggle {
        file: PathBuf,
        #[arg(long)]
        stdout: bool,
    },

    /// Force every prompt line inactive
    Deactivate {
        file: PathBuf,
        #[arg(long)]
        stdout: bool,
    },

    /// Remove every weight wrapper
    ResetWeights {
        file: PathBuf,
        #[arg(long)]
        stdout: bool,
    },

    /// Flip one line (1-based)
    ToggleLine {
        file: PathBuf,
        line: usize,
        #[arg(long)]
        stdout: bool,
    },

    /// Raise or lower one line's weight by the configured step
    Weight {
        file: PathBuf,
        /// 1-based line number
        line: usize,
        /// Lower instead of raise
        #[arg(long)]
        down: bool,
        #[arg(long)]
        stdout: bool,
    },

    /// Random pickup with the selector from a tag string
    Random {
        file: PathBuf,

        /// Tags to read the selector from (e.g. "/R1-3")
        #[arg(long, short = 't', default_value = "/r")]
        tags: String,

        #[arg(long)]
        stdout: bool,
    },

    /// Run one pre-execution cycle (turn, then chaos-multi) over a workspace
    Trigger { workspace: PathBuf },

    /// Deactivate every entity in a workspace not tagged /a
    DeactivateAll { workspace: PathBuf },

    /// Random pickup for every entity in a workspace not muted or tagged /r
    RandomizeAll { workspace: PathBuf },
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
            } else {
                eprintln!("{}: {:#}", "error".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new(path),
        None => ConfigLoader::from_env(),
    };
    let mut config = loader.load()?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    let engine = Engine::new(config);

    match &cli.command {
        Commands::Render { file, prefix } => {
            let text = read_text(file)?;
            println!("{}", assemble_prompt(&text, prefix.as_deref()));
            Ok(())
        }
        Commands::Toggle { file, stdout } => {
            rewrite_file(file, *stdout, directives::toggle_all_prompts)
        }
        Commands::Deactivate { file, stdout } => {
            rewrite_file(file, *stdout, directives::deactivate_prompt_text)
        }
        Commands::ResetWeights { file, stdout } => {
            rewrite_file(file, *stdout, directives::reset_weights_text)
        }
        Commands::ToggleLine { file, line, stdout } => {
            let index = line_index(*line)?;
            rewrite_file(file, *stdout, |text| directives::toggle_line_text(text, index))
        }
        Commands::Weight {
            file,
            line,
            down,
            stdout,
        } => {
            let index = line_index(*line)?;
            let config = engine.config();
            let delta = if *down {
                -config.weight_step
            } else {
                config.weight_step
            };
            let bounds = config.weight_bounds();
            rewrite_file(file, *stdout, |text| {
                directives::adjust_weight_text(text, index, delta, bounds)
            })
        }
        Commands::Random {
            file,
            tags,
            stdout,
        } => {
            let (tag_set, tag_diag) = TagSet::parse_or_empty(tags);
            let (range, range_diag) = SelectionRange::resolve(tag_set.random());
            let diagnostics: Vec<Diagnostic> = tag_diag.into_iter().chain(range_diag).collect();
            report_diagnostics(&diagnostics, cli.json)?;

            let mut rng = engine.rng();
            rewrite_file(file, *stdout, |text| random_pickup(text, &range, &mut rng))
        }
        Commands::Trigger { workspace } => {
            let mut ws = read_workspace(workspace)?;
            let mut rng = engine.rng();
            let report = engine.before_work(&mut ws, &mut rng);
            write_workspace(workspace, &ws)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report_diagnostics(&report.diagnostics, false)?;
                println!(
                    "{} {} turn(s), {} chaos roll(s), {} hold(s)",
                    "OK".green(),
                    report.turns,
                    report.chaos_rolls,
                    report.chaos_holds
                );
            }
            Ok(())
        }
        Commands::DeactivateAll { workspace } => {
            let mut ws = read_workspace(workspace)?;
            let outcome = engine.deactivate_all_entities(&mut ws);
            if let DeactivateOutcome::Deactivated { .. } = outcome {
                write_workspace(workspace, &ws)?;
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    DeactivateOutcome::AlreadyInactive => {
                        println!("{} all entities are already deactivated", "--".yellow())
                    }
                    DeactivateOutcome::Deactivated { entities } => {
                        println!("{} deactivated {} entit(ies)", "OK".green(), entities)
                    }
                }
            }
            Ok(())
        }
        Commands::RandomizeAll { workspace } => {
            let mut ws = read_workspace(workspace)?;
            let mut rng = engine.rng();
            let outcome = engine.randomize_all_entities(&mut ws, &mut rng);
            write_workspace(workspace, &ws)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                report_diagnostics(&outcome.diagnostics, false)?;
                println!("{} randomized {} entit(ies)", "OK".green(), outcome.entities);
            }
            Ok(())
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn line_index(line: usize) -> Result<usize> {
    line.checked_sub(1).context("line numbers start at 1")
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn rewrite_file(path: &Path, stdout: bool, op: impl FnOnce(&str) -> String) -> Result<()> {
    let text = read_text(path)?;
    let rewritten = op(&text);

    if stdout {
        println!("{rewritten}");
        return Ok(());
    }
    if rewritten == text {
        println!("{} {} unchanged", "--".yellow(), path.display());
        return Ok(());
    }
    fs::write(path, &rewritten).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} {}", "OK".green(), path.display());
    Ok(())
}

fn read_workspace(path: &Path) -> Result<Workspace> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_workspace(path: &Path, ws: &Workspace) -> Result<()> {
    let json = serde_json::to_string_pretty(ws)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn report_diagnostics(diagnostics: &[Diagnostic], json: bool) -> Result<()> {
    if json {
        if !diagnostics.is_empty() {
            eprintln!("{}", serde_json::to_string_pretty(diagnostics)?);
        }
        return Ok(());
    }
    for diag in diagnostics {
        let level = if diag.is_warning() {
            "warning".yellow().bold()
        } else {
            "note".cyan().bold()
        };
        match &diag.entity {
            Some(entity) => eprintln!("{level}: {} [{}]", diag.message, entity.dimmed()),
            None => eprintln!("{level}: {}", diag.message),
        }
    }
    Ok(())
}

