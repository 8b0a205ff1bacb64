//! keepours command-line tool.
//!
//! Resolves version-control merge conflicts in the given files by keeping the
//! "ours" side of every conflict block. Each existing path is announced on
//! stdout as `Resolving: <path>`; paths that do not exist are skipped.

mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use keepours_core::config::{AppConfig, ErrorPolicy, ResolverConfig};
use keepours_core::conflict::{ConflictResolver, FileOutcome, SeparatorPolicy, WriteMode};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Resolve merge conflicts by keeping "ours".
#[derive(Parser, Debug)]
#[command(
    name = "keepours",
    version,
    about = "Collapse merge-conflict blocks to their \"ours\" side, in place"
)]
struct Cli {
    /// Files to resolve. Paths that do not exist are skipped.
    paths: Vec<PathBuf>,

    /// Optional TOML options file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only treat `=======` as a separator inside an open `<<<<<<<` block.
    #[arg(long)]
    guarded_separator: bool,

    /// Write through a temporary file and rename it over the original.
    #[arg(long)]
    atomic: bool,

    /// Keep processing remaining paths after a failure.
    #[arg(long)]
    keep_going: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Layer the command-line switches over the file-based settings.
    fn apply_flags(&self, resolver: &mut ResolverConfig) {
        if self.guarded_separator {
            resolver.separator_policy = SeparatorPolicy::Guarded;
        }
        if self.atomic {
            resolver.write_mode = WriteMode::Atomic;
        }
        if self.keep_going {
            resolver.on_error = ErrorPolicy::Continue;
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style::error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only progress lines.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).context("failed to load configuration file")?,
        None => AppConfig::default(),
    };
    cli.apply_flags(&mut config.resolver);

    let resolver = ConflictResolver::new(config.resolver.resolve_options());
    let on_error = config.resolver.on_error;
    debug!(options = ?resolver.options(), ?on_error, "resolver configured");
    let mut failed = 0usize;

    for path in &cli.paths {
        let result = resolver.resolve_path(path, |p| println!("Resolving: {}", p.display()));

        match result {
            Ok(FileOutcome::Resolved(_)) | Ok(FileOutcome::Skipped) => {}
            Err(e) if on_error == ErrorPolicy::Continue => {
                debug!(path = %e.path().display(), "failed to resolve, continuing");
                eprintln!("{}", style::warn(&format!("{:#}", anyhow::Error::new(e))));
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} paths failed to resolve", failed, cli.paths.len());
    }

    info!(paths = cli.paths.len(), "done");
    Ok(())
}
