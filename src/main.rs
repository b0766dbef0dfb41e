use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, anyhow, ensure};
use clap::{ArgAction, Parser};

use wslpaste::Config;
use wslpaste::capture::{
    CaptureDependencies, CaptureMode, CaptureOrchestrator, CaptureOutcome, CaptureSettings,
    file::TempFileStore, quote_for_shell,
};
use wslpaste::hotkey::HotkeySpec;

/// Exit code for invalid arguments and unrecoverable setup failures.
const EXIT_INVALID: i32 = 3;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("WSLPASTE_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "wslpaste")]
#[command(
    version,
    long_version = LONG_VERSION,
    about = "Take a Windows screenshot and paste its path into WSL"
)]
struct Cli {
    /// Process the current clipboard content now instead of firing a hotkey
    #[arg(long, short = 'c', action = ArgAction::SetTrue, conflicts_with = "hotkey")]
    clipboard: bool,

    /// Capture hotkey to fire, e.g. "Win+Shift+S" or "Ctrl+PrintScreen" (overrides config)
    #[arg(long, short = 'k', value_name = "SPEC")]
    hotkey: Option<String>,

    /// Seconds to wait for the screenshot to reach the clipboard
    #[arg(
        long,
        short = 't',
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    timeout: Option<u64>,

    /// Load configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the path without writing it back to the clipboard
    #[arg(long, action = ArgAction::SetTrue)]
    no_publish: bool,
}

fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version arrive here too and go to stdout.
            let code = if err.use_stderr() { EXIT_INVALID } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let outcome = match run(&cli) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            process::exit(EXIT_INVALID);
        }
    };

    match &outcome {
        CaptureOutcome::Success(path) => {
            let mut stdout = io::stdout();
            let _ = write!(stdout, "{}", quote_for_shell(path));
            let _ = stdout.flush();
        }
        other => eprintln!("{}", other.message()),
    }

    process::exit(outcome.exit_code());
}

fn run(cli: &Cli) -> anyhow::Result<CaptureOutcome> {
    let config = match &cli.config {
        Some(path) => {
            ensure!(path.is_file(), "Config file not found: {}", path.display());
            Config::load_from(path)?
        }
        None => Config::load()?,
    };

    let mode = if cli.clipboard {
        CaptureMode::Direct
    } else {
        let spec = cli.hotkey.as_deref().unwrap_or(&config.hotkey);
        let hotkey =
            HotkeySpec::parse(spec).map_err(|e| anyhow!("Invalid hotkey '{}': {}", spec, e))?;
        CaptureMode::Hotkey(hotkey)
    };

    let mut settings =
        CaptureSettings::from_config(&config).context("Invalid capture settings")?;
    if let Some(secs) = cli.timeout {
        settings.timeout = Duration::from_secs(secs);
    }
    settings.publish = !cli.no_publish;

    let store = TempFileStore::new(config.scratch_dir(), config.storage.file_prefix.clone());
    log::debug!("Scratch directory: {}", store.directory().display());

    let orchestrator = CaptureOrchestrator::new(settings, CaptureDependencies::system(store));
    Ok(orchestrator.run(&mode))
}
