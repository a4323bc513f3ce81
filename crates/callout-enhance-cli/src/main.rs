use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use callout_enhance_config::{Config, LoadOptions};
use callout_enhance_ops::diff::build_unified_diff;
use callout_enhance_ops::{
    process_source, render_report, ExitCode, Mode, OperationError, Operations, ReportFormat,
    RunOptions,
};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Turn [!type] blockquotes in rendered HTML into callouts",
    long_about = None
)]
struct Cli {
    /// Files or directories to process ('-' reads stdin and writes stdout)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Rewrite pages in place (default)
    #[arg(long, conflicts_with_all = ["check", "diff"])]
    write: bool,

    /// Exit with status 1 when any page would change; write nothing
    #[arg(long, conflicts_with = "diff")]
    check: bool,

    /// Print unified diffs; write nothing
    #[arg(long)]
    diff: bool,

    /// Summary format
    #[arg(long, value_enum, default_value_t = FormatArg::Plain)]
    format: FormatArg,

    /// Only print the summary line
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file applied on top of discovered ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Copy each page to <page>.bak before rewriting it
    #[arg(long)]
    backup: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Plain,
    Json,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.diff {
            Mode::Diff
        } else {
            Mode::Write
        }
    }

    fn reads_stdin(&self) -> bool {
        self.paths.iter().any(|path| path == Path::new("-"))
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("callout-enhance error: {err:#}");
            let code = err
                .downcast_ref::<OperationError>()
                .map(OperationError::exit_code)
                .unwrap_or(ExitCode::Io);
            std::process::ExitCode::from(code as u8)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let fallback = format!("callout_enhance={level},callout_enhance_ops={level}");
    let filter = if verbose > 0 {
        EnvFilter::new(fallback)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.reads_stdin() {
        if cli.paths.len() > 1 {
            return Err(OperationError::InvalidInput(
                "'-' cannot be combined with other paths".to_string(),
            )
            .into());
        }
        return run_stdin(cli);
    }

    let config = Config::load(LoadOptions {
        override_path: cli.config.clone(),
        working_dir: None,
    })
    .map_err(OperationError::from)
    .context("failed to load configuration")?;
    debug!(root = %config.project.root.display(), "configuration loaded");

    let ops = Operations::new(config);
    let outcome = ops.run(RunOptions {
        paths: cli.paths.clone(),
        mode: cli.mode(),
        backup: cli.backup.then_some(true),
    })?;

    let format = match cli.format {
        FormatArg::Plain => ReportFormat::Plain,
        FormatArg::Json => ReportFormat::Json,
    };
    let rendered = render_report(&outcome, format, cli.quiet)?;
    emit(&rendered)?;

    Ok(outcome.exit_code)
}

fn run_stdin(cli: &Cli) -> Result<ExitCode> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;

    let outcome = process_source(&source);
    debug!(callouts = outcome.callouts.len(), "processed stdin");

    match cli.mode() {
        Mode::Write => emit(&outcome.output)?,
        Mode::Check => {
            if outcome.changed() {
                return Ok(ExitCode::Changes);
            }
        }
        Mode::Diff => {
            if let Some(diff) = build_unified_diff(&source, &outcome.output, "stdin") {
                emit(&diff)?;
            }
        }
    }

    Ok(ExitCode::Success)
}

fn emit(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match handle.write_all(content.as_bytes()) {
        Ok(_) => {}
        Err(err) if should_ignore_pipe_error(&err) => return Ok(()),
        Err(err) => return Err(err).context("failed to write output"),
    }

    match handle.flush() {
        Ok(_) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("failed to flush stdout"),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}
