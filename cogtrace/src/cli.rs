//! Setup shared by the cogtrace binaries.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use cogtrace_core::logging::{self, LoggingGuard};
use cogtrace_core::{load_session, Config, LoadOptions, SessionAnalyzer, SessionReport};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Session log to analyze (one JSON record per line)
    pub log: PathBuf,

    /// Config file (defaults to $XDG_CONFIG_HOME/cogtrace/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip malformed lines instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Entries shown in top-N lists
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// A report plus the logging guard that must outlive printing.
pub struct Session {
    pub report: SessionReport,
    _log_guard: LoggingGuard,
}

/// Load config, apply CLI overrides, then load and analyze the log.
pub fn analyze(args: &CommonArgs) -> Result<Session> {
    Config::ensure_xdg_env();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    if args.lenient {
        config.ingest.lenient = true;
    }
    if let Some(top) = args.top {
        config.report.top_n = top;
    }
    config.validate().context("invalid command-line options")?;

    let log_guard = logging::init(&config.logging).context("failed to initialize logging")?;

    // Compile the catalog before touching the log
    let analyzer = SessionAnalyzer::from_config(&config).context("invalid pattern catalog")?;

    let options = LoadOptions {
        lenient: config.ingest.lenient,
    };
    let session = load_session(&args.log, &options)
        .with_context(|| format!("failed to load session log {}", args.log.display()))?;

    if !session.skipped.is_empty() {
        eprintln!(
            "Skipped {} malformed line(s) in {}",
            session.skipped.len(),
            args.log.display()
        );
    }

    let analysis = analyzer.analyze(&session.events);
    let report = SessionReport::assemble(&analysis, &config.report, session.skipped);

    Ok(Session {
        report,
        _log_guard: log_guard,
    })
}

/// Print the report as JSON when asked; returns whether it did.
pub fn print_json(report: &SessionReport, format: OutputFormat) -> Result<bool> {
    if format != OutputFormat::Json {
        return Ok(false);
    }
    let json = report.to_json().context("failed to serialize report")?;
    println!("{json}");
    Ok(true)
}
