use clap::Parser;
use layout_compare::telemetry::init_tracing;
use layout_compare::{Error, HarnessConfig, Orchestrator, SystemHost};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// Render every input through the layout engine under test and the reference renderer,
/// then open both results side by side.
#[derive(Debug, Parser)]
#[command(name = "layout-compare", version)]
struct Cli {
    /// Case-insensitive substring filter on input file names. `only-<marker>` and
    /// `skip-<marker>` keep or drop names containing the marker word (default `html`).
    #[arg(short, long)]
    filter: Option<String>,

    /// YAML configuration file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Abort on the first renderer failure.
    #[arg(long, conflicts_with = "keep_going")]
    fail_fast: bool,

    /// Skip failed renders and keep going.
    #[arg(long)]
    keep_going: bool,

    /// Print the produced paths instead of launching a viewer.
    #[arg(long)]
    no_view: bool,

    /// Print the inputs that would be rendered and exit.
    #[arg(long)]
    list: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Newline-delimited JSON logs.
    #[arg(long)]
    log_json: bool,

    /// Flags forwarded verbatim to the candidate renderer (never to the reference).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "FORWARDED")]
    forwarded: Vec<String>,
}

impl Cli {
    fn harness_config(&self) -> layout_compare::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        if let Some(filter) = &self.filter {
            config.filter = Some(filter.clone());
        }
        if self.fail_fast {
            config.fail_fast = true;
        }
        if self.keep_going {
            config.fail_fast = false;
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> layout_compare::Result<()> {
    let config = cli.harness_config()?;
    let mut orchestrator = Orchestrator::new(config, SystemHost)
        .with_forwarded(cli.forwarded)
        .with_viewer(!cli.no_view);

    let mut stdout = std::io::stdout().lock();
    if cli.list {
        for input in orchestrator.discover()? {
            writeln!(stdout, "{}", input.path().display()).map_err(Error::Stdout)?;
        }
        return Ok(());
    }

    let report = orchestrator.run()?;
    if cli.no_view {
        for path in report.result.iter() {
            writeln!(stdout, "{}", path.display()).map_err(Error::Stdout)?;
        }
    }
    if !report.skipped.is_empty() {
        tracing::warn!(
            count = report.skipped.len(),
            "some renders failed and were skipped"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.log_json, level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
