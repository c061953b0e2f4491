use clap::Parser;
use testport::commands::convert_command;
use tracing_subscriber::EnvFilter;

/// Convert bench-format operator tests to FlagGems pytest format.
///
/// This CLI is a thin wrapper around `testport-core` (exposed in code as
/// `testport_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "testport",
    version,
    about = "Convert bench-format tests to FlagGems pytest format",
    long_about = None
)]
struct Cli {
    /// Directory containing the 4 input files.
    input_dir: String,

    /// Directory to write output files (created if missing).
    output_dir: String,

    /// Name of the operator (e.g., relu).
    operator_name: String,

    /// Optional JSON conversion config (extension, tolerances, module path).
    #[arg(long)]
    config: Option<String>,

    /// Run every stage but do not write any files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Emit a JSON report instead of human-readable progress.
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Log to stderr so `--json` output on stdout stays parseable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = convert_command(
        &cli.input_dir,
        &cli.output_dir,
        &cli.operator_name,
        cli.config.as_deref(),
        cli.dry_run,
        cli.json,
    );

    // `{:#}` keeps the whole cause chain on one line.
    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
