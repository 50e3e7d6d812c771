use clap::Parser;
use lockagent_cli::cmd::lock::{LockOptions, LockSubcommand};
use lockagent_cli::{cmd, telemetry};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "lockcli",
    about = "Create, inspect, release and delete workflow locks",
    version,
    propagate_version = true
)]
struct Cli {
    /// The API endpoint URL
    #[arg(long, global = true, env = "API_ENDPOINT")]
    api_endpoint: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Also write the result (lock id or lock JSON) to this file
    #[arg(long, global = true, env = "LOCK_RESULT_FILE")]
    result_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "LOCK_REQUEST_TIMEOUT", default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: LockSubcommand,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };
    telemetry::init(tracing::Level::WARN);

    let opts = LockOptions {
        endpoint: cli.api_endpoint.as_deref(),
        timeout: Duration::from_secs(cli.timeout),
        json: cli.json,
        result_file: cli.result_file.as_deref(),
    };

    if let Err(e) = cmd::lock::run(&opts, cli.command) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
