use clap::Parser;
use lockagent_cli::cmd::agent::AgentArgs;
use lockagent_cli::{cmd, telemetry};

#[derive(Parser)]
#[command(
    name = "lockagt",
    about = "Resume Argo workflows whose locks have been released",
    version
)]
struct Cli {
    #[command(flatten)]
    agent: AgentArgs,
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
    telemetry::init(tracing::Level::INFO);

    if let Err(e) = cmd::agent::run(cli.agent) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
