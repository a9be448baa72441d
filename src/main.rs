use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fahrplan::{render_table, ClientConfig, FahrplanError, Invocation, TimetableClient};

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        1 => "error",
        2 => "warn",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("fahrplan={level}")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(invocation: Invocation) -> anyhow::Result<()> {
    let query = invocation.into_query();
    debug!(?query, "Parsed arguments");

    let client = TimetableClient::new(&ClientConfig::default())?;
    let connections = client.fetch_connections(&query)?;

    let table = render_table(&connections)?;

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(&table).context("failed to write table")?;
    stdout.flush().context("failed to write table")?;
    Ok(())
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();

    let invocation = match Invocation::from_args(&argv) {
        Ok(invocation) => invocation,
        Err(FahrplanError::Usage(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(invocation.verbosity());

    if let Err(err) = run(invocation) {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
