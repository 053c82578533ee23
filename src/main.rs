// Entrypoint for the DSLab submission CLI.
// - Parses the five positional arguments.
// - Builds the config from `DSLAB_*` environment variables.
// - Runs the workflow; a halted run makes the process exit non-zero.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dslab_client::{
    logging, ui, ClientConfig, Credentials, DslabClient, Orchestrator, ReqwestTransport,
    Submission,
};

/// Submit a zip to DSLab, then compile and evaluate it.
///
/// Settings are read from DSLAB_API_URL, DSLAB_CHARSET, DSLAB_INSECURE_TLS,
/// DSLAB_TIMEOUT_SECS and DSLAB_STRICT.
#[derive(Parser, Debug)]
#[command(name = "dslab-client", version)]
struct Cli {
    /// Tenant (course namespace) the project belongs to
    tenant: String,
    /// DSLab project name
    project: String,
    username: String,
    /// Password, or `-` to be prompted for it
    password: String,
    /// Path to the zip file to submit
    zip: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging();

    let config = ClientConfig::from_env().context("Invalid DSLab configuration")?;
    let password = if cli.password == "-" {
        ui::prompt_password(&cli.username)?
    } else {
        cli.password
    };

    let transport = ReqwestTransport::new(&config)?;
    let client = DslabClient::new(transport, config.endpoints(), config.policy);
    let orchestrator = Orchestrator::new(client);

    let submission = Submission {
        credentials: Credentials::new(cli.tenant, cli.username, password),
        project: cli.project,
        zip_path: cli.zip,
    };

    let reporter = ui::TerminalReporter::new();
    orchestrator.run(&submission, &reporter)?;
    Ok(())
}
