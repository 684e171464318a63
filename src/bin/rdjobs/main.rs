mod cli;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use rdjobs::client::Client;
use rdjobs::commands::dispatch;
use rdjobs::config::load_config;
use rdjobs::error::as_input_error;
use rdjobs::output::ConsoleOutput;
use rdjobs::prompt::TerminalPrompt;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[cfg(target_arch = "x86_64")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Exit status for usage errors, reported without a cause chain.
const INPUT_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::RdJobs::parse();

    let filter = match args.debug {
        0 => "rdjobs=warn",
        1 => "rdjobs=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => match as_input_error(&err) {
            Some(message) => {
                eprintln!("{message}");
                ExitCode::from(INPUT_ERROR)
            }
            None => {
                eprintln!("{err:?}");
                ExitCode::from(1)
            }
        },
    }
}

async fn run(args: cli::RdJobs) -> anyhow::Result<bool> {
    if let cli::Commands::Completion { shell } = args.command {
        generate_completion(shell)?;
        return Ok(true);
    }

    let config = load_config(args.config.as_ref()).context("Failed to load configuration")?;
    tracing::debug!(url = %config.server.url, version = config.server.version, "Loaded config");

    let Some(command) = args.command.into_jobs_command(config.project.as_deref()) else {
        return Ok(true);
    };
    let client = Client::build(&config)?;
    let mut output = ConsoleOutput::new();
    let mut prompt = TerminalPrompt;

    dispatch(&command, &client, &mut output, &mut prompt).await
}

fn generate_completion(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = cli::RdJobs::command();
    let mut buf = Vec::<u8>::new();
    clap_complete::generate(shell, &mut cmd, "rdjobs", &mut buf);

    match std::io::stdout().write_all(&buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(e.into()),
    }
}
