use anyhow::Result;
use log::{LevelFilter, debug, warn};
use repodoc::{
    build_agent, cli::parse_args, run_repodoc, run_until_interrupted, writer::write_output,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = parse_args()?;
    init_logging(config.verbosity);

    let agent = match build_agent(&config) {
        Ok(agent) => agent,
        Err(e) => {
            debug!("{e:?}");
            eprintln!("{}", e.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    let run = run_repodoc(&config, agent.as_ref());
    let Some(outcome) = run_until_interrupted(run, interrupted()).await else {
        eprintln!("Interrupted");
        return Ok(ExitCode::from(130));
    };

    let written = match outcome {
        Ok(markdown) => write_output(config.output_path.as_deref(), &markdown).await,
        Err(e) => Err(e),
    };

    match written {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            debug!("{e:?}");
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
