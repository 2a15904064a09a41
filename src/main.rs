use std::io;
use std::process::ExitCode;

use reasoning_chat::providers::backend_from_config;
use reasoning_chat::{logging, run_app, AppError, EnvConfig};

fn main() -> ExitCode {
    logging::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "reasoning_chat exited with an error");
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = EnvConfig::from_env()?;
    let backend = backend_from_config(&config)?;
    tracing::debug!(profile = ?backend.provider().profile(), "provider ready");

    let history = run_app(backend.as_ref(), &config, io::stdin().lock(), io::stdout().lock())?;
    tracing::debug!(messages = history.len(), "conversation finished");
    Ok(())
}
