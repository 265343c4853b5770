//! Testsmith service entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use testsmith::TestsmithConfig;
use testsmith::config::ConfigError;
use testsmith::server::{ServeError, run};
use testsmith::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn start() -> Result<(), ServeError> {
    let config = load_config()?;
    telemetry::init_tracing("info,tower_http=info");
    run(config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ServeError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<TestsmithConfig, ServeError> {
    TestsmithConfig::load().map_err(|error| {
        ServeError::Configuration(ConfigError::Load {
            message: error.to_string(),
        })
    })
}
