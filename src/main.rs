use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use RustAutoDeploy::ci::{run_action, RunOutcome};
use RustAutoDeploy::config::{Config, RunInputs};
use RustAutoDeploy::core::logging::{escape_workflow_data, init_structured_logging, report_failure};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet, so fall back to plain stderr
            eprintln!("::error::{}", escape_workflow_data(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_structured_logging(config.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let inputs = RunInputs::parse();

    match run_action(inputs, config).await {
        Ok(RunOutcome::CredentialsValidated) => {
            info!("✅ Credentials validated");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Completed { operation, release_name, .. }) => {
            info!("✅ helm {} of {} finished", operation.as_str(), release_name);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
