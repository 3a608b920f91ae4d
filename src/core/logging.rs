use std::fmt::Display;

use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LogFormat;
use crate::error::{AppError, Result};

/// Initialize structured logging system
pub fn init_structured_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .json()
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .pretty()
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .compact()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("Failed to initialize logging: {}", e)))?;

    info!(format = ?format, "📝 Structured logging initialized");
    Ok(())
}

/// True when running as a GitHub Actions step.
pub fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Collapsible section in the pipeline log; closed when dropped.
pub struct LogGroup {
    workflow_commands: bool,
}

impl LogGroup {
    pub fn start(title: &str) -> Self {
        let workflow_commands = is_github_actions();
        if workflow_commands {
            println!("::group::{}", title);
        }
        info!("▶️ {}", title);
        Self { workflow_commands }
    }
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        if self.workflow_commands {
            println!("::endgroup::");
        }
    }
}

/// Reports a fatal failure as a log event and, on GitHub Actions, as an error annotation.
pub fn report_failure(message: impl Display) {
    error!("❌ {}", message);
    if is_github_actions() {
        println!("::error::{}", escape_workflow_data(&message.to_string()));
    }
}

/// Workflow command payloads must not contain raw line breaks.
pub fn escape_workflow_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Renders `key value` rows with the keys padded to a common column.
pub fn format_table(rows: &[(&str, String)]) -> Vec<String> {
    rows.iter()
        .map(|(key, value)| format!("{:<20} {}", key, value))
        .collect()
}
