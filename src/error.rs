use std::fmt;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Could not determine target for deployment: no digitalocean_token supplied")]
    MissingDeploymentTarget,

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Kubernetes cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("Values file not found: {}", .0.display())]
    ValuesFileMissing(PathBuf),

    #[error("Invalid values file {}: {message}", .path.display())]
    InvalidValuesFile { path: PathBuf, message: String },

    #[error("helm {operation} failed: {}", exit_description(.code))]
    InvocationFailed { operation: String, code: Option<i32> },

    #[error("Failed to start {program}: {message}")]
    ToolUnavailable { program: String, message: String },

    #[error("Failed to post commit comment: {0}")]
    NotificationError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    DecodeError { endpoint: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Workspace error: {0}")]
    WorkspaceError(String),

    #[error("Run cancelled")]
    Cancelled,
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("process exited with code {}", code),
        None => "process terminated by signal".to_string(),
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::WorkspaceError(format!("IO error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalServiceError(format!("HTTP error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Orchestration step a fatal error surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStep {
    Inputs,
    Workspace,
    CredentialValidation,
    ClusterResolution,
    Deployment,
    Undeployment,
    Run,
}

impl fmt::Display for RunStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStep::Inputs => "input validation",
            RunStep::Workspace => "workspace setup",
            RunStep::CredentialValidation => "credential validation",
            RunStep::ClusterResolution => "cluster resolution",
            RunStep::Deployment => "deployment",
            RunStep::Undeployment => "undeployment",
            RunStep::Run => "run",
        };
        f.write_str(name)
    }
}

/// Fatal result of a run: the error kind plus the step that raised it.
#[derive(thiserror::Error, Debug)]
#[error("{step} failed: {source}")]
pub struct RunError {
    pub step: RunStep,
    #[source]
    pub source: AppError,
}

impl RunError {
    pub fn new(step: RunStep, source: AppError) -> Self {
        Self { step, source }
    }

    /// Adapter for `map_err` at a step boundary.
    pub fn at(step: RunStep) -> impl FnOnce(AppError) -> RunError {
        move |source| RunError::new(step, source)
    }
}
