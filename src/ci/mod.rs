pub mod helm;
pub mod orchestrator;
pub mod parameters;
pub mod workspace;

// Re-export the types the binary and integration tests drive
pub use helm::{DeploymentInvoker, HelmOperation, InvocationRequest};
pub use orchestrator::{run_action, DeployOrchestrator, RunOutcome, RunResult};
pub use parameters::DeploymentTarget;
pub use workspace::Workspace;
