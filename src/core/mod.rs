//! Cross-cutting pieces shared by the services and the orchestrator

pub mod logging;
pub mod traits;

pub use logging::{init_structured_logging, LogGroup};
pub use traits::{CloudProvider, CommandRunner, CommitCommenter, ToolInvocation};
