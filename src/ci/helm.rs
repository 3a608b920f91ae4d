//! Helm argument construction and execution against the resolved cluster

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::ci::parameters::DeploymentTarget;
use crate::core::traits::{CommandRunner, ToolInvocation};
use crate::error::{AppError, Result};

/// Upper bound helm waits for the release to become ready
pub const HELM_TIMEOUT: &str = "30s";
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelmOperation {
    Upgrade,
    Delete,
}

impl HelmOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HelmOperation::Upgrade => "upgrade",
            HelmOperation::Delete => "delete",
        }
    }
}

/// Ordered helm argument list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelmArgs {
    args: Vec<String>,
}

impl HelmArgs {
    pub fn new(operation: HelmOperation) -> Self {
        Self {
            args: vec![operation.as_str().to_string()],
        }
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    /// `--name value` as two arguments
    pub fn option(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push(name.to_string());
        self.args.push(value.into());
        self
    }

    /// `--name=value` as a single argument
    pub fn assign(mut self, name: &str, value: &str) -> Self {
        self.args.push(format!("{}={}", name, value));
        self
    }

    /// `--set key=value`, with the value escaped for helm's parser
    pub fn set(self, key: &str, value: &str) -> Self {
        let pair = format!("{}={}", key, escape_set_value(value));
        self.option("--set", pair)
    }

    pub fn set_all<'a, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        pairs
            .into_iter()
            .fold(self, |args, (key, value)| args.set(key, value))
    }

    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}

/// Helm splits `--set` values on commas and treats backslash as escape.
pub fn escape_set_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == ',' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Arguments for `helm upgrade --install` of the target release
pub fn upgrade_args(
    target: &DeploymentTarget,
    env_passthrough: &[(String, String)],
    values_file: Option<&Path>,
    chart_path: &Path,
) -> HelmArgs {
    // An unset host is passed as empty so the chart default never applies
    let mut args = HelmArgs::new(HelmOperation::Upgrade)
        .flag("--atomic")
        .flag("--cleanup-on-fail")
        .option("--timeout", HELM_TIMEOUT)
        .flag("--install")
        .set("nameOverride", &target.app)
        .set("host", target.host.as_deref().unwrap_or_default())
        .set("image", &target.image)
        .set("port", &target.port.to_string())
        .set("app", &target.app)
        .set("dockerPullSecret", &target.pull_secret)
        .set("release", &target.release)
        .set_all(env_passthrough);

    if let Some(values_file) = values_file {
        args = args.option("--values", values_file.to_string_lossy());
    }

    args.assign("--namespace", &target.namespace)
        .positional(target.release_name())
        .positional(chart_path.to_string_lossy())
}

/// Arguments for `helm delete` of the target release
pub fn delete_args(target: &DeploymentTarget) -> HelmArgs {
    HelmArgs::new(HelmOperation::Delete)
        .assign("--namespace", &target.namespace)
        .positional(target.release_name())
}

/// Values files must exist and hold a YAML mapping.
pub async fn check_values_file(path: &Path) -> Result<()> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::ValuesFileMissing(path.to_path_buf()))
        }
        Err(e) => {
            return Err(AppError::InvalidValuesFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    let parsed: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| AppError::InvalidValuesFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    match parsed {
        serde_yaml::Value::Mapping(_) | serde_yaml::Value::Null => Ok(()),
        _ => Err(AppError::InvalidValuesFile {
            path: path.to_path_buf(),
            message: "top level must be a mapping".to_string(),
        }),
    }
}

/// What the invoker needs beyond the derived target
#[derive(Debug, Clone)]
pub struct InvocationRequest<'a> {
    pub target: &'a DeploymentTarget,
    pub env_passthrough: &'a [(String, String)],
    pub kubeconfig: &'a Path,
    pub undeploy: bool,
    pub values_file: Option<&'a Path>,
}

/// Runs helm against the resolved cluster
pub struct DeploymentInvoker {
    runner: Arc<dyn CommandRunner>,
    helm_bin: String,
    chart_path: PathBuf,
}

impl DeploymentInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>, helm_bin: impl Into<String>, chart_path: PathBuf) -> Self {
        Self {
            runner,
            helm_bin: helm_bin.into(),
            chart_path,
        }
    }

    pub fn operation(undeploy: bool) -> HelmOperation {
        if undeploy {
            HelmOperation::Delete
        } else {
            HelmOperation::Upgrade
        }
    }

    /// Build the exact helm call for a request without running it
    pub fn build(&self, request: &InvocationRequest<'_>) -> ToolInvocation {
        let args = match Self::operation(request.undeploy) {
            HelmOperation::Delete => delete_args(request.target),
            HelmOperation::Upgrade => upgrade_args(
                request.target,
                request.env_passthrough,
                request.values_file,
                &self.chart_path,
            ),
        };

        ToolInvocation::new(self.helm_bin.clone(), args.into_vec())
            .with_env(KUBECONFIG_ENV, request.kubeconfig.as_os_str())
    }

    pub async fn invoke(&self, request: &InvocationRequest<'_>) -> Result<HelmOperation> {
        let operation = Self::operation(request.undeploy);

        if let Some(values_file) = request.values_file {
            check_values_file(values_file).await?;
        }

        let invocation = self.build(request);
        info!(
            "⚙️ helm {} {} in namespace {}",
            operation.as_str(),
            request.target.release_name(),
            request.target.namespace
        );

        match self.runner.run(&invocation).await? {
            Some(0) => {
                info!("✅ helm {} completed", operation.as_str());
                Ok(operation)
            }
            code => Err(AppError::InvocationFailed {
                operation: operation.as_str().to_string(),
                code,
            }),
        }
    }
}
