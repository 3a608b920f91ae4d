//! The deployment run: validate credentials, resolve the cluster, derive
//! the release parameters, notify, then drive helm.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::ci::helm::{DeploymentInvoker, HelmOperation, InvocationRequest};
use crate::ci::parameters::{env_passthrough_from_process, DeploymentTarget};
use crate::ci::workspace::Workspace;
use crate::config::{Config, RunInputs};
use crate::core::logging::{format_table, LogGroup};
use crate::core::traits::{CloudProvider, CommandRunner, CommitCommenter};
use crate::error::{AppError, RunError, RunStep};
use crate::infrastructure::{DigitalOceanClient, GitHubClient, TokioCommandRunner};
use crate::services::{ClusterResolver, CommitNotifier, CredentialValidator, KubeCredential, NotificationOutcome};

pub type RunResult<T = RunOutcome> = std::result::Result<T, RunError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Token checked, no cluster requested
    CredentialsValidated,
    Completed {
        operation: HelmOperation,
        release_name: String,
        notification: NotificationOutcome,
    },
}

pub struct DeployOrchestrator {
    validator: CredentialValidator,
    resolver: ClusterResolver,
    notifier: CommitNotifier,
    invoker: DeploymentInvoker,
}

impl DeployOrchestrator {
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        notifier: CommitNotifier,
        invoker: DeploymentInvoker,
    ) -> Self {
        Self {
            validator: CredentialValidator::new(provider.clone()),
            resolver: ClusterResolver::new(provider),
            notifier,
            invoker,
        }
    }

    /// Wire the production clients for a set of inputs
    pub fn from_config(inputs: &RunInputs, config: &Config) -> RunResult<Self> {
        let token = inputs
            .token()
            .ok_or_else(|| RunError::new(RunStep::Inputs, AppError::MissingDeploymentTarget))?;

        let provider: Arc<dyn CloudProvider> = Arc::new(
            DigitalOceanClient::new(&config.digitalocean_api_url, token).map_err(RunError::at(RunStep::Inputs))?,
        );

        let commenter: Option<Arc<dyn CommitCommenter>> = match inputs.github_token() {
            Some(github_token) if inputs.github_comment => Some(Arc::new(
                GitHubClient::new(&config.github_api_url, github_token).map_err(RunError::at(RunStep::Inputs))?,
            )),
            _ => None,
        };
        let notifier = CommitNotifier::new(
            inputs.github_comment,
            commenter,
            config.github_repository.clone(),
            config.github_sha.clone(),
        );

        let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner);
        let invoker = DeploymentInvoker::new(runner, config.helm_bin.clone(), config.chart_path.clone());

        Ok(Self::new(provider, notifier, invoker))
    }

    /// Run the whole sequence to completion.
    pub async fn execute(&self, inputs: &RunInputs, workspace: &Workspace) -> RunResult {
        self.execute_until(inputs, workspace, std::future::pending::<()>()).await
    }

    /// Run the sequence, abandoning it with `Cancelled` if `interrupt`
    /// resolves before helm has been started. Once helm runs it is always
    /// awaited to exit.
    pub async fn execute_until<F>(&self, inputs: &RunInputs, workspace: &Workspace, interrupt: F) -> RunResult
    where
        F: Future<Output = ()>,
    {
        // Polling `interrupt` first also installs the SIGINT handler before any
        // step runs; it stays installed, so a later Ctrl-C only reaches helm.
        let prepared = tokio::select! {
            biased;
            _ = interrupt => return Err(RunError::new(RunStep::Run, AppError::Cancelled)),
            prepared = self.prepare(inputs, workspace) => prepared?,
        };

        match prepared {
            Prepared::Finished(outcome) => Ok(outcome),
            Prepared::Ready(plan) => self.deploy(inputs, plan).await,
        }
    }

    async fn prepare(&self, inputs: &RunInputs, workspace: &Workspace) -> RunResult<Prepared> {
        {
            let _group = LogGroup::start("Login to digitalocean");
            self.validator
                .validate()
                .await
                .map_err(RunError::at(RunStep::CredentialValidation))?;
        }

        let Some(cluster_name) = inputs.cluster() else {
            info!("ℹ️ No digitalocean_cluster given, nothing to deploy");
            return Ok(Prepared::Finished(RunOutcome::CredentialsValidated));
        };

        if inputs.image.trim().is_empty() {
            return Err(RunError::new(
                RunStep::Inputs,
                AppError::ConfigError("image input is required to deploy".to_string()),
            ));
        }

        let credential = {
            let _group = LogGroup::start("Login to kubernetes cluster");
            self.resolver
                .resolve(cluster_name, workspace)
                .await
                .map_err(RunError::at(RunStep::ClusterResolution))?
        };

        let target = DeploymentTarget::resolve(inputs);
        let env_passthrough = env_passthrough_from_process(inputs.env.as_deref());
        {
            let _group = LogGroup::start("Deployment Information");
            for line in format_table(&target.summary()) {
                info!("{}", line);
            }
            for (key, _) in &env_passthrough {
                info!("{:<20} (from environment)", key);
            }
        }

        let operation = DeploymentInvoker::operation(inputs.undeploy);
        let notification = self.notifier.notify(&target, operation).await;

        Ok(Prepared::Ready(DeploymentPlan {
            credential,
            target,
            env_passthrough,
            operation,
            notification,
        }))
    }

    async fn deploy(&self, inputs: &RunInputs, plan: DeploymentPlan) -> RunResult {
        let (title, step) = match plan.operation {
            HelmOperation::Upgrade => ("Deploy", RunStep::Deployment),
            HelmOperation::Delete => ("Undeploy", RunStep::Undeployment),
        };
        let _group = LogGroup::start(title);
        let request = InvocationRequest {
            target: &plan.target,
            env_passthrough: &plan.env_passthrough,
            kubeconfig: &plan.credential.path,
            undeploy: inputs.undeploy,
            values_file: inputs.values_file().map(|p| p.as_path()),
        };
        self.invoker.invoke(&request).await.map_err(RunError::at(step))?;

        Ok(RunOutcome::Completed {
            operation: plan.operation,
            release_name: plan.target.release_name(),
            notification: plan.notification,
        })
    }
}

/// Everything resolved before helm is started
struct DeploymentPlan {
    credential: KubeCredential,
    target: DeploymentTarget,
    env_passthrough: Vec<(String, String)>,
    operation: HelmOperation,
    notification: NotificationOutcome,
}

enum Prepared {
    Finished(RunOutcome),
    Ready(DeploymentPlan),
}

/// Full run as the binary performs it: own the workspace for the duration
/// of the sequence and remove it on every exit path, including interrupts.
pub async fn run_action(inputs: RunInputs, config: Config) -> RunResult {
    run_action_in(inputs, config, &std::env::temp_dir()).await
}

pub async fn run_action_in(inputs: RunInputs, config: Config, base_path: &Path) -> RunResult {
    let workspace = Workspace::create_in(base_path).map_err(RunError::at(RunStep::Workspace))?;

    let result = match DeployOrchestrator::from_config(&inputs, &config) {
        Ok(orchestrator) => orchestrator.execute_until(&inputs, &workspace, interrupted()).await,
        Err(e) => Err(e),
    };

    workspace.close();
    result
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; the run can only end on its own.
        std::future::pending::<()>().await;
    }
}
