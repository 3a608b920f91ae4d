use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::{get_env_opt, get_env_or_default, non_blank};

pub const DEFAULT_DIGITALOCEAN_API_URL: &str = "https://api.digitalocean.com/v2";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_CHART_PATH: &str = "k8s/helm";

/// Inputs of a single pipeline run.
///
/// Each field can be passed as a flag or through the `INPUT_*` variable the
/// pipeline runner exports for step inputs.
#[derive(Debug, Clone, Default, Parser)]
#[command(author, version, about = "Deploy a container image to a managed Kubernetes cluster with helm")]
pub struct RunInputs {
    /// DigitalOcean API token
    #[arg(long, env = "INPUT_DIGITALOCEAN_TOKEN", hide_env_values = true)]
    pub digitalocean_token: Option<String>,

    /// Name of the Kubernetes cluster to deploy to
    #[arg(long, env = "INPUT_DIGITALOCEAN_CLUSTER")]
    pub digitalocean_cluster: Option<String>,

    /// Container image reference, e.g. registry/org/app:v1
    #[arg(long, env = "INPUT_IMAGE", default_value = "")]
    pub image: String,

    /// Container port exposed by the application
    #[arg(long, env = "INPUT_PORT", default_value_t = 80)]
    pub port: u16,

    #[arg(long, env = "INPUT_APP")]
    pub app: Option<String>,

    #[arg(long, env = "INPUT_RELEASE")]
    pub release: Option<String>,

    /// Host template; every `*` becomes `{release}-{app}`
    #[arg(long, env = "INPUT_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "INPUT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Comma-separated names of environment variables passed to the chart
    #[arg(long, env = "INPUT_ENV")]
    pub env: Option<String>,

    #[arg(long, env = "INPUT_DOCKER_PULL_SECRET")]
    pub docker_pull_secret: Option<String>,

    /// Post the deployment link as a comment on the triggering commit
    #[arg(
        long,
        env = "INPUT_GITHUB_COMMENT",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub github_comment: bool,

    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Remove the release instead of installing it
    #[arg(
        long,
        env = "INPUT_UNDEPLOY",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub undeploy: bool,

    /// Extra helm values file
    #[arg(long, env = "INPUT_VALUES_FILE")]
    pub values_file: Option<PathBuf>,
}

impl RunInputs {
    pub fn token(&self) -> Option<&str> {
        self.digitalocean_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn cluster(&self) -> Option<&str> {
        self.digitalocean_cluster
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn values_file(&self) -> Option<&PathBuf> {
        self.values_file
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

/// Repository the run was triggered from, `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(AppError::ConfigError(format!(
                "GITHUB_REPOSITORY must be owner/name, got '{}'",
                full_name
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
    Pretty,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Process-level settings that are not step inputs.
#[derive(Debug, Clone)]
pub struct Config {
    pub digitalocean_api_url: Url,
    pub github_api_url: Url,
    pub github_repository: Option<RepositoryRef>,
    pub github_sha: Option<String>,
    pub chart_path: PathBuf,
    pub helm_bin: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn init() -> Result<Config> {
        let digitalocean_api_url = parse_url(
            "DIGITALOCEAN_API_URL",
            &get_env_or_default("DIGITALOCEAN_API_URL", DEFAULT_DIGITALOCEAN_API_URL),
        )?;
        let github_api_url = parse_url(
            "GITHUB_API_URL",
            &get_env_or_default("GITHUB_API_URL", DEFAULT_GITHUB_API_URL),
        )?;

        let github_repository = get_env_opt("GITHUB_REPOSITORY")
            .map(|repo| RepositoryRef::parse(&repo))
            .transpose()?;
        let github_sha = get_env_opt("GITHUB_SHA");

        let chart_path = PathBuf::from(get_env_or_default("DEPLOY_CHART_PATH", DEFAULT_CHART_PATH));
        let helm_bin = get_env_or_default("HELM_BIN", "helm");
        let log_format = LogFormat::from_name(&get_env_or_default("LOG_FORMAT", "compact"));

        Ok(Config {
            digitalocean_api_url,
            github_api_url,
            github_repository,
            github_sha,
            chart_path,
            helm_bin,
            log_format,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    let trimmed = non_blank(Some(raw.trim_end_matches('/').to_string()))
        .ok_or_else(|| AppError::ConfigError(format!("{} must not be empty", key)))?;
    Url::parse(&trimmed).map_err(|e| AppError::ConfigError(format!("{} is not a valid URL: {}", key, e)))
}
