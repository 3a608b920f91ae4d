//! Derivation of deployment identifiers from the run inputs
//!
//! Everything here is a pure function of its arguments: the same inputs
//! always yield the same [`DeploymentTarget`].

use crate::config::RunInputs;
use crate::utils::non_blank;

pub const DEFAULT_RELEASE: &str = "latest";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_PULL_SECRET: &str = "regcred";
pub const HOST_WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub app: String,
    pub release: String,
    pub namespace: String,
    pub host: Option<String>,
    pub image: String,
    pub port: u16,
    pub pull_secret: String,
}

impl DeploymentTarget {
    pub fn resolve(inputs: &RunInputs) -> Self {
        let image = inputs.image.trim().to_string();
        let app = non_blank(inputs.app.clone()).unwrap_or_else(|| app_from_image(&image));
        let release = non_blank(inputs.release.clone()).unwrap_or_else(|| release_from_image(&image));
        let host = non_blank(inputs.host.clone()).map(|template| resolve_host(&template, &app, &release));
        let namespace =
            non_blank(inputs.namespace.clone()).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let pull_secret =
            non_blank(inputs.docker_pull_secret.clone()).unwrap_or_else(|| DEFAULT_PULL_SECRET.to_string());

        Self {
            app,
            release,
            namespace,
            host,
            image,
            port: inputs.port,
            pull_secret,
        }
    }

    /// Helm release identifier, `{app}-{release}`
    pub fn release_name(&self) -> String {
        format!("{}-{}", self.app, self.release)
    }

    pub fn url(&self) -> Option<String> {
        self.host.as_ref().map(|host| format!("https://{}", host))
    }

    /// Rows for the deployment information log group
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("app", self.app.clone()),
            ("release", self.release.clone()),
            ("namespace", self.namespace.clone()),
            ("host", self.host.clone().unwrap_or_else(|| "-".to_string())),
            ("image", self.image.clone()),
            ("port", self.port.to_string()),
            ("dockerPullSecret", self.pull_secret.clone()),
        ]
    }
}

/// Last path segment of the image without tag or digest.
pub fn app_from_image(image: &str) -> String {
    let name = image_name_segment(image);
    match name.split_once(':') {
        Some((app, _)) => app.to_string(),
        None => name.to_string(),
    }
}

/// Tag of the image, or `latest` when it has none.
pub fn release_from_image(image: &str) -> String {
    image_name_segment(image)
        .rsplit_once(':')
        .map(|(_, tag)| tag)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(DEFAULT_RELEASE)
        .to_string()
}

fn image_name_segment(image: &str) -> &str {
    let last = image.rsplit('/').next().unwrap_or(image);
    last.split('@').next().unwrap_or(last)
}

pub fn resolve_host(template: &str, app: &str, release: &str) -> String {
    template.replace(HOST_WILDCARD, &format!("{}-{}", release, app))
}

/// Parses a comma-separated allowlist and keeps the names `lookup` can
/// resolve, in allowlist order, as `env.<name>` / value pairs.
pub fn resolve_env_passthrough<F>(allowlist: Option<&str>, lookup: F) -> Vec<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    allowlist
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| lookup(name).map(|value| (format!("env.{}", name), value)))
        .collect()
}

/// [`resolve_env_passthrough`] against the process environment
pub fn env_passthrough_from_process(allowlist: Option<&str>) -> Vec<(String, String)> {
    resolve_env_passthrough(allowlist, |name| std::env::var(name).ok())
}
