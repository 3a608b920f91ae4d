pub mod digitalocean_client;
pub mod github_client;
pub mod process;

#[cfg(test)]
pub(crate) mod test_server;

pub use digitalocean_client::DigitalOceanClient;
pub use github_client::GitHubClient;
pub use process::TokioCommandRunner;
