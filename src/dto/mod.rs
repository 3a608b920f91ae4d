pub mod digitalocean;
pub mod github;

pub use digitalocean::*;
pub use github::*;
