//! RustAutoDeploy - pipeline step that ships a container image to a
//! DigitalOcean Kubernetes cluster through helm.
//!
//! The binary validates the provider token, resolves the cluster and its
//! kubeconfig into a private workspace, then installs or removes the helm
//! release derived from the image reference.

#![allow(non_snake_case)]

pub mod ci;
pub mod config;
pub mod core;
pub mod dto;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, Result};
