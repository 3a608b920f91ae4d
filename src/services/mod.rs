pub mod cluster;
pub mod credentials;
pub mod notification;

pub use cluster::*;
pub use credentials::*;
pub use notification::*;
