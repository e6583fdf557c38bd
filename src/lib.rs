//! Deploy Azure Function Apps (ZIP deploy) and Logic Apps (ARM template deployments).
//!
//! The `function-app-deploy` and `logic-app-deploy` binaries are thin wrappers around
//! [`cli::commands`]; the deployment logic lives in [`deploy`] and talks to Azure only
//! through the capability traits in [`azure`].

pub mod azure;
pub mod cli;
pub mod deploy;
pub mod error;

pub use error::{ApiError, DeployError};

// Re-export tracing for use in other modules
pub use tracing;
