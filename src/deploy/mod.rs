//! Deployment orchestration for Function Apps and Logic Apps.

mod logic_app;
mod poll;
mod profile;
mod targets;
mod template;
mod triggers;
mod zip;

pub use logic_app::LogicAppDeployer;
pub use poll::{poll_all, wait_single, Worklist};
pub use profile::{
    parse_publish_profiles, resolve_publish_profile, select_zip_deploy, PublishProfile,
};
pub use targets::{collect_targets, LogicAppTarget, TargetMode};
pub use template::{build_envelope, load_template, DeploymentNaming, DEPLOYMENT_PREFIX};
pub use triggers::{sync_function_app_triggers, BENIGN_SYNC_ERROR};
pub use zip::{basic_auth_header, ZipDeployer};
