use std::path::PathBuf;

/// Fatal conditions raised while deploying. Every variant ends the run.
#[derive(Debug)]
pub enum DeployError {
    PathNotFound(PathBuf),
    ProfileNotFound {
        function_app: String,
    },
    UploadFailed {
        status: u16,
        body: String,
    },
    TriggerSyncFailed(String),
    ResourceNotFound {
        name: String,
        resource_group: String,
    },
    UnsupportedFileType(PathBuf),
    DuplicateTarget {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    DeploymentFailed {
        name: String,
    },
}

impl std::fmt::Display for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployError::PathNotFound(path) => {
                write!(f, "Path: \"{}\" doesn't exist.", path.display())
            }
            DeployError::ProfileNotFound { function_app } => write!(
                f,
                "No ZipDeploy publish profile found for Function App \"{}\"",
                function_app
            ),
            DeployError::UploadFailed { status, body } => write!(
                f,
                "Deployment failed with status code: {} | error: {}",
                status, body
            ),
            DeployError::TriggerSyncFailed(message) => {
                write!(f, "Error during syncing triggers, exception: {}", message)
            }
            DeployError::ResourceNotFound {
                name,
                resource_group,
            } => write!(
                f,
                "Logic App \"{}\" doesn't exist in resource group \"{}\".",
                name, resource_group
            ),
            DeployError::UnsupportedFileType(path) => write!(
                f,
                "File: \"{}\" has invalid type, only '.json' is supported.",
                path.display()
            ),
            DeployError::DuplicateTarget {
                name,
                first,
                second,
            } => write!(
                f,
                "Logic App \"{}\" is defined twice: \"{}\" and \"{}\"",
                name,
                first.display(),
                second.display()
            ),
            DeployError::DeploymentFailed { name } => {
                write!(f, "Deployment failed | Name: {}", name)
            }
        }
    }
}

impl std::error::Error for DeployError {}

/// Failure talking to Azure: transport errors, unexpected status codes, bad payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error for an operation that answered with a status it does not document.
    pub fn invalid_status(status: reqwest::StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        Self::with_status(
            status.as_u16(),
            format!("Operation returned an invalid status '{}'", reason),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::with_status(status.as_u16(), e.to_string()),
            None => Self::new(e.to_string()),
        }
    }
}
