use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    #[error("trial already used for this account")]
    AlreadyTrialed,

    #[error("invalid plan '{0}': expected free, pro, premium, or gold")]
    InvalidPlan(String),

    #[error("invalid phase id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidPhaseId(String),

    #[error("duplicate phase in catalog: {0}")]
    DuplicatePhase(String),

    #[error("phase '{phase}' depends on unregistered phase '{dependency}'")]
    UnknownDependency { phase: String, dependency: String },

    #[error("dependency cycle involving phase '{0}'")]
    DependencyCycle(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
