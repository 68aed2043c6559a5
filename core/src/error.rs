use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayErr>;

#[derive(Debug, Error)]
pub enum RelayErr {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse draft store: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not determine the relay home directory")]
    MissingHome,

    #[error("unknown slash command `{0}`")]
    UnknownCommand(String),

    #[error("message `{0}` not found")]
    MessageNotFound(String),

    #[error("a description is required to report a user")]
    EmptyReportDescription,

    /// A collaborator (remote API, database) failed.
    #[error("{0}")]
    Service(String),
}
