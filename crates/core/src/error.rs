use thiserror::Error;

pub type InsightsResult<T> = Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    /// A caller passed an argument that makes the computation meaningless.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for InsightsError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
