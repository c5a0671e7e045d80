use thiserror::Error;

#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Setup error for {id}: {reason}")]
    Setup { id: String, reason: String },

    #[error("Start error for {id}: {reason}")]
    Start { id: String, reason: String },

    #[error("Rating query error: {0}")]
    Rating(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TunerError>;
