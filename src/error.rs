use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("{source_name}: no front matter block found")]
    MalformedInput { source_name: String },

    #[error("failed to load {location}: {reason}")]
    FetchFailure { location: String, reason: String },

    #[error("post not found: {slug}")]
    NotFound { slug: String },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlogError {
    pub fn fetch(location: impl Into<String>, reason: impl ToString) -> Self {
        BlogError::FetchFailure {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = BlogError> = std::result::Result<T, E>;
