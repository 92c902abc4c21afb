use std::path::PathBuf;

/// Everything a command can fail with. None of these end the session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("bookmark '{0}' not found")]
    UnknownBookmark(String),
    #[error("file error at {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unknown command: {0}. Type 'help' for available commands.")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
