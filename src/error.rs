use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("renderer for {0:?} not found")]
    UnknownPlatform(String),

    #[error("invalid renderer registry: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to write renderer registry: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
