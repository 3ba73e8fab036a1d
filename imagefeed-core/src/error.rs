use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MapperError {
    #[error("invalid data")]
    InvalidData,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store contents are corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Terminal failure of a load request. A cancelled request never produces one.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("connectivity error: {0}")]
    Connectivity(#[from] HttpClientError),
    #[error("invalid data")]
    InvalidData,
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("no cached data for {0}")]
    NotFound(Url),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<MapperError> for LoadError {
    fn from(err: MapperError) -> Self {
        match err {
            MapperError::InvalidData => LoadError::InvalidData,
        }
    }
}
