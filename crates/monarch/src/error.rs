use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unable to decode response")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint url")]
    Url(#[from] url::ParseError),
    #[error("{0} returned no data: {1}")]
    EmptyResponse(&'static str, String),
    #[error("page size must be at least 1")]
    PageSize,
    #[error("{0} failed: {1}")]
    Mutation(&'static str, String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
