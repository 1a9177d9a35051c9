use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid version: {0}")]
    InvalidVersion(String),
    #[error("invalid url {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Sorts a transport error into [`Error::Connection`] or [`Error::Request`].
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_connect() {
            Error::Connection {
                url: url.to_string(),
                source,
            }
        } else {
            Error::Request(source)
        }
    }

    /// True when the server could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }
}
