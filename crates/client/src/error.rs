use advising_core::pagination::ParamsError;
use advising_core::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid pagination parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with HTTP {status}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("item {index} could not be parsed: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("server returned {items} items for a page of {page_size}")]
    PageOverflow { items: usize, page_size: u32 },

    #[error("invalid url: {0}")]
    Url(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
