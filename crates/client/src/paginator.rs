//! Single-fetch pagination over a fixed resource path.

use std::marker::PhantomData;

use advising_core::pagination::{PageQuery, Paginated, TimeRangePaginationParams};
use advising_core::ParseError;
use tracing::debug;

use crate::error::FetchError;

/// Fetches one page per call from `base_url + path`.
///
/// Holds no state between calls: no caching and no retries. The parameters
/// echoed by the server replace the caller's in the returned page.
#[derive(Debug, Clone)]
pub struct Paginator<P> {
    client: reqwest::Client,
    base_url: String,
    path: String,
    token: Option<String>,
    _params: PhantomData<fn() -> P>,
}

/// Paginator over a start/end window.
pub type TimeRangePaginator = Paginator<TimeRangePaginationParams>;

impl<P: PageQuery> Paginator<P> {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path: path.into(),
            token: None,
            _params: PhantomData,
        }
    }

    /// Sends `token` as a bearer credential on every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn load_page<T, F>(&self, params: &P, mut parse: F) -> Result<Paginated<T, P>, FetchError>
    where
        F: FnMut(serde_json::Value) -> Result<T, ParseError>,
    {
        params.validate()?;

        let url = format!("{}{}", self.base_url, self.path);
        debug!(path = %self.path, page = params.base().page, "loading page");

        let mut request = self.client.get(&url).query(&params.query_pairs());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let raw: Paginated<serde_json::Value, P> = serde_json::from_slice(&bytes)?;

        let page_size = raw.params.base().page_size;
        if raw.items.len() > page_size as usize {
            return Err(FetchError::PageOverflow {
                items: raw.items.len(),
                page_size,
            });
        }

        raw.try_map_items(|index, item| {
            parse(item).map_err(|source| FetchError::Parse { index, source })
        })
    }
}
