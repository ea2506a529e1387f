//! Remote reads and writes for the advising feature.

use std::time::Duration;

use advising_core::config::ClientSettings;
use advising_core::pagination::{Paginated, TimeRangePaginationParams};
use advising_core::types::{DocumentDetails, DocumentSection};
use advising_core::{parse_drop_in, DropIn};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::paginator::{Paginator, TimeRangePaginator};

pub const FEED_PATH: &str = "/api/drop-ins/paginate";

pub const UNAUTHENTICATED_MESSAGE: &str =
    "User is not authenticated. Please log in to view events.";

pub type FeedPage = Paginated<DropIn, TimeRangePaginationParams>;

pub struct AdvisingService {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    feed: TimeRangePaginator,
    public_feed: Option<TimeRangePaginator>,
}

impl AdvisingService {
    pub fn new(settings: &ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: &ClientSettings) -> Self {
        let base_url = settings.api_url.trim_end_matches('/').to_string();
        let feed = Paginator::new(client.clone(), base_url.clone(), FEED_PATH)
            .with_token(settings.token.clone());
        let public_feed = settings
            .public_feed_path
            .as_ref()
            .map(|path| Paginator::new(client.clone(), base_url.clone(), path.clone()));

        Self {
            client,
            base_url,
            token: settings.token.clone(),
            feed,
            public_feed,
        }
    }

    /// Loads one window of the drop-in feed.
    ///
    /// Unauthenticated callers get the public feed when one is configured and
    /// otherwise an empty page carrying `UNAUTHENTICATED_MESSAGE`. A public
    /// feed that still demands credentials yields the same stand-in page.
    pub async fn get_events(
        &self,
        params: &TimeRangePaginationParams,
        authenticated: bool,
    ) -> Result<FeedPage, FetchError> {
        if authenticated {
            return self.feed.load_page(params, parse_drop_in).await;
        }

        let Some(public_feed) = &self.public_feed else {
            debug!("no public feed bound, substituting empty page");
            return Ok(Paginated::unavailable(params.clone(), UNAUTHENTICATED_MESSAGE));
        };

        match public_feed.load_page(params, parse_drop_in).await {
            Err(err) if err.is_unauthorized() => {
                debug!(path = public_feed.path(), "public feed requires authentication");
                Ok(Paginated::unavailable(params.clone(), UNAUTHENTICATED_MESSAGE))
            }
            other => other,
        }
    }

    pub async fn get_event(&self, id: i64) -> Result<DropIn, FetchError> {
        let url = self.url(&["api", "drop-ins", &id.to_string()])?;
        let raw: serde_json::Value = self.get_json(url).await?;
        parse_drop_in(raw).map_err(|source| FetchError::Parse { index: 0, source })
    }

    /// Document sections matching `query`, in server rank order.
    pub async fn search(&self, query: &str) -> Result<Vec<DocumentSection>, FetchError> {
        let url = self.url(&["api", "documents", "search", query])?;
        self.get_json(url).await
    }

    pub async fn get_document(&self, id: i64) -> Result<DocumentDetails, FetchError> {
        let url = self.url(&["api", "documents", &id.to_string()])?;
        self.get_json(url).await
    }

    pub async fn register(&self, event_id: i64) -> Result<(), FetchError> {
        self.send_registration(Method::POST, event_id).await?;
        info!(event_id, "registered for drop-in");
        Ok(())
    }

    pub async fn unregister(&self, event_id: i64) -> Result<(), FetchError> {
        self.send_registration(Method::DELETE, event_id).await?;
        info!(event_id, "unregistered from drop-in");
        Ok(())
    }

    async fn send_registration(&self, method: Method, event_id: i64) -> Result<(), FetchError> {
        let url = self.url(&["api", "drop-ins", &event_id.to_string(), "registration"])?;
        let resp = self.request(method, url).send().await?;
        check_status(resp).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let resp = self.request(Method::GET, url).send().await?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Appends percent-encoded path segments to the base url.
    fn url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| FetchError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(FetchError::Status {
        status: status.as_u16(),
        body,
    })
}
