use crate::pagination::{PaginationParams, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: String,
    pub token: Option<String>,
    pub page_size: u32,
    pub timeout_secs: u64,
    pub public_feed_path: Option<String>,
}

impl ClientSettings {
    /// Defaults for everything but the API root.
    pub fn new(api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
            public_feed_path: None,
        }
    }

    pub fn from_env() -> Result<Self, std::env::VarError> {
        let api_url =
            std::env::var("ADVISING_API_URL").or_else(|_| std::env::var("API_URL"))?;
        let token = std::env::var("ADVISING_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let page_size = std::env::var("ADVISING_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(PaginationParams::clamp_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let timeout_secs = std::env::var("ADVISING_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let public_feed_path = std::env::var("ADVISING_PUBLIC_FEED_PATH")
            .ok()
            .filter(|v| !v.is_empty());

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            page_size,
            timeout_secs,
            public_feed_path,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
