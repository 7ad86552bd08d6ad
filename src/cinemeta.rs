use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::SyncConfig;
use crate::domain::{ImdbId, SkipReason};
use crate::error::MetaError;

/// One lookup against the remote meta service.
///
/// Implementations return the full response body of a successful request, or
/// the reason the identifier has to be skipped.
pub trait MetaClient {
    fn fetch_body(&self, id: &ImdbId) -> Result<String, SkipReason>;
}

#[derive(Clone)]
pub struct CinemetaHttpClient {
    client: Client,
    base_url: String,
    cache_buster: Option<String>,
}

impl CinemetaHttpClient {
    pub fn new(config: &SyncConfig) -> Result<Self, MetaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("stremio-metafetcher/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MetaError::HttpClient(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| MetaError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cache_buster: config.cache_buster.clone(),
        })
    }

    pub fn meta_url(&self, id: &ImdbId) -> String {
        meta_url(&self.base_url, id, self.cache_buster.as_deref())
    }
}

impl MetaClient for CinemetaHttpClient {
    fn fetch_body(&self, id: &ImdbId) -> Result<String, SkipReason> {
        let url = self.meta_url(id);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| SkipReason::Network(format!("couldn't GET {url}: {err}")))?;
        if !response.status().is_success() {
            return Err(SkipReason::Status(response.status().as_u16()));
        }
        // Decoding must not touch the payload, so invalid UTF-8 is a skip.
        let bytes = response
            .bytes()
            .map_err(|err| SkipReason::Body(err.to_string()))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| SkipReason::Body(format!("body is not UTF-8: {err}")))
    }
}

pub fn meta_url(base_url: &str, id: &ImdbId, cache_buster: Option<&str>) -> String {
    match cache_buster {
        Some(query) => format!("{base_url}/{id}.json?{query}"),
        None => format!("{base_url}/{id}.json"),
    }
}
