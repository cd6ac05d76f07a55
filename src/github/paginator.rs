use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::github::cache::{CachedPage, ResponseCache};
use crate::github::rate_limiter::RateLimiter;

pub struct Paginator<'a> {
    client: &'a Client,
    rate_limiter: &'a RateLimiter,
    cache: &'a ResponseCache,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a Client, rate_limiter: &'a RateLimiter, cache: &'a ResponseCache) -> Self {
        Self {
            client,
            rate_limiter,
            cache,
        }
    }

    /// Drains every page of a list endpoint. Pages are cached by URL, so a
    /// re-fetch within the cache TTL costs no API quota.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let separator = if base_url.contains('?') { "&" } else { "?" };
            let url = format!("{}{}per_page={}&page={}", base_url, separator, per_page, page);

            let cached = self.fetch_page(&url).await?;
            let items: Vec<T> = serde_json::from_str(&cached.body)?;
            let items_count = items.len();
            all_items.extend(items);

            if !cached.has_next || items_count < per_page as usize {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }

    async fn fetch_page(&self, url: &str) -> Result<CachedPage> {
        if let Some(hit) = self.cache.get(url) {
            tracing::debug!("Cache hit: {}", url);
            return Ok(hit);
        }

        self.rate_limiter.wait().await;
        tracing::debug!("Fetching: {}", url);
        let response = self.client.get(url).send().await?;
        self.rate_limiter.update_from_response(&response);

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                return Err(Error::AuthFailure(
                    "GitHub rejected the supplied token".to_string(),
                ));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::GitHubApi(format!(
                    "Failed to fetch {}: {} - {}",
                    url, status, body
                )));
            }
            _ => {}
        }

        let has_next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("rel=\"next\""))
            .unwrap_or(false);

        let page = CachedPage {
            body: response.text().await?,
            has_next,
        };
        self.cache.put(url, page.clone());
        Ok(page)
    }
}
