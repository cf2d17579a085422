use crate::error::{Error, Result};
use crate::fetch::{FetchError, FetchResponse, Fetcher};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Proxy, redirect};
use std::time::Duration;
use url::Url;

/// Plain HTTP fetcher backed by one shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher, routing every request through `proxy` when given
    pub fn new(proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().redirect(redirect::Policy::limited(10));

        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy).map_err(|e| Error::invalid_input(proxy, e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::invalid_input("http client", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        user_agent: &str,
    ) -> std::result::Result<FetchResponse, FetchError> {
        ::log::debug!("Fetching {}", url);

        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::timeout(url, timeout)
            } else {
                FetchError::network(url, e)
            }
        };

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        ::log::debug!(
            "Fetched {} bytes from {} (status {}, {:?})",
            body.len(),
            url,
            status,
            content_type
        );

        Ok(FetchResponse {
            body,
            content_type,
            status,
        })
    }
}
