use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page produced no usable content
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("unsupported content type {content_type:?} for {url}")]
    ContentType { url: String, content_type: String },

    #[error("rendering {url} failed: {reason}")]
    Render { url: String, reason: String },

    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn network(url: &Url, reason: impl ToString) -> Self {
        FetchError::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(url: &Url, timeout: Duration) -> Self {
        FetchError::Timeout {
            url: url.to_string(),
            timeout,
        }
    }

    pub fn render(url: &Url, reason: impl ToString) -> Self {
        FetchError::Render {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Raw result of an HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: Vec<u8>,
    pub content_type: String,
    pub status: u16,
}

impl FetchResponse {
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            body: body.into().into_bytes(),
            content_type: "text/html; charset=utf-8".to_string(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Fetches raw page content over the network
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<FetchResponse, FetchError>;
}

/// Produces fully rendered HTML, typically through a headless browser
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, timeout: Duration, user_agent: &str)
    -> Result<String, FetchError>;

    /// Release any browser session held by the renderer
    async fn shutdown(&self) {}
}

/// Per-request settings shared by every site in a run
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Navigation bound handed to the renderer
    pub render_timeout: Duration,
    pub user_agent: String,
    pub allowed_content_types: Vec<String>,
}

impl FetchOptions {
    /// Whether the content type matches the allow-list (substring, case-insensitive)
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.allowed_content_types
            .iter()
            .any(|allowed| content_type.contains(&allowed.to_ascii_lowercase()))
    }
}
