use crate::fetch::{FetchError, Renderer};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// WebDriver endpoints tried when the configured one refuses the connection
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
];

/// Renders pages in a headless browser through a WebDriver server.
///
/// The session is opened lazily on the first render and reused afterwards.
/// Renders are serialized because one session can only show one page at a time.
pub struct WebDriverRenderer {
    webdriver_url: String,
    client: Mutex<Option<Client>>,
}

impl WebDriverRenderer {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            client: Mutex::new(None),
        }
    }

    /// Connects to the configured WebDriver, then to the fallback endpoints
    async fn connect(&self, user_agent: &str) -> Result<Client, FetchError> {
        match connect_to(&self.webdriver_url, user_agent).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::warn!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            // Don't log fallback failures to avoid log spam
            if let Ok(client) = connect_to(url, user_agent).await {
                ::log::info!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        Err(FetchError::Unavailable(format!(
            "no WebDriver server reachable at {} (set WEBDRIVER_URL)",
            self.webdriver_url
        )))
    }
}

async fn connect_to(webdriver_url: &str, user_agent: &str) -> Result<Client, String> {
    let mut capabilities = serde_json::Map::new();
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless=new", format!("--user-agent={}", user_agent)] }),
    );
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities);
    builder
        .connect(webdriver_url)
        .await
        .map_err(|e| e.to_string())
}

async fn page_source(client: &Client, url: &Url) -> Result<String, fantoccini::error::CmdError> {
    client.goto(url.as_str()).await?;
    client.source().await
}

fn is_session_lost(error: &fantoccini::error::CmdError) -> bool {
    let message = error.to_string();
    message.contains("Unable to find session") || message.contains("invalid session id")
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(
        &self,
        url: &Url,
        render_timeout: Duration,
        user_agent: &str,
    ) -> Result<String, FetchError> {
        let mut session = self.client.lock().await;

        // One reconnect when the browser session has gone away
        for attempt in 0..2 {
            let client = match session.as_ref() {
                Some(client) => client.clone(),
                None => {
                    let client = self.connect(user_agent).await?;
                    *session = Some(client.clone());
                    client
                }
            };

            match timeout(render_timeout, page_source(&client, url)).await {
                Ok(Ok(html)) => {
                    ::log::debug!("Rendered {} ({} bytes)", url, html.len());
                    return Ok(html);
                }
                Ok(Err(e)) if attempt == 0 && is_session_lost(&e) => {
                    ::log::warn!("Lost WebDriver session while rendering {}, reconnecting", url);
                    *session = None;
                }
                Ok(Err(e)) => return Err(FetchError::render(url, e)),
                Err(_) => return Err(FetchError::timeout(url, render_timeout)),
            }
        }

        Err(FetchError::render(url, "WebDriver session could not be re-established"))
    }

    async fn shutdown(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
