pub mod http;
pub mod site;
pub mod web;

#[cfg(test)]
pub(crate) mod tests;

pub use http::HttpFetcher;
pub use site::{CrawlServices, CrawlState, FetchedPage, SiteCrawl, SiteCrawler};
pub use web::WebDriverRenderer;
