pub mod crawler;
pub mod export;
pub mod normalize;
mod parser;
pub mod scraper;
pub mod types;
pub mod urls;
pub mod utils;

pub use crawler::{CrawlError, Crawler};
pub use scraper::{ScraperError, WebScraper};

pub(crate) const BASE_URL: &str = "https://www.latribuneauto.com";
