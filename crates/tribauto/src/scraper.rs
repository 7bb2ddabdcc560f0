use crate::parser::{
    ParseError, parse_brand_options, parse_model_options, parse_trim_table, parse_year_list,
};
use crate::types::{Brand, Mode, Model, TrimEntry};
use crate::urls;

use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: crate::BASE_URL.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_brands(&self, mode: Mode) -> Result<Vec<Brand>, ScraperError> {
        let url = urls::brands_page(&self.base_url, mode);
        log::info!("Fetching {} brand list: {}", mode, url);
        let html = self.get_html(&url).await?;
        Ok(parse_brand_options(&html)?)
    }

    pub async fn fetch_models(
        &self,
        mode: Mode,
        brand_id: &str,
    ) -> Result<Vec<Model>, ScraperError> {
        let url = urls::models_page(&self.base_url, mode, brand_id);
        log::info!("Fetching model list: {}", url);
        let html = self.get_html(&url).await?;
        Ok(parse_model_options(&html)?)
    }

    pub async fn fetch_years(&self, brand: &Brand, model: &Model) -> Result<Vec<i32>, ScraperError> {
        let url = urls::year_picker_page(&self.base_url, &brand.label, &model.label);
        log::info!("Fetching year picker: {}", url);
        let html = self.get_html(&url).await?;
        Ok(parse_year_list(&html)?)
    }

    pub async fn fetch_trim_table(&self, url: &str) -> Result<Vec<TrimEntry>, ScraperError> {
        log::info!("Fetching trim table: {}", url);
        let html = self.get_html(url).await?;
        Ok(parse_trim_table(&html))
    }

    // Error statuses still return the page body. A 404 for a malformed
    // label renders without the expected markup, which the parsers
    // already report as an empty/structureless page, so only transport
    // failures are errors here.
    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        if let Err(e) = response.error_for_status_ref() {
            log::debug!("Non-success status for {}: {}", url, e);
        }

        Ok(response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
