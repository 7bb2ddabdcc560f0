use chrono::{Datelike, Local};

use crate::export::{CheckpointStore, ExportError};
use crate::scraper::{ScraperError, WebScraper};
use crate::types::{Brand, Catalog, Mode, Model, TrimEntry, TrimKey, TrimRecord};
use crate::urls;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScraperError),
    #[error("Checkpoint failed: {0}")]
    Checkpoint(#[from] ExportError),
}

/// Walks brand → model → [year] → trim-comparison table and assembles
/// the catalog. One page fetch completes before the next begins; the
/// site is crawled strictly request-by-request.
pub struct Crawler {
    scraper: WebScraper,
    checkpoints: Option<CheckpointStore>,
    brand_limit: Option<usize>,
}

impl Crawler {
    pub fn new(scraper: WebScraper) -> Self {
        Self {
            scraper,
            checkpoints: None,
            brand_limit: None,
        }
    }

    /// Persist per-brand progress so a re-run can skip completed brands.
    pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Crawl only the first `limit` brands. Meant for smoke runs.
    pub fn with_brand_limit(mut self, limit: usize) -> Self {
        self.brand_limit = Some(limit);
        self
    }

    pub async fn crawl(&self, mode: Mode) -> Result<Catalog, CrawlError> {
        let mut catalog = Catalog::new();
        let mut completed: Vec<String> = Vec::new();

        if let Some(store) = &self.checkpoints
            && let Some(checkpoint) = store.load(mode)?
        {
            log::info!(
                "Resuming {} crawl: {} brand(s) already done, {} record(s) restored",
                mode,
                checkpoint.completed_brands.len(),
                checkpoint.records.len()
            );
            completed = checkpoint.completed_brands;
            catalog = Catalog::from_records(checkpoint.records);
        }

        let mut brands = recover(self.scraper.fetch_brands(mode).await, "brand list")?;
        if let Some(limit) = self.brand_limit {
            brands.truncate(limit);
        }
        log::info!("Crawling {} brand(s) in {} mode", brands.len(), mode);

        for brand in &brands {
            if completed.iter().any(|done| done == &brand.label) {
                log::info!("Skipping {} (checkpointed)", brand.label);
                continue;
            }

            self.crawl_brand(mode, brand, &mut catalog).await?;

            completed.push(brand.label.clone());
            if let Some(store) = &self.checkpoints {
                store.save(mode, &completed, &catalog)?;
            }
            log::info!("Done with {} ({} record(s) so far)", brand.label, catalog.len());
        }

        Ok(catalog)
    }

    async fn crawl_brand(
        &self,
        mode: Mode,
        brand: &Brand,
        catalog: &mut Catalog,
    ) -> Result<(), CrawlError> {
        let models = recover(
            self.scraper.fetch_models(mode, &brand.id).await,
            &format!("models of {}", brand.label),
        )?;

        for model in &models {
            match mode {
                Mode::New => {
                    let url =
                        urls::trim_page_new(self.scraper.base_url(), &brand.label, &model.label);
                    let trims = recover(self.scraper.fetch_trim_table(&url).await, &url)?;
                    merge_trims(catalog, brand, model, None, &url, trims);
                }
                Mode::Used => {
                    let years = recover(
                        self.scraper.fetch_years(brand, model).await,
                        &format!("years of {}/{}", brand.label, model.label),
                    )?;

                    for year in valid_years(&years, Local::now().year()) {
                        let url = urls::trim_page_used(
                            self.scraper.base_url(),
                            &brand.label,
                            &model.label,
                            year,
                        );
                        let trims = recover(self.scraper.fetch_trim_table(&url).await, &url)?;
                        merge_trims(catalog, brand, model, Some(year), &url, trims);
                    }
                }
            }
            log::debug!("Done with {}/{}", brand.label, model.label);
        }

        Ok(())
    }
}

/// A parse failure on one traversal node means zero results for that
/// node, not an aborted run. Transport failures stay fatal.
fn recover<T>(result: Result<Vec<T>, ScraperError>, node: &str) -> Result<Vec<T>, ScraperError> {
    match result {
        Ok(items) => Ok(items),
        Err(ScraperError::ParseError(e)) => {
            log::warn!("Skipping {}: {}", node, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Used-vehicle listings are only kept for the last four model years,
/// `[current_year - 3, current_year]` inclusive, and only when the
/// year-picker actually offers the year.
pub fn valid_years(available: &[i32], current_year: i32) -> Vec<i32> {
    (current_year - 3..=current_year)
        .filter(|year| available.contains(year))
        .collect()
}

fn merge_trims(
    catalog: &mut Catalog,
    brand: &Brand,
    model: &Model,
    year: Option<i32>,
    source_url: &str,
    trims: Vec<TrimEntry>,
) {
    for trim in trims {
        catalog.insert(TrimRecord {
            key: TrimKey {
                brand: brand.label.clone(),
                model: model.label.clone(),
                year,
                trim: trim.name,
            },
            price: trim.price,
            co2_emissions: trim.co2_emissions,
            source_url: source_url.to_string(),
        });
    }
}
