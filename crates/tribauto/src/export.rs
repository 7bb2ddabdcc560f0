//! Catalog persistence: the CSV/JSON sink for normalized rows and the
//! JSON checkpoint files the crawler uses to resume interrupted runs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{Catalog, CatalogRow, Mode, TrimRecord};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row per record, header from the `CatalogRow` field order.
pub fn write_csv<W: Write>(writer: W, rows: &[CatalogRow]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, rows: &[CatalogRow]) -> Result<(), ExportError> {
    write_csv(fs::File::create(path)?, rows)
}

pub fn write_json_file(path: &Path, rows: &[CatalogRow]) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(path, json)?;
    Ok(())
}

/// Per-brand crawl progress, serialized as flat records because JSON
/// cannot key a map by a composite struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlCheckpoint {
    pub completed_brands: Vec<String>,
    pub records: Vec<TrimRecord>,
}

/// Directory of one checkpoint file per crawl mode.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, mode: Mode) -> PathBuf {
        self.dir.join(format!("crawl-{}.json", mode.slug()))
    }

    pub fn load(&self, mode: Mode) -> Result<Option<CrawlCheckpoint>, ExportError> {
        let path = self.path(mode);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn save(
        &self,
        mode: Mode,
        completed_brands: &[String],
        catalog: &Catalog,
    ) -> Result<(), ExportError> {
        fs::create_dir_all(&self.dir)?;
        let checkpoint = CrawlCheckpoint {
            completed_brands: completed_brands.to_vec(),
            records: catalog.records().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&checkpoint)?;
        fs::write(self.path(mode), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrimKey;

    fn sample_rows() -> Vec<CatalogRow> {
        vec![
            CatalogRow {
                brand: "Renault".into(),
                model: "Clio".into(),
                year: None,
                trim: "Clio-1".into(),
                price: Some("15000".into()),
                co2_emissions: Some(95),
                is_electric: false,
                source_url: "https://example.com/clio".into(),
            },
            CatalogRow {
                brand: "Renault".into(),
                model: "Clio".into(),
                year: Some(2024),
                trim: "Clio-2".into(),
                price: None,
                co2_emissions: Some(0),
                is_electric: true,
                source_url: "https://example.com/clio/2024".into(),
            },
        ]
    }

    #[test]
    fn test_write_csv_stable_column_order() {
        let mut out = Vec::new();
        write_csv(&mut out, &sample_rows()).expect("Failed to write CSV");

        let csv = String::from_utf8(out).expect("CSV should be UTF-8");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("brand,model,year,trim,price,co2_emissions,is_electric,source_url")
        );
        assert_eq!(
            lines.next(),
            Some("Renault,Clio,,Clio-1,15000,95,false,https://example.com/clio")
        );
        assert_eq!(
            lines.next(),
            Some("Renault,Clio,2024,Clio-2,,0,true,https://example.com/clio/2024")
        );
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = std::env::temp_dir().join(format!("tribauto-checkpoint-{}", std::process::id()));
        let store = CheckpointStore::new(&dir);

        assert!(
            store
                .load(Mode::Used)
                .expect("Missing checkpoint should not error")
                .is_none()
        );

        let mut catalog = Catalog::new();
        catalog.insert(TrimRecord {
            key: TrimKey {
                brand: "Renault".into(),
                model: "Clio".into(),
                year: Some(2024),
                trim: "Zen".into(),
            },
            price: Some("15 000 €".into()),
            co2_emissions: Some("95".into()),
            source_url: "https://example.com".into(),
        });
        let completed = vec!["Renault".to_string()];

        store
            .save(Mode::Used, &completed, &catalog)
            .expect("Failed to save checkpoint");
        let checkpoint = store
            .load(Mode::Used)
            .expect("Failed to load checkpoint")
            .expect("Checkpoint should exist");

        assert_eq!(checkpoint.completed_brands, completed);
        assert_eq!(checkpoint.records.len(), 1);
        assert_eq!(Catalog::from_records(checkpoint.records), catalog);

        // New-mode checkpoints live in a separate file.
        assert!(
            store
                .load(Mode::New)
                .expect("Missing checkpoint should not error")
                .is_none()
        );

        fs::remove_dir_all(&dir).expect("Failed to clean up temp dir");
    }
}
