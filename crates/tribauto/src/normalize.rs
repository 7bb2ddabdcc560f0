use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Catalog, CatalogRow, TrimKey, TrimRecord};

static RE_NON_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]").expect("invalid regex: non-digit"));

/// A CO2 value that was present on the page but has no usable digits
/// after cleaning. Surfaced per record so the source defect stays
/// visible instead of being zeroed away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CO2 value '{raw}' for {key} has no usable digits")]
pub struct ConversionError {
    pub key: TrimKey,
    pub raw: String,
}

#[derive(Debug, Default)]
pub struct NormalizedCatalog {
    pub rows: Vec<CatalogRow>,
    pub anomalies: Vec<ConversionError>,
}

/// Strips everything but ASCII digits; idempotent on clean input.
pub fn clean_numeric(raw: &str) -> String {
    RE_NON_DIGIT.replace_all(raw, "").into_owned()
}

/// Cleans every record's numeric fields and derives the electric flag.
/// Records with an unparseable CO2 value are excluded from the rows and
/// reported as anomalies.
pub fn normalize(catalog: &Catalog) -> NormalizedCatalog {
    let mut normalized = NormalizedCatalog::default();
    for record in catalog.records() {
        match normalize_record(record) {
            Ok(row) => normalized.rows.push(row),
            Err(anomaly) => normalized.anomalies.push(anomaly),
        }
    }
    normalized
}

fn normalize_record(record: &TrimRecord) -> Result<CatalogRow, ConversionError> {
    // A price that cleans to nothing is treated as absent; the
    // invariant is "absent, or at least one digit".
    let price = record
        .price
        .as_deref()
        .map(clean_numeric)
        .filter(|cleaned| !cleaned.is_empty());

    let co2_emissions = match record.co2_emissions.as_deref() {
        None => None,
        Some(raw) => Some(clean_numeric(raw).parse::<u32>().map_err(|_| {
            ConversionError {
                key: record.key.clone(),
                raw: raw.to_string(),
            }
        })?),
    };

    Ok(CatalogRow {
        brand: record.key.brand.clone(),
        model: record.key.model.clone(),
        year: record.key.year,
        trim: record.key.trim.clone(),
        price,
        co2_emissions,
        is_electric: co2_emissions == Some(0),
        source_url: record.source_url.clone(),
    })
}
