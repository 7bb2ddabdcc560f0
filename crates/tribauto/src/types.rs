use std::collections::BTreeMap;
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("Invalid mode '{0}'. Accepted values: 'new', 'used'")]
pub struct ModeParseError(String);

/// Which of the site's two disjoint catalogs a crawl targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    New,
    Used,
}

impl Mode {
    pub fn slug(&self) -> &'static str {
        match self {
            Mode::New => "new",
            Mode::Used => "used",
        }
    }
}

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" | "neuve" => Ok(Mode::New),
            "used" | "occasion" => Ok(Mode::Used),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Brand labels double as URL path segments: spaces become hyphens.
pub fn sanitize_brand_label(raw: &str) -> String {
    raw.trim().replace(' ', "-")
}

/// Model labels carry two extra quirks on top of the brand rule: a
/// trailing `+` is dropped outright, any remaining `+` and any
/// apostrophe become hyphens.
pub fn sanitize_model_label(raw: &str) -> String {
    let mut label = sanitize_brand_label(raw);
    if let Some(stripped) = label.strip_suffix('+') {
        label = stripped.to_string();
    }
    label.replace('+', "-").replace('\'', "-")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Site-assigned numeric id, kept as the raw attribute string.
    pub id: String,
    pub label: String,
}

impl Brand {
    pub fn new(id: impl Into<String>, raw_label: &str) -> Self {
        Self {
            id: id.into(),
            label: sanitize_brand_label(raw_label),
        }
    }
}

impl Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [id {}]", self.label, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub label: String,
}

impl Model {
    pub fn new(id: impl Into<String>, raw_label: &str) -> Self {
        Self {
            id: id.into(),
            label: sanitize_model_label(raw_label),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [id {}]", self.label, self.id)
    }
}

/// One row of a trim-comparison table before it is keyed: the trim name
/// plus whatever numeric fields the table carried for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimEntry {
    pub name: String,
    pub price: Option<String>,
    pub co2_emissions: Option<String>,
}

/// Composite key of one scraped trim. Year is only present for
/// used-vehicle records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrimKey {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub trim: String,
}

impl Display for TrimKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.brand, self.model)?;
        if let Some(year) = self.year {
            write!(f, "/{}", year)?;
        }
        write!(f, "/{}", self.trim)
    }
}

/// The atomic scraped unit: key plus raw (uncleaned) field values and
/// the trim-comparison page it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimRecord {
    #[serde(flatten)]
    pub key: TrimKey,
    pub price: Option<String>,
    pub co2_emissions: Option<String>,
    pub source_url: String,
}

/// All trim records of one crawl run, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: BTreeMap<TrimKey, TrimRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TrimRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// First writer wins. Keys are already disambiguated per page, so a
    /// duplicate here means two traversal nodes overlapped; the earlier
    /// record is kept and the clash is logged.
    pub fn insert(&mut self, record: TrimRecord) {
        use std::collections::btree_map::Entry;
        match self.records.entry(record.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(_) => {
                log::warn!("Duplicate catalog key {}, keeping first record", record.key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TrimRecord> {
        self.records.values()
    }

    pub fn into_records(self) -> Vec<TrimRecord> {
        self.records.into_values().collect()
    }
}

/// Normalized flat output row. Field order is the sink's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    pub trim: String,
    pub price: Option<String>,
    pub co2_emissions: Option<u32>,
    pub is_electric: bool,
    pub source_url: String,
}
