use std::collections::HashSet;

use crate::types::CatalogRow;

#[derive(Debug)]
pub struct CatalogStats {
    pub brands: usize,
    pub models: usize,
    pub records: usize,
    pub electric: usize,
}

impl CatalogStats {
    pub fn from_rows(rows: &[CatalogRow]) -> CatalogStats {
        let brands: HashSet<&str> = rows.iter().map(|r| r.brand.as_str()).collect();
        let models: HashSet<(&str, &str)> = rows
            .iter()
            .map(|r| (r.brand.as_str(), r.model.as_str()))
            .collect();

        CatalogStats {
            brands: brands.len(),
            models: models.len(),
            records: rows.len(),
            electric: rows.iter().filter(|r| r.is_electric).count(),
        }
    }
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Brands:         {}", self.brands)?;
        writeln!(f, "  Models:         {}", self.models)?;
        writeln!(f, "  Trim records:   {}", self.records)?;
        writeln!(f, "  Electric trims: {}", self.electric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(brand: &str, model: &str, trim: &str, electric: bool) -> CatalogRow {
        CatalogRow {
            brand: brand.into(),
            model: model.into(),
            year: None,
            trim: trim.into(),
            price: None,
            co2_emissions: Some(if electric { 0 } else { 95 }),
            is_electric: electric,
            source_url: String::new(),
        }
    }

    #[test]
    fn test_stats_count_distinct_brands_and_models() {
        let rows = vec![
            row("Renault", "Clio", "Zen", false),
            row("Renault", "Clio", "Intens", false),
            row("Renault", "Zoe", "Life", true),
            row("Audi", "A3", "Sport", false),
        ];

        let stats = CatalogStats::from_rows(&rows);
        assert_eq!(stats.brands, 2);
        assert_eq!(stats.models, 3);
        assert_eq!(stats.records, 4);
        assert_eq!(stats.electric, 1);
    }

    #[test]
    fn test_stats_on_empty_catalog() {
        let stats = CatalogStats::from_rows(&[]);
        assert_eq!(stats.brands, 0);
        assert_eq!(stats.records, 0);
    }
}
