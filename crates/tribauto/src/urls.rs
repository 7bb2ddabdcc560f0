//! Catalog page URLs. Labels must already be sanitized by the
//! [`Brand`](crate::types::Brand)/[`Model`](crate::types::Model)
//! constructors; no further escaping happens here. A malformed label
//! simply 404s downstream, which the crawler treats as an empty page.

use crate::types::Mode;

/// Brand dropdown page, which doubles as the entry point of a crawl.
pub fn brands_page(base: &str, mode: Mode) -> String {
    match mode {
        Mode::New => format!("{}/prix/voitures-neuves", base),
        Mode::Used => format!("{}/cote-occasions/", base),
    }
}

/// Model dropdown page, filtered by brand id.
pub fn models_page(base: &str, mode: Mode, brand_id: &str) -> String {
    format!("{}?search[brand]={}", brands_page(base, mode), brand_id)
}

/// Trim-comparison page for a new-vehicle model.
pub fn trim_page_new(base: &str, brand: &str, model: &str) -> String {
    format!(
        "{}/caracteristiques-voitures-neuves/{}/modele/{}",
        base, brand, model
    )
}

/// Year-picker page for a used-vehicle model.
pub fn year_picker_page(base: &str, brand: &str, model: &str) -> String {
    format!("{}/cote-occasions/{}/modele/{}", base, brand, model)
}

/// Trim-comparison page for a used-vehicle model in one model year.
pub fn trim_page_used(base: &str, brand: &str, model: &str, year: i32) -> String {
    format!(
        "{}/caracteristiques-voitures-occasions/{}/modele/{}/{}",
        base, brand, model, year
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.latribuneauto.com";

    #[test]
    fn test_brands_page() {
        assert_eq!(
            brands_page(BASE, Mode::New),
            "https://www.latribuneauto.com/prix/voitures-neuves"
        );
        assert_eq!(
            brands_page(BASE, Mode::Used),
            "https://www.latribuneauto.com/cote-occasions/"
        );
    }

    #[test]
    fn test_models_page() {
        assert_eq!(
            models_page(BASE, Mode::New, "42"),
            "https://www.latribuneauto.com/prix/voitures-neuves?search[brand]=42"
        );
        assert_eq!(
            models_page(BASE, Mode::Used, "7"),
            "https://www.latribuneauto.com/cote-occasions/?search[brand]=7"
        );
    }

    #[test]
    fn test_trim_page_new() {
        assert_eq!(
            trim_page_new(BASE, "Alfa-Romeo", "Giulia"),
            "https://www.latribuneauto.com/caracteristiques-voitures-neuves/Alfa-Romeo/modele/Giulia"
        );
    }

    #[test]
    fn test_year_picker_page() {
        assert_eq!(
            year_picker_page(BASE, "Renault", "Clio"),
            "https://www.latribuneauto.com/cote-occasions/Renault/modele/Clio"
        );
    }

    #[test]
    fn test_trim_page_used() {
        assert_eq!(
            trim_page_used(BASE, "Renault", "Clio", 2024),
            "https://www.latribuneauto.com/caracteristiques-voitures-occasions/Renault/modele/Clio/2024"
        );
    }
}
