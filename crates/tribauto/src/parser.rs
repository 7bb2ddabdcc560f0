use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use crate::types::{Brand, Model, TrimEntry};

/// Every trim group in a comparison table ends with this literal token,
/// the text rendering of a hidden rating column. It is the only record
/// delimiter the site offers.
const GROUP_SENTINEL: &str = "2";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Expected markup not found: {0}")]
    StructureNotFound(String),
    #[error("Missing required attribute: {0}")]
    MissingAttr(String),
    #[error("Failed to parse year: {0}")]
    InvalidYear(String),
}

/// Ordered non-empty stripped text nodes under an element.
fn stripped_strings<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.text().map(str::trim).filter(|t| !t.is_empty())
}

fn option_pairs(options: &[ElementRef]) -> Result<Vec<(String, String)>, ParseError> {
    // The first entry is a "choose a brand/model" placeholder and the
    // last is a trailing non-brand entry; both are discarded. That is a
    // quirk of this site's dropdowns, not a general rule.
    let Some(kept) = options.get(1..options.len().saturating_sub(1)) else {
        return Ok(Vec::new());
    };

    let mut pairs = Vec::with_capacity(kept.len());
    for option in kept {
        let id = option
            .value()
            .attr("value")
            .ok_or_else(|| ParseError::MissingAttr("option value".to_string()))?;
        let label = stripped_strings(*option).collect::<Vec<_>>().join(" ");
        pairs.push((id.to_string(), label));
    }
    Ok(pairs)
}

/// Brands offered by the brand dropdown page, in page order.
pub fn parse_brand_options(html: &str) -> Result<Vec<Brand>, ParseError> {
    let document = Html::parse_document(html);
    let option_sel = Selector::parse("option").unwrap();

    let options: Vec<ElementRef> = document.select(&option_sel).collect();
    if options.is_empty() {
        return Err(ParseError::StructureNotFound(
            "brand dropdown".to_string(),
        ));
    }

    Ok(option_pairs(&options)?
        .into_iter()
        .map(|(id, label)| Brand::new(id, &label))
        .collect())
}

/// Models of one brand, from the `search_model` dropdown.
pub fn parse_model_options(html: &str) -> Result<Vec<Model>, ParseError> {
    let document = Html::parse_document(html);
    let select_sel = Selector::parse("select#search_model").unwrap();

    let Some(select) = document.select(&select_sel).next() else {
        return Err(ParseError::StructureNotFound(
            "model dropdown (select#search_model)".to_string(),
        ));
    };

    let option_sel = Selector::parse("option").unwrap();
    let options: Vec<ElementRef> = select.select(&option_sel).collect();

    Ok(option_pairs(&options)?
        .into_iter()
        .map(|(id, label)| Model::new(id, &label))
        .collect())
}

/// Model years offered by a used-vehicle year-picker page. The first
/// stripped string under the picker is header text, not a year.
pub fn parse_year_list(html: &str) -> Result<Vec<i32>, ParseError> {
    let document = Html::parse_document(html);
    let picker_sel = Selector::parse("div#years-module").unwrap();

    let Some(picker) = document.select(&picker_sel).next() else {
        return Err(ParseError::StructureNotFound(
            "year picker (div#years-module)".to_string(),
        ));
    };

    stripped_strings(picker)
        .skip(1)
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| ParseError::InvalidYear(token.to_string()))
        })
        .collect()
}

/// Splits the flat token stream of a comparison table into per-trim
/// groups. A token equal to exactly [`GROUP_SENTINEL`] closes the
/// current group, whatever its length; the sentinel itself is not kept.
/// A trailing group whose sentinel never arrived is incomplete data and
/// is dropped.
fn group_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        if token == GROUP_SENTINEL {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(token.to_string());
        }
    }

    groups
}

/// Turns closed groups `[name, rest..]` into entries. A single
/// remaining value is a price when it carries the currency symbol and a
/// CO2 figure otherwise; two or more values are positional (price, then
/// CO2). Within one page a repeated trim name gets a `(<n>)` suffix,
/// with the counter shared across the page and bumped only on
/// collision.
fn entries_from_groups(groups: Vec<Vec<String>>) -> Vec<TrimEntry> {
    let mut entries = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut collisions = 0usize;

    for group in groups {
        let mut tokens = group.into_iter();
        let Some(mut name) = tokens.next() else {
            continue;
        };
        let rest: Vec<String> = tokens.collect();

        if seen.contains(&name) {
            name = format!("{}({})", name, collisions);
            collisions += 1;
        }
        seen.insert(name.clone());

        let (price, co2_emissions) = match rest.as_slice() {
            [] => (None, None),
            [value] => {
                if value.contains('€') {
                    (Some(value.clone()), None)
                } else {
                    (None, Some(value.clone()))
                }
            }
            [price, co2, ..] => (Some(price.clone()), Some(co2.clone())),
        };

        entries.push(TrimEntry {
            name,
            price,
            co2_emissions,
        });
    }

    entries
}

/// Parses a trim-comparison page into entries. When the page renders
/// more than one table body the first is a legend/summary table and the
/// real comparison data sits in the second; with none, the page has no
/// trims (a 404 renders this way too).
pub fn parse_trim_table(html: &str) -> Vec<TrimEntry> {
    let document = Html::parse_document(html);
    let tbody_sel = Selector::parse("tbody").unwrap();

    let bodies: Vec<ElementRef> = document.select(&tbody_sel).collect();
    let body = match bodies.len() {
        0 => return Vec::new(),
        1 => bodies[0],
        _ => bodies[1],
    };

    entries_from_groups(group_tokens(stripped_strings(body)))
}
