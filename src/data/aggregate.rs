use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::filter::{in_city, listings_in_city};
use super::model::{Listing, Priced, Table};
use super::price::{self, parse_or_zero};
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Result shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragePrice {
    pub city: String,
    /// `None` when no listing matches or any matching price fails to parse.
    pub average_price: Option<f64>,
}

/// Per-area price statistics: statistic → (area → value).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaSummary {
    pub max: BTreeMap<String, f64>,
    pub mean: BTreeMap<String, f64>,
    pub median: BTreeMap<String, f64>,
    pub min: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Distinct values
// ---------------------------------------------------------------------------

/// Distinct non-empty cities, ascending.
pub fn list_cities(table: &Table) -> Vec<String> {
    table
        .listings
        .iter()
        .filter(|l| !l.city.is_empty())
        .map(|l| l.city.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct areas of the listings in `city`, ascending.
pub fn list_areas(table: &Table, city: &str) -> Vec<String> {
    listings_in_city(table, city)
        .into_iter()
        .map(|l| l.area.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Number of listings in `city` per bedroom value.
pub fn bhk_distribution(table: &Table, city: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for listing in listings_in_city(table, city) {
        *counts.entry(listing.bhk.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of listings per city.
pub fn city_leaderboard(table: &Table) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for listing in &table.listings {
        *counts.entry(listing.city.clone()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Price statistics
// ---------------------------------------------------------------------------

/// Mean price of the listings in `city`.
///
/// All-or-nothing: a single unparseable price yields `None` for the whole city.
pub fn average_price(table: &Table, city: &str) -> AveragePrice {
    let listings = listings_in_city(table, city);
    let average = match price::parse_all(listings.iter().map(|l| l.price.as_str())) {
        Some(prices) => price::mean(&prices),
        None => {
            log::debug!("unparseable price among listings in {city:?}, no average");
            None
        }
    };
    AveragePrice {
        city: city.to_string(),
        average_price: average,
    }
}

/// Mean, median, min and max price per area of `city`.
///
/// Unparseable prices count as `0`; a statistic that does not come out finite
/// is reported as `0`.
pub fn area_summary(table: &Table, city: &str) -> AreaSummary {
    let mut by_area: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for listing in table.listings.iter().filter(|l| in_city(l, city)) {
        by_area
            .entry(listing.area.as_str())
            .or_default()
            .push(parse_or_zero(&listing.price));
    }

    let mut summary = AreaSummary::default();
    for (area, prices) in by_area {
        let or_zero = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        let min = prices.iter().copied().reduce(f64::min);
        let max = prices.iter().copied().reduce(f64::max);

        summary.mean.insert(area.to_string(), or_zero(price::mean(&prices)));
        summary.median.insert(area.to_string(), or_zero(price::median(&prices)));
        summary.min.insert(area.to_string(), or_zero(min));
        summary.max.insert(area.to_string(), or_zero(max));
    }
    summary
}

// ---------------------------------------------------------------------------
// Ordering and sampling
// ---------------------------------------------------------------------------

/// The `n` most expensive listings, highest first.
///
/// Unparseable prices count as `0`. Ties keep source order. A negative `n`
/// drops that many listings from the cheap end instead.
pub fn top_expensive(table: &Table, n: i64) -> Vec<Priced<'_>> {
    let mut priced: Vec<Priced<'_>> = table
        .listings
        .iter()
        .map(|listing| Priced {
            listing,
            price: parse_or_zero(&listing.price),
        })
        .collect();
    // Stable sort, so equal prices stay in source order.
    priced.sort_by(|a, b| b.price.total_cmp(&a.price));

    let keep = if n >= 0 {
        usize::try_from(n).unwrap_or(usize::MAX)
    } else {
        let drop = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
        priced.len().saturating_sub(drop)
    };
    priced.truncate(keep);
    priced
}

/// One listing chosen uniformly at random.
pub fn random_property<'a, R: Rng + ?Sized>(
    table: &'a Table,
    rng: &mut R,
) -> Result<&'a Listing, QueryError> {
    table
        .listings
        .choose(rng)
        .ok_or(QueryError::EmptyDataset)
}
