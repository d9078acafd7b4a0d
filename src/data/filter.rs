use super::model::{DESCRIPTION, Listing, Priced, Table};
use super::price::parse_or_zero;
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// Case-insensitive equality between a listing's city and `city`.
pub fn in_city(listing: &Listing, city: &str) -> bool {
    listing.city.to_lowercase() == city.to_lowercase()
}

/// Listings whose city equals `city`, ignoring case.
pub fn listings_in_city<'a>(table: &'a Table, city: &str) -> Vec<&'a Listing> {
    table
        .listings
        .iter()
        .filter(|l| in_city(l, city))
        .collect()
}

/// Every listing, in source order.
pub fn all(table: &Table) -> Vec<&Listing> {
    table.listings.iter().collect()
}

/// Listings whose city contains `term`, ignoring case.
///
/// An empty term matches every listing.
pub fn filter_by_city_term<'a>(table: &'a Table, term: &str) -> Vec<&'a Listing> {
    let term = term.to_lowercase();
    table
        .listings
        .iter()
        .filter(|l| l.city.to_lowercase().contains(&term))
        .collect()
}

/// Listings whose price lies within `[min, max]`.
///
/// Unparseable prices count as `0`, so they pass whenever `min <= 0`.
pub fn price_range(table: &Table, min: f64, max: f64) -> Vec<Priced<'_>> {
    table
        .listings
        .iter()
        .map(|listing| Priced {
            listing,
            price: parse_or_zero(&listing.price),
        })
        .filter(|p| min <= p.price && p.price <= max)
        .collect()
}

/// Listings whose description contains `keyword`, ignoring case.
pub fn search_description<'a>(
    table: &'a Table,
    keyword: &str,
) -> Result<Vec<&'a Listing>, QueryError> {
    if !table.has_column(DESCRIPTION) {
        return Err(QueryError::MissingColumn(DESCRIPTION));
    }
    let keyword = keyword.to_lowercase();
    Ok(table
        .listings
        .iter()
        .filter(|l| {
            l.description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&keyword))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{BEDROOMS, CellValue, LOCATION, PRICE, RawTable};

    fn table(rows: &[(&str, &str, &str)], descriptions: Option<&[&str]>) -> Table {
        let mut columns = vec![LOCATION.to_string(), BEDROOMS.to_string(), PRICE.to_string()];
        if descriptions.is_some() {
            columns.push(DESCRIPTION.to_string());
        }
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, (loc, bhk, price))| {
                let mut rec = std::collections::BTreeMap::new();
                rec.insert(LOCATION.to_string(), CellValue::String(loc.to_string()));
                rec.insert(BEDROOMS.to_string(), CellValue::String(bhk.to_string()));
                rec.insert(PRICE.to_string(), CellValue::String(price.to_string()));
                if let Some(descs) = descriptions {
                    rec.insert(DESCRIPTION.to_string(), CellValue::String(descs[i].to_string()));
                }
                rec
            })
            .collect();
        Table::from_raw(RawTable { columns, records }).unwrap()
    }

    fn sample() -> Table {
        table(
            &[
                ("Sector 5, Gurgaon", "3", "50,00,000"),
                ("Andheri, Mumbai", "2BHK", "1,20,00,000"),
                ("Bandra, Mumbai", "1", "on request"),
                ("DLF Phase 2, Gurgaon", "4", "2,00,00,000"),
            ],
            None,
        )
    }

    #[test]
    fn empty_term_matches_everything() {
        let t = sample();
        assert_eq!(filter_by_city_term(&t, "").len(), t.len());
    }

    #[test]
    fn term_matches_city_substring_ignoring_case() {
        let t = sample();
        let hits = filter_by_city_term(&t, "MUM");
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|l| l.city == "Mumbai"));
        assert!(filter_by_city_term(&t, "Chennai").is_empty());
    }

    #[test]
    fn term_is_not_a_pattern() {
        let t = sample();
        assert!(filter_by_city_term(&t, "M.mbai").is_empty());
    }

    #[test]
    fn city_equality_ignores_case() {
        let t = sample();
        assert_eq!(listings_in_city(&t, "gurgaon").len(), 2);
        assert!(listings_in_city(&t, "gurg").is_empty());
    }

    #[test]
    fn default_price_range_keeps_unparseable_rows_at_zero() {
        let t = sample();
        let hits = price_range(&t, 0.0, 1e9);
        assert_eq!(hits.len(), 4);
        let bandra = hits.iter().find(|p| p.listing.area == "Bandra").unwrap();
        assert_eq!(bandra.price, 0.0);
    }

    #[test]
    fn non_finite_prices_are_kept_at_zero() {
        let t = table(
            &[("A, X", "1", "50,00,000"), ("B, X", "1", "nan"), ("C, X", "1", "inf")],
            None,
        );
        let hits = price_range(&t, 0.0, 1e9);
        assert_eq!(hits.len(), 3);
        assert!(hits[1..].iter().all(|p| p.price == 0.0));
    }

    #[test]
    fn price_range_is_inclusive() {
        let t = sample();
        let hits = price_range(&t, 5_000_000.0, 12_000_000.0);
        let areas: Vec<_> = hits.iter().map(|p| p.listing.area.as_str()).collect();
        assert_eq!(areas, vec!["Sector 5", "Andheri"]);
    }

    #[test]
    fn search_description_requires_the_column() {
        let t = sample();
        let err = search_description(&t, "view").unwrap_err();
        assert_eq!(err.to_string(), "No Description column in dataset");
    }

    #[test]
    fn search_description_ignores_case() {
        let t = table(
            &[("A, X", "1", "1"), ("B, X", "2", "2"), ("C, X", "3", "3")],
            Some(&["Sea VIEW flat", "", "garden view"]),
        );
        let hits = search_description(&t, "View").unwrap();
        let areas: Vec<_> = hits.iter().map(|l| l.area.as_str()).collect();
        assert_eq!(areas, vec!["A", "C"]);
    }
}
