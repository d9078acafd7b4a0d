use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, bail};
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const LOCATION: &str = "Location";
pub const BEDROOMS: &str = "Bedrooms";
pub const PRICE: &str = "Price";
pub const DESCRIPTION: &str = "Description";

/// Name of the bedroom column once it has been normalised.
pub const BHK: &str = "BHK";
pub const CITY: &str = "city";
pub const AREA: &str = "area";

/// Placeholder for `city` / `area` when the location carries no text.
pub const UNKNOWN: &str = "Unknown";

/// Bedroom values that mean "not recorded".
pub const BHK_SENTINELS: [&str; 4] = ["N/A", "NA", "-", ""];

// ---------------------------------------------------------------------------
// CellValue – a single cell in a passthrough column
// ---------------------------------------------------------------------------

/// A loosely-typed cell as read from the source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Text form of the cell; `Null` becomes the empty string.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Replace a missing value with the empty string, leave anything else untouched.
    pub fn fill_missing(self) -> Self {
        match self {
            CellValue::Null => CellValue::String(String::new()),
            other => other,
        }
    }
}

/// One source row keyed by column name. Readers reject duplicate column names.
pub type RawRecord = BTreeMap<String, CellValue>;

/// Everything a format reader produces, before any derivation.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Column names in source order.
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

// ---------------------------------------------------------------------------
// Derived fields
// ---------------------------------------------------------------------------

/// Text after the last comma of `location`, trimmed.
pub fn extract_city(location: &str) -> String {
    if location.trim().is_empty() {
        return UNKNOWN.to_string();
    }
    location
        .rsplit(',')
        .next()
        .unwrap_or(location)
        .trim()
        .to_string()
}

/// Text before the first comma of `location`, trimmed.
pub fn extract_area(location: &str) -> String {
    if location.trim().is_empty() {
        return UNKNOWN.to_string();
    }
    location
        .split(',')
        .next()
        .unwrap_or(location)
        .trim()
        .to_string()
}

/// Normalise a bedroom count: sentinels collapse to `""`, anything else is trimmed.
pub fn clean_bhk(raw: &str) -> String {
    let trimmed = raw.trim();
    if BHK_SENTINELS.contains(&trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the table
// ---------------------------------------------------------------------------

/// A single property listing with both raw and derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub location: String,
    pub city: String,
    pub area: String,
    pub bhk: String,
    /// Raw price text, thousands separators included.
    pub price: String,
    /// `None` when the source has no `Description` column at all.
    pub description: Option<String>,
    /// Any other source columns, passed through unchanged.
    pub extra: BTreeMap<String, CellValue>,
}

impl Listing {
    /// Build a listing from a raw source row.
    ///
    /// `with_description` is a table-level fact: whether the source carries a
    /// `Description` column. Missing cells become empty strings.
    pub fn from_record(mut record: RawRecord, with_description: bool) -> Self {
        let mut take = |column: &str| {
            record
                .remove(column)
                .map(|v| v.to_text())
                .unwrap_or_default()
        };

        let location = take(LOCATION);
        let bhk = clean_bhk(&take(BEDROOMS));
        let price = take(PRICE);
        let description = with_description.then(|| take(DESCRIPTION));

        let extra = record
            .into_iter()
            .map(|(col, val)| (col, val.fill_missing()))
            .collect();

        Listing {
            city: extract_city(&location),
            area: extract_area(&location),
            location,
            bhk,
            price,
            description,
            extra,
        }
    }

    /// Flatten back to a column → value map, the shape sent to clients.
    pub fn to_record(&self) -> BTreeMap<String, CellValue> {
        let mut out = self.extra.clone();
        out.insert(LOCATION.to_string(), CellValue::String(self.location.clone()));
        out.insert(CITY.to_string(), CellValue::String(self.city.clone()));
        out.insert(AREA.to_string(), CellValue::String(self.area.clone()));
        out.insert(BHK.to_string(), CellValue::String(self.bhk.clone()));
        out.insert(PRICE.to_string(), CellValue::String(self.price.clone()));
        if let Some(desc) = &self.description {
            out.insert(DESCRIPTION.to_string(), CellValue::String(desc.clone()));
        }
        out
    }
}

impl Serialize for Listing {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// A listing paired with its best-effort numeric price.
///
/// Serialises like the listing itself, except `Price` is the number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priced<'a> {
    pub listing: &'a Listing,
    pub price: f64,
}

impl Serialize for Priced<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut record = self.listing.to_record();
        record.insert(PRICE.to_string(), CellValue::Float(self.price));
        record.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All listings of one request, in source order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column names after derivation (`Bedrooms` renamed, `city` / `area` appended).
    pub columns: Vec<String>,
    pub listings: Vec<Listing>,
}

impl Table {
    /// Derive the table from raw rows. Fails if a required column is absent.
    pub fn from_raw(raw: RawTable) -> Result<Self> {
        for required in [LOCATION, BEDROOMS, PRICE] {
            if !raw.columns.iter().any(|c| c == required) {
                bail!("dataset has no '{required}' column");
            }
        }
        let with_description = raw.columns.iter().any(|c| c == DESCRIPTION);

        let mut columns: Vec<String> = raw
            .columns
            .into_iter()
            .map(|c| if c == BEDROOMS { BHK.to_string() } else { c })
            .collect();
        columns.push(CITY.to_string());
        columns.push(AREA.to_string());

        let listings = raw
            .records
            .into_iter()
            .map(|rec| Listing::from_record(rec, with_description))
            .collect();

        Ok(Table { columns, listings })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
