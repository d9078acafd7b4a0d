use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const COLUMNS: [&str; 5] = ["Location", "Bedrooms", "Price", "Description", "Furnishing"];

const CITIES: [(&str, &[&str]); 4] = [
    ("Gurgaon", &["Sector 5", "DLF Phase 2", "Sohna Road", "Golf Course Road"]),
    ("Mumbai", &["Andheri", "Bandra", "Powai", "Thane West"]),
    ("Pune", &["Baner", "Wakad", "Hinjewadi"]),
    ("Bangalore", &["Whitefield", "Koramangala", "HSR Layout"]),
];

const BEDROOMS: [&str; 7] = ["1", "2", "3", "4", "2BHK", "N/A", ""];
const FURNISHING: [&str; 4] = ["Furnished", "Semi-Furnished", "Unfurnished", ""];
const FEATURES: [&str; 6] = [
    "park view",
    "close to metro",
    "gated community",
    "corner unit",
    "modular kitchen",
    "covered parking",
];

/// One generated listing, every field as text.
struct Row([String; 5]);

/// Indian digit grouping: 12500000 → "1,25,00,000".
fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (a, b) = rest.split_at(rest.len() - 2);
        groups.push(b);
        rest = a;
    }
    groups.push(rest);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

fn generate_rows(count: usize, rng: &mut StdRng) -> Vec<Row> {
    (0..count)
        .map(|_| {
            let (city, areas) = CITIES[rng.gen_range(0..CITIES.len())];
            let area = areas.choose(rng).copied().unwrap_or(city);
            let location = if rng.gen_bool(0.03) {
                String::new()
            } else {
                format!("{area}, {city}")
            };

            let price = if rng.gen_bool(0.05) {
                "Price on Request".to_string()
            } else {
                format_inr(rng.gen_range(25..=400) * 100_000)
            };

            let features: Vec<&str> = FEATURES.choose_multiple(rng, 2).copied().collect();
            let description = format!("Spacious home in {area} with {}", features.join(" and "));

            Row([
                location,
                BEDROOMS.choose(rng).copied().unwrap_or("").to_string(),
                price,
                description,
                FURNISHING.choose(rng).copied().unwrap_or("").to_string(),
            ])
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(&row.0)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let arrays = (0..COLUMNS.len())
        .map(|col| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|r| Some(r.0[col].as_str()).filter(|s| !s.is_empty()))
                .collect();
            Arc::new(StringArray::from(values)) as arrow::array::ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_listings.csv"));

    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate_rows(500, &mut rng);

    let is_parquet = output_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&output_path, &rows)?;
    } else {
        write_csv(&output_path, &rows)?;
    }

    println!("Wrote {} listings to {}", rows.len(), output_path.display());
    Ok(())
}
