//! Best-effort price parsing.
//!
//! Prices arrive as text with thousands separators (`"12,50,000"`). Only the
//! commas are stripped; anything else that is not a number makes the parse
//! fail, and each caller picks its fallback through one of the helpers below.

/// Parse a price, `None` if the text is not a finite number once commas are removed.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Per-row policy: an unparseable price counts as `0`.
pub fn parse_or_zero(raw: &str) -> f64 {
    parse_price(raw).unwrap_or_else(|| {
        log::debug!("unparseable price {raw:?}, using 0");
        0.0
    })
}

/// All-or-nothing policy: every price must parse, otherwise `None`.
pub fn parse_all<'a, I>(raws: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    raws.into_iter().map(parse_price).collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values, averaging the middle pair for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
