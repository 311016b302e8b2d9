use polars::prelude::*;

use crate::error::Result;

/// Two-digit suffix carried by province-level region codes (`1100`, `3100`, ...).
pub const PROVINCE_SUFFIX: &str = "00";

/// Canonical string form of a region code.
///
/// Codes arrive as integers from CSV inference, as floats when a column held
/// nulls, or as strings from GeoJSON properties. Integral numeric renderings
/// collapse to their integer digits so both tables compare equal.
pub fn normalize_key(code: &str) -> String {
    let trimmed = code.trim();

    if let Some((whole, fraction)) = trimmed.split_once('.') {
        let integral = !whole.is_empty()
            && whole.chars().all(|c| c.is_ascii_digit())
            && fraction.chars().all(|c| c == '0');
        if integral {
            return whole.to_string();
        }
    }

    trimmed.to_string()
}

pub fn is_province_code(code: &str) -> bool {
    code.ends_with(PROVINCE_SUFFIX)
}

/// Returns `column` cast to strings and passed through [`normalize_key`].
///
/// The source frame is left untouched.
pub fn normalize_key_column(df: &DataFrame, column: &str) -> Result<Series> {
    let raw = df.column(column)?.cast(&DataType::String)?;
    let values = raw.str()?;

    let normalized: Vec<Option<String>> = values
        .into_iter()
        .map(|value| value.map(normalize_key))
        .collect();

    Ok(Series::new(
        column.into(),
        normalized
            .iter()
            .map(|opt| opt.as_deref())
            .collect::<Vec<Option<&str>>>(),
    ))
}
