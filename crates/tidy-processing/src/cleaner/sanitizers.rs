//! Text standardization for string columns.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Trim surrounding whitespace and lowercase a value.
pub fn normalize_text(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Trim and lowercase every value of the named string columns.
///
/// Missing cells stay missing. Columns without any value are left as they
/// are. Returns the names of the columns that were rewritten.
pub fn standardize_text_columns(
    mut df: DataFrame,
    columns: &[String],
) -> Result<(DataFrame, Vec<String>)> {
    let mut normalized = Vec::new();

    for col_name in columns {
        let series = df.column(col_name)?.as_materialized_series();
        if series.null_count() == series.len() {
            continue;
        }

        let as_text = series.cast(&DataType::String)?;
        let cleaned_values: Vec<Option<String>> = as_text
            .str()?
            .into_iter()
            .map(|opt_val| opt_val.map(normalize_text))
            .collect();

        let cleaned_series = Series::new(col_name.as_str().into(), cleaned_values);
        df.replace(col_name, cleaned_series)?;
        normalized.push(col_name.clone());
        debug!("Standardized text column '{}'", col_name);
    }

    Ok((df, normalized))
}
