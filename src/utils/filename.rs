use crate::error::{ProcessingError, Result};
use std::path::{Path, PathBuf};

const YEAR_PLACEHOLDER: &str = "{year}";

/// Expand a raw file template such as `raw{year}.csv` for one year
pub fn raw_file_name(template: &str, year: i32) -> Result<String> {
    if !template.contains(YEAR_PLACEHOLDER) {
        return Err(ProcessingError::Config(format!(
            "Raw file template '{}' has no {} placeholder",
            template, YEAR_PLACEHOLDER
        )));
    }
    Ok(template.replace(YEAR_PLACEHOLDER, &year.to_string()))
}

/// Full path of the raw table for `year` under `data_dir`
pub fn raw_file_path(data_dir: &Path, template: &str, year: i32) -> Result<PathBuf> {
    Ok(data_dir.join(raw_file_name(template, year)?))
}
