use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_ROW_GROUP_SIZE,
    DEFAULT_SCHEMA_CUTOFF_YEAR, RAW_FILE_TEMPLATE, REGISTRY_FILE,
};
use crate::utils::filename::{raw_file_name, raw_file_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

/// Environment variables with this prefix override file settings,
/// e.g. `PM25_OUTPUT_DIR=out` or `PM25_YEARS=2015,2024`.
pub const ENV_PREFIX: &str = "PM25";

/// Pipeline settings: defaults, then an optional TOML file, then
/// `PM25_*` environment variables, then command-line overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Relative paths resolve against `data_dir`
    pub registry_file: PathBuf,

    /// Yearly file name pattern; `{year}` is substituted
    #[validate(length(min = 1))]
    pub raw_file_template: String,

    #[validate(length(min = 1))]
    pub years: Vec<i32>,

    /// Years after this one use the six-row metadata layout
    pub schema_cutoff_year: i32,

    /// Raw files were dumped with a label row and an index column
    pub raw_index_column: bool,

    pub use_mmap: bool,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    pub cities: Vec<String>,
    pub trend_years: Vec<i32>,

    pub write_parquet: bool,
    pub compression: String,

    #[validate(range(min = 1))]
    pub row_group_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            registry_file: PathBuf::from(REGISTRY_FILE),
            raw_file_template: RAW_FILE_TEMPLATE.to_string(),
            years: vec![2015, 2018, 2021, 2024],
            schema_cutoff_year: DEFAULT_SCHEMA_CUTOFF_YEAR,
            raw_index_column: true,
            use_mmap: false,
            max_workers: num_cpus::get(),
            cities: vec!["Warszawa".to_string(), "Katowice".to_string()],
            trend_years: vec![2015, 2024],
            write_parquet: false,
            compression: COMPRESSION_SNAPPY.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Layer an optional config file and the environment over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ProcessingError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("years")
                    .with_list_parse_key("cities")
                    .with_list_parse_key("trend_years"),
            )
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        debug!("loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Field constraints plus the checks that span several fields
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;

        raw_file_name(&self.raw_file_template, DEFAULT_SCHEMA_CUTOFF_YEAR)?;

        if let Some(year) = self
            .trend_years
            .iter()
            .find(|year| !self.years.contains(year))
        {
            return Err(ProcessingError::Config(format!(
                "trend year {} is not among the processed years {:?}",
                year, self.years
            )));
        }

        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        if self.registry_file.is_absolute() {
            self.registry_file.clone()
        } else {
            self.data_dir.join(&self.registry_file)
        }
    }

    /// (year, path) for every configured year, in ascending year order
    pub fn raw_paths(&self) -> Result<Vec<(i32, PathBuf)>> {
        let mut years = self.years.clone();
        years.sort_unstable();
        years.dedup();

        years
            .into_iter()
            .map(|year| Ok((year, raw_file_path(&self.data_dir, &self.raw_file_template, year)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.registry_path(), PathBuf::from("data/raw/Metadata.csv"));
    }

    #[test]
    fn test_load_from_toml_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "output_dir = \"out\"")?;
        writeln!(file, "years = [2015, 2024]")?;
        writeln!(file, "write_parquet = true")?;

        let config = PipelineConfig::load(Some(file.path()))?;

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.years, vec![2015, 2024]);
        assert!(config.write_parquet);
        // untouched fields keep their defaults
        assert_eq!(config.schema_cutoff_year, DEFAULT_SCHEMA_CUTOFF_YEAR);
        Ok(())
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = PipelineConfig::load(Some(Path::new("/nonexistent/pm25.toml")));
        assert!(matches!(result, Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_validation_failures() {
        let config = PipelineConfig {
            years: vec![],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate_all(),
            Err(ProcessingError::Validation(_))
        ));

        let config = PipelineConfig {
            raw_file_template: "raw.csv".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate_all(), Err(ProcessingError::Config(_))));

        let config = PipelineConfig {
            trend_years: vec![2016],
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate_all(), Err(ProcessingError::Config(_))));

        let config = PipelineConfig {
            row_group_size: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate_all(),
            Err(ProcessingError::Validation(_))
        ));
    }

    #[test]
    fn test_raw_paths_sorted_and_deduplicated() -> Result<()> {
        let config = PipelineConfig {
            data_dir: PathBuf::from("in"),
            years: vec![2024, 2015, 2024],
            ..PipelineConfig::default()
        };

        let paths = config.raw_paths()?;
        assert_eq!(
            paths,
            vec![
                (2015, PathBuf::from("in/raw2015.csv")),
                (2024, PathBuf::from("in/raw2024.csv")),
            ]
        );
        Ok(())
    }
}
