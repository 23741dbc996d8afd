use crate::config::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pm25-processor")]
#[command(about = "GIOŚ hourly PM2.5 archive processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Only log warnings and errors")]
    pub quiet: bool,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean, align and aggregate the yearly tables, then write all outputs
    Process {
        #[command(flatten)]
        pipeline: PipelineArgs,

        #[arg(short, long, help = "Directory for the CSV outputs")]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Also write the combined dataset as Parquet")]
        parquet: bool,

        #[arg(short, long, help = "Parquet compression (snappy, gzip, lz4, zstd, none)")]
        compression: Option<String>,
    },

    /// Run the pipeline and print the integrity report without writing files
    Validate {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Recompute the aggregates from a saved combined dataset
    Analyze {
        #[arg(short, long, help = "Combined dataset (.csv or .parquet)")]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Station registry CSV, relative to the current directory"
        )]
        registry: Option<PathBuf>,

        #[arg(short, long, help = "Directory for the CSV outputs")]
        output_dir: Option<PathBuf>,

        #[arg(long, value_delimiter = ',', help = "Cities for the monthly/trend tables")]
        cities: Option<Vec<String>>,

        #[arg(long, value_delimiter = ',', help = "Years kept in the trend table")]
        trend_years: Option<Vec<i32>>,
    },

    /// Rebuild the trend table from a saved city monthly table
    Trend {
        #[arg(short, long, help = "City monthly means CSV (year, month, city, value)")]
        input: PathBuf,

        #[arg(short, long, help = "Directory for the trend CSV")]
        output_dir: Option<PathBuf>,

        #[arg(long, value_delimiter = ',', help = "Years kept in the trend table")]
        trend_years: Option<Vec<i32>>,
    },
}

/// Paths given on the command line are taken relative to the working
/// directory, unlike config-file paths which resolve against `data_dir`
pub fn from_current_dir(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|dir| dir.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Input options shared by `process` and `validate`
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    #[arg(short, long, help = "Directory holding the raw yearly tables")]
    pub data_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Station registry CSV, relative to the current directory"
    )]
    pub registry: Option<PathBuf>,

    #[arg(short, long, value_delimiter = ',', help = "Years to process, e.g. 2015,2024")]
    pub years: Option<Vec<i32>>,

    #[arg(long, help = "Raw file name pattern containing {year}")]
    pub template: Option<String>,

    #[arg(long, help = "Last year published in the short metadata layout")]
    pub cutoff_year: Option<i32>,

    #[arg(long, help = "Raw files have no pandas label row/index column")]
    pub no_index_column: bool,

    #[arg(long, help = "Memory-map raw files while reading")]
    pub mmap: bool,

    #[arg(long)]
    pub max_workers: Option<usize>,
}

impl PipelineArgs {
    /// Command-line values take precedence over file and environment
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(registry) = &self.registry {
            config.registry_file = from_current_dir(registry);
        }
        if let Some(years) = &self.years {
            config.years = years.clone();
        }
        if let Some(template) = &self.template {
            config.raw_file_template = template.clone();
        }
        if let Some(cutoff) = self.cutoff_year {
            config.schema_cutoff_year = cutoff;
        }
        if self.no_index_column {
            config.raw_index_column = false;
        }
        if self.mmap {
            config.use_mmap = true;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
    }
}
