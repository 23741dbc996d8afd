use crate::analyzers::{trend_summary, AnalysisOutputs, Pm25Analyzer};
use crate::cli::args::{from_current_dir, Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{CombinedDataset, StationRegistry};
use crate::processors::{
    Aggregator, IntegrityChecker, IntegrityReport, ParallelProcessor, PipelineOutput, TracingSink,
    YearSource,
};
use crate::readers::{CombinedReader, RawTableReader, RegistryReader};
use crate::utils::constants::{COMBINED_PARQUET_FILE, TREND_FILE};
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ParquetWriter};
use std::path::Path;
use tracing::{debug, info, warn};

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet);

    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            pipeline,
            output_dir,
            parquet,
            compression,
        } => {
            pipeline.apply(&mut config);
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if parquet {
                config.write_parquet = true;
            }
            if let Some(compression) = compression {
                config.compression = compression;
            }
            config.validate_all()?;

            process(&config, cli.quiet)
        }

        Commands::Validate { pipeline } => {
            pipeline.apply(&mut config);
            config.validate_all()?;

            validate(&config, cli.quiet)
        }

        Commands::Analyze {
            input,
            registry,
            output_dir,
            cities,
            trend_years,
        } => {
            if let Some(registry) = registry {
                config.registry_file = from_current_dir(&registry);
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(cities) = cities {
                config.cities = cities;
            }
            if let Some(years) = trend_years {
                config.trend_years = years;
            }

            analyze(&config, &input, cli.quiet)
        }

        Commands::Trend {
            input,
            output_dir,
            trend_years,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(years) = trend_years {
                config.trend_years = years;
            }

            trend(&config, &input, cli.quiet)
        }
    }
}

/// Read the registry and every yearly table, then align the years
pub fn run_pipeline(
    config: &PipelineConfig,
    quiet: bool,
) -> Result<(StationRegistry, PipelineOutput)> {
    let registry = RegistryReader::new().read_registry(&config.registry_path())?;

    let mut sources = Vec::new();
    for (year, path) in config.raw_paths()? {
        if !path.exists() {
            return Err(ProcessingError::MissingData(format!(
                "raw table for {} not found at {}",
                year,
                path.display()
            )));
        }
        sources.push(YearSource::File { year, path });
    }

    let reader = RawTableReader::new()
        .with_pandas_index(config.raw_index_column)
        .with_mmap(config.use_mmap);
    let processor = ParallelProcessor::new(config.max_workers)
        .with_cutoff_year(config.schema_cutoff_year)
        .with_reader(reader);

    let progress = ProgressReporter::for_years(sources.len(), quiet);
    let output = processor.process_all(&sources, &registry, &TracingSink, Some(&progress))?;
    progress.finish_with_message(&format!(
        "Aligned {} years: {} records from {} stations",
        output.years.len(),
        output.dataset.len(),
        output.dataset.stations.len()
    ));

    Ok((registry, output))
}

fn integrity_report(output: &PipelineOutput, outputs: &AnalysisOutputs) -> IntegrityReport {
    IntegrityChecker::new().check_integrity(
        &output.dataset,
        output.years.clone(),
        &output.alignment,
        &outputs.exceedance,
    )
}

fn process(config: &PipelineConfig, quiet: bool) -> Result<()> {
    let (registry, output) = run_pipeline(config, quiet)?;

    let analyzer = Pm25Analyzer::new(config.cities.clone(), config.trend_years.clone());
    let outputs = analyzer.analyze(&output.dataset, &registry);

    let checker = IntegrityChecker::new();
    let report = integrity_report(&output, &outputs);
    println!("\n{}", checker.generate_summary(&report));

    let writer = CsvWriter::new(&config.output_dir);
    writer.write_combined(&output.dataset)?;
    let written = writer.write_outputs(&outputs)?;
    let summary = outputs.summary();
    writer.write_summary(&summary)?;

    if config.write_parquet {
        write_parquet(config, &output.dataset)?;
    }

    println!("{}", summary.report());
    info!(
        "wrote {} aggregate tables to {}",
        written.len(),
        config.output_dir.display()
    );
    println!("Processing complete!");
    Ok(())
}

fn write_parquet(config: &PipelineConfig, dataset: &CombinedDataset) -> Result<()> {
    let path = config.output_dir.join(COMBINED_PARQUET_FILE);
    let writer = ParquetWriter::new()
        .with_compression(&config.compression)?
        .with_row_group_size(config.row_group_size);

    if dataset.is_empty() {
        warn!("combined dataset is empty, no Parquet file written");
        return Ok(());
    }

    writer.write_records(&dataset.records, &path)?;
    let file_info = writer.get_file_info(&path)?;
    println!("\n{}", file_info.summary());
    Ok(())
}

fn validate(config: &PipelineConfig, quiet: bool) -> Result<()> {
    let (registry, output) = run_pipeline(config, quiet)?;

    let aggregator = Aggregator::new();
    let exceedance = aggregator.exceedance_from_dataset(&output.dataset);
    debug!(
        "{} regional averages computed",
        aggregator.regional_averages(&exceedance, &registry).len()
    );

    let checker = IntegrityChecker::new();
    let report = checker.check_integrity(
        &output.dataset,
        output.years.clone(),
        &output.alignment,
        &exceedance,
    );
    println!("\n{}", checker.generate_summary(&report));

    if report.violations.is_empty() {
        println!("✅ All data passed validation checks");
    } else {
        println!("⚠️  Found {} validation issues", report.violations.len());
    }
    println!("Validation complete - no output files written");
    Ok(())
}

fn analyze(config: &PipelineConfig, input: &Path, quiet: bool) -> Result<()> {
    let registry = RegistryReader::new().read_registry(&config.registry_path())?;

    let spinner =
        ProgressReporter::new_spinner(&format!("Loading {}", input.display()), quiet);
    let dataset = load_combined(input)?;
    spinner.finish_with_message(&format!("Loaded {} records", dataset.len()));

    if dataset.is_empty() {
        return Err(ProcessingError::MissingData(format!(
            "no records in {}",
            input.display()
        )));
    }

    let analyzer = Pm25Analyzer::new(config.cities.clone(), config.trend_years.clone());
    let outputs = analyzer.analyze(&dataset, &registry);

    let writer = CsvWriter::new(&config.output_dir);
    writer.write_outputs(&outputs)?;
    let summary = outputs.summary();
    writer.write_summary(&summary)?;

    println!("{}", summary.report());
    Ok(())
}

fn trend(config: &PipelineConfig, input: &Path, quiet: bool) -> Result<()> {
    let spinner =
        ProgressReporter::new_spinner(&format!("Loading {}", input.display()), quiet);
    let analyzer = Pm25Analyzer::new(config.cities.clone(), config.trend_years.clone());
    let trend = analyzer.trend_from_file(input)?;
    spinner.finish_with_message(&format!("Selected {} trend rows", trend.len()));

    if trend.is_empty() {
        warn!(
            "no rows of {} fall in the trend years {:?}",
            input.display(),
            config.trend_years
        );
    }

    let path = CsvWriter::new(&config.output_dir).write_records(TREND_FILE, &trend)?;
    let summary = trend_summary(&trend);
    println!(
        "Trend: {} cities over years {:?} written to {}",
        summary.cities_present.len(),
        summary.years_present,
        path.display()
    );
    Ok(())
}

/// Combined dataset from CSV, or from Parquet when the extension says so
pub fn load_combined(path: &Path) -> Result<CombinedDataset> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        let records = ParquetWriter::new().read_records(path, 0)?;
        Ok(CombinedDataset::from_records(records))
    } else {
        CombinedReader::new().read_dataset(path)
    }
}

/// Set up structured logging on stderr; `RUST_LOG` overrides the flags
fn setup_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pm25_processor={}", log_level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}
