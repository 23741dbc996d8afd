use crate::error::Result;
use crate::models::{
    CityMonthlyMean, CombinedDataset, ExceedanceCount, MonthlyMean, RegionalAverage,
    StationRegistry,
};
use crate::processors::aggregator::MeanAccumulator;
use crate::processors::Aggregator;
use crate::readers::columns::require_columns;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Columns a trend table must carry when loaded from disk
pub const TREND_COLUMNS: [&str; 4] = ["year", "month", "city", "value"];

/// Months present and mean concentration for one (city, year)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityYearStat {
    pub city: String,
    pub year: i32,
    pub months: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub years_present: Vec<i32>,
    pub cities_present: Vec<String>,
    pub city_years: Vec<CityYearStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSummary {
    pub years_present: Vec<i32>,
    pub n_cities: usize,
    pub city_years: Vec<CityYearStat>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Everything derived from one combined panel
#[derive(Debug, Clone)]
pub struct AnalysisOutputs {
    pub monthly: Vec<MonthlyMean>,
    pub exceedance: Vec<ExceedanceCount>,
    pub regional: Vec<RegionalAverage>,
    pub city_monthly: Vec<CityMonthlyMean>,
    pub trend: Vec<CityMonthlyMean>,
    pub heatmap: Vec<CityMonthlyMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub monthly_rows: usize,
    pub exceedance_rows: usize,
    pub regional_rows: usize,
    pub trend: TrendSummary,
    pub heatmap: HeatmapSummary,
}

impl AnalysisOutputs {
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            monthly_rows: self.monthly.len(),
            exceedance_rows: self.exceedance.len(),
            regional_rows: self.regional.len(),
            trend: trend_summary(&self.trend),
            heatmap: heatmap_summary(&self.heatmap),
        }
    }
}

impl AnalysisSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn report(&self) -> String {
        let range = match (self.heatmap.min_value, self.heatmap.max_value) {
            (Some(min), Some(max)) => format!("{:.1} to {:.1} µg/m³", min, max),
            _ => "No valid measurements".to_string(),
        };

        format!(
            "Monthly means: {} rows\n\
            Exceedance counts: {} rows\n\
            Regional averages: {} rows\n\
            Trend: {} cities over years {:?}\n\
            Heatmap: {} cities over years {:?}, monthly means {}",
            self.monthly_rows,
            self.exceedance_rows,
            self.regional_rows,
            self.trend.cities_present.len(),
            self.trend.years_present,
            self.heatmap.n_cities,
            self.heatmap.years_present,
            range
        )
    }
}

/// City-level views built on top of the station aggregates
pub struct Pm25Analyzer {
    aggregator: Aggregator,
    cities: Vec<String>,
    trend_years: Vec<i32>,
}

impl Pm25Analyzer {
    pub fn new(cities: Vec<String>, trend_years: Vec<i32>) -> Self {
        Self {
            aggregator: Aggregator::new(),
            cities,
            trend_years,
        }
    }

    /// Run every aggregate over the panel
    pub fn analyze(&self, dataset: &CombinedDataset, registry: &StationRegistry) -> AnalysisOutputs {
        let monthly = self.aggregator.monthly_means(dataset);
        let exceedance = self.aggregator.exceedance_from_dataset(dataset);
        let regional = self.aggregator.regional_averages(&exceedance, registry);
        let city_monthly = self.city_monthly_means(&monthly);
        let trend = self.trend(&city_monthly);
        let heatmap = self.heatmap(&monthly);

        info!(
            "aggregated {} monthly means, {} exceedance counts, {} regional averages",
            monthly.len(),
            exceedance.len(),
            regional.len()
        );

        AnalysisOutputs {
            monthly,
            exceedance,
            regional,
            city_monthly,
            trend,
            heatmap,
        }
    }

    /// Mean of station monthly means per (year, month, city), for the
    /// configured cities only
    pub fn city_monthly_means(&self, monthly: &[MonthlyMean]) -> Vec<CityMonthlyMean> {
        let wanted: BTreeSet<&str> = self.cities.iter().map(String::as_str).collect();
        let mut groups: BTreeMap<(i32, u32, &str), MeanAccumulator> = BTreeMap::new();

        for row in monthly.iter().filter(|row| wanted.contains(row.city.as_str())) {
            groups
                .entry((row.year, row.month, row.city.as_str()))
                .or_default()
                .push(row.value);
        }

        groups
            .into_iter()
            .filter_map(|((year, month, city), acc)| {
                acc.mean().map(|value| CityMonthlyMean {
                    year,
                    month,
                    city: city.to_string(),
                    value,
                })
            })
            .collect()
    }

    /// City monthly means of the trend years, ordered by (city, year, month)
    pub fn trend(&self, city_monthly: &[CityMonthlyMean]) -> Vec<CityMonthlyMean> {
        let mut trend: Vec<CityMonthlyMean> = city_monthly
            .iter()
            .filter(|row| self.trend_years.contains(&row.year))
            .cloned()
            .collect();

        trend.sort_by(|a, b| {
            (a.city.as_str(), a.year, a.month).cmp(&(b.city.as_str(), b.year, b.month))
        });
        trend
    }

    /// Load a persisted city-monthly table and build the trend from it
    pub fn trend_from_reader<R: Read>(&self, input: R) -> Result<Vec<CityMonthlyMean>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let names: Vec<&str> = headers.iter().collect();
        require_columns("trend input", names.iter().copied(), &TREND_COLUMNS)?;

        let rows = reader
            .deserialize::<CityMonthlyMean>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(self.trend(&rows))
    }

    pub fn trend_from_file(&self, path: &Path) -> Result<Vec<CityMonthlyMean>> {
        self.trend_from_reader(File::open(path)?)
    }

    /// Mean over stations per (city, year, month), for every city
    pub fn heatmap(&self, monthly: &[MonthlyMean]) -> Vec<CityMonthlyMean> {
        let mut groups: BTreeMap<(&str, i32, u32), MeanAccumulator> = BTreeMap::new();

        for row in monthly {
            groups
                .entry((row.city.as_str(), row.year, row.month))
                .or_default()
                .push(row.value);
        }

        groups
            .into_iter()
            .filter_map(|((city, year, month), acc)| {
                acc.mean().map(|value| CityMonthlyMean {
                    year,
                    month,
                    city: city.to_string(),
                    value,
                })
            })
            .collect()
    }
}

fn city_year_stats(rows: &[CityMonthlyMean]) -> Vec<CityYearStat> {
    let mut groups: BTreeMap<(&str, i32), (BTreeSet<u32>, MeanAccumulator)> = BTreeMap::new();

    for row in rows {
        let (months, acc) = groups.entry((row.city.as_str(), row.year)).or_default();
        months.insert(row.month);
        acc.push(row.value);
    }

    groups
        .into_iter()
        .filter_map(|((city, year), (months, acc))| {
            acc.mean().map(|mean| CityYearStat {
                city: city.to_string(),
                year,
                months: months.len(),
                mean,
            })
        })
        .collect()
}

fn years_present(rows: &[CityMonthlyMean]) -> Vec<i32> {
    rows.iter()
        .map(|row| row.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn trend_summary(trend: &[CityMonthlyMean]) -> TrendSummary {
    TrendSummary {
        years_present: years_present(trend),
        cities_present: trend
            .iter()
            .map(|row| row.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        city_years: city_year_stats(trend),
    }
}

pub fn heatmap_summary(heatmap: &[CityMonthlyMean]) -> HeatmapSummary {
    let values = heatmap.iter().map(|row| row.value);

    HeatmapSummary {
        years_present: years_present(heatmap),
        n_cities: heatmap
            .iter()
            .map(|row| row.city.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        city_years: city_year_stats(heatmap),
        min_value: values.clone().reduce(f64::min),
        max_value: values.reduce(f64::max),
    }
}

impl Default for Pm25Analyzer {
    fn default() -> Self {
        Self::new(
            vec!["Warszawa".to_string(), "Katowice".to_string()],
            vec![2015, 2024],
        )
    }
}
