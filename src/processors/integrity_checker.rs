use crate::models::{CombinedDataset, CombinedRecord, ExceedanceCount, YearTable};
use crate::processors::AlignmentStats;
use crate::utils::constants::{MAX_PLAUSIBLE_PM25, MIN_VALID_PM25};
use chrono::NaiveDate;
use serde::Serialize;

/// Per-year counts taken before the cross-year alignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub records: usize,
    pub stations: usize,
    pub cities: usize,
    pub missing_values: usize,
}

impl YearSummary {
    pub fn from_table(table: &YearTable) -> Self {
        Self {
            year: table.year,
            records: table.records.len(),
            stations: table.stations().len(),
            cities: table.cities().len(),
            missing_values: table.missing_values(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViolationType {
    Negative,
    Implausible,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValueViolation {
    pub station: String,
    pub date: NaiveDate,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub panel_stations: usize,
    pub years: Vec<YearSummary>,
    pub excluded_station_records: usize,
    pub incomplete_records: usize,
    pub negative_values: usize,
    pub implausible_values: usize,
    pub violations: Vec<ValueViolation>,
    pub max_exceedance: Option<ExceedanceCount>,
}

pub struct IntegrityChecker {
    max_plausible: f64,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_plausible: MAX_PLAUSIBLE_PM25,
        }
    }

    /// Sanity checks over the combined panel; reports, never fails
    pub fn check_integrity(
        &self,
        dataset: &CombinedDataset,
        years: Vec<YearSummary>,
        alignment: &AlignmentStats,
        exceedance: &[ExceedanceCount],
    ) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_records: dataset.len(),
            panel_stations: dataset.stations.len(),
            years,
            excluded_station_records: alignment.excluded_station_records,
            incomplete_records: alignment.incomplete_records,
            negative_values: 0,
            implausible_values: 0,
            violations: Vec::new(),
            max_exceedance: exceedance.iter().max_by_key(|c| c.exceeded).cloned(),
        };

        for record in &dataset.records {
            self.check_record(record, &mut report);
        }

        report
    }

    fn check_record(&self, record: &CombinedRecord, report: &mut IntegrityReport) {
        if record.value < MIN_VALID_PM25 {
            report.negative_values += 1;
            report.violations.push(ValueViolation {
                station: record.station.clone(),
                date: record.date,
                violation_type: ViolationType::Negative,
                details: format!("negative concentration {}", record.value),
            });
        } else if record.value > self.max_plausible {
            report.implausible_values += 1;
            report.violations.push(ValueViolation {
                station: record.station.clone(),
                date: record.date,
                violation_type: ViolationType::Implausible,
                details: format!(
                    "concentration {} above plausible maximum {}",
                    record.value, self.max_plausible
                ),
            });
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Integrity Check Report ===\n");
        for year in &report.years {
            summary.push_str(&format!(
                "Year {}: {} records, {} stations, {} cities, {} missing values\n",
                year.year, year.records, year.stations, year.cities, year.missing_values
            ));
        }
        summary.push_str(&format!(
            "Panel: {} stations common to all years\n",
            report.panel_stations
        ));
        summary.push_str(&format!("Combined Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Excluded (station not in every year): {}\n",
            report.excluded_station_records
        ));
        summary.push_str(&format!(
            "Dropped (missing timestamp or value): {}\n",
            report.incomplete_records
        ));
        summary.push_str(&format!("Negative Values: {}\n", report.negative_values));
        summary.push_str(&format!(
            "Implausible Values: {}\n",
            report.implausible_values
        ));

        if let Some(max) = &report.max_exceedance {
            summary.push_str(&format!(
                "Most Exceedance Days: {} ({}) in {}: {}\n",
                max.station, max.city, max.year, max.exceeded
            ));
        }

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Station {} on {}: {}\n",
                    i + 1,
                    violation.station,
                    violation.date,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: f64) -> CombinedRecord {
        CombinedRecord::new(
            "ST01",
            Some("Warszawa".into()),
            value,
            2024,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    #[test]
    fn test_negative_and_implausible_values_counted() {
        let dataset =
            CombinedDataset::from_records(vec![record(-1.0), record(12.0), record(1500.0)]);
        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&dataset, vec![], &AlignmentStats::default(), &[]);

        assert_eq!(report.total_records, 3);
        assert_eq!(report.negative_values, 1);
        assert_eq!(report.implausible_values, 1);
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.violations[0].violation_type, ViolationType::Negative);
    }

    #[test]
    fn test_max_exceedance_and_summary() {
        let dataset = CombinedDataset::from_records(vec![record(20.0)]);
        let counts = vec![
            ExceedanceCount {
                year: 2024,
                station: "ST01".into(),
                city: "Warszawa".into(),
                exceeded: 3,
            },
            ExceedanceCount {
                year: 2024,
                station: "ST02".into(),
                city: "Katowice".into(),
                exceeded: 41,
            },
        ];
        let years = vec![YearSummary {
            year: 2024,
            records: 2,
            stations: 1,
            cities: 1,
            missing_values: 1,
        }];

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&dataset, years, &AlignmentStats::default(), &counts);

        assert_eq!(report.max_exceedance.as_ref().unwrap().station, "ST02");
        let summary = checker.generate_summary(&report);
        assert!(summary.contains("Year 2024: 2 records"));
        assert!(summary.contains("Most Exceedance Days: ST02 (Katowice) in 2024: 41"));
    }
}
