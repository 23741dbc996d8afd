use crate::models::{
    CombinedDataset, DailyMean, ExceedanceCount, MonthlyMean, RegionalAverage, StationRegistry,
};
use crate::utils::constants::EXCEEDANCE_THRESHOLD;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Running arithmetic mean
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Derived views over the combined panel. Every grouping key that
/// contains a city skips records whose city is unknown.
pub struct Aggregator {
    threshold: f64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            threshold: EXCEEDANCE_THRESHOLD,
        }
    }

    /// Mean per (year, month, station, city)
    pub fn monthly_means(&self, dataset: &CombinedDataset) -> Vec<MonthlyMean> {
        let mut groups: BTreeMap<(i32, u32, &str, &str), MeanAccumulator> = BTreeMap::new();

        for record in &dataset.records {
            if let Some(city) = record.city.as_deref() {
                groups
                    .entry((record.year, record.month, record.station.as_str(), city))
                    .or_default()
                    .push(record.value);
            }
        }

        groups
            .into_iter()
            .filter_map(|((year, month, station, city), acc)| {
                acc.mean().map(|value| MonthlyMean {
                    year,
                    month,
                    station: station.to_string(),
                    city: city.to_string(),
                    value,
                })
            })
            .collect()
    }

    /// Mean per (year, station, city, date) with the exceedance flag
    pub fn daily_means(&self, dataset: &CombinedDataset) -> Vec<DailyMean> {
        let mut groups: BTreeMap<(i32, &str, &str, NaiveDate), MeanAccumulator> =
            BTreeMap::new();

        for record in &dataset.records {
            if let Some(city) = record.city.as_deref() {
                groups
                    .entry((record.year, record.station.as_str(), city, record.date))
                    .or_default()
                    .push(record.value);
            }
        }

        groups
            .into_iter()
            .filter_map(|((year, station, city, date), acc)| {
                acc.mean().map(|value| DailyMean {
                    year,
                    station: station.to_string(),
                    city: city.to_string(),
                    date,
                    value,
                    exceeded: value > self.threshold,
                })
            })
            .collect()
    }

    /// Number of exceedance days per (year, station, city)
    pub fn exceedance_counts(&self, daily: &[DailyMean]) -> Vec<ExceedanceCount> {
        let mut groups: BTreeMap<(i32, &str, &str), u32> = BTreeMap::new();

        for day in daily {
            *groups
                .entry((day.year, day.station.as_str(), day.city.as_str()))
                .or_default() += u32::from(day.exceeded);
        }

        groups
            .into_iter()
            .map(|((year, station, city), exceeded)| ExceedanceCount {
                year,
                station: station.to_string(),
                city: city.to_string(),
                exceeded,
            })
            .collect()
    }

    /// Daily means followed by exceedance counts
    pub fn exceedance_from_dataset(&self, dataset: &CombinedDataset) -> Vec<ExceedanceCount> {
        self.exceedance_counts(&self.daily_means(dataset))
    }

    /// Unweighted mean of exceedance-day counts per (region, year).
    ///
    /// Stations without a registry region are left out of the join.
    pub fn regional_averages(
        &self,
        counts: &[ExceedanceCount],
        registry: &StationRegistry,
    ) -> Vec<RegionalAverage> {
        let mut groups: BTreeMap<(&str, i32), MeanAccumulator> = BTreeMap::new();

        for count in counts {
            if let Some(region) = registry.region_of(&count.station) {
                groups
                    .entry((region, count.year))
                    .or_default()
                    .push(f64::from(count.exceeded));
            }
        }

        groups
            .into_iter()
            .filter_map(|((region, year), acc)| {
                acc.mean().map(|avg_exceeded_days| RegionalAverage {
                    region: region.to_string(),
                    year,
                    avg_exceeded_days,
                })
            })
            .collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CombinedRecord, RegistryEntry};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(station: &str, city: Option<&str>, value: f64, date: NaiveDate) -> CombinedRecord {
        CombinedRecord::new(station, city.map(String::from), value, 2024, date)
    }

    fn registry() -> StationRegistry {
        StationRegistry::from_entries(vec![
            RegistryEntry::new("S1", None, "Warszawa", "Mazowieckie"),
            RegistryEntry::new("S2", None, "Radom", "Mazowieckie"),
            RegistryEntry::new("S3", None, "Katowice", "Śląskie"),
        ])
        .unwrap()
    }

    #[test]
    fn test_monthly_mean_groups_by_station_and_month() {
        let dataset = CombinedDataset::from_records(vec![
            record("S1", Some("Warszawa"), 10.0, day(2024, 1, 1)),
            record("S1", Some("Warszawa"), 20.0, day(2024, 1, 15)),
            record("S1", Some("Warszawa"), 40.0, day(2024, 2, 1)),
            record("S2", Some("Radom"), 5.0, day(2024, 1, 3)),
            record("S9", None, 99.0, day(2024, 1, 3)),
        ]);

        let monthly = Aggregator::new().monthly_means(&dataset);

        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[0].station, "S1");
        assert_eq!(monthly[0].month, 1);
        assert_eq!(monthly[0].value, 15.0);
        assert_eq!(monthly[1].station, "S2");
        assert_eq!(monthly[2].month, 2);
        assert_eq!(monthly[2].value, 40.0);
    }

    #[test]
    fn test_daily_exceedance_is_strictly_above_threshold() {
        let dataset = CombinedDataset::from_records(vec![
            record("S1", Some("Warszawa"), 10.0, day(2024, 1, 1)),
            record("S1", Some("Warszawa"), 20.0, day(2024, 1, 1)),
            record("S1", Some("Warszawa"), 16.0, day(2024, 1, 2)),
            record("S1", Some("Warszawa"), 14.0, day(2024, 1, 2)),
            record("S1", Some("Warszawa"), 30.0, day(2024, 1, 3)),
        ]);

        let aggregator = Aggregator::new();
        let daily = aggregator.daily_means(&dataset);

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].value, 15.0);
        assert!(!daily[0].exceeded);
        assert!(!daily[1].exceeded);
        assert!(daily[2].exceeded);

        let counts = aggregator.exceedance_counts(&daily);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].exceeded, 1);
    }

    #[test]
    fn test_regional_average_is_plain_mean() {
        let counts = vec![
            ExceedanceCount {
                year: 2024,
                station: "S1".into(),
                city: "Warszawa".into(),
                exceeded: 10,
            },
            ExceedanceCount {
                year: 2024,
                station: "S2".into(),
                city: "Radom".into(),
                exceeded: 20,
            },
        ];

        let aggregator = Aggregator::new();
        let regional = aggregator.regional_averages(&counts, &registry());
        assert_eq!(regional.len(), 1);
        assert_eq!(regional[0].region, "Mazowieckie");
        assert_eq!(regional[0].year, 2024);
        assert_eq!(regional[0].avg_exceeded_days, 15.0);

        let mut reversed = counts.clone();
        reversed.reverse();
        assert_eq!(aggregator.regional_averages(&reversed, &registry()), regional);
    }

    #[test]
    fn test_regional_average_skips_unregistered_stations() {
        let counts = vec![
            ExceedanceCount {
                year: 2024,
                station: "S3".into(),
                city: "Katowice".into(),
                exceeded: 7,
            },
            ExceedanceCount {
                year: 2024,
                station: "GHOST".into(),
                city: "Nowhere".into(),
                exceeded: 100,
            },
        ];

        let regional = Aggregator::new().regional_averages(&counts, &registry());
        assert_eq!(regional.len(), 1);
        assert_eq!(regional[0].region, "Śląskie");
        assert_eq!(regional[0].avg_exceeded_days, 7.0);
    }

    #[test]
    fn test_blank_registry_city_and_region_excluded() {
        use crate::models::{LongRecord, YearTable};
        use crate::processors::{CityEnricher, YearAligner};

        let registry =
            StationRegistry::from_entries(vec![RegistryEntry::new("ST09", None, "", "")]).unwrap();
        let timestamp = day(2024, 1, 1).and_hms_opt(5, 0, 0);
        let table = YearTable::new(
            2024,
            vec![LongRecord::new(timestamp, "ST09", Some(50.0), 2024)],
        );

        let enriched = CityEnricher::new(&registry).enrich(table);
        assert_eq!(enriched.records[0].city, None);

        let (dataset, _) = YearAligner::new().align(vec![enriched]).unwrap();
        assert_eq!(dataset.len(), 1);

        let aggregator = Aggregator::new();
        assert!(aggregator.monthly_means(&dataset).is_empty());
        assert!(aggregator.exceedance_from_dataset(&dataset).is_empty());

        let counts = vec![ExceedanceCount {
            year: 2024,
            station: "ST09".into(),
            city: "Warszawa".into(),
            exceeded: 1,
        }];
        assert!(aggregator.regional_averages(&counts, &registry).is_empty());
    }

    #[test]
    fn test_records_without_city_excluded_from_exceedance() {
        let dataset = CombinedDataset::from_records(vec![
            record("S9", None, 50.0, day(2024, 1, 1)),
        ]);
        assert!(Aggregator::new().exceedance_from_dataset(&dataset).is_empty());
    }
}
