use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mean concentration of one station in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMean {
    pub year: i32,
    pub month: u32,
    pub station: String,
    pub city: String,
    pub value: f64,
}

/// Daily mean of one station with its exceedance flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMean {
    pub year: i32,
    pub station: String,
    pub city: String,
    pub date: NaiveDate,
    pub value: f64,
    pub exceeded: bool,
}

/// Number of exceedance days of one station in one year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceedanceCount {
    pub year: i32,
    pub station: String,
    pub city: String,
    pub exceeded: u32,
}

/// Mean exceedance-day count per station within a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalAverage {
    pub region: String,
    pub year: i32,
    pub avg_exceeded_days: f64,
}

/// Mean of station monthly means within a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMonthlyMean {
    pub year: i32,
    pub month: u32,
    pub city: String,
    pub value: f64,
}
