pub mod pm25_analyzer;

pub use pm25_analyzer::{
    heatmap_summary, trend_summary, AnalysisOutputs, AnalysisSummary, CityYearStat,
    HeatmapSummary, Pm25Analyzer, TrendSummary, TREND_COLUMNS,
};
