use serde::{Deserialize, Serialize};

/// Role of a leading row in a published sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowRole {
    /// Running column number ("Nr")
    Sequence,
    /// Station codes ("Kod stacji"); becomes the header
    StationCode,
    /// Measured indicator ("Wskaźnik")
    Indicator,
    /// Averaging period ("Czas uśredniania")
    AveragingTime,
    /// Unit of measure ("Jednostka")
    Unit,
    /// Measuring position code ("Kod stanowiska")
    PositionCode,
}

/// Sheet layout generations published by the agency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutVersion {
    /// Up to and including the cutoff year
    PreCutoff,
    /// After the cutoff year: extra sequence, unit and position rows
    PostCutoff,
}

/// Declarative description of the metadata block heading a raw sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaLayout {
    pub version: LayoutVersion,
    rows: &'static [RowRole],
}

const PRE_CUTOFF_ROWS: &[RowRole] = &[
    RowRole::StationCode,
    RowRole::Indicator,
    RowRole::AveragingTime,
];

const POST_CUTOFF_ROWS: &[RowRole] = &[
    RowRole::Sequence,
    RowRole::StationCode,
    RowRole::Indicator,
    RowRole::AveragingTime,
    RowRole::Unit,
    RowRole::PositionCode,
];

impl SchemaLayout {
    pub fn new(version: LayoutVersion) -> Self {
        let rows = match version {
            LayoutVersion::PreCutoff => PRE_CUTOFF_ROWS,
            LayoutVersion::PostCutoff => POST_CUTOFF_ROWS,
        };
        Self { version, rows }
    }

    /// Layout used for `year` given the schema-change cutoff year
    pub fn for_year(year: i32, cutoff_year: i32) -> Self {
        if year > cutoff_year {
            Self::new(LayoutVersion::PostCutoff)
        } else {
            Self::new(LayoutVersion::PreCutoff)
        }
    }

    /// Number of leading rows occupied by metadata (header included)
    pub fn metadata_rows(&self) -> usize {
        self.rows.len()
    }

    /// Index of the station-code row within the raw sheet
    pub fn header_row(&self) -> usize {
        self.rows
            .iter()
            .position(|role| *role == RowRole::StationCode)
            .unwrap_or(0)
    }

    /// Raw row indices removed before the header is taken
    pub fn dropped_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, role)| **role != RowRole::StationCode)
            .map(|(index, _)| index)
            .collect()
    }
}
