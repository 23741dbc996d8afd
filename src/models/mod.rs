pub mod aggregates;
pub mod layout;
pub mod record;
pub mod station;
pub mod table;

pub use aggregates::{CityMonthlyMean, DailyMean, ExceedanceCount, MonthlyMean, RegionalAverage};
pub use layout::{LayoutVersion, RowRole, SchemaLayout};
pub use record::{CombinedDataset, CombinedRecord, LongRecord, YearTable};
pub use station::{RegistryEntry, StationRegistry};
pub use table::{Cell, RawTable, WideTable};
