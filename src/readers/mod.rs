pub mod columns;
pub mod combined_reader;
pub mod raw_table_reader;
pub mod registry_reader;

pub use columns::{find_column, require_columns};
pub use combined_reader::{CombinedReader, COMBINED_COLUMNS};
pub use raw_table_reader::RawTableReader;
pub use registry_reader::RegistryReader;
