pub mod constants;
pub mod encoding;
pub mod filename;
pub mod parsing;
pub mod progress;

pub use constants::*;
pub use encoding::{decode_text, sniff_delimiter};
pub use filename::{raw_file_name, raw_file_path};
pub use parsing::{owning_day, parse_decimal, parse_decimal_cell, parse_timestamp};
pub use progress::ProgressReporter;
