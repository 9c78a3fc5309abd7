//! Input loading.

mod loader;

pub use loader::{load_csv, parse_timestamp, read_series};
