pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod loader;

pub use csv_table::{CsvTable, csv_table_to_frame, read_csv_table};
pub use discovery::{DiscoveredFile, discover_files, discover_record_files, list_csv_files};
pub use error::{IngestError, Result};
pub use loader::{SourceFrame, load_record_frame, load_record_frames};
