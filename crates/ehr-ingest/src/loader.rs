//! Loading a folder of flat files into named frames.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use ehr_model::RecordTypeRegistry;

use crate::csv_table::{csv_table_to_frame, read_csv_table};
use crate::discovery::discover_files;
use crate::error::Result;

/// One loaded flat file, named after its record type.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub record_type: String,
    pub path: PathBuf,
    pub data: DataFrame,
}

/// Read a single CSV file as a frame for `record_type`.
pub fn load_record_frame(path: &Path, record_type: &str) -> Result<SourceFrame> {
    let table = read_csv_table(path)?;
    let data = csv_table_to_frame(&table, path)?;
    debug!(
        record_type,
        path = %path.display(),
        rows = data.height(),
        columns = data.width(),
        "loaded record file"
    );
    Ok(SourceFrame {
        record_type: record_type.to_string(),
        path: path.to_path_buf(),
        data,
    })
}

/// Load every CSV file in `dir` that resolves to a registered record type.
///
/// Two files resolving to the same type are both returned; the graph
/// builder rejects the duplicate name.
pub fn load_record_frames(dir: &Path, registry: &RecordTypeRegistry) -> Result<Vec<SourceFrame>> {
    let mut frames = Vec::new();
    for file in discover_files(dir, registry)? {
        if file.is_metadata {
            debug!(path = %file.path.display(), "skipping metadata file");
            continue;
        }
        let Some(record_type) = file.record_type else {
            warn!(path = %file.path.display(), "no record type matches file");
            continue;
        };
        frames.push(load_record_frame(&file.path, &record_type)?);
    }
    info!(
        folder = %dir.display(),
        file_count = frames.len(),
        "record files loaded"
    );
    Ok(frames)
}
