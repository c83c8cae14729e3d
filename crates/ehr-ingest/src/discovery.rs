//! File discovery and record type matching.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ehr_model::RecordTypeRegistry;

use crate::error::{IngestError, Result};

/// A discovered CSV file with its record type classification.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Canonical record type name (e.g., "Encounter").
    pub record_type: Option<String>,
    /// Whether this appears to be a metadata file.
    pub is_metadata: bool,
}

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        // Check for .csv extension (case-insensitive)
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Groups CSV files by the record type their name resolves to.
///
/// Metadata files and files with no matching record type are left out.
pub fn discover_record_files(
    csv_files: &[PathBuf],
    registry: &RecordTypeRegistry,
) -> BTreeMap<String, Vec<PathBuf>> {
    let mut record_files: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in classify_files(csv_files, registry) {
        if let Some(record_type) = file.record_type {
            record_files.entry(record_type).or_default().push(file.path);
        }
    }
    record_files
}

/// Classifies every CSV file in `dir`.
pub fn discover_files(dir: &Path, registry: &RecordTypeRegistry) -> Result<Vec<DiscoveredFile>> {
    let csv_files = list_csv_files(dir)?;
    Ok(classify_files(&csv_files, registry))
}

fn classify_files(csv_files: &[PathBuf], registry: &RecordTypeRegistry) -> Vec<DiscoveredFile> {
    csv_files
        .iter()
        .map(|path| {
            let stem = path.file_stem().and_then(|v| v.to_str()).unwrap_or("");
            let is_metadata = is_metadata_file(&stem.to_uppercase());
            let record_type = if is_metadata {
                None
            } else {
                match_record_type(stem, registry)
            };
            DiscoveredFile {
                path: path.clone(),
                record_type,
                is_metadata,
            }
        })
        .collect()
}

/// Checks if a filename looks like a metadata file.
fn is_metadata_file(filename: &str) -> bool {
    let metadata_indicators = ["CODELIST", "README", "METADATA", "DICTIONARY"];

    metadata_indicators
        .iter()
        .any(|pattern| filename.contains(pattern))
}

/// Matches a file stem to a registered record type.
///
/// Handles patterns like:
/// - Encounter.csv -> Encounter
/// - encounter_diagnosis.csv -> Encounter_Diagnosis
/// - demo_Encounter.csv -> Encounter
fn match_record_type(stem: &str, registry: &RecordTypeRegistry) -> Option<String> {
    if let Some(name) = registry.canonical_name(stem) {
        return Some(name.to_string());
    }
    // Drop leading `_`-separated prefixes one at a time, longest suffix first.
    let mut rest = stem;
    while let Some((_, tail)) = rest.split_once('_') {
        if let Some(name) = registry.canonical_name(tail) {
            return Some(name.to_string());
        }
        rest = tail;
    }
    None
}
