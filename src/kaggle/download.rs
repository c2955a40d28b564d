use serde_json::{ Map, Value as JsonValue };
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{ Cursor, Read };
use std::path::{ Path, PathBuf };
use log::info;
use zip::ZipArchive;

use super::DatasetRef;

#[derive(Debug)]
pub enum DownloadError {
    IoError(std::io::Error),
    ZipError(zip::result::ZipError),
    CsvError(csv::Error),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::IoError(e) => write!(f, "Dataset file IO error: {}", e),
            DownloadError::ZipError(e) => write!(f, "Dataset archive error: {}", e),
            DownloadError::CsvError(e) => write!(f, "Sample CSV error: {}", e),
        }
    }
}

impl Error for DownloadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DownloadError::IoError(e) => Some(e),
            DownloadError::ZipError(e) => Some(e),
            DownloadError::CsvError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        DownloadError::IoError(err)
    }
}

impl From<zip::result::ZipError> for DownloadError {
    fn from(err: zip::result::ZipError) -> Self {
        DownloadError::ZipError(err)
    }
}

impl From<csv::Error> for DownloadError {
    fn from(err: csv::Error) -> Self {
        DownloadError::CsvError(err)
    }
}

/// Default target is `<base_dir>/<slug>`; an explicit path wins and is
/// resolved to an absolute path.
pub fn resolve_download_path(
    base_dir: &Path,
    dataset: &DatasetRef,
    explicit: Option<&Path>
) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) =>
            std::env
                ::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
        None => base_dir.join(&dataset.slug),
    }
}

/// Unzips the archive into `dest` (created if absent) and returns the
/// extracted file names. Entries that would escape `dest` are skipped.
pub fn extract_archive(data: &[u8], dest: &Path) -> Result<Vec<String>, DownloadError> {
    fs::create_dir_all(dest)?;
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        extracted.push(relative.to_string_lossy().into_owned());
    }

    info!("Extracted {} file(s) into {}", extracted.len(), dest.display());
    Ok(extracted)
}

/// Reads up to `max_rows` records from the first `.csv` entry in the
/// archive, keyed by header. `None` when the archive has no CSV.
pub fn sample_from_archive(
    data: &[u8],
    max_rows: usize
) -> Result<Option<Vec<JsonValue>>, DownloadError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let mut csv_index = None;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_file() && entry.name().to_ascii_lowercase().ends_with(".csv") {
            csv_index = Some(index);
            break;
        }
    }
    let Some(index) = csv_index else {
        return Ok(None);
    };

    let mut entry = archive.by_index(index)?;
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    Ok(Some(csv_preview(&raw, max_rows)?))
}

pub fn csv_preview(data: &[u8], max_rows: usize) -> Result<Vec<JsonValue>, DownloadError> {
    let mut reader = csv::Reader::from_reader(data);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records().take(max_rows) {
        let record = record?;
        let mut row = Map::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), JsonValue::String(field.to_string()));
        }
        rows.push(JsonValue::Object(row));
    }
    Ok(rows)
}
