//! Per-file and per-directory assembly of enriched tables.
//!
//! A file's segments are concatenated into one table. A directory yields one
//! table per file and is never concatenated; use [`concat`] for a single
//! directory-wide table.

use std::path::Path;

use crate::error::{FetchError, PipelineError};
use crate::pipeline::correlate::{self, WeatherSource};
use crate::pipeline::{augment, motion, parse};
use crate::types::record::EnrichedTable;
use crate::types::track::{FileFormat, ParsedTrack};

/// What `enrich_dir` does when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    #[default]
    Abort,
    Skip,
}

pub async fn enrich_track<S: WeatherSource>(
    source: &S,
    filename: &str,
    parsed: &ParsedTrack,
) -> Result<EnrichedTable, FetchError> {
    let mut table = EnrichedTable {
        records: Vec::with_capacity(parsed.point_count()),
    };

    for segment in &parsed.segments {
        let samples = motion::compute(segment);
        let joined = correlate::correlate(source, segment, samples).await?;
        table
            .records
            .extend(joined.into_iter().map(|s| augment::augment(filename, s)));
    }

    Ok(table)
}

pub async fn enrich_bytes<S: WeatherSource>(
    source: &S,
    filename: &str,
    bytes: &[u8],
    format: FileFormat,
) -> Result<EnrichedTable, PipelineError> {
    let parsed = parse::parse(bytes, format)?;
    tracing::info!(
        "Parsed {} ({} segments, {} points)",
        filename,
        parsed.segments.len(),
        parsed.point_count()
    );
    Ok(enrich_track(source, filename, &parsed).await?)
}

/// Table for one file; rows are tagged with the file's name.
pub async fn enrich_file<S: WeatherSource>(
    source: &S,
    path: &Path,
) -> Result<EnrichedTable, PipelineError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let format = FileFormat::from_filename(&filename)
        .ok_or_else(|| PipelineError::UnsupportedFormat(filename.clone()))?;

    let bytes = tokio::fs::read(path).await.map_err(|e| PipelineError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    enrich_bytes(source, &filename, &bytes, format).await
}

/// One table per track file in `dir`, in file name order. Files with other
/// extensions are ignored.
pub async fn enrich_dir<S: WeatherSource>(
    source: &S,
    dir: &Path,
    policy: BatchPolicy,
) -> Result<Vec<EnrichedTable>, PipelineError> {
    let files = track_files(dir).await?;
    let mut tables = Vec::with_capacity(files.len());

    for path in files {
        match enrich_file(source, &path).await {
            Ok(table) => tables.push(table),
            Err(err) if policy == BatchPolicy::Skip => {
                tracing::warn!("Skipping {}: {}", path.display(), err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(tables)
}

pub fn concat(tables: Vec<EnrichedTable>) -> EnrichedTable {
    let mut all = EnrichedTable::default();
    for table in tables {
        all.extend(table);
    }
    all
}

async fn track_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, PipelineError> {
    let io_err = |e: std::io::Error| PipelineError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_track = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(FileFormat::from_filename)
            .is_some();
        if is_track && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
