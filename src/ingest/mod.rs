
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::RagError;
use crate::Result;
use crate::backend::{ChunkMetadata, Embedder, VectorIndex, VectorRecord};
use crate::chunking::{ChunkingConfig, chunk_text};
use crate::extract::extract_text;

/// Batch ingestion pipeline: walk a directory, extract and chunk each file,
/// embed every chunk and upsert it into the vector store.
pub struct Ingestor<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
    chunking: ChunkingConfig,
}

/// Outcome counters for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_upserted: usize,
    pub chunks_failed: usize,
}

impl<'a> Ingestor<'a> {
    #[inline]
    pub fn new(
        embedder: &'a dyn Embedder,
        index: &'a dyn VectorIndex,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            chunking,
        }
    }

    /// Ingest every regular file under `dir` into `namespace`.
    ///
    /// This is a best-effort batch job: extraction failures skip the file,
    /// chunk-level embedding or upsert failures are logged and counted, and
    /// the run always continues with the remaining work.
    #[inline]
    pub fn ingest_directory(&self, dir: &Path, namespace: &str) -> Result<IngestStats> {
        validate_directory(dir)?;
        self.chunking.validate()?;

        let files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        info!(
            "Ingesting {} files from {} into namespace '{}'",
            files.len(),
            dir.display(),
            namespace
        );

        let progress = file_progress_bar(files.len() as u64);
        let mut stats = IngestStats::default();

        for file in &files {
            progress.set_message(file.display().to_string());
            self.ingest_file(file, namespace, &mut stats);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Ingestion complete: {} files processed, {} skipped, {} chunks upserted, {} failed",
            stats.files_processed, stats.files_skipped, stats.chunks_upserted, stats.chunks_failed
        );

        Ok(stats)
    }

    fn ingest_file(&self, file: &Path, namespace: &str, stats: &mut IngestStats) {
        debug!("Processing {}", file.display());

        let text = extract_text(file);
        if text.trim().is_empty() {
            debug!("Skipping {} (no extractable text)", file.display());
            stats.files_skipped += 1;
            return;
        }

        let chunks = match chunk_text(&text, &self.chunking) {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("Failed to chunk {}: {}", file.display(), e);
                stats.files_skipped += 1;
                return;
            }
        };

        let filename = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());

        for chunk in &chunks {
            let record_id = format!("{}-chunk-{}", filename, chunk.index + 1);

            let values = match self.embedder.embed(&chunk.text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Failed to embed chunk {}: {}", record_id, e);
                    stats.chunks_failed += 1;
                    continue;
                }
            };

            let record = VectorRecord {
                id: record_id.clone(),
                values,
                metadata: ChunkMetadata {
                    source: file.display().to_string(),
                    text: chunk.text.clone(),
                },
            };

            match self.index.upsert(std::slice::from_ref(&record), namespace) {
                Ok(()) => stats.chunks_upserted += 1,
                Err(e) => {
                    warn!("Failed to upsert chunk {}: {}", record_id, e);
                    stats.chunks_failed += 1;
                }
            }
        }

        stats.files_processed += 1;
    }
}

/// The ingestion target must exist, be a directory, and contain at least one
/// entry.
#[inline]
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(RagError::Config(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(RagError::Config(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }
    let mut entries = fs::read_dir(dir)?;
    if entries.next().is_none() {
        return Err(RagError::Config(format!(
            "Directory is empty: {}",
            dir.display()
        )));
    }
    Ok(())
}

fn file_progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress
}
