//! Document fetching and batch packaging
//!
//! One topic yields the raw PDF. Several topics are fetched one after another
//! and packed into an in-memory ZIP; a failed fetch becomes a plain-text
//! `ERROR_<code>.txt` entry instead of aborting the batch.

use crate::error::{Error, Result};
use crate::gateway::TopicGateway;
use crate::types::{
    ARCHIVE_FILENAME, ArchiveEntry, ArchiveEntryKind, DownloadOutcome, ItemFailure, ItemOutcome,
    ResolvedTopic,
};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::{debug, info, warn};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// Fetches topic documents and packages them for delivery
#[derive(Clone, Debug)]
pub struct ArtifactAggregator {
    compression: CompressionMethod,
}

impl Default for ArtifactAggregator {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArtifactAggregator {
    /// Create an aggregator that deflates archive entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every topic and package the result
    ///
    /// # Errors
    ///
    /// - [`Error::NoTopicsForDownload`] when `topics` is empty
    /// - the gateway error itself when a single-topic fetch fails
    /// - [`Error::AllDownloadsFailed`] when every fetch in a batch fails
    pub async fn fetch_all(
        &self,
        gateway: &dyn TopicGateway,
        topics: &[ResolvedTopic],
    ) -> Result<DownloadOutcome> {
        match topics {
            [] => Err(Error::NoTopicsForDownload),
            [topic] => {
                debug!(code = %topic.code, topic_id = %topic.topic_id, "fetching single topic");
                let bytes = gateway.fetch_document(&topic.topic_id).await?;
                info!(code = %topic.code, size = bytes.len(), "single topic PDF ready");
                Ok(DownloadOutcome::Document {
                    filename: document_entry_name(&topic.code),
                    bytes,
                })
            }
            _ => {
                let items = Self::collect_items(gateway, topics).await;
                self.pack_archive(&items)
            }
        }
    }

    /// Fetch each topic in order, recording failures instead of stopping
    pub async fn collect_items(
        gateway: &dyn TopicGateway,
        topics: &[ResolvedTopic],
    ) -> Vec<ItemOutcome> {
        let mut items = Vec::with_capacity(topics.len());

        for topic in topics {
            let result = match gateway.fetch_document(&topic.topic_id).await {
                Ok(bytes) => {
                    debug!(code = %topic.code, size = bytes.len(), "topic PDF fetched");
                    Ok(bytes)
                }
                Err(e) => {
                    warn!(code = %topic.code, topic_id = %topic.topic_id, error = %e, "topic PDF fetch failed");
                    Err(ItemFailure::from(e))
                }
            };
            items.push(ItemOutcome {
                topic: topic.clone(),
                result,
            });
        }

        items
    }

    /// Pack fetched items into a ZIP archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllDownloadsFailed`] when no item succeeded, and
    /// [`Error::Archive`] or [`Error::Io`] if writing the archive fails.
    pub fn pack_archive(&self, items: &[ItemOutcome]) -> Result<DownloadOutcome> {
        let failed = items.iter().filter(|i| i.result.is_err()).count();
        if failed == items.len() {
            let all_upstream = items
                .iter()
                .all(|i| matches!(i.result, Err(ItemFailure::Upstream(_))));
            return Err(Error::AllDownloadsFailed {
                failed,
                all_upstream,
            });
        }

        let options = FileOptions::default().compression_method(self.compression);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = Vec::with_capacity(items.len());
        let mut used = HashSet::with_capacity(items.len());

        for item in items {
            let code = &item.topic.code;
            let entry = match &item.result {
                Ok(bytes) => {
                    let name = claim_entry_name(&mut used, document_entry_name(code));
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(bytes)?;
                    ArchiveEntry {
                        name,
                        code: code.clone(),
                        kind: ArchiveEntryKind::Document,
                    }
                }
                Err(failure) => {
                    let name = claim_entry_name(
                        &mut used,
                        format!("ERROR_{}.txt", sanitize_entry_name(code)),
                    );
                    writer.start_file(name.as_str(), options)?;
                    writer.write_all(placeholder_text(code, failure).as_bytes())?;
                    ArchiveEntry {
                        name,
                        code: code.clone(),
                        kind: ArchiveEntryKind::ErrorPlaceholder,
                    }
                }
            };
            entries.push(entry);
        }

        let bytes = writer.finish()?.into_inner();
        info!(
            documents = items.len() - failed,
            failed,
            size = bytes.len(),
            "topic archive packed"
        );

        Ok(DownloadOutcome::Archive {
            filename: ARCHIVE_FILENAME.to_string(),
            bytes,
            entries,
        })
    }
}

/// `<code>.pdf` with the code made safe for use as a file name
pub fn document_entry_name(code: &str) -> String {
    format!("{}.pdf", sanitize_entry_name(code))
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_` and strip leading dots
pub fn sanitize_entry_name(code: &str) -> String {
    let cleaned: String = code
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "topic".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Reserve `name`, appending `~2`, `~3`, ... before the extension when two
/// codes sanitize to the same entry. `~` never survives sanitizing, so a
/// suffixed name cannot shadow another code.
fn claim_entry_name(used: &mut HashSet<String>, name: String) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name.as_str(), ""),
    };
    let mut n = 2usize;
    loop {
        let candidate = format!("{stem}~{n}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn placeholder_text(code: &str, failure: &ItemFailure) -> String {
    format!("Failed to download PDF for topic {code}.\nError: {failure}\n")
}
