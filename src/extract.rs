//! Markdown extraction from an in-memory zip archive.

use crate::error::DocsError;
use serde::Serialize;
use std::io::{Cursor, Read};

/// File extensions treated as documentation.
const DOC_EXTENSIONS: &[&str] = &[".md", ".mdx"];

/// Maximum decompressed bytes read from a single entry (zip-bomb protection).
/// Larger entries are skipped.
const MAX_ENTRY_BYTES: u64 = 16 * 1024 * 1024;

/// One indexable markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Archive path with the top-level directory removed, e.g. `docs/index.md`
    pub id: String,
    /// Raw markdown text
    pub content: String,
    /// Full path of the entry inside the archive
    pub path: String,
}

/// Unpacks `bytes` as a zip archive and returns its markdown files in archive order.
///
/// Entries that cannot be read, are too large, or are not valid UTF-8 are
/// skipped. Fails when the buffer is not a zip archive or when no markdown
/// file survives filtering.
pub fn extract(bytes: &[u8]) -> Result<Vec<Document>, DocsError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocsError::Extract(format!("invalid or corrupted zip archive: {}", e)))?;

    let mut documents = Vec::new();
    let mut skipped = 0usize;

    for i in 0..archive.len() {
        // Filter on the central-directory name so other entries are never opened
        let Some(path) = archive
            .name_for_index(i)
            .filter(|name| !name.ends_with('/') && is_doc_path(name))
            .map(str::to_string)
        else {
            continue;
        };
        let Some(id) = document_id(&path).map(str::to_string) else {
            continue;
        };

        let entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable archive entry {}: {}", path, e);
                skipped += 1;
                continue;
            }
        };

        let mut buf = Vec::new();
        if let Err(e) = entry.take(MAX_ENTRY_BYTES + 1).read_to_end(&mut buf) {
            tracing::warn!("Skipping {}: {}", path, e);
            skipped += 1;
            continue;
        }
        if buf.len() as u64 > MAX_ENTRY_BYTES {
            tracing::warn!("Skipping {}: exceeds {} bytes", path, MAX_ENTRY_BYTES);
            skipped += 1;
            continue;
        }

        match String::from_utf8(buf) {
            Ok(content) => documents.push(Document {
                id,
                content,
                path,
            }),
            Err(_) => {
                tracing::debug!("Skipping {}: not valid UTF-8", path);
                skipped += 1;
            }
        }
    }

    if documents.is_empty() {
        return Err(DocsError::Extract(
            "archive contains no markdown (.md, .mdx) files".to_string(),
        ));
    }

    tracing::debug!(
        "Extracted {} markdown documents ({} skipped) from {} entries",
        documents.len(),
        skipped,
        archive.len()
    );
    Ok(documents)
}

fn is_doc_path(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DOC_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Drops the archive's top-level directory (`fastmcp-main/docs/x.md` -> `docs/x.md`).
/// Entries at the archive root keep their name.
fn document_id(path: &str) -> Option<&str> {
    let id = match path.split_once('/') {
        Some((_, rest)) => rest,
        None => path,
    };
    (!id.is_empty()).then_some(id)
}
