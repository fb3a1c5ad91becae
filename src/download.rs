//! Download sink — deterministic filenames, PNG bytes persisted to the
//! user's downloads folder.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::page::NodeDescriptor;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("no downloads directory on this system")]
    NoDownloadsDir,

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Keep only characters that are safe in every filesystem we write to.
fn sanitize(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// `tag[-id][-class]-<timestamp>.png`, with an ISO-8601 timestamp whose
/// `:` and `.` are replaced by `-` for filesystem safety.
pub fn derive_filename(descriptor: &NodeDescriptor, at: DateTime<Utc>) -> String {
    let mut name = sanitize(&descriptor.tag.to_lowercase());
    if name.is_empty() {
        name.push_str("element");
    }
    for part in [&descriptor.id, &descriptor.first_class] {
        if let Some(part) = part {
            let clean = sanitize(part);
            if !clean.is_empty() {
                name.push('-');
                name.push_str(&clean);
            }
        }
    }

    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{name}-{stamp}.png")
}

/// Persist encoded PNG bytes. Returns the full path and the bare filename
/// for the "saved" notice.
pub fn save_png(bytes: &[u8], descriptor: &NodeDescriptor) -> Result<(PathBuf, String), DownloadError> {
    let dir = dirs::download_dir().ok_or(DownloadError::NoDownloadsDir)?;
    let filename = derive_filename(descriptor, Utc::now());
    let path = dir.join(&filename);

    std::fs::write(&path, bytes).map_err(|source| DownloadError::Write {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("saved {} bytes to {}", bytes.len(), path.display());
    Ok((path, filename))
}
