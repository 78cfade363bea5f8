//! On-disk naming and atomic file writes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Name of the sidecar counter file.
pub(crate) const COUNTER_FILE: &str = "Id.json";

const PAGE_PREFIX: &str = "page-";
const PAGE_SUFFIX: &str = ".json";
const TEMP_SUFFIX: &str = ".tmp";

/// Contents of the counter file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct CounterFile {
    #[serde(rename = "Id")]
    pub(crate) id: u64,
}

/// `page-<index>.json`
pub(crate) fn page_file_name(index: usize) -> String {
    format!("{PAGE_PREFIX}{index}{PAGE_SUFFIX}")
}

/// Inverse of [`page_file_name`]. Anything else in the directory, including
/// in-flight temp files, yields `None`.
pub(crate) fn parse_page_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(PAGE_PREFIX)?
        .strip_suffix(PAGE_SUFFIX)?
        .parse()
        .ok()
}

/// Page files in `dir`, sorted by page index.
pub(crate) async fn list_pages(dir: &Path) -> StorageResult<Vec<(usize, PathBuf)>> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StorageError::io(dir, e))?;

    let mut pages = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| StorageError::io(dir, e))?
    {
        let name = entry.file_name();
        if let Some(index) = name.to_str().and_then(parse_page_index) {
            pages.push((index, entry.path()));
        }
    }
    pages.sort_unstable_by_key(|(index, _)| *index);
    Ok(pages)
}

/// Replace `path` with `contents` so that readers see either the old file or
/// the new one, never a partial write.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(TEMP_SUFFIX);
    let temp = PathBuf::from(temp);

    tokio::fs::write(&temp, contents)
        .await
        .map_err(|e| StorageError::io(&temp, e))?;
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(StorageError::io(path, e));
    }
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub(crate) async fn write_json<V: Serialize + ?Sized>(path: &Path, value: &V) -> StorageResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::serialization(path, e))?;
    write_atomic(path, &bytes).await
}
