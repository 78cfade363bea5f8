//! Generic paged entity store.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use guildhall_core::{Diagnostic, Notifier};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::layout::{self, COUNTER_FILE, CounterFile};

/// Entries per page file unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Stable identifier assigned by a [`PagedStore`]. Never reused.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl EntryId {
    /// Wrap a raw ID.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw ID.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following ID, or `None` past `u64::MAX`.
    fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record that can live in a [`PagedStore`].
///
/// The store owns the ID: it is overwritten on insert and restored after
/// updates.
pub trait PageStorable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record's ID.
    fn id(&self) -> EntryId;

    /// Assign the record's ID.
    fn set_id(&mut self, id: EntryId);
}

struct State<T> {
    entries: Vec<T>,
    /// `None` once every ID has been issued.
    next_id: Option<EntryId>,
}

impl<T> State<T> {
    /// Whether `id` has been handed out.
    fn issued(&self, id: EntryId) -> bool {
        self.next_id.is_none_or(|next| id < next)
    }
}

struct Inner<T> {
    dir: PathBuf,
    page_size: usize,
    state: Mutex<State<T>>,
    notifier: Arc<dyn Notifier>,
}

/// An ordered collection of `T` mirrored to page files under one directory.
///
/// All operations take the store's lock, including the file writes they
/// trigger, so there is a single writer per store. Cloning yields a handle
/// to the same store. Open at most one store per directory.
pub struct PagedStore<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PagedStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for PagedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedStore")
            .field("dir", &self.inner.dir)
            .field("page_size", &self.inner.page_size)
            .finish_non_exhaustive()
    }
}

impl<T: PageStorable> PagedStore<T> {
    /// Open an empty store over `dir`, creating the directory if needed.
    ///
    /// Call [`initial_load`](Self::initial_load) to read existing pages.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPageSize`] if `page_size` is zero, or an
    /// I/O error if the directory cannot be created.
    pub async fn open(
        dir: impl Into<PathBuf>,
        page_size: usize,
        notifier: Arc<dyn Notifier>,
    ) -> StorageResult<Self> {
        if page_size == 0 {
            return Err(StorageError::InvalidPageSize(page_size));
        }
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;

        Ok(Self {
            inner: Arc::new(Inner {
                dir,
                page_size,
                state: Mutex::new(State {
                    entries: Vec::new(),
                    next_id: Some(EntryId::default()),
                }),
                notifier,
            }),
        })
    }

    /// The directory holding this store's files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Entries per page file.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Replace the in-memory state with what is on disk.
    ///
    /// Returns `false`, leaving the store empty, if the counter file is
    /// missing or unreadable; the directory is then treated as a fresh
    /// store. A missing counter is only reported when page files exist.
    /// Otherwise every readable page is replayed in page order. A page
    /// that fails to parse is skipped whole, a record that fails to parse is
    /// skipped alone, and a record whose ID was already seen is dropped.
    pub async fn initial_load(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        state.entries.clear();
        state.next_id = Some(EntryId::default());

        let mut next_id = match self.read_counter().await {
            Ok(id) => Some(id),
            Err(e) => {
                if matches!(e, StorageError::NotFound(_)) && self.has_no_pages().await {
                    info!(dir = %self.inner.dir.display(), "No counter file, starting fresh store");
                } else {
                    self.report("load counter", &e);
                }
                return false;
            },
        };

        let pages = match layout::list_pages(&self.inner.dir).await {
            Ok(pages) => pages,
            Err(e) => {
                self.report("list pages", &e);
                return false;
            },
        };

        let mut seen = HashSet::new();
        let mut entries: Vec<T> = Vec::new();
        for (index, path) in pages {
            let records = match read_page(&path).await {
                Ok(records) => records,
                Err(e) => {
                    self.report("load page", &e);
                    continue;
                },
            };

            for record in records {
                let entry: T = match serde_json::from_value(record) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(page = index, error = %e, "Skipping malformed record");
                        continue;
                    },
                };
                let id = entry.id();
                if !seen.insert(id) {
                    warn!(page = index, id = %id, "Dropping duplicate entry");
                    continue;
                }
                if next_id.is_some_and(|next| id >= next) {
                    warn!(id = %id, "Entry ID ahead of counter; advancing");
                    next_id = id.checked_next();
                }
                entries.push(entry);
            }
        }

        info!(
            dir = %self.inner.dir.display(),
            entries = entries.len(),
            next_id = ?next_id.map(EntryId::get),
            "Loaded paged store"
        );
        state.entries = entries;
        state.next_id = next_id;
        true
    }

    /// Append `value` under a freshly allocated ID and return the ID.
    ///
    /// Writes the counter file and the one page the entry landed on. Save
    /// failures are reported, not returned.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::IdSpaceExhausted`] once `u64::MAX` has been
    /// issued; the value is not stored.
    pub async fn add_entry(&self, mut value: T) -> StorageResult<EntryId> {
        let mut state = self.inner.state.lock().await;
        let Some(id) = state.next_id else {
            let error = StorageError::IdSpaceExhausted(self.inner.dir.clone());
            self.report("allocate id", &error);
            return Err(error);
        };
        state.next_id = id.checked_next();
        value.set_id(id);
        state.entries.push(value);

        // An exhausted counter stays at the last issued ID; reloading the
        // entry holding it marks the store exhausted again.
        self.persist_counter(state.next_id.unwrap_or(id)).await;
        let page = self.page_of(state.entries.len().saturating_sub(1));
        self.persist_page(&state.entries, page).await;

        debug!(id = %id, page, "Added entry");
        Ok(id)
    }

    /// Remove the entry with `id`. Returns whether it existed.
    ///
    /// Every later entry shifts position, so all pages are rewritten.
    pub async fn remove_entry(&self, id: EntryId) -> bool {
        let mut state = self.inner.state.lock().await;
        if !state.issued(id) {
            return false;
        }
        let Some(position) = state.entries.iter().position(|e| e.id() == id) else {
            return false;
        };
        state.entries.remove(position);

        self.persist_all(&state.entries).await;
        debug!(id = %id, "Removed entry");
        true
    }

    /// Apply `f` to the entry with `id` and persist its page.
    ///
    /// The entry keeps its ID whatever `f` does. Returns whether the entry
    /// existed.
    pub async fn update_entry(&self, id: EntryId, f: impl FnOnce(&mut T)) -> bool {
        let mut state = self.inner.state.lock().await;
        if !state.issued(id) {
            return false;
        }
        let Some(position) = state.entries.iter().position(|e| e.id() == id) else {
            return false;
        };
        if let Some(entry) = state.entries.get_mut(position) {
            f(entry);
            entry.set_id(id);
        }

        let page = self.page_of(position);
        self.persist_page(&state.entries, page).await;
        true
    }

    /// A copy of the entry with `id`.
    pub async fn get(&self, id: EntryId) -> Option<T> {
        let state = self.inner.state.lock().await;
        if !state.issued(id) {
            return None;
        }
        state.entries.iter().find(|e| e.id() == id).cloned()
    }

    /// Whether an entry with `id` exists.
    pub async fn has(&self, id: EntryId) -> bool {
        let state = self.inner.state.lock().await;
        state.issued(id) && state.entries.iter().any(|e| e.id() == id)
    }

    /// A copy of the first entry matching `predicate`.
    pub async fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        let state = self.inner.state.lock().await;
        state.entries.iter().find(|e| predicate(e)).cloned()
    }

    /// A snapshot of all entries in order.
    pub async fn entries(&self) -> Vec<T> {
        self.inner.state.lock().await.entries.clone()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.state.lock().await.entries.is_empty()
    }

    /// The ID the next [`add_entry`](Self::add_entry) will assign, or `None`
    /// once the ID space is exhausted.
    pub async fn next_id(&self) -> Option<EntryId> {
        self.inner.state.lock().await.next_id
    }

    fn page_of(&self, position: usize) -> usize {
        position.checked_div(self.inner.page_size).unwrap_or(0)
    }

    fn page_path(&self, index: usize) -> PathBuf {
        self.inner.dir.join(layout::page_file_name(index))
    }

    fn counter_path(&self) -> PathBuf {
        self.inner.dir.join(COUNTER_FILE)
    }

    async fn has_no_pages(&self) -> bool {
        layout::list_pages(&self.inner.dir)
            .await
            .is_ok_and(|pages| pages.is_empty())
    }

    async fn read_counter(&self) -> StorageResult<EntryId> {
        let path = self.counter_path();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        let counter: CounterFile =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(&path, e))?;
        Ok(EntryId(counter.id))
    }

    async fn persist_counter(&self, next_id: EntryId) {
        let path = self.counter_path();
        let counter = CounterFile { id: next_id.get() };
        if let Err(e) = layout::write_json(&path, &counter).await {
            self.report("save counter", &e);
        }
    }

    async fn persist_page(&self, entries: &[T], index: usize) {
        let chunk = entries.chunks(self.inner.page_size).nth(index).unwrap_or(&[]);
        if let Err(e) = layout::write_json(&self.page_path(index), chunk).await {
            self.report("save page", &e);
        }
    }

    /// Rewrite every page, then delete page files past the new end.
    async fn persist_all(&self, entries: &[T]) {
        let page_count = entries.len().div_ceil(self.inner.page_size);
        for (index, chunk) in entries.chunks(self.inner.page_size).enumerate() {
            if let Err(e) = layout::write_json(&self.page_path(index), chunk).await {
                self.report("save page", &e);
            }
        }

        let pages = match layout::list_pages(&self.inner.dir).await {
            Ok(pages) => pages,
            Err(e) => {
                self.report("list pages", &e);
                return;
            },
        };
        for (index, path) in pages {
            if index < page_count {
                continue;
            }
            if let Err(e) = tokio::fs::remove_file(&path).await {
                self.report("delete page", &StorageError::io(&path, e));
            }
        }
    }

    fn report(&self, operation: &str, error: &StorageError) {
        warn!(
            operation,
            dir = %self.inner.dir.display(),
            error = %error,
            "Paged store operation failed"
        );
        self.inner.notifier.notify(Diagnostic::storage_failure(
            operation,
            error.path().map(Path::to_path_buf),
            error.to_string(),
        ));
    }
}

async fn read_page(path: &Path) -> StorageResult<Vec<serde_json::Value>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::serialization(path, e))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
