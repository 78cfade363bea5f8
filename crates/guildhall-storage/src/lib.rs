//! Guildhall Storage - paged JSON persistence.
//!
//! A [`PagedStore`] keeps an ordered collection of records in memory and
//! mirrors it to a directory of fixed-size JSON page files plus a sidecar
//! counter file:
//!
//! ```text
//! <dir>/Id.json        {"Id": 131}
//! <dir>/page-0.json    [ {..}, {..}, ... ]   entries 0..64
//! <dir>/page-1.json    [ ... ]               entries 64..128
//! <dir>/page-2.json    [ ... ]               entries 128..
//! ```
//!
//! Loading is forgiving: a corrupted page costs only that page, and a
//! malformed record costs only that record. Save failures are reported
//! through a [`Notifier`](guildhall_core::Notifier) and never surface to the
//! caller; the in-memory state stays authoritative.
//!
//! # Example
//!
//! ```rust,ignore
//! use guildhall_storage::{EntryId, PageStorable, PagedStore};
//!
//! let store: PagedStore<Poll> = PagedStore::open(dir, 64, notifier).await?;
//! store.initial_load().await;
//! let id = store.add_entry(Poll::new("Lunch?")).await?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
mod layout;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{DEFAULT_PAGE_SIZE, EntryId, PageStorable, PagedStore};
