use super::*;

use guildhall_test::RecordingNotifier;
use serde_json::json;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    id: EntryId,
    text: String,
}

impl Note {
    fn new(text: impl Into<String>) -> Self {
        Self {
            id: EntryId::default(),
            text: text.into(),
        }
    }
}

impl PageStorable for Note {
    fn id(&self) -> EntryId {
        self.id
    }

    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
}

async fn open(dir: &Path, notifier: &RecordingNotifier) -> PagedStore<Note> {
    PagedStore::open(dir, DEFAULT_PAGE_SIZE, Arc::new(notifier.clone()))
        .await
        .unwrap()
}

async fn filled(dir: &Path, count: u64) -> PagedStore<Note> {
    let store = open(dir, &RecordingNotifier::new()).await;
    for i in 0..count {
        store.add_entry(Note::new(format!("note {i}"))).await.unwrap();
    }
    store
}

async fn page_files(dir: &Path) -> Vec<usize> {
    layout::list_pages(dir)
        .await
        .unwrap()
        .into_iter()
        .map(|(index, _)| index)
        .collect()
}

#[tokio::test]
async fn open_rejects_zero_page_size() {
    let dir = TempDir::new().unwrap();
    let result =
        PagedStore::<Note>::open(dir.path(), 0, Arc::new(RecordingNotifier::new())).await;
    assert!(matches!(result, Err(StorageError::InvalidPageSize(0))));
}

#[tokio::test]
async fn open_creates_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("guilds").join("polls");

    let store = open(&nested, &RecordingNotifier::new()).await;

    assert!(nested.is_dir());
    assert_eq!(store.dir(), nested);
    assert_eq!(store.page_size(), DEFAULT_PAGE_SIZE);
}

#[tokio::test]
async fn initial_load_without_counter_fails_and_stays_empty() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(
        dir.path().join("page-0.json"),
        json!([{"id": 0, "text": "orphan"}]).to_string(),
    )
    .await
    .unwrap();
    let notifier = RecordingNotifier::new();
    let store = open(dir.path(), &notifier).await;

    assert!(!store.initial_load().await);
    assert!(store.is_empty().await);
    assert_eq!(store.next_id().await, Some(EntryId(0)));
    assert_eq!(notifier.count("storage_failure"), 1);
}

#[tokio::test]
async fn initial_load_of_fresh_directory_is_quiet() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let store = open(dir.path(), &notifier).await;

    assert!(!store.initial_load().await);
    assert!(store.is_empty().await);
    assert_eq!(notifier.count("storage_failure"), 0);
}

#[tokio::test]
async fn initial_load_with_unreadable_counter_fails() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), "not json")
        .await
        .unwrap();
    let store = open(dir.path(), &RecordingNotifier::new()).await;

    assert!(!store.initial_load().await);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn add_assigns_monotonic_ids() {
    let dir = TempDir::new().unwrap();
    let store = open(dir.path(), &RecordingNotifier::new()).await;

    let a = store.add_entry(Note::new("a")).await.unwrap();
    let b = store.add_entry(Note::new("b")).await.unwrap();

    assert_eq!((a, b), (EntryId(0), EntryId(1)));
    assert_eq!(store.get(b).await.unwrap().text, "b");
    assert_eq!(store.get(b).await.unwrap().id, b);
    assert_eq!(store.next_id().await, Some(EntryId(2)));
}

#[tokio::test]
async fn ids_are_never_reused_after_removal() {
    let dir = TempDir::new().unwrap();
    let store = filled(dir.path(), 3).await;

    assert!(store.remove_entry(EntryId(2)).await);
    let next = store.add_entry(Note::new("after")).await.unwrap();

    assert_eq!(next, EntryId(3));
    assert!(!store.has(EntryId(2)).await);

    // Also across a reload.
    let reloaded = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(reloaded.initial_load().await);
    assert_eq!(reloaded.add_entry(Note::new("later")).await.unwrap(), EntryId(4));
}

#[tokio::test]
async fn remove_unknown_id_is_false() {
    let dir = TempDir::new().unwrap();
    let store = filled(dir.path(), 2).await;

    assert!(!store.remove_entry(EntryId(7)).await);
    assert!(store.remove_entry(EntryId(0)).await);
    assert!(!store.remove_entry(EntryId(0)).await);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn round_trip_spans_three_pages() {
    let dir = TempDir::new().unwrap();
    let original = filled(dir.path(), 130).await;

    assert_eq!(page_files(dir.path()).await, vec![0, 1, 2]);

    let reloaded = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(reloaded.initial_load().await);
    assert_eq!(reloaded.entries().await, original.entries().await);
    assert_eq!(reloaded.len().await, 130);
    assert_eq!(reloaded.next_id().await, Some(EntryId(130)));
    assert_eq!(reloaded.get(EntryId(129)).await.unwrap().text, "note 129");
}

#[tokio::test]
async fn corrupted_page_costs_only_that_page() {
    let dir = TempDir::new().unwrap();
    filled(dir.path(), 150).await;
    tokio::fs::write(dir.path().join("page-1.json"), "{ this is not json")
        .await
        .unwrap();

    let notifier = RecordingNotifier::new();
    let store = open(dir.path(), &notifier).await;
    assert!(store.initial_load().await);

    let ids: Vec<u64> = store.entries().await.iter().map(|n| n.id.get()).collect();
    let expected: Vec<u64> = (0..64).chain(128..150).collect();
    assert_eq!(ids.len(), 86);
    assert_eq!(ids, expected);
    assert_eq!(notifier.count("storage_failure"), 1);
}

#[tokio::test]
async fn malformed_record_costs_only_that_record() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), r#"{"Id": 3}"#)
        .await
        .unwrap();
    tokio::fs::write(
        dir.path().join("page-0.json"),
        json!([
            {"id": 0, "text": "first"},
            {"id": "one", "text": 1},
            {"id": 2, "text": "third"},
        ])
        .to_string(),
    )
    .await
    .unwrap();

    let store = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(store.initial_load().await);

    let texts: Vec<String> = store.entries().await.into_iter().map(|n| n.text).collect();
    assert_eq!(texts, vec!["first", "third"]);
}

#[tokio::test]
async fn duplicate_ids_keep_first_seen() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), r#"{"Id": 2}"#)
        .await
        .unwrap();
    tokio::fs::write(
        dir.path().join("page-0.json"),
        json!([{"id": 0, "text": "original"}, {"id": 1, "text": "other"}]).to_string(),
    )
    .await
    .unwrap();
    tokio::fs::write(
        dir.path().join("page-1.json"),
        json!([{"id": 0, "text": "copy"}]).to_string(),
    )
    .await
    .unwrap();

    let store = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(store.initial_load().await);

    assert_eq!(store.len().await, 2);
    assert_eq!(store.get(EntryId(0)).await.unwrap().text, "original");
}

#[tokio::test]
async fn stale_counter_is_advanced_past_loaded_ids() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), r#"{"Id": 1}"#)
        .await
        .unwrap();
    tokio::fs::write(
        dir.path().join("page-0.json"),
        json!([{"id": 0, "text": "a"}, {"id": 5, "text": "b"}]).to_string(),
    )
    .await
    .unwrap();

    let store = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(store.initial_load().await);

    assert_eq!(store.next_id().await, Some(EntryId(6)));
    assert!(store.has(EntryId(5)).await);
    assert_eq!(store.add_entry(Note::new("c")).await.unwrap(), EntryId(6));
}

#[tokio::test]
async fn removal_rewrites_pages_and_drops_trailing_page() {
    let dir = TempDir::new().unwrap();
    let store = filled(dir.path(), 65).await;
    assert_eq!(page_files(dir.path()).await, vec![0, 1]);

    assert!(store.remove_entry(EntryId(10)).await);
    assert_eq!(page_files(dir.path()).await, vec![0]);

    let reloaded = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(reloaded.initial_load().await);
    assert_eq!(reloaded.len().await, 64);
    assert!(!reloaded.has(EntryId(10)).await);
    assert!(reloaded.has(EntryId(64)).await);
}

#[tokio::test]
async fn update_persists_and_preserves_id() {
    let dir = TempDir::new().unwrap();
    let store = filled(dir.path(), 70).await;

    let updated = store
        .update_entry(EntryId(66), |note| {
            note.text = "edited".to_string();
            note.id = EntryId(999);
        })
        .await;
    assert!(updated);
    assert!(!store.update_entry(EntryId(500), |_| {}).await);

    let reloaded = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(reloaded.initial_load().await);
    let note = reloaded.get(EntryId(66)).await.unwrap();
    assert_eq!(note.text, "edited");
    assert_eq!(note.id, EntryId(66));
}

#[tokio::test]
async fn find_returns_first_match() {
    let dir = TempDir::new().unwrap();
    let store = filled(dir.path(), 5).await;

    let found = store.find(|n| n.text.ends_with('3')).await.unwrap();
    assert_eq!(found.id, EntryId(3));
    assert!(store.find(|n| n.text.is_empty()).await.is_none());
}

#[tokio::test]
async fn temp_files_are_ignored_on_load() {
    let dir = TempDir::new().unwrap();
    filled(dir.path(), 2).await;
    tokio::fs::write(
        dir.path().join("page-0.json.tmp"),
        json!([{"id": 0, "text": "half written"}]).to_string(),
    )
    .await
    .unwrap();

    let store = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(store.initial_load().await);
    assert_eq!(store.get(EntryId(0)).await.unwrap().text, "note 0");
}

#[tokio::test]
async fn save_failure_is_reported_and_memory_stays_authoritative() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::new();
    let store = open(dir.path(), &notifier).await;
    // A directory where the page file should go makes the rename fail.
    tokio::fs::create_dir(dir.path().join("page-0.json"))
        .await
        .unwrap();

    let id = store.add_entry(Note::new("kept")).await.unwrap();

    assert!(store.has(id).await);
    assert_eq!(store.get(id).await.unwrap().text, "kept");
    assert!(notifier.count("storage_failure") >= 1);
}

#[tokio::test]
async fn exhausted_counter_refuses_new_entries() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), r#"{"Id": 18446744073709551615}"#)
        .await
        .unwrap();
    let notifier = RecordingNotifier::new();
    let store = open(dir.path(), &notifier).await;
    assert!(store.initial_load().await);

    let last = store.add_entry(Note::new("last")).await.unwrap();
    assert_eq!(last, EntryId(u64::MAX));
    assert_eq!(store.next_id().await, None);

    let refused = store.add_entry(Note::new("one too many")).await;
    assert!(matches!(refused, Err(StorageError::IdSpaceExhausted(_))));
    assert_eq!(store.len().await, 1);
    assert!(store.has(last).await);
    assert_eq!(notifier.count("storage_failure"), 1);

    // The exhaustion survives a reload.
    let reloaded = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(reloaded.initial_load().await);
    assert_eq!(reloaded.next_id().await, None);
    assert!(reloaded.add_entry(Note::new("again")).await.is_err());
}

#[tokio::test]
async fn loaded_entry_at_max_id_exhausts_the_store() {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("Id.json"), r#"{"Id": 1}"#)
        .await
        .unwrap();
    tokio::fs::write(
        dir.path().join("page-0.json"),
        json!([{"id": 0, "text": "a"}, {"id": u64::MAX, "text": "max"}]).to_string(),
    )
    .await
    .unwrap();

    let store = open(dir.path(), &RecordingNotifier::new()).await;
    assert!(store.initial_load().await);

    assert_eq!(store.next_id().await, None);
    assert_eq!(store.get(EntryId(u64::MAX)).await.unwrap().text, "max");
    assert!(store.add_entry(Note::new("b")).await.is_err());
    assert_eq!(store.len().await, 2);
}
