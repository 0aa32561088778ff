//! Access-layer behavior with the remote source behind the on-device cache.
//!
//! A scripted `RemoteSource` stands in for the verses API so each test
//! controls exactly what the network returns and counts how often it is hit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use gita_companion::cache::FileCache;
use gita_companion::library::Library;
use gita_companion::remote::RemoteSource;
use gita_core::error::AccessError;
use serde_json::{json, Value};
use tempfile::TempDir;

#[derive(Clone)]
enum Reply {
    Json(Value),
    NotFound,
    Fail,
}

#[derive(Default)]
struct ScriptedRemote {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl ScriptedRemote {
    fn with(self, path: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    fn set(&self, path: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(path.to_string(), reply);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSource for ScriptedRemote {
    async fn fetch(&self, path: &str) -> Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().get(path).cloned();
        match reply {
            Some(Reply::Json(v)) => Ok(Some(v)),
            Some(Reply::NotFound) | None => Ok(None),
            Some(Reply::Fail) => anyhow::bail!("connection reset"),
        }
    }

    fn origin(&self) -> &str {
        "scripted"
    }
}

fn slok(chapter: u32, verse: u32) -> Value {
    json!({
        "_id": format!("BG{}.{}", chapter, verse),
        "chapter": chapter,
        "verse": verse,
        "slok": format!("श्लोक {}.{}", chapter, verse),
        "transliteration": "ślōka",
        "tej": { "author": "Swami Tejomayananda", "ht": "हिन्दी" },
        "siva": { "author": "Swami Sivananda", "et": "English", "ec": "commentary" }
    })
}

fn chapter(n: u32, verses: u32) -> Value {
    json!({
        "chapter_number": n,
        "name": format!("अध्याय {}", n),
        "transliteration": format!("Adhyaya {}", n),
        "meaning": { "en": "Meaning", "hi": "अर्थ" },
        "summary": { "en": "Summary", "hi": "सारांश" },
        "verses_count": verses
    })
}

fn setup(remote: ScriptedRemote) -> (TempDir, Arc<ScriptedRemote>, Library) {
    let tmp = TempDir::new().unwrap();
    let remote = Arc::new(remote);
    let library = Library::remote(remote.clone(), FileCache::new(tmp.path().join("gita-cache")));
    (tmp, remote, library)
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let (tmp, remote, library) = setup(ScriptedRemote::default().with("/slok/2/47", Reply::Json(slok(2, 47))));

    let first = library.get_slok(2u32, 47u32).await.unwrap().unwrap();
    remote.set("/slok/2/47", Reply::Fail);
    let second = library.get_slok(2u32, 47u32).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.english(), Some("English"));
    assert_eq!(remote.calls(), 1);

    let files: Vec<_> = std::fs::read_dir(tmp.path().join("gita-cache"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files, vec!["slok-2-47.json"]);
}

#[tokio::test]
async fn test_not_found_is_soft_and_not_cached() {
    let (tmp, remote, library) = setup(ScriptedRemote::default().with("/slok/2/99", Reply::NotFound));

    assert!(library.get_slok(2u32, 99u32).await.unwrap().is_none());
    assert!(library.get_slok(2u32, 99u32).await.unwrap().is_none());
    assert_eq!(remote.calls(), 2);
    assert!(!tmp.path().join("gita-cache/slok-2-99.json").exists());
}

#[tokio::test]
async fn test_out_of_range_ids_never_reach_the_network() {
    let (_tmp, remote, library) = setup(ScriptedRemote::default());

    assert!(library.get_chapter(0u32).await.unwrap().is_none());
    assert!(library.get_chapter(19u32).await.unwrap().is_none());
    assert!(library.get_chapter("abc").await.unwrap().is_none());
    assert!(library.get_slok(1u32, 0u32).await.unwrap().is_none());
    assert!(library.get_slok(-1i64, 1u32).await.unwrap().is_none());
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn test_fetch_failure_surfaces() {
    let (tmp, _remote, library) = setup(ScriptedRemote::default().with("/chapter/3/", Reply::Fail));

    let err = library.get_chapter(3u32).await.unwrap_err();
    assert!(matches!(err, AccessError::FetchFailed { .. }));
    assert!(!tmp.path().join("gita-cache/chapter-3.json").exists());
}

#[tokio::test]
async fn test_chapter_list_failure_is_data_unavailable() {
    let (_tmp, _remote, library) = setup(ScriptedRemote::default().with("/chapters", Reply::Fail));

    assert!(matches!(
        library.get_chapters().await,
        Err(AccessError::DataUnavailable(_))
    ));
}

fn chapter_list(numbers: impl IntoIterator<Item = u32>) -> Value {
    Value::Array(numbers.into_iter().map(|n| chapter(n, 10)).collect())
}

#[tokio::test]
async fn test_chapter_list_sorted_and_cached() {
    let list = chapter_list((1..=18).rev());
    let (tmp, remote, library) = setup(ScriptedRemote::default().with("/chapters", Reply::Json(list)));

    let chapters = library.get_chapters().await.unwrap();
    let numbers: Vec<u32> = chapters.iter().map(|c| c.chapter_number).collect();
    assert_eq!(numbers, (1..=18).collect::<Vec<_>>());

    library.get_chapters().await.unwrap();
    assert_eq!(remote.calls(), 1);
    assert!(tmp.path().join("gita-cache/chapters.json").exists());
}

#[tokio::test]
async fn test_incomplete_chapter_list_is_rejected_and_not_cached() {
    let lists = [
        chapter_list([1, 1, 5]),
        chapter_list([2, 1]),
        chapter_list((1..=18).chain([18])),
        chapter_list((1..=17).chain([17])),
        json!([]),
    ];
    for list in lists {
        let (tmp, _remote, library) = setup(ScriptedRemote::default().with("/chapters", Reply::Json(list)));
        assert!(matches!(
            library.get_chapters().await,
            Err(AccessError::InvalidRecord { .. })
        ));
        assert!(!tmp.path().join("gita-cache/chapters.json").exists());
    }
}

#[tokio::test]
async fn test_partial_cached_chapter_list_is_refetched() {
    let (tmp, remote, library) =
        setup(ScriptedRemote::default().with("/chapters", Reply::Json(chapter_list(1..=18))));
    let cache_dir = tmp.path().join("gita-cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(
        cache_dir.join("chapters.json"),
        serde_json::to_string(&chapter_list([1, 1, 5])).unwrap(),
    )
    .unwrap();

    assert_eq!(library.get_chapters().await.unwrap().len(), 18);
    assert_eq!(remote.calls(), 1);

    let raw = std::fs::read_to_string(cache_dir.join("chapters.json")).unwrap();
    let cached: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached.as_array().unwrap().len(), 18);
}

#[tokio::test]
async fn test_corrupt_cache_entry_is_refetched_and_overwritten() {
    let (tmp, remote, library) = setup(ScriptedRemote::default().with("/chapter/2/", Reply::Json(chapter(2, 72))));
    let cache_dir = tmp.path().join("gita-cache");
    std::fs::create_dir_all(&cache_dir).unwrap();
    std::fs::write(cache_dir.join("chapter-2.json"), "{\"chapter_number\": ").unwrap();

    let chapter = library.get_chapter(2u32).await.unwrap().unwrap();
    assert_eq!(chapter.verses_count, 72);
    assert_eq!(remote.calls(), 1);

    let raw = std::fs::read_to_string(cache_dir.join("chapter-2.json")).unwrap();
    let cached: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(cached["verses_count"], 72);
}

#[tokio::test]
async fn test_unwritable_cache_still_returns_value() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let remote = Arc::new(ScriptedRemote::default().with("/slok/1/1", Reply::Json(slok(1, 1))));
    let library = Library::remote(remote.clone(), FileCache::new(&blocker));

    let verse = library.get_slok(1u32, 1u32).await.unwrap().unwrap();
    assert_eq!(verse.verse, 1);
    library.get_slok(1u32, 1u32).await.unwrap().unwrap();
    assert_eq!(remote.calls(), 2);
}

#[tokio::test]
async fn test_mismatched_payload_is_rejected_and_not_cached() {
    let (tmp, _remote, library) = setup(ScriptedRemote::default().with("/slok/2/47", Reply::Json(slok(2, 48))));

    assert!(matches!(
        library.get_slok(2u32, 47u32).await,
        Err(AccessError::InvalidRecord { .. })
    ));
    assert!(!tmp.path().join("gita-cache/slok-2-47.json").exists());
}

#[tokio::test]
async fn test_null_payload_is_not_found() {
    let (_tmp, _remote, library) = setup(ScriptedRemote::default().with("/slok/3/1", Reply::Json(Value::Null)));
    assert!(library.get_slok(3u32, 1u32).await.unwrap().is_none());
}

#[tokio::test]
async fn test_verses_of_walks_the_chapter() {
    let remote = ScriptedRemote::default()
        .with("/chapter/1/", Reply::Json(chapter(1, 3)))
        .with("/slok/1/1", Reply::Json(slok(1, 1)))
        .with("/slok/1/2", Reply::Json(slok(1, 2)))
        .with("/slok/1/3", Reply::Json(slok(1, 3)));
    let (_tmp, _remote, library) = setup(remote);

    let verses = library.verses_of("1").await.unwrap();
    let numbers: Vec<u32> = verses.iter().map(|v| v.verse).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}
