use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::{NoteError, NoteResult};
use crate::models::note::{Note, NoteDraft, NoteSummary};

pub const DEFAULT_PER_PAGE: usize = 15;
pub const MAX_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl ListQuery {
    fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> usize {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub last_page: usize,
}

/// Storage for notes, scoped by owner.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// The user's notes, most recently updated first
    async fn list(&self, user_id: &str, query: &ListQuery) -> NoteResult<Page<NoteSummary>>;

    async fn get(&self, user_id: &str, id: u64) -> NoteResult<Note>;

    async fn create(&self, user_id: &str, draft: NoteDraft) -> NoteResult<Note>;

    async fn update(&self, user_id: &str, id: u64, draft: NoteDraft) -> NoteResult<Note>;

    async fn delete(&self, user_id: &str, id: u64) -> NoteResult<()>;

    /// Every note the user owns, in no particular order
    async fn all_for_user(&self, user_id: &str) -> NoteResult<Vec<Note>>;
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    notes: BTreeMap<u64, Note>,
}

/// A process-local [`NoteStore`].
#[derive(Default)]
pub struct InMemoryNoteStore {
    inner: RwLock<Inner>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned<'a>(notes: &'a BTreeMap<u64, Note>, user_id: &str, id: u64) -> NoteResult<&'a Note> {
    let note = notes.get(&id).ok_or(NoteError::NotFound(id))?;
    if note.user_id != user_id {
        return Err(NoteError::Forbidden(id));
    }
    Ok(note)
}

fn matches(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
        || note.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self, user_id: &str, query: &ListQuery) -> NoteResult<Page<NoteSummary>> {
        let inner = self.inner.read().await;
        let needle = query.needle();

        let mut notes: Vec<&Note> = inner
            .notes
            .values()
            .filter(|note| note.user_id == user_id)
            .filter(|note| needle.as_deref().map_or(true, |n| matches(note, n)))
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let page = query.page();
        let per_page = query.per_page();
        let total = notes.len();
        let data = notes
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .map(Note::summary)
            .collect();

        Ok(Page {
            data,
            page,
            per_page,
            total,
            last_page: total.div_ceil(per_page).max(1),
        })
    }

    async fn get(&self, user_id: &str, id: u64) -> NoteResult<Note> {
        let inner = self.inner.read().await;
        owned(&inner.notes, user_id, id).cloned()
    }

    async fn create(&self, user_id: &str, draft: NoteDraft) -> NoteResult<Note> {
        draft.validate()?;
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let note = Note {
            id: inner.next_id,
            user_id: user_id.to_string(),
            tags: draft.normalized_tags(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, user_id: &str, id: u64, draft: NoteDraft) -> NoteResult<Note> {
        let mut inner = self.inner.write().await;
        owned(&inner.notes, user_id, id)?;
        draft.validate()?;

        let tags = draft.normalized_tags();
        let note = inner.notes.get_mut(&id).ok_or(NoteError::NotFound(id))?;
        note.title = draft.title;
        note.content = draft.content;
        note.tags = tags;
        note.updated_at = Utc::now();
        Ok(note.clone())
    }

    async fn delete(&self, user_id: &str, id: u64) -> NoteResult<()> {
        let mut inner = self.inner.write().await;
        owned(&inner.notes, user_id, id)?;
        inner.notes.remove(&id);
        Ok(())
    }

    async fn all_for_user(&self, user_id: &str) -> NoteResult<Vec<Note>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .values()
            .filter(|note| note.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str, tags: &[&str]) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryNoteStore::new();
        let note = store
            .create("alice", draft("Groceries", "milk, eggs", &[" food ", ""]))
            .await
            .unwrap();

        assert_eq!(note.id, 1);
        assert_eq!(note.tags, vec!["food"]);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(store.get("alice", note.id).await.unwrap(), note);
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let store = InMemoryNoteStore::new();
        let note = store.create("alice", draft("Private", "secret", &[])).await.unwrap();

        assert_eq!(store.get("bob", note.id).await, Err(NoteError::Forbidden(note.id)));
        assert_eq!(
            store.update("bob", note.id, draft("Mine", "now", &[])).await,
            Err(NoteError::Forbidden(note.id))
        );
        assert_eq!(store.delete("bob", note.id).await, Err(NoteError::Forbidden(note.id)));
        assert_eq!(store.get("alice", 42).await, Err(NoteError::NotFound(42)));
        assert!(store.get("alice", note.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let store = InMemoryNoteStore::new();
        let note = store.create("alice", draft("Old", "old body", &["a"])).await.unwrap();

        let updated = store
            .update("alice", note.id, draft("New", "new body", &["b", "c"]))
            .await
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "new body");
        assert_eq!(updated.tags, vec!["b", "c"]);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let store = InMemoryNoteStore::new();
        assert!(matches!(
            store.create("alice", draft("", "body", &[])).await,
            Err(NoteError::Validation(_))
        ));
        let note = store.create("alice", draft("Ok", "body", &[])).await.unwrap();
        assert!(matches!(
            store.update("alice", note.id, draft("Ok", " ", &[])).await,
            Err(NoteError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryNoteStore::new();
        let note = store.create("alice", draft("Gone", "soon", &[])).await.unwrap();
        store.delete("alice", note.id).await.unwrap();
        assert_eq!(store.get("alice", note.id).await, Err(NoteError::NotFound(note.id)));
        assert_eq!(store.delete("alice", note.id).await, Err(NoteError::NotFound(note.id)));
    }

    #[tokio::test]
    async fn test_list_orders_and_scopes_by_user() {
        let store = InMemoryNoteStore::new();
        let first = store.create("alice", draft("First", "one", &[])).await.unwrap();
        let second = store.create("alice", draft("Second", "two", &[])).await.unwrap();
        store.create("bob", draft("Other", "three", &[])).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update("alice", first.id, draft("First edited", "one", &[]))
            .await
            .unwrap();

        let page = store.list("alice", &ListQuery::default()).await.unwrap();
        let ids: Vec<u64> = page.data.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_list_search_matches_title_content_and_tags() {
        let store = InMemoryNoteStore::new();
        store.create("alice", draft("Rust book", "chapter 1", &[])).await.unwrap();
        store.create("alice", draft("Cooking", "use RUSTIC bread", &[])).await.unwrap();
        store.create("alice", draft("Travel", "Lisbon", &["rust-belt"])).await.unwrap();
        store.create("alice", draft("Unrelated", "nothing", &[])).await.unwrap();

        let query = ListQuery {
            search: Some("  Rust ".to_string()),
            ..Default::default()
        };
        let page = store.list("alice", &query).await.unwrap();
        assert_eq!(page.total, 3);
        assert!(page.data.iter().all(|n| n.title != "Unrelated"));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let store = InMemoryNoteStore::new();
        for i in 0..5 {
            store
                .create("alice", draft(&format!("Note {i}"), "body", &[]))
                .await
                .unwrap();
        }

        let query = ListQuery {
            page: Some(3),
            per_page: Some(2),
            ..Default::default()
        };
        let page = store.list("alice", &query).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 5);
        assert_eq!(page.last_page, 3);

        let beyond = ListQuery {
            page: Some(9),
            per_page: Some(0),
            ..Default::default()
        };
        let page = store.list("alice", &beyond).await.unwrap();
        assert_eq!(page.per_page, 1);
        assert!(page.data.is_empty());

        let empty = store.list("nobody", &ListQuery::default()).await.unwrap();
        assert_eq!(empty.last_page, 1);
        assert_eq!(empty.per_page, DEFAULT_PER_PAGE);
    }

    #[tokio::test]
    async fn test_list_truncates_content_preview() {
        let store = InMemoryNoteStore::new();
        store
            .create("alice", draft("Long", &"a".repeat(250), &[]))
            .await
            .unwrap();
        let page = store.list("alice", &ListQuery::default()).await.unwrap();
        assert_eq!(page.data[0].content, format!("{}...", "a".repeat(200)));
    }
}
