use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{Book, BookDraft};

/// Persistent collection of book documents.
///
/// Implementations assign ids and timestamps; callers only ever hand in drafts.
/// Concurrent writers to the same id resolve last-write-wins.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;

    /// Persist a new book and return it with its generated id.
    async fn insert(&self, draft: BookDraft) -> Result<Book>;

    async fn get(&self, id: Uuid) -> Result<Option<Book>>;

    /// All books in creation order.
    async fn list(&self) -> Result<Vec<Book>>;

    /// Overwrite every draft field of an existing book. `None` if the id is unknown.
    async fn replace(&self, id: Uuid, draft: BookDraft) -> Result<Option<Book>>;

    /// Returns `true` if a book was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Schema-level check shared by every backend.
pub(crate) fn check_required(draft: &BookDraft) -> Result<()> {
    let missing = draft.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(missing))
    }
}

pub(crate) fn sort_by_creation(books: &mut [Book]) {
    books.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
