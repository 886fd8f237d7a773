use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{Book, BookDraft};
use crate::store::{check_required, sort_by_creation, BookStore};

/// In-process store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    books: RwLock<HashMap<Uuid, Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, draft: BookDraft) -> Result<Book> {
        check_required(&draft)?;
        let book = draft.into_book(Uuid::now_v7(), OffsetDateTime::now_utc());
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        sort_by_creation(&mut books);
        Ok(books)
    }

    async fn replace(&self, id: Uuid, draft: BookDraft) -> Result<Option<Book>> {
        check_required(&draft)?;
        let mut books = self.books.write().await;
        let Some(existing) = books.get_mut(&id) else {
            return Ok(None);
        };
        *existing = draft.into_book(id, existing.created_at);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.books.write().await.remove(&id).is_some())
    }
}
