use std::path::PathBuf;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{Book, BookDraft};
use crate::store::{check_required, sort_by_creation, BookStore};

const DOC_PREFIX: &str = "book-";
const DOC_EXT: &str = ".json";

/// Directory-backed store holding one JSON document per book.
///
/// Every write goes to a temp file that is renamed over the target, so readers
/// never observe a half-written document.
pub struct FsStore {
    root: PathBuf,
    // Serializes read-modify-write sequences within this process.
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn doc_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{DOC_PREFIX}{id}{DOC_EXT}"))
    }

    async fn read_doc(&self, id: &Uuid) -> Result<Option<Book>> {
        match fs::read(self.doc_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_doc(&self, book: &Book) -> Result<()> {
        let content = serde_json::to_vec_pretty(book)?;
        let tmp = self.root.join(format!(".{DOC_PREFIX}{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, self.doc_path(&book.id)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

fn parse_doc_id(name: &str) -> Option<Uuid> {
    let stem = name.strip_prefix(DOC_PREFIX)?.strip_suffix(DOC_EXT)?;
    Uuid::parse_str(stem).ok()
}

#[async_trait]
impl BookStore for FsStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn insert(&self, draft: BookDraft) -> Result<Book> {
        check_required(&draft)?;
        let book = draft.into_book(Uuid::now_v7(), OffsetDateTime::now_utc());
        let _guard = self.write_lock.lock().await;
        self.write_doc(&book).await?;
        tracing::debug!(book_id = %book.id, path = %self.root.display(), "book document written");
        Ok(book)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Book>> {
        self.read_doc(&id).await
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let mut books = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(parse_doc_id) else {
                continue;
            };
            // A concurrent delete can remove the file between listing and reading.
            match self.read_doc(&id).await {
                Ok(Some(book)) => books.push(book),
                Ok(None) => {}
                Err(StoreError::Serialization(e)) => {
                    tracing::warn!(
                        file = %entry.path().display(),
                        error = %e,
                        "skipping unreadable book document"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        sort_by_creation(&mut books);
        Ok(books)
    }

    async fn replace(&self, id: Uuid, draft: BookDraft) -> Result<Option<Book>> {
        check_required(&draft)?;
        let _guard = self.write_lock.lock().await;
        let Some(existing) = self.read_doc(&id).await? else {
            return Ok(None);
        };
        let book = draft.into_book(id, existing.created_at);
        self.write_doc(&book).await?;
        tracing::debug!(book_id = %id, "book document replaced");
        Ok(Some(book))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.doc_path(&id)).await {
            Ok(()) => {
                tracing::debug!(book_id = %id, "book document removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
