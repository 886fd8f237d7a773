//! Book document store: the `BookStore` contract, its backends, and the
//! connection factory that picks one from a database URL.

use std::sync::Arc;

pub mod error;
pub mod fs;
pub mod memory;
pub mod model;
pub mod store;

pub use error::StoreError;
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use model::{Book, BookDraft};
pub use store::BookStore;

/// Open the store named by `url`.
///
/// `memory://` yields an in-process store; `file://<dir>` or a bare path yields a
/// directory of JSON documents.
pub async fn connect(url: &str) -> error::Result<Arc<dyn BookStore>> {
    let url = url.trim();

    let store: Arc<dyn BookStore> = if url == "memory://" || url == "memory" {
        Arc::new(MemoryStore::new())
    } else if let Some(path) = url.strip_prefix("file://") {
        Arc::new(FsStore::open(path).await?)
    } else if !url.is_empty() && !url.contains("://") {
        Arc::new(FsStore::open(url).await?)
    } else {
        return Err(StoreError::UnsupportedUrl(url.to_string()));
    };

    tracing::info!(target: "bookshelf-db", backend = store.backend(), "book store connected");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_memory() {
        let store = connect("memory://").await.unwrap();
        assert_eq!(store.backend(), "memory");
    }

    #[tokio::test]
    async fn connect_file_url_and_bare_path() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file://{}", dir.path().join("books").display());
        assert_eq!(connect(&url).await.unwrap().backend(), "file");

        let bare = dir.path().join("other");
        assert_eq!(connect(bare.to_str().unwrap()).await.unwrap().backend(), "file");
        assert!(bare.is_dir());
    }

    #[tokio::test]
    async fn connect_rejects_unknown_scheme() {
        let err = connect("mongodb://localhost:27017/books").await.err().unwrap();
        assert!(matches!(err, StoreError::UnsupportedUrl(_)));
    }
}
