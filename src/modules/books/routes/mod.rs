//! HTTP surface of the Books module.

mod crud;
mod upload;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use bookshelf_db::{BookStore, StoreError};
use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::{BookSettings, UploadSettings};

use super::models::{missing_fields_error, YearRange};
use crate::utils;

/// Shared handler state
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    pub uploads: UploadSettings,
    pub books: BookSettings,
}

impl BooksState {
    /// Year window applied to payloads right now, if enforcement is on
    pub fn year_range(&self) -> Option<YearRange> {
        self.books
            .enforce_publish_year_range
            .then(|| YearRange::for_current_year(utils::current_year()))
    }
}

/// Build the module router; mounted under `/books`
pub fn router(state: BooksState) -> Router {
    let upload_limit = state.uploads.max_bytes;

    Router::new()
        .route("/", get(crud::list_books).post(crud::create_book))
        .route("/health", get(health_check))
        .route(
            "/upload-image",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/{id}",
            get(crud::get_book)
                .put(crud::update_book)
                .delete(crud::delete_book),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::Validation(missing) => missing_fields_error(&missing),
        other => AppError::Internal(anyhow::Error::new(other).context("book store operation failed")),
    }
}
