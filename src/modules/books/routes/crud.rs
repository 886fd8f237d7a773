use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_db::Book;
use bookshelf_http::error::AppError;
use uuid::Uuid;

use super::{store_error, BooksState};
use crate::modules::books::models::{BookList, BookPayload, MessageResponse};

type JsonBody = Result<Json<BookPayload>, JsonRejection>;

fn payload(body: JsonBody) -> Result<BookPayload, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

// Ids that are not even UUIDs cannot name a stored book.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| book_not_found())
}

fn book_not_found() -> AppError {
    AppError::not_found("Book not found")
}

pub(super) async fn list_books(State(state): State<BooksState>) -> Result<Json<BookList>, AppError> {
    let books = state.store.list().await.map_err(store_error)?;
    Ok(Json(BookList {
        count: books.len(),
        data: books,
    }))
}

pub(super) async fn create_book(
    State(state): State<BooksState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let draft = payload(body)?.validate(state.year_range())?.into_draft();
    let book = state.store.insert(draft).await.map_err(store_error)?;

    tracing::info!(book_id = %book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

pub(super) async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = parse_id(&id)?;
    state
        .store
        .get(id)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(book_not_found)
}

pub(super) async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<Book>, AppError> {
    let valid = payload(body)?.validate(state.year_range())?;
    let id = parse_id(&id)?;

    let current = state
        .store
        .get(id)
        .await
        .map_err(store_error)?
        .ok_or_else(book_not_found)?;

    // The record may vanish between read and write; that is still a 404.
    let book = state
        .store
        .replace(id, valid.apply_to(Some(&current)))
        .await
        .map_err(store_error)?
        .ok_or_else(book_not_found)?;

    tracing::info!(book_id = %book.id, "book updated");
    Ok(Json(book))
}

pub(super) async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await.map_err(store_error)? {
        return Err(book_not_found());
    }

    tracing::info!(book_id = %id, "book deleted");
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
