pub mod models;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use bookshelf_db::BookStore;
use bookshelf_kernel::{settings::Settings, InitCtx, Module};

use crate::utils;
use routes::BooksState;

/// Books module: CRUD over the book store plus cover image uploads
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>, settings: &Settings) -> Self {
        Self {
            state: BooksState {
                store,
                uploads: settings.uploads.clone(),
                books: settings.books.clone(),
            },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let dir = &self.state.uploads.dir;
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create uploads directory {}", dir.display()))?;

        tracing::info!(
            module = self.name(),
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            uploads = %dir.display(),
            enforce_year_range = self.state.books.enforce_publish_year_range,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self
            .state
            .store
            .list()
            .await
            .context("book store is not readable")?
            .len();
        tracing::info!(
            module = self.name(),
            backend = self.state.store.backend(),
            books = count,
            "books module started"
        );
        Ok(())
    }

    async fn health(&self) -> anyhow::Result<()> {
        self.state
            .store
            .list()
            .await
            .context("book store is not readable")?;

        let dir = &self.state.uploads.dir;
        let meta = tokio::fs::metadata(dir)
            .await
            .with_context(|| format!("uploads directory {} is missing", dir.display()))?;
        anyhow::ensure!(meta.is_dir(), "{} is not a directory", dir.display());
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn BookStore>, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, settings))
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });
    let input_body = serde_json::json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    });
    let id_param = serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    });

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", serde_json::json!({
                            "$ref": "#/components/schemas/BookList"
                        })),
                        "500": error_response("Internal server error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": input_body.clone(),
                    "responses": {
                        "201": json_response("Created book", book_ref.clone()),
                        "400": error_response("Malformed JSON body"),
                        "422": error_response("Missing or invalid fields"),
                        "500": error_response("Internal server error")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch one book",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "responses": {
                        "200": json_response("The book", book_ref.clone()),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace a book",
                    "description": "Optional fields omitted from the body keep their stored value; an empty string clears them.",
                    "tags": ["Books"],
                    "parameters": [id_param.clone()],
                    "requestBody": input_body,
                    "responses": {
                        "200": json_response("Updated book", book_ref),
                        "400": error_response("Malformed JSON body"),
                        "404": error_response("Book not found"),
                        "422": error_response("Missing or invalid fields")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id_param],
                    "responses": {
                        "200": json_response("Deletion confirmation", serde_json::json!({
                            "$ref": "#/components/schemas/Message"
                        })),
                        "404": error_response("Book not found")
                    }
                }
            },
            "/upload-image": {
                "post": {
                    "summary": "Upload a cover image",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "multipart/form-data": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "image": { "type": "string", "format": "binary" }
                                    },
                                    "required": ["image"]
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response("Stored image location", serde_json::json!({
                            "$ref": "#/components/schemas/UploadResult"
                        })),
                        "400": error_response("Missing, empty or non-image upload")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": { "schema": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "_id": { "type": "string", "format": "uuid", "description": "Unique identifier for the book" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "description": { "type": "string" },
                        "publishYear": { "type": "integer" },
                        "imageUrl": { "type": "string", "format": "uri" },
                        "link": { "type": "string", "format": "uri" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["_id", "title", "author", "description", "publishYear", "createdAt", "updatedAt"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "description": { "type": "string" },
                        "publishYear": { "type": "integer", "minimum": 1800 },
                        "imageUrl": { "type": "string" },
                        "link": { "type": "string" }
                    },
                    "required": ["title", "author", "description", "publishYear"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "data": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                    },
                    "required": ["count", "data"]
                },
                "Message": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                },
                "UploadResult": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "imageUrl": { "type": "string", "format": "uri" }
                    },
                    "required": ["imageUrl"]
                }
            }
        }
    })
}
