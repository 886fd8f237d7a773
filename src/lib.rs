//! Bookshelf application library
//!
//! Feature modules plus the wiring that turns settings and a book store into a
//! ready-to-serve router.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use axum::Router;
use bookshelf_db::BookStore;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Registry holding every application module, backed by `store`
pub fn build_registry(store: Arc<dyn BookStore>, settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings)?;
    Ok(registry)
}

/// Full HTTP application (module routes, static uploads, docs, middleware)
pub fn build_app(store: Arc<dyn BookStore>, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(store, settings)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}
