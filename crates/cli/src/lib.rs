//! Terminal client for the Bookshelf API: a typed HTTP client plus the form
//! checks, search filter and text views the `bookshelf` binary is built from.

pub mod client;
pub mod error;
pub mod filter;
pub mod form;
pub mod render;

pub use client::{BookInput, BookshelfClient};
pub use error::ClientError;
pub use form::{BookForm, FormErrors};
