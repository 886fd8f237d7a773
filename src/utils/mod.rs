//! Project-specific utilities live here.

use bookshelf_kernel::settings::UploadSettings;
use time::OffsetDateTime;

/// Formats a shared log target prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("bookshelf::{module}")
}

pub fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

/// Public URL of an uploaded file.
///
/// Uses `public_base_url` when configured, then the request's `Host`, and as a
/// last resort a path relative to the server root.
pub fn public_upload_url(uploads: &UploadSettings, host: Option<&str>, file_name: &str) -> String {
    let prefix = uploads.url_prefix.trim_end_matches('/');
    match (uploads.public_base_url.as_deref(), host) {
        (Some(base), _) => format!("{}{}/{}", base.trim_end_matches('/'), prefix, file_name),
        (None, Some(host)) => format!("http://{host}{prefix}/{file_name}"),
        (None, None) => format!("{prefix}/{file_name}"),
    }
}
