//! Client-side checks run before anything is sent to the API.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bookshelf_db::Book;
use url::Url;

use crate::client::BookInput;

pub const MIN_PUBLISH_YEAR: i32 = 1800;

/// Largest cover image the client will upload
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Raw, user-typed field values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_year: String,
    pub image_url: String,
    pub link: String,
}

/// Wire field name -> message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub BTreeMap<&'static str, &'static str>);

impl FormErrors {
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().copied().collect();
        write!(f, "Please fix the errors in the form: {}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok()
}

impl BookForm {
    /// Pre-fill from a stored book, for editing
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            publish_year: book.publish_year.to_string(),
            image_url: book.image_url.clone().unwrap_or_default(),
            link: book.link.clone().unwrap_or_default(),
        }
    }

    /// Trimmed payload, or every problem found
    pub fn validate(&self, current_year: i32) -> Result<BookInput, FormErrors> {
        let mut errors = BTreeMap::new();

        let title = self.title.trim();
        let author = self.author.trim();
        let description = self.description.trim();
        let image_url = self.image_url.trim();
        let link = self.link.trim();

        if title.is_empty() {
            errors.insert("title", "Title is required");
        }
        if author.is_empty() {
            errors.insert("author", "Author is required");
        }
        if description.is_empty() {
            errors.insert("description", "Description is required");
        }

        let year = self.publish_year.trim();
        let publish_year = if year.is_empty() {
            errors.insert("publishYear", "Publish year is required");
            None
        } else {
            match year.parse::<i32>() {
                Ok(y) if (MIN_PUBLISH_YEAR..=current_year + 1).contains(&y) => Some(y),
                _ => {
                    errors.insert("publishYear", "Please enter a valid year");
                    None
                }
            }
        };

        if !image_url.is_empty() && !is_valid_url(image_url) {
            errors.insert("imageUrl", "Please enter a valid image URL");
        }
        if !link.is_empty() && !is_valid_url(link) {
            errors.insert("link", "Please enter a valid link URL");
        }

        match publish_year {
            Some(publish_year) if errors.is_empty() => Ok(BookInput {
                title: title.to_string(),
                author: author.to_string(),
                description: description.to_string(),
                publish_year,
                image_url: image_url.to_string(),
                link: link.to_string(),
            }),
            _ => Err(FormErrors(errors)),
        }
    }
}

/// Read a local cover image, refusing anything over [`MAX_IMAGE_BYTES`]
pub async fn read_image_file(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    use anyhow::Context;

    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    if meta.len() > MAX_IMAGE_BYTES {
        anyhow::bail!("File size must be less than 5MB");
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        anyhow::bail!("{} does not look like an image", path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok((file_name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> BookForm {
        BookForm {
            title: " Dune ".to_string(),
            author: "Frank Herbert".to_string(),
            description: "Spice".to_string(),
            publish_year: "1965".to_string(),
            image_url: String::new(),
            link: "https://example.com/dune".to_string(),
        }
    }

    #[test]
    fn valid_form_is_trimmed() {
        let input = form().validate(2026).unwrap();
        assert_eq!(input.title, "Dune");
        assert_eq!(input.publish_year, 1965);
        assert_eq!(input.image_url, "");
    }

    #[test]
    fn every_error_is_collected() {
        let errors = BookForm::default().validate(2026).unwrap_err();
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("author"), Some("Author is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert_eq!(errors.get("publishYear"), Some("Publish year is required"));
        assert_eq!(errors.get("imageUrl"), None);
    }

    #[test]
    fn year_window_is_1800_to_next_year() {
        for (year, ok) in [("1799", false), ("1800", true), ("2027", true), ("2028", false), ("soon", false)] {
            let mut f = form();
            f.publish_year = year.to_string();
            assert_eq!(f.validate(2026).is_ok(), ok, "year {year}");
        }
    }

    #[test]
    fn url_shapes_are_checked() {
        let mut f = form();
        f.image_url = "cover.jpg".to_string();
        f.link = "example dot com".to_string();

        let errors = f.validate(2026).unwrap_err();
        assert_eq!(errors.get("imageUrl"), Some("Please enter a valid image URL"));
        assert_eq!(errors.get("link"), Some("Please enter a valid link URL"));
        assert!(errors.to_string().starts_with("Please fix the errors in the form"));
    }

    #[tokio::test]
    async fn oversized_images_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("huge.png");
        std::fs::write(&big, vec![0u8; (MAX_IMAGE_BYTES + 1) as usize]).unwrap();
        let err = read_image_file(&big).await.unwrap_err();
        assert!(err.to_string().contains("less than 5MB"));

        let small = dir.path().join("cover.png");
        std::fs::write(&small, b"png").unwrap();
        let (name, bytes) = read_image_file(&small).await.unwrap();
        assert_eq!(name, "cover.png");
        assert_eq!(bytes, b"png");
    }

    #[tokio::test]
    async fn non_image_files_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();
        assert!(read_image_file(&notes).await.is_err());
    }
}
