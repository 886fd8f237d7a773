use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A persisted book document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier, never changes after insert
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied fields of a book, before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl BookDraft {
    /// Wire names of required text fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub(crate) fn into_book(self, id: Uuid, created_at: OffsetDateTime) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            publish_year: self.publish_year,
            image_url: self.image_url,
            link: self.link,
            created_at,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookDraft {
        BookDraft {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            description: "Desert planet".to_string(),
            publish_year: 1965,
            image_url: None,
            link: None,
        }
    }

    #[test]
    fn complete_draft_has_no_missing_fields() {
        assert!(draft().missing_fields().is_empty());
    }

    #[test]
    fn blank_fields_are_reported_in_schema_order() {
        let mut d = draft();
        d.title = "  ".to_string();
        d.description = String::new();
        assert_eq!(d.missing_fields(), vec!["title", "description"]);
    }

    #[test]
    fn book_serializes_with_wire_names() {
        let now = OffsetDateTime::now_utc();
        let book = draft().into_book(Uuid::now_v7(), now);
        let value = serde_json::to_value(&book).unwrap();

        assert!(value.get("_id").is_some());
        assert_eq!(value["publishYear"], 1965);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("imageUrl").is_none());
    }
}
