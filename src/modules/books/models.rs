use bookshelf_db::{Book, BookDraft};
use bookshelf_http::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Earliest publish year the API accepts when range checks are on.
pub const MIN_PUBLISH_YEAR: i32 = 1800;

/// `publishYear` as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl YearInput {
    fn to_year(&self) -> Option<i32> {
        match self {
            YearInput::Integer(n) => i32::try_from(*n).ok(),
            YearInput::Float(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => {
                Some(*f as i32)
            }
            YearInput::Float(_) => None,
            YearInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Request body for create and update. Every field is optional at the wire
/// level so missing ones can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publish_year: Option<YearInput>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// What a request wants done with an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Field absent from the body
    Keep,
    /// Field sent as an empty string
    Clear,
    Set(String),
}

impl FieldChange {
    fn from_wire(value: Option<String>) -> Self {
        match value {
            None => FieldChange::Keep,
            Some(v) if v.trim().is_empty() => FieldChange::Clear,
            Some(v) => FieldChange::Set(v),
        }
    }

    fn resolve(self, current: Option<String>) -> Option<String> {
        match self {
            FieldChange::Keep => current,
            FieldChange::Clear => None,
            FieldChange::Set(v) => Some(v),
        }
    }
}

/// A payload that passed API-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_year: i32,
    pub image_url: FieldChange,
    pub link: FieldChange,
}

impl ValidBook {
    /// Draft for a brand-new record; nothing to keep, so `Keep` means unset.
    pub fn into_draft(self) -> BookDraft {
        self.apply_to(None)
    }

    /// Draft replacing `current`, carrying over optional fields the body omitted.
    pub fn apply_to(self, current: Option<&Book>) -> BookDraft {
        let (image_url, link) = match current {
            Some(book) => (book.image_url.clone(), book.link.clone()),
            None => (None, None),
        };
        BookDraft {
            title: self.title,
            author: self.author,
            description: self.description,
            publish_year: self.publish_year,
            image_url: self.image_url.resolve(image_url),
            link: self.link.resolve(link),
        }
    }
}

/// Allowed `publishYear` window; `None` disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// `[1800, current_year + 1]`
    pub fn for_current_year(current_year: i32) -> Self {
        Self {
            min: MIN_PUBLISH_YEAR,
            max: current_year + 1,
        }
    }
}

impl BookPayload {
    pub fn validate(self, range: Option<YearRange>) -> Result<ValidBook, AppError> {
        fn required(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let title = required(self.title);
        let author = required(self.author);
        let description = required(self.description);

        let mut missing = Vec::new();
        if title.is_none() {
            missing.push("title");
        }
        if author.is_none() {
            missing.push("author");
        }
        if description.is_none() {
            missing.push("description");
        }
        if self.publish_year.is_none() {
            missing.push("publishYear");
        }
        if !missing.is_empty() {
            return Err(missing_fields_error(&missing));
        }

        let publish_year = match self.publish_year.as_ref().and_then(YearInput::to_year) {
            Some(year) => year,
            None => {
                return Err(AppError::validation(
                    vec![json!({"field": "publishYear", "error": "not_an_integer"})],
                    "publishYear must be a whole number",
                ))
            }
        };

        if let Some(range) = range {
            if publish_year < range.min || publish_year > range.max {
                return Err(AppError::validation(
                    vec![json!({
                        "field": "publishYear",
                        "error": "out_of_range",
                        "min": range.min,
                        "max": range.max,
                    })],
                    format!(
                        "publishYear must be between {} and {}",
                        range.min, range.max
                    ),
                ));
            }
        }

        Ok(ValidBook {
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            description: description.unwrap_or_default(),
            publish_year,
            image_url: FieldChange::from_wire(self.image_url),
            link: FieldChange::from_wire(self.link),
        })
    }
}

/// 422 naming every missing required field.
pub fn missing_fields_error(missing: &[&str]) -> AppError {
    let details = missing
        .iter()
        .map(|field| json!({"field": field, "error": "required"}))
        .collect();
    AppError::validation(
        details,
        format!("Send all required fields: {}", missing.join(", ")),
    )
}

/// Response body of `GET /books`
#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub count: usize,
    pub data: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
}
