//! Typed HTTP client for the Bookshelf API.

use bookshelf_db::Book;
use reqwest::{multipart, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};

/// Body sent on create and full replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: String,
    pub publish_year: i32,
    /// Empty means "no cover"; on replace it clears a stored one
    pub image_url: String,
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct BookList {
    data: Vec<Book>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Uploaded {
    image_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// One call per method, no retries
#[derive(Debug, Clone)]
pub struct BookshelfClient {
    http: reqwest::Client,
    base: Url,
}

impl BookshelfClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|source| ClientError::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::BaseUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let response = self.http.get(self.endpoint(&["books"])).send().await?;
        let list: BookList = check(response).await?.json().await?;
        Ok(list.data)
    }

    pub async fn get_book(&self, id: &str) -> Result<Book> {
        let response = self.http.get(self.endpoint(&["books", id])).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn create_book(&self, input: &BookInput) -> Result<Book> {
        let response = self
            .http
            .post(self.endpoint(&["books"]))
            .json(input)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn update_book(&self, id: &str, input: &BookInput) -> Result<Book> {
        let response = self
            .http
            .put(self.endpoint(&["books", id]))
            .json(input)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Returns the server's confirmation message
    pub async fn delete_book(&self, id: &str) -> Result<String> {
        let response = self
            .http
            .delete(self.endpoint(&["books", id]))
            .send()
            .await?;
        let message: Message = check(response).await?.json().await?;
        Ok(message.message)
    }

    /// Upload an image and return the URL to attach to a book
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())?;
        let form = multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(self.endpoint(&["books", "upload-image"]))
            .multipart(form)
            .send()
            .await?;
        let uploaded: Uploaded = check(response).await?.json().await?;
        Ok(uploaded.image_url)
    }
}

/// Turn non-success responses into `ClientError::Api` carrying the server message
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorEnvelope>(&text) {
        Ok(envelope) => envelope.error.message,
        Err(_) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        Err(_) => text.trim().to_string(),
    };

    tracing::debug!(status = %status, %message, "API returned an error");
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_base_path() {
        let client = BookshelfClient::new("http://localhost:5555/api/").unwrap();
        assert_eq!(
            client.endpoint(&["books", "abc"]).as_str(),
            "http://localhost:5555/api/books/abc"
        );

        let client = BookshelfClient::new("http://localhost:5555").unwrap();
        assert_eq!(
            client.endpoint(&["books"]).as_str(),
            "http://localhost:5555/books"
        );
    }

    #[test]
    fn ids_are_escaped_as_one_segment() {
        let client = BookshelfClient::new("http://localhost:5555").unwrap();
        assert_eq!(
            client.endpoint(&["books", "a/b"]).as_str(),
            "http://localhost:5555/books/a%2Fb"
        );
    }

    #[test]
    fn non_http_base_is_rejected() {
        assert!(BookshelfClient::new("ftp://example.com").is_err());
        assert!(BookshelfClient::new("not a url").is_err());
    }

    #[test]
    fn input_serializes_with_wire_names() {
        let input = BookInput {
            title: "X".to_string(),
            author: "Y".to_string(),
            description: "Z".to_string(),
            publish_year: 2020,
            image_url: String::new(),
            link: "https://example.com".to_string(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["publishYear"], 2020);
        assert_eq!(value["imageUrl"], "");
        assert_eq!(value["link"], "https://example.com");
    }
}
