//! `multipart/form-data` body encoding.
//!
//! The client encodes bodies itself so that a built `HttpRequest` is
//! complete plain data: the `Content-Type` header and the body agree on the
//! boundary before any transport sees them.

use uuid::Uuid;

use crate::types::PetPhoto;

#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("----petfriends{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &'static str, value: &str) -> Self {
        self.part_header(name, None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn photo(mut self, name: &'static str, photo: &PetPhoto) -> Self {
        self.part_header(name, Some((&photo.file_name, photo.content_type)));
        self.body.extend_from_slice(&photo.bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Close the form and return `(content_type, body)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let closing = format!("--{}--\r\n", self.boundary);
        self.body.extend_from_slice(closing.as_bytes());
        (self.content_type(), self.body)
    }

    fn part_header(&mut self, name: &str, file: Option<(&str, &str)>) {
        let mut header = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{name}\"",
            self.boundary
        );
        if let Some((file_name, content_type)) = file {
            header.push_str(&format!(
                "; filename=\"{}\"\r\nContent-Type: {content_type}",
                escape_quoted(file_name)
            ));
        }
        header.push_str("\r\n\r\n");
        self.body.extend_from_slice(header.as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

// Quotes and line breaks in a file name would terminate the disposition
// parameter early. Field names are always literals.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
