//! Multipart form data encoding.
//!
//! A call plan keeps multipart parts as a name to [`PartValue`] map; the
//! transport turns that map into a [`Form`] and encodes it.
//!
//! # Example
//!
//! ```
//! use ferrule_core::{Form, Part};
//!
//! let form = Form::with_boundary("xyz")
//!     .part("name", Part::text("John Doe"))
//!     .part("avatar", Part::file("photo.png", vec![0x89, 0x50]));
//!
//! let (content_type, body) = form.into_body();
//! assert_eq!(content_type, "multipart/form-data; boundary=xyz");
//! assert!(body.starts_with(b"--xyz\r\n"));
//! ```

use std::collections::BTreeMap;

use bytes::{BufMut, Bytes, BytesMut};

use crate::PartValue;

/// Content of a single multipart part: data plus optional file metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Create a part without file metadata.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Create a text part (`text/plain; charset=utf-8`).
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(value.into()).with_content_type("text/plain; charset=utf-8")
    }

    /// Create a binary part (`application/octet-stream`).
    #[must_use]
    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self::new(data).with_content_type("application/octet-stream")
    }

    /// Create a file part; the content type is guessed from the extension.
    #[must_use]
    pub fn file(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename);
        Self {
            filename: Some(filename),
            content_type: Some(content_type.to_string()),
            data: data.into(),
        }
    }

    /// Set the filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Filename, if set.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Part data.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// A multipart form: named parts plus a boundary.
#[derive(Debug, Clone)]
pub struct Form {
    parts: Vec<(String, Part)>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Create an empty form with a time-derived boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Create an empty form with a fixed boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Build a form from call-plan parts, in key order. Null parts are skipped.
    #[must_use]
    pub fn from_values(values: &BTreeMap<String, PartValue>) -> Self {
        values
            .iter()
            .filter_map(|(name, value)| value.to_part().map(|part| (name, part)))
            .fold(Self::new(), |form, (name, part)| form.part(name.clone(), part))
    }

    /// Add a part.
    #[must_use]
    pub fn part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    /// Boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Named parts, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }

    /// `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode into `(content type header value, body)`.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let content_type = self.content_type();
        (content_type, self.encode())
    }

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        for (name, part) in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");

            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(name.as_bytes());
            buf.put_slice(b"\"");
            if let Some(filename) = &part.filename {
                buf.put_slice(b"; filename=\"");
                buf.put_slice(filename.as_bytes());
                buf.put_slice(b"\"");
            }
            buf.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                buf.put_slice(b"Content-Type: ");
                buf.put_slice(content_type.as_bytes());
                buf.put_slice(b"\r\n");
            }

            buf.put_slice(b"\r\n");
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        buf.freeze()
    }
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("----FerruleBoundary{timestamp:x}")
}
