//! In-memory HTTP response accumulator.
//!
//! One [`ResponseBuffer`] per request. It is written by the task that owns the
//! request and then handed to the transport by value with
//! [`ResponseBuffer::into_parts`].

use std::borrow::Cow;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Status, content type, and an ordered body accumulated in memory.
///
/// `set_status` may be called more than once; the most recent call wins.
/// The body is the concatenation of every appended chunk in call order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResponseBuffer {
    status: Option<u16>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record status code and content type. Overwrites any earlier values.
    pub fn set_status(&mut self, code: u16, content_type: impl Into<String>) {
        self.status = Some(code);
        self.content_type = Some(content_type.into());
    }

    /// Append `chunk` to the body. Empty chunks leave the body unchanged.
    pub fn append_body(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    /// `set_status` followed by `append_body`.
    pub fn respond_with(&mut self, code: u16, content_type: &str, chunk: impl AsRef<[u8]>) {
        self.set_status(code, content_type);
        self.append_body(chunk);
    }

    /// `None` until `set_status` has been called.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// `None` until `set_status` has been called.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }

    /// Hand the response off to the transport.
    pub fn into_parts(self) -> (Option<u16>, Option<String>, Vec<u8>) {
        (self.status, self.content_type, self.body)
    }
}
