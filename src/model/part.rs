//! Content parts: the unit every viewable, attachment and ld+json body is read from.

use std::borrow::Cow;

use crate::error::{CardsError, Result};

/// One MIME body part.
///
/// The body may be absent when the part has not been downloaded yet
/// (attachments loaded on demand). Reading an absent body is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Lowercase `type/subtype`.
    pub mime_type: String,
    /// Raw header name/value pairs, in message order.
    pub headers: Vec<(String, String)>,
    /// Filename from Content-Disposition (or the Content-Type `name` parameter).
    pub filename: Option<String>,
    /// Charset label from the Content-Type header.
    pub charset: Option<String>,
    body: Option<Vec<u8>>,
}

impl Part {
    /// A part without body content.
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into().to_ascii_lowercase(),
            headers: Vec::new(),
            filename: None,
            charset: None,
            body: None,
        }
    }

    /// A fully loaded UTF-8 text part.
    pub fn text(mime_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(mime_type).with_body(content.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `true` once the body has been materialized.
    pub fn is_available(&self) -> bool {
        self.body.is_some()
    }

    /// Lowercase file extension of the part's filename, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// Filename or the empty string, as used by named dividers.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("")
    }

    /// Raw body bytes.
    pub fn read_body(&self) -> Result<&[u8]> {
        self.body.as_deref().ok_or_else(|| {
            CardsError::ContentExtraction(format!(
                "body of {} part{} is not available",
                self.mime_type,
                self.filename
                    .as_deref()
                    .map(|f| format!(" '{f}'"))
                    .unwrap_or_default()
            ))
        })
    }

    /// Body decoded to text using the part's charset (UTF-8 when absent or unknown).
    pub fn read_text(&self) -> Result<String> {
        let bytes = self.read_body()?;
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()))
            .unwrap_or(encoding_rs::UTF_8);
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::debug!(
                mime_type = %self.mime_type,
                charset = encoding.name(),
                "Replaced malformed sequences while decoding part"
            );
        }
        Ok(match text {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => s,
        })
    }
}
