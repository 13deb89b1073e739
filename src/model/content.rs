//! The viewable tree of a message: which parts are shown as text or HTML.

use chrono::{DateTime, FixedOffset};

use super::address::Mailbox;
use super::part::Part;

/// Markup of a textual part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// One node of the viewable tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// A `text/plain` or `text/html` part shown inline.
    Textual { part: Part, format: TextFormat },
    /// A `multipart/alternative`: the plain and HTML renditions of the same content.
    Alternative {
        text: Vec<ContentNode>,
        html: Vec<ContentNode>,
    },
    /// Start of an attached `message/rfc822`; its body nodes follow as siblings.
    MessageHeader {
        container: Part,
        headers: EmbeddedHeaders,
    },
}

impl ContentNode {
    pub fn plain(part: Part) -> Self {
        Self::Textual {
            part,
            format: TextFormat::Plain,
        }
    }

    pub fn html(part: Part) -> Self {
        Self::Textual {
            part,
            format: TextFormat::Html,
        }
    }
}

/// Header fields of an embedded message, as shown in the header table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedHeaders {
    pub from: Vec<Mailbox>,
    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub date: Option<DateTime<FixedOffset>>,
    pub subject: Option<String>,
}

/// Everything the pipeline needs from one parsed message.
#[derive(Debug, Clone, Default)]
pub struct MessageContent {
    /// Subject of the outer message.
    pub subject: Option<String>,
    /// Viewable tree, in display order.
    pub viewables: Vec<ContentNode>,
    /// Non-viewable parts with their (possibly absent) bodies.
    pub attachments: Vec<Part>,
    /// Explicit `application/ld+json` parts.
    pub ld_json_parts: Vec<Part>,
}

/// The parallel renditions produced by flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenResult {
    pub text: String,
    pub html: String,
}
