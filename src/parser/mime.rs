//! Build the viewable tree of a raw RFC 5322 message.

use mail_parser::{Message, MessageParser, MessagePart, MimeHeaders, PartType};

use crate::error::{CardsError, Result};
use crate::model::{ContentNode, EmbeddedHeaders, Mailbox, MessageContent, Part};

/// Maximum nesting of multiparts and embedded messages that is followed.
const MAX_DEPTH: usize = 16;

/// Parse a complete raw message (headers + body) into its viewable tree,
/// attachments and explicit `application/ld+json` parts.
pub fn parse_message(raw_message: &[u8]) -> Result<MessageContent> {
    let message_bytes = skip_from_line(raw_message);
    let msg = MessageParser::default()
        .parse(message_bytes)
        .ok_or_else(|| CardsError::Mime("message has no parseable headers".into()))?;

    let mut content = MessageContent {
        subject: msg.subject().map(String::from),
        ..Default::default()
    };
    let mut viewables = Vec::new();
    walk(&msg, 0, &mut viewables, &mut content, 0);
    content.viewables = viewables;

    tracing::debug!(
        viewables = content.viewables.len(),
        attachments = content.attachments.len(),
        ld_json_parts = content.ld_json_parts.len(),
        "Parsed message structure"
    );
    Ok(content)
}

fn walk(
    msg: &Message<'_>,
    idx: usize,
    out: &mut Vec<ContentNode>,
    content: &mut MessageContent,
    depth: usize,
) {
    let Some(part) = msg.parts.get(idx) else {
        return;
    };
    if depth > MAX_DEPTH {
        tracing::warn!(depth, "Message nesting too deep, ignoring remaining parts");
        return;
    }

    let mime = mime_type(part, idx == 0);
    let attachment = is_attachment(part);

    match &part.body {
        PartType::Multipart(children) if mime == "multipart/alternative" => {
            let mut text = Vec::new();
            let mut html = Vec::new();
            for &child in children {
                let mut branch = Vec::new();
                walk(msg, child, &mut branch, content, depth + 1);
                if branch.iter().any(contains_html) {
                    html.extend(branch);
                } else {
                    text.extend(branch);
                }
            }
            if !text.is_empty() || !html.is_empty() {
                out.push(ContentNode::Alternative { text, html });
            }
        }
        PartType::Multipart(children) => {
            for &child in children {
                walk(msg, child, out, content, depth + 1);
            }
        }
        PartType::Text(_) if !attachment && mime == "text/plain" => {
            out.push(ContentNode::plain(to_part(part, &mime)));
        }
        PartType::Html(_) if !attachment => {
            out.push(ContentNode::html(to_part(part, &mime)));
        }
        PartType::Message(inner) => {
            out.push(ContentNode::MessageHeader {
                container: to_part(part, &mime),
                headers: embedded_headers(inner),
            });
            walk(inner, 0, out, content, depth + 1);
        }
        _ if mime == "application/ld+json" => content.ld_json_parts.push(to_part(part, &mime)),
        _ => content.attachments.push(to_part(part, &mime)),
    }
}

fn contains_html(node: &ContentNode) -> bool {
    match node {
        ContentNode::Textual { format, .. } => *format == crate::model::TextFormat::Html,
        ContentNode::Alternative { html, .. } => !html.is_empty(),
        ContentNode::MessageHeader { .. } => false,
    }
}

fn mime_type(part: &MessagePart<'_>, is_root: bool) -> String {
    match part.content_type() {
        Some(ct) => match ct.subtype() {
            Some(sub) => format!("{}/{}", ct.ctype(), sub).to_ascii_lowercase(),
            None => ct.ctype().to_ascii_lowercase(),
        },
        None if is_root || matches!(part.body, PartType::Text(_)) => "text/plain".to_string(),
        None if matches!(part.body, PartType::Html(_)) => "text/html".to_string(),
        None => "application/octet-stream".to_string(),
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"))
}

fn to_part(part: &MessagePart<'_>, mime: &str) -> Part {
    let mut p = Part::new(mime).with_header("Content-Type", mime);
    if let Some(name) = part.attachment_name() {
        p = p.with_filename(name);
    }
    if let Some(cid) = part.content_id() {
        p = p.with_header("Content-ID", cid);
    }
    // mail-parser already decodes text parts to UTF-8; only binary bodies
    // keep their declared charset.
    if let PartType::Binary(_) | PartType::InlineBinary(_) = part.body {
        if let Some(charset) = part.content_type().and_then(|ct| ct.attribute("charset")) {
            p = p.with_charset(charset);
        }
    }
    p.with_body(part.contents().to_vec())
}

fn embedded_headers(msg: &Message<'_>) -> EmbeddedHeaders {
    EmbeddedHeaders {
        from: mailboxes(msg.from()),
        to: mailboxes(msg.to()),
        cc: mailboxes(msg.cc()),
        date: msg
            .date()
            .and_then(|d| chrono::DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok()),
        subject: msg.subject().map(String::from),
    }
}

fn mailboxes(addr: Option<&mail_parser::Address<'_>>) -> Vec<Mailbox> {
    let to_mailbox = |a: &mail_parser::Addr<'_>| {
        Mailbox::new(
            a.name.as_deref().unwrap_or(""),
            a.address.as_deref().unwrap_or(""),
        )
    };
    match addr {
        None => Vec::new(),
        Some(mail_parser::Address::List(list)) => list.iter().map(to_mailbox).collect(),
        Some(mail_parser::Address::Group(groups)) => groups
            .iter()
            .flat_map(|g| g.addresses.iter().map(to_mailbox))
            .collect(),
    }
}

/// Skip an mbox `From ` separator line (and a UTF-8 BOM) if present.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    if data.starts_with(b"From ") {
        if let Some(nl) = data.iter().position(|&b| b == b'\n') {
            return &data[nl + 1..];
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextFormat;

    const ALTERNATIVE: &str = "From: Alice <alice@example.com>\r\n\
Subject: Your trip\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"outer\"\r\n\
\r\n\
--outer\r\n\
Content-Type: multipart/alternative; boundary=\"alt\"\r\n\
\r\n\
--alt\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Plain body\r\n\
--alt\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>HTML body</p>\r\n\
--alt--\r\n\
--outer\r\n\
Content-Type: application/ld+json\r\n\
\r\n\
{\"@type\": \"Event\"}\r\n\
--outer\r\n\
Content-Type: text/calendar; method=REQUEST\r\n\
Content-Disposition: attachment; filename=\"invite.ics\"\r\n\
\r\n\
BEGIN:VCALENDAR\r\n\
END:VCALENDAR\r\n\
--outer--\r\n";

    #[test]
    fn test_skip_from_line() {
        let data = b"From user@example.com Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
        let plain = b"Subject: Test\n\nBody\n";
        assert_eq!(skip_from_line(plain), plain);
    }

    #[test]
    fn test_alternative_and_side_parts() {
        let content = parse_message(ALTERNATIVE.as_bytes()).unwrap();
        assert_eq!(content.subject.as_deref(), Some("Your trip"));
        assert_eq!(content.viewables.len(), 1);
        let ContentNode::Alternative { text, html } = &content.viewables[0] else {
            panic!("expected alternative, got {:?}", content.viewables[0]);
        };
        assert_eq!(text.len(), 1);
        assert_eq!(html.len(), 1);
        assert!(matches!(
            &html[0],
            ContentNode::Textual { format: TextFormat::Html, .. }
        ));

        assert_eq!(content.ld_json_parts.len(), 1);
        assert!(content.ld_json_parts[0].read_text().unwrap().contains("Event"));
        assert_eq!(content.attachments.len(), 1);
        assert_eq!(content.attachments[0].extension().as_deref(), Some("ics"));
    }

    #[test]
    fn test_single_part_plain_message() {
        let raw = b"Subject: Hi\r\n\r\nJust text\r\n";
        let content = parse_message(raw).unwrap();
        assert_eq!(content.viewables.len(), 1);
        let ContentNode::Textual { part, format } = &content.viewables[0] else {
            panic!("expected textual node");
        };
        assert_eq!(*format, TextFormat::Plain);
        assert!(part.read_text().unwrap().contains("Just text"));
    }
}
