//! Flattening of the viewable tree into parallel text and HTML renditions.
//!
//! Both outputs walk the same nodes with the same divider rules: no divider
//! before the first block, a divider before every later block, and no extra
//! divider right after an embedded message header (the header brings its own).

use crate::error::{CardsError, Result};
use crate::i18n;
use crate::model::{ContentNode, EmbeddedHeaders, FlattenResult, Mailbox, Part, TextFormat};
use crate::parser::{clearsign, html};

/// Total width of a text divider line.
pub const TEXT_DIVIDER_WIDTH: usize = 72;
const FILENAME_PREFIX: &str = "----- ";
const FILENAME_SUFFIX: &str = " ";
const ELLIPSIS: &str = "...";
const HTML_DIVIDER_OPEN: &str =
    "<p style=\"margin-top: 2.5em; margin-bottom: 1em; border-bottom: 1px solid #000\">";

/// Flatten `nodes` into text and HTML.
///
/// Fails only when a part body cannot be read; the error is reported as a
/// single [`CardsError::ContentExtraction`].
pub fn flatten(nodes: &[ContentNode]) -> Result<FlattenResult> {
    flatten_inner(nodes).map_err(|e| match e {
        CardsError::ContentExtraction(_) => e,
        other => CardsError::ContentExtraction(other.to_string()),
    })
}

fn flatten_inner(nodes: &[ContentNode]) -> Result<FlattenResult> {
    let mut text = String::new();
    let mut html = String::new();
    let mut suppress_divider = true;

    for node in nodes {
        match node {
            ContentNode::Textual { .. } => {
                build_text(&mut text, node, !suppress_divider)?;
                build_html(&mut html, node, !suppress_divider)?;
                suppress_divider = false;
            }
            ContentNode::MessageHeader { container, headers } => {
                push_text_divider(&mut text, container, !suppress_divider);
                push_header_text(&mut text, headers);
                push_html_divider(&mut html, container, !suppress_divider);
                push_header_html(&mut html, headers);
                suppress_divider = true;
            }
            ContentNode::Alternative { .. } => {
                let (text_branch, html_branch) = preferred_branches(node);

                let mut divider = !suppress_divider;
                for child in text_branch {
                    build_text(&mut text, child, divider)?;
                    divider = true;
                }
                let mut divider = !suppress_divider;
                for child in html_branch {
                    build_html(&mut html, child, divider)?;
                    divider = true;
                }
                suppress_divider = false;
            }
        }
    }

    Ok(FlattenResult { text, html })
}

/// Text-preferred and HTML-preferred branches of an alternative; each falls
/// back to the other when empty.
fn preferred_branches(node: &ContentNode) -> (&[ContentNode], &[ContentNode]) {
    match node {
        ContentNode::Alternative { text, html } => {
            let for_text = if text.is_empty() { html } else { text };
            let for_html = if html.is_empty() { text } else { html };
            (for_text, for_html)
        }
        _ => (&[], &[]),
    }
}

fn build_text(out: &mut String, node: &ContentNode, divider: bool) -> Result<()> {
    match node {
        ContentNode::Textual { part, format } => {
            push_text_divider(out, part, divider);
            let body = read_viewable(part, *format)?;
            match format {
                TextFormat::Plain => out.push_str(&body),
                TextFormat::Html => out.push_str(&html::html_to_text(&body)),
            }
        }
        ContentNode::Alternative { .. } => {
            let (branch, _) = preferred_branches(node);
            for child in branch {
                build_text(out, child, divider)?;
            }
        }
        ContentNode::MessageHeader { container, headers } => {
            push_text_divider(out, container, divider);
            push_header_text(out, headers);
        }
    }
    Ok(())
}

fn build_html(out: &mut String, node: &ContentNode, divider: bool) -> Result<()> {
    match node {
        ContentNode::Textual { part, format } => {
            push_html_divider(out, part, divider);
            let body = read_viewable(part, *format)?;
            match format {
                TextFormat::Plain => out.push_str(&html::text_to_html(&body)),
                TextFormat::Html => out.push_str(&body),
            }
        }
        ContentNode::Alternative { .. } => {
            let (_, branch) = preferred_branches(node);
            for child in branch {
                build_html(out, child, divider)?;
            }
        }
        ContentNode::MessageHeader { container, headers } => {
            push_html_divider(out, container, divider);
            push_header_html(out, headers);
        }
    }
    Ok(())
}

/// Decoded body of a viewable; clear-signed plain text is unwrapped first.
fn read_viewable(part: &Part, format: TextFormat) -> Result<String> {
    let body = part.read_text()?;
    if format == TextFormat::Plain {
        if let Some(signed) = clearsign::extract_clearsigned(&body) {
            return Ok(signed);
        }
    }
    Ok(body)
}

/// The divider line for `filename`: exactly [`TEXT_DIVIDER_WIDTH`] characters.
pub fn text_divider_line(filename: &str) -> String {
    if filename.is_empty() {
        return "-".repeat(TEXT_DIVIDER_WIDTH);
    }
    let room = TEXT_DIVIDER_WIDTH - FILENAME_PREFIX.len() - FILENAME_SUFFIX.len();
    let name: String = if filename.chars().count() > room {
        let kept: String = filename.chars().take(room - ELLIPSIS.len()).collect();
        format!("{kept}{ELLIPSIS}")
    } else {
        filename.to_string()
    };
    let dashes = room - name.chars().count();
    format!("{FILENAME_PREFIX}{name}{FILENAME_SUFFIX}{}", "-".repeat(dashes))
}

fn push_text_divider(out: &mut String, part: &Part, divider: bool) {
    if divider {
        out.push_str("\r\n\r\n");
        out.push_str(&text_divider_line(part.display_name()));
        out.push_str("\r\n\r\n");
    }
}

fn push_html_divider(out: &mut String, part: &Part, divider: bool) {
    if divider {
        out.push_str(HTML_DIVIDER_OPEN);
        out.push_str(&html::escape(part.display_name()));
        out.push_str("</p>");
    }
}

/// Header rows in display order, skipping empty address lists.
fn header_rows(headers: &EmbeddedHeaders) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    for (label, list) in [
        (i18n::header_from(), &headers.from),
        (i18n::header_to(), &headers.to),
        (i18n::header_cc(), &headers.cc),
    ] {
        if !list.is_empty() {
            rows.push((label, Mailbox::join(list)));
        }
    }
    if let Some(date) = headers.date {
        rows.push((i18n::header_date(), date.to_rfc2822()));
    }
    let subject = headers
        .subject
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(i18n::no_subject());
    rows.push((i18n::header_subject(), subject.to_string()));
    rows
}

fn push_header_text(out: &mut String, headers: &EmbeddedHeaders) {
    let rows = header_rows(headers);
    let last = rows.len().saturating_sub(1);
    for (i, (label, value)) in rows.iter().enumerate() {
        out.push_str(label);
        out.push(' ');
        out.push_str(value);
        out.push_str(if i == last { "\r\n\r\n" } else { "\r\n" });
    }
}

fn push_header_html(out: &mut String, headers: &EmbeddedHeaders) {
    out.push_str("<table style=\"border: 0\">");
    for (label, value) in header_rows(headers) {
        out.push_str("<tr><th style=\"text-align: left; vertical-align: top;\">");
        out.push_str(&html::escape(label));
        out.push_str("</th><td>");
        out.push_str(&html::escape(&value));
        out.push_str("</td></tr>");
    }
    out.push_str("</table>");
}
