//! Conversions between plain text and HTML renditions.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Line width for `html2text` rendering.
const TEXT_WIDTH: usize = 80;

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t]*(\n[ \t]*){2,}").expect("valid regex")
});
static WEB_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]+[^\s<>".,;:!?)']"#)
        .expect("valid regex")
});

/// Render HTML as readable plain text with `html2text`, trailing spaces
/// trimmed and runs of blank lines collapsed to one.
pub fn html_to_text(html: &str) -> String {
    let rendered = html2text::from_read(html.as_bytes(), TEXT_WIDTH).unwrap_or_else(|e| {
        warn!(error = %e, "Cannot render HTML as text");
        String::new()
    });
    let lines: Vec<&str> = rendered.lines().map(str::trim_end).collect();
    BLANK_RUN.replace_all(&lines.join("\n"), "\n\n").trim().to_string()
}

/// Render plain text as HTML: escaped, links made clickable, line breaks kept.
pub fn text_to_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let escaped = html_escape::encode_text(&normalized);
    let linked = WEB_LINK.replace_all(&escaped, r#"<a href="$0">$0</a>"#);
    format!(
        "<div dir=\"auto\">{}</div>",
        linked.replace('\n', "<br>\n")
    )
}

/// Escape text for use inside HTML element content.
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text for use inside a double-quoted attribute.
pub fn escape_attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}
