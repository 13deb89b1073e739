//! HTML sanitizing before the message body is shown next to the cards.

use ammonia::Builder;

/// Makes untrusted message HTML safe to display.
pub trait HtmlSanitizer {
    fn sanitize_for_display(&self, html: &str) -> String;
}

/// `ammonia` allow-list cleaning with the layout attributes mail bodies
/// rely on. Scripts, frames, plugins, `<meta>`, event handlers and
/// non-web URL schemes are dropped.
pub struct BasicSanitizer {
    builder: Builder<'static>,
}

impl Default for BasicSanitizer {
    fn default() -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(["font", "center"])
            .add_tag_attributes("font", ["color", "face", "size"])
            .add_generic_attributes(["style", "dir", "align", "valign", "width", "height", "bgcolor"])
            .add_clean_content_tags(["iframe", "object", "embed", "applet"])
            .add_url_schemes(["cid"])
            .link_rel(None);
        Self { builder }
    }
}

impl HtmlSanitizer for BasicSanitizer {
    fn sanitize_for_display(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(html: &str) -> String {
        BasicSanitizer::default().sanitize_for_display(html)
    }

    #[test]
    fn test_removes_active_blocks() {
        let html = "<p>a</p><script>alert(1)</script><IFRAME src=x></IFRAME><object data=y>z</object><embed src=e><p>b</p>";
        assert_eq!(clean(html), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_removes_event_handlers() {
        let out = clean(r#"<img src="a.png" onerror="steal()" onload='x()' alt="on=1"><p onclick=go>text onclick=ok</p>"#);
        assert!(!out.contains("steal"));
        assert!(!out.contains("x()"));
        assert!(out.contains(r#"alt="on=1""#));
        assert!(out.contains("<p>text onclick=ok</p>"));
    }

    #[test]
    fn test_removes_slash_separated_handler() {
        let out = clean("<img/onerror=alert(1) src=x>");
        assert!(!out.contains("onerror"));
        assert!(!out.contains("alert"));
    }

    #[test]
    fn test_drops_javascript_urls() {
        let out = clean(r#"<a href="javascript:alert('x')">a</a><a href='JavaScript:void(0)'>b</a><a href=javascript:x>c</a>"#);
        assert!(!out.to_ascii_lowercase().contains("javascript"));
        assert!(out.contains(">a</a>") && out.contains(">b</a>") && out.contains(">c</a>"));
    }

    #[test]
    fn test_drops_entity_encoded_javascript_url() {
        let out = clean(r#"<a href="jav&#x61;script:alert(1)">x</a>"#);
        assert!(!out.contains("script:"));
        assert!(!out.contains("alert"));
        assert!(out.contains(">x</a>"));
    }

    #[test]
    fn test_drops_meta_refresh() {
        let out = clean(r#"<meta http-equiv="refresh" content="0;url=javascript:alert(1)"><p>hi</p>"#);
        assert!(!out.contains("<meta"));
        assert!(!out.contains("refresh"));
        assert!(out.contains("<p>hi</p>"));
    }

    #[test]
    fn test_plain_markup_untouched() {
        let html = r#"<div style="color: red"><a href="https://example.com/">x</a></div>"#;
        assert_eq!(clean(html), html);
        let text = "<div dir=\"auto\">a<br>\nb</div>";
        assert_eq!(clean(text), text);
    }
}
