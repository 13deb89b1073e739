//! Final HTML assembly: rendered cards, "load cards" affordances for
//! allow-listed links, or a banner when the message carries no data.

pub mod allowlist;
pub mod sanitize;

use crate::buttons::uri;
use crate::i18n;
use crate::parser::html::escape;
use crate::template::IconSet;

pub use allowlist::{Allowlist, UrlMatch};
pub use sanitize::{BasicSanitizer, HtmlSanitizer};

/// Separates the rendered cards from the original message body.
pub const CARDS_MARKER: &str = "<br><b>ACTUAL HTML MAIL BELOW</b><br>";
/// Prefixed to the message body when nothing could be extracted.
pub const NO_DATA_BANNER: &str = "<b>NO STRUCTURED DATA FOUND</b><br>";

/// Stylesheets, scripts and fonts used by the card markup.
pub const CSS_HEAD: &str = concat!(
    "<head>",
    "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
    "<link href=\"https://unpkg.com/material-components-web@latest/dist/material-components-web.min.css\" rel=\"stylesheet\">",
    "<script src=\"https://unpkg.com/material-components-web@latest/dist/material-components-web.min.js\"></script>",
    "<link href=\"https://fonts.googleapis.com/icon?family=Material+Icons\" rel=\"stylesheet\">",
    "<link href=\"https://fonts.googleapis.com/css2?family=Roboto+Mono\" rel=\"stylesheet\">",
    "<link href=\"https://fonts.googleapis.com/css2?family=Roboto:wght@300;400;500\" rel=\"stylesheet\">",
    "</head>\n"
);

/// Which of the three outputs [`FallbackComposer::compose`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Cards,
    LoadCards,
    NoData,
}

/// Assembles the HTML handed to the display surface.
#[derive(Debug, Clone)]
pub struct FallbackComposer {
    include_css_head: bool,
    icon_set: IconSet,
}

impl Default for FallbackComposer {
    fn default() -> Self {
        Self::new(true, IconSet::material())
    }
}

impl FallbackComposer {
    pub fn new(include_css_head: bool, icon_set: IconSet) -> Self {
        Self {
            include_css_head,
            icon_set,
        }
    }

    fn head(&self) -> &'static str {
        if self.include_css_head {
            CSS_HEAD
        } else {
            ""
        }
    }

    /// Pick and build the output for a message.
    ///
    /// `cards` are already rendered (heuristic card included). `urls` are the
    /// allow-listed links found in the message; they only matter when there
    /// are no cards.
    pub fn compose(
        &self,
        cards: &[String],
        sanitized_html: &str,
        allowlist: &Allowlist,
        urls: &[String],
    ) -> (String, Composition) {
        if !cards.is_empty() {
            let html = format!(
                "{}{}{}{}",
                self.head(),
                cards.join("\n"),
                CARDS_MARKER,
                sanitized_html
            );
            return (html, Composition::Cards);
        }
        if !urls.is_empty() {
            return (self.with_load_buttons(sanitized_html, allowlist, urls), Composition::LoadCards);
        }
        (format!("{NO_DATA_BANNER}{sanitized_html}"), Composition::NoData)
    }

    /// The body with one top "Load cards" button for all URLs and an inline
    /// button after each occurrence.
    fn with_load_buttons(&self, html: &str, allowlist: &Allowlist, urls: &[String]) -> String {
        let top = format!(
            "<a class=\"mdc-button mdc-button--raised ld2h-load-cards\" href=\"{}\">{}<span class=\"mdc-button__label\">{}</span></a><br><hr><br><br>",
            uri::load_cards(urls),
            self.icon_set.render("web"),
            escape(i18n::btn_load_cards()),
        );
        format!("{}{}{}", self.head(), top, self.insert_inline_buttons(html, allowlist))
    }

    fn inline_button(&self, url: &str) -> String {
        format!(
            "<a class=\"mdc-button mdc-card__action mdc-card__action--button ld2h-load-card\" href=\"{}\">{}</a>",
            uri::load_cards(&[url]),
            self.icon_set.render("web")
        )
    }

    /// Insert a button after every allow-listed URL in `html`.
    ///
    /// A URL inside a tag gets its button after the tag (after `</a>` for
    /// links); a URL that is the text of a link also goes after `</a>`, so
    /// a link whose href and text are the same URL gets a single button.
    pub fn insert_inline_buttons(&self, html: &str, allowlist: &Allowlist) -> String {
        let lower = html.to_ascii_lowercase();
        let mut insertions: Vec<(usize, &str)> = Vec::new();
        let found = allowlist.matches(html);
        for m in &found {
            let pos = insertion_point(&lower, m.start, m.end);
            if !insertions.iter().any(|(p, u)| *p == pos && *u == m.url) {
                insertions.push((pos, &m.url));
            }
        }
        insertions.sort_by_key(|(pos, _)| *pos);

        let mut out = String::with_capacity(html.len() + insertions.len() * 256);
        let mut cursor = 0;
        for (pos, url) in insertions {
            out.push_str(&html[cursor..pos]);
            out.push_str(&self.inline_button(url));
            cursor = pos;
        }
        out.push_str(&html[cursor..]);
        out
    }
}

/// Byte offset where the button for the URL at `start..end` belongs.
fn insertion_point(lower: &str, start: usize, end: usize) -> usize {
    let before = &lower[..start];
    let in_tag = match (before.rfind('<'), before.rfind('>')) {
        (Some(lt), Some(gt)) => lt > gt,
        (Some(_), None) => true,
        _ => false,
    };

    let open_anchor = before.rfind("<a").filter(|&a| {
        let after = lower[a + 2..].chars().next();
        after.is_some_and(|c| c.is_whitespace() || c == '>')
    });
    let in_anchor = match (open_anchor, before.rfind("</a>")) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    };

    if in_anchor {
        if let Some(close) = lower[end..].find("</a>") {
            return end + close + "</a>".len();
        }
    }
    if in_tag {
        if let Some(gt) = lower[end..].find('>') {
            return end + gt + 1;
        }
        return lower.len();
    }
    end
}
