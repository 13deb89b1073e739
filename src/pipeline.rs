//! End-to-end message view extraction.
//!
//! [`MessageViewExtractor`] runs the whole flow for one message: flatten the
//! viewables, extract structured data, render cards with their buttons and
//! compose the final HTML. Whatever fails after flattening, the sanitized
//! message HTML is still returned.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::buttons::{uri, ButtonGenerator};
use crate::compose::{Allowlist, BasicSanitizer, Composition, FallbackComposer, HtmlSanitizer};
use crate::config::Config;
use crate::error::Result;
use crate::extract::{should_try_to_derive, StructuredDataExtractor};
use crate::flatten::flatten;
use crate::i18n;
use crate::model::{ButtonDescription, MessageContent, ParseableAttachmentRef, Part, StructuredObject};
use crate::parser::mime::parse_message;
use crate::render::CardRenderer;
use crate::template::{IconSet, Registry, SharedRegistry};

/// Requests the download of an attachment body that is not available yet.
///
/// Loading is fire-and-forget: the current pass does not wait for it, and an
/// attachment that is still missing is skipped. A later pass over the same
/// message picks it up.
pub trait AttachmentLoader {
    fn request_load(&self, part: &Part);
}

/// Loader for hosts where every body is already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl AttachmentLoader for NoopLoader {
    fn request_load(&self, part: &Part) {
        debug!(attachment = part.display_name(), "No loader configured, skipping");
    }
}

/// What the display surface shows for one message.
#[derive(Debug, Clone)]
pub struct MessageView {
    /// Plain-text rendition.
    pub text: String,
    /// Final HTML: cards, load-cards affordances or the banner, then the body.
    pub html: String,
    /// Structured objects that were rendered (after type filtering).
    pub objects: Vec<StructuredObject>,
    /// Heuristically derived object, if any.
    pub heuristic: Option<StructuredObject>,
    /// Output kind; `None` when composing failed and the plain body was used.
    pub composition: Option<Composition>,
}

/// Runs the pipeline. One instance can serve many messages, from any thread.
pub struct MessageViewExtractor {
    registry: Arc<SharedRegistry>,
    extractor: StructuredDataExtractor,
    generator: ButtonGenerator,
    sanitizer: Box<dyn HtmlSanitizer + Send + Sync>,
    loader: Box<dyn AttachmentLoader + Send + Sync>,
    allowlist: Allowlist,
    derive_codes: bool,
    show_source: bool,
    include_css_head: bool,
}

impl Default for MessageViewExtractor {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl MessageViewExtractor {
    pub fn from_config(config: &Config) -> Self {
        let icon_set = IconSet::by_name(&config.render.icon_set).unwrap_or_else(|| {
            warn!(icon_set = %config.render.icon_set, "Unknown icon set, using material");
            IconSet::material()
        });
        Self {
            registry: Arc::new(SharedRegistry::new(Registry::builtin().with_icon_set(icon_set))),
            extractor: StructuredDataExtractor::default()
                .with_skip_types(config.extract.skip_types_when_multiple.clone()),
            generator: ButtonGenerator::new(config.buttons.share_as_mail.clone()),
            sanitizer: Box::new(BasicSanitizer::default()),
            loader: Box::new(NoopLoader),
            allowlist: Allowlist::new(config.extract.allowlist.iter().cloned()),
            derive_codes: config.extract.derive_verification_codes,
            show_source: config.render.show_source,
            include_css_head: config.render.include_css_head,
        }
    }

    /// Share a template registry with other extractors.
    pub fn with_registry(mut self, registry: Arc<SharedRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Box<dyn HtmlSanitizer + Send + Sync>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_loader(mut self, loader: Box<dyn AttachmentLoader + Send + Sync>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the extractor, including its skip list.
    pub fn with_extractor(mut self, extractor: StructuredDataExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Templates and icon set used by subsequent renders.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Parse a raw RFC 5322 message and build its view.
    pub fn view_raw_message(&self, raw: &[u8]) -> Result<MessageView> {
        let message = parse_message(raw)?;
        self.extract_message_for_view(&message)
    }

    /// Build the view for a parsed message.
    ///
    /// Only flattening errors are returned; everything after it degrades to
    /// the sanitized HTML.
    pub fn extract_message_for_view(&self, message: &MessageContent) -> Result<MessageView> {
        let flat = flatten(&message.viewables)?;

        let attachments = ParseableAttachmentRef::collect(&message.attachments);
        for pending in attachments.iter().filter(|a| !a.attachment.is_available()) {
            self.loader.request_load(&pending.attachment);
        }

        let sanitized = self.sanitizer.sanitize_for_display(&flat.html);

        let hint = if self.derive_codes {
            should_try_to_derive(message.subject.as_deref())
        } else {
            None
        };
        let extraction = self.extractor.extract(
            &flat.html,
            &flat.text,
            &attachments,
            &message.ld_json_parts,
            hint,
        );

        let objects = extraction.objects;

        let (html, composition) =
            match self.compose(&objects, extraction.heuristic.as_ref(), &flat.text, &flat.html, &sanitized) {
                Ok((html, kind)) => (html, Some(kind)),
                Err(e) => {
                    warn!(error = %e, "Card rendering failed, showing message body only");
                    (sanitized, None)
                }
            };

        info!(
            objects = objects.len(),
            heuristic = extraction.heuristic.is_some(),
            composition = ?composition,
            "Message view ready"
        );
        Ok(MessageView {
            text: flat.text,
            html,
            objects,
            heuristic: extraction.heuristic,
            composition,
        })
    }

    fn compose(
        &self,
        objects: &[StructuredObject],
        heuristic: Option<&StructuredObject>,
        text: &str,
        html: &str,
        sanitized: &str,
    ) -> Result<(String, Composition)> {
        let snapshot = self.registry.snapshot();
        let renderer = CardRenderer::new(Arc::clone(&snapshot))?;

        let mut cards = Vec::new();
        for obj in objects.iter().chain(heuristic) {
            match self.render_card(&renderer, obj) {
                Ok(card) => cards.push(card),
                Err(e) => warn!(
                    schema_type = obj.schema_type(),
                    source = obj.source.as_str(),
                    error = %e,
                    "Skipping card"
                ),
            }
        }

        let urls = if cards.is_empty() {
            self.allowlist.find_urls(&[text, html])
        } else {
            Vec::new()
        };

        let composer = FallbackComposer::new(self.include_css_head, snapshot.icon_set().clone());
        Ok(composer.compose(&cards, sanitized, &self.allowlist, &urls))
    }

    fn render_card(&self, renderer: &CardRenderer, obj: &StructuredObject) -> Result<String> {
        let homogeneous = obj.is_homogeneous_reservation_array();
        let mapping = renderer.registry().resolve(obj.schema_type(), homogeneous);

        match &obj.value {
            Value::Array(items) if mapping.tabbed => {
                let tabs: Vec<(Value, Vec<ButtonDescription>)> = items
                    .iter()
                    .map(|item| (item.clone(), self.buttons_for(item)))
                    .collect();
                renderer.render_tabs(&tabs, &mapping)
            }
            Value::Array(items) => {
                let first = items.first().unwrap_or(&Value::Null);
                renderer.render(obj, &self.buttons_for(first), &mapping)
            }
            value => renderer.render(obj, &self.buttons_for(value), &mapping),
        }
    }

    /// Buttons for one object, plus the debug source button when enabled.
    pub fn buttons_for(&self, value: &Value) -> Vec<ButtonDescription> {
        let mut buttons = self.generator.build_buttons(value);
        if self.show_source {
            match uri::show_source(value) {
                Ok(target) => buttons.push(ButtonDescription::new(
                    Some(i18n::btn_show_source()),
                    Some("code"),
                    target,
                )),
                Err(e) => warn!(error = %e, "Cannot build show-source button"),
            }
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::NO_DATA_BANNER;
    use crate::error::CardsError;
    use crate::model::ContentNode;
    use std::sync::Mutex;

    fn html_message(html: &str, subject: Option<&str>) -> MessageContent {
        MessageContent {
            subject: subject.map(String::from),
            viewables: vec![ContentNode::html(Part::text("text/html", html))],
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct RecordingLoader(Mutex<Vec<String>>);

    impl AttachmentLoader for Arc<RecordingLoader> {
        fn request_load(&self, part: &Part) {
            self.0.lock().unwrap().push(part.display_name().to_string());
        }
    }

    #[test]
    fn test_no_data_banner() {
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message("<p>Hello there</p>", Some("Hi")))
            .unwrap();
        assert!(view.html.starts_with(NO_DATA_BANNER));
        assert!(view.html.contains("<p>Hello there</p>"));
        assert_eq!(view.composition, Some(Composition::NoData));
        assert_eq!(view.text, "Hello there");
    }

    #[test]
    fn test_scheme_less_allow_listed_link_offers_load_cards() {
        let message = MessageContent {
            viewables: vec![ContentNode::plain(Part::text(
                "text/plain",
                "Read www.spiegel.de/politik/a-123.html today",
            ))],
            ..Default::default()
        };
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&message)
            .unwrap();
        assert_eq!(view.composition, Some(Composition::LoadCards));
        assert!(view
            .html
            .contains(&uri::load_cards(&["www.spiegel.de/politik/a-123.html"])));
    }

    #[test]
    fn test_verification_code_card() {
        let html = "<p>Your code is <b>482913</b>.</p>";
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message(html, Some("Your login code")))
            .unwrap();
        assert!(view.objects.is_empty());
        let heuristic = view.heuristic.expect("heuristic object");
        assert_eq!(heuristic.schema_type(), Some("EmailMessage"));
        assert_eq!(view.composition, Some(Composition::Cards));
        assert!(view.html.contains("xclipboard:482913"));
    }

    #[test]
    fn test_derivation_disabled_by_config() {
        let mut config = Config::default();
        config.extract.derive_verification_codes = false;
        let view = MessageViewExtractor::from_config(&config)
            .extract_message_for_view(&html_message("<b>482913</b>", Some("code")))
            .unwrap();
        assert!(view.heuristic.is_none());
    }

    #[test]
    fn test_skip_types_only_with_multiple_objects() {
        let single = r#"<script type="application/ld+json">{"@type":"WebPage","name":"Only"}</script>"#;
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message(single, None))
            .unwrap();
        assert_eq!(view.objects.len(), 1);

        let many = r#"<script type="application/ld+json">[{"@type":"WebPage","name":"Page"},{"@type":"Event","name":"Gig","startDate":"2025-05-01"}]</script>"#;
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message(many, None))
            .unwrap();
        assert_eq!(view.objects.len(), 1);
        assert_eq!(view.objects[0].schema_type(), Some("Event"));
    }

    #[test]
    fn test_all_skipped_objects_fall_through_to_heuristic() {
        let html = r#"<script type="application/ld+json">[{"@type":"WebPage","name":"Page"},{"@type":"BreadcrumbList"}]</script><p>Your code is <b>482913</b>.</p>"#;
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message(html, Some("Your code")))
            .unwrap();
        assert!(view.objects.is_empty());
        assert!(view.heuristic.is_some());
        assert_eq!(view.composition, Some(Composition::Cards));
        assert!(view.html.contains("xclipboard:482913"));
    }

    #[test]
    fn test_template_failure_falls_back_to_body() {
        let extractor = MessageViewExtractor::default();
        extractor.registry().set_card_template("Event", "{{#each}}");
        let html = r#"<script type="application/ld+json">{"@type":"Event","name":"Gig"}</script><p>body</p>"#;
        let view = extractor.extract_message_for_view(&html_message(html, None)).unwrap();
        assert_eq!(view.composition, None);
        assert_eq!(view.html, "<p>body</p>");
        assert_eq!(view.objects.len(), 1);
    }

    #[test]
    fn test_unreadable_viewable_aborts() {
        let message = MessageContent {
            viewables: vec![ContentNode::plain(Part::new("text/plain").with_filename("lost.txt"))],
            ..Default::default()
        };
        let err = MessageViewExtractor::default()
            .extract_message_for_view(&message)
            .unwrap_err();
        assert!(matches!(err, CardsError::ContentExtraction(_)));
    }

    #[test]
    fn test_missing_attachment_requested_not_awaited() {
        let loader = Arc::new(RecordingLoader::default());
        let extractor = MessageViewExtractor::default().with_loader(Box::new(Arc::clone(&loader)));
        let mut message = html_message("<p>invite</p>", None);
        message.attachments = vec![
            Part::new("text/calendar").with_filename("invite.ics"),
            Part::new("application/pdf").with_filename("menu.pdf"),
        ];
        let view = extractor.extract_message_for_view(&message).unwrap();
        assert_eq!(*loader.0.lock().unwrap(), vec!["invite.ics"]);
        assert_eq!(view.composition, Some(Composition::NoData));
    }

    #[test]
    fn test_show_source_button_appended() {
        let mut config = Config::default();
        config.render.show_source = true;
        let extractor = MessageViewExtractor::from_config(&config);
        let buttons = extractor.buttons_for(&serde_json::json!({"@type": "Thing"}));
        let last = buttons.last().unwrap();
        assert_eq!(last.icon.as_deref(), Some("code"));
        assert!(last.target.starts_with("xshowsource://"));
    }

    #[test]
    fn test_sanitizer_applied_to_body() {
        let view = MessageViewExtractor::default()
            .extract_message_for_view(&html_message("<p onclick=\"x()\">hi</p><script>bad()</script>", None))
            .unwrap();
        assert!(!view.html.contains("onclick"));
        assert!(!view.html.contains("bad()"));
    }
}
