//! JSON-LD and microdata extraction from HTML.

use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Map, Value};

use crate::error::{CardsError, Result};

/// Pulls structured-data documents out of HTML and JSON text.
///
/// Each returned entry is one payload; a malformed payload is an `Err`
/// that the caller skips without losing the others.
pub trait StructuredDataParser {
    fn parse_json_ld(&self, html: &str) -> Vec<Result<Value>>;
    fn parse_microdata(&self, html: &str) -> Vec<Result<Value>>;
    fn parse_from_json_text(&self, text: &str) -> Vec<Result<Value>>;
}

/// Default [`StructuredDataParser`] built on `scraper`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScraperParser;

impl StructuredDataParser for ScraperParser {
    fn parse_json_ld(&self, html: &str) -> Vec<Result<Value>> {
        let Ok(selector) = Selector::parse("script[type]") else {
            return Vec::new();
        };
        let document = Html::parse_document(html);
        document
            .select(&selector)
            .filter(|el| {
                el.value()
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            })
            .map(|el| parse_json(&el.text().collect::<String>(), "json-ld"))
            .collect()
    }

    fn parse_microdata(&self, html: &str) -> Vec<Result<Value>> {
        let Ok(selector) = Selector::parse("[itemscope]") else {
            return Vec::new();
        };
        let document = Html::parse_document(html);
        document
            .select(&selector)
            // Nested scopes are reached through their parent's itemprop.
            .filter(|el| el.value().attr("itemprop").is_none())
            .map(|el| {
                let mut item = read_item(el);
                if item.is_empty() {
                    return Err(CardsError::parse("microdata", "empty itemscope"));
                }
                let mut doc = Map::new();
                doc.insert("@context".into(), json!("https://schema.org"));
                doc.append(&mut item);
                Ok(Value::Object(doc))
            })
            .collect()
    }

    fn parse_from_json_text(&self, text: &str) -> Vec<Result<Value>> {
        vec![parse_json(text, "ld+json part")]
    }
}

fn parse_json(raw: &str, source_kind: &'static str) -> Result<Value> {
    let cleaned = raw
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim()
        .trim_start_matches("//<![CDATA[")
        .trim_end_matches("//]]>")
        .trim();
    serde_json::from_str(cleaned).map_err(|e| CardsError::parse(source_kind, e))
}

/// Read one `itemscope` element into a map (without `@context`).
fn read_item(scope: ElementRef<'_>) -> Map<String, Value> {
    let mut item = Map::new();
    if let Some(itemtype) = scope.value().attr("itemtype") {
        let first = itemtype.split_whitespace().next().unwrap_or("");
        let name = first.trim_end_matches('/').rsplit('/').next().unwrap_or(first);
        if !name.is_empty() {
            item.insert("@type".into(), json!(name));
        }
    }
    collect_props(scope, &mut item);
    item
}

fn collect_props(parent: ElementRef<'_>, item: &mut Map<String, Value>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        let is_scope = child.value().attr("itemscope").is_some();
        if let Some(props) = child.value().attr("itemprop") {
            let value = if is_scope {
                Value::Object(read_item(child))
            } else {
                json!(property_value(child))
            };
            for name in props.split_whitespace() {
                add_value(item, name, value.clone());
            }
        }
        if !is_scope {
            collect_props(child, item);
        }
    }
}

/// Repeated properties become arrays in document order.
fn add_value(item: &mut Map<String, Value>, name: &str, value: Value) {
    match item.get_mut(name) {
        None => {
            item.insert(name.to_string(), value);
        }
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn property_value(el: ElementRef<'_>) -> String {
    let node = el.value();
    let attr = match node.name() {
        "meta" => node.attr("content"),
        "a" | "area" | "link" => node.attr("href"),
        "img" | "audio" | "video" | "source" | "iframe" | "embed" | "track" => node.attr("src"),
        "object" => node.attr("data"),
        "time" => node.attr("datetime"),
        "data" | "meter" => node.attr("value"),
        _ => None,
    };
    match attr.or_else(|| node.attr("content")) {
        Some(v) => v.trim().to_string(),
        None => el
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}
