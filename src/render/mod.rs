//! Card rendering with handlebars.
//!
//! A [`CardRenderer`] compiles every template of one [`Registry`] snapshot
//! once and renders any number of cards from it.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::i18n;
use crate::model::structured::type_of;
use crate::model::{ButtonDescription, StructuredObject};
use crate::template::{builtin, Registry, TemplateMapping};

/// Context key holding the rendered subtemplate.
pub const SUBTEMPLATE_CONTENT: &str = "ld2hSubtemplateContent";
const TYPE_KEY: &str = "ld2hType";
const BUTTONS_KEY: &str = "ld2hButtons";
const DATE_KEY: &str = "ld2hDate";
const TIME_KEY: &str = "ld2hTime";
const IMAGE_KEY: &str = "ld2hImage";
const TABS_KEY: &str = "ld2hTabs";

/// Renders structured objects into card HTML fragments.
pub struct CardRenderer {
    registry: Arc<Registry>,
    hb: Handlebars<'static>,
}

impl CardRenderer {
    /// Compile all templates of `registry`.
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let mut hb = Handlebars::new();
        hb.register_partial("ld2hButton", builtin::BUTTON_PARTIAL)?;
        for (key, source) in registry.cards() {
            hb.register_template_string(&card_name(key), source)?;
        }
        for (key, source) in registry.subtemplates() {
            hb.register_template_string(&sub_name(key), source)?;
        }

        let icons = registry.icon_set().clone();
        hb.register_helper(
            "ld2hIcon",
            Box::new(
                move |h: &Helper,
                      _: &Handlebars,
                      _: &Context,
                      _: &mut RenderContext,
                      out: &mut dyn Output|
                      -> HelperResult {
                    if let Some(name) = h.param(0).and_then(|p| p.value().as_str()) {
                        if !name.is_empty() {
                            out.write(&icons.render(name))?;
                        }
                    }
                    Ok(())
                },
            ),
        );

        tracing::debug!(
            icon_set = registry.icon_set().name(),
            templates = hb.get_templates().len(),
            "Card renderer ready"
        );
        Ok(Self { registry, hb })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render one card. Array values are reduced to their first element.
    pub fn render(
        &self,
        obj: &StructuredObject,
        buttons: &[ButtonDescription],
        mapping: &TemplateMapping,
    ) -> Result<String> {
        let first = match &obj.value {
            Value::Array(items) => items.first().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        };
        let mut ctx = prepare(&first);
        let content = self.hb.render(&sub_name(&mapping.subtemplate), &ctx)?;
        ctx.insert(SUBTEMPLATE_CONTENT.into(), Value::String(content));
        ctx.insert(BUTTONS_KEY.into(), buttons_json(buttons));
        Ok(self.hb.render(&card_name(&mapping.card), &ctx)?)
    }

    /// Render a list of same-typed objects as one tabbed card, one tab per
    /// item with its own buttons.
    pub fn render_tabs(
        &self,
        items: &[(Value, Vec<ButtonDescription>)],
        mapping: &TemplateMapping,
    ) -> Result<String> {
        let mut tabs = Vec::with_capacity(items.len());
        for (index, (item, buttons)) in items.iter().enumerate() {
            let ctx = prepare(item);
            let content = self.hb.render(&sub_name(&mapping.subtemplate), &ctx)?;
            tabs.push(json!({
                "index": index,
                "title": tab_title(&ctx, index),
                "content": content,
                "buttons": buttons_json(buttons),
            }));
        }
        let ctx = json!({ TABS_KEY: tabs });
        Ok(self.hb.render(&card_name(&mapping.card), &ctx)?)
    }
}

fn card_name(key: &str) -> String {
    format!("card:{key}")
}

fn sub_name(key: &str) -> String {
    format!("sub:{key}")
}

fn buttons_json(buttons: &[ButtonDescription]) -> Value {
    serde_json::to_value(buttons).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn tab_title(ctx: &Map<String, Value>, index: usize) -> String {
    let nested_name = ctx
        .get("reservationFor")
        .and_then(|r| r.get("name"))
        .and_then(Value::as_str);
    let pick = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    pick(nested_name)
        .or_else(|| pick(ctx.get(TYPE_KEY).and_then(Value::as_str)))
        .unwrap_or_else(|| format!("{}", index + 1))
}

/// Build the template context for one object: reservation date/time
/// fields first, then arrays collapsed to their first value.
pub fn prepare(value: &Value) -> Map<String, Value> {
    let mut map = value.as_object().cloned().unwrap_or_default();
    let schema_type = type_of(&map).map(String::from);

    if schema_type.as_deref().is_some_and(|t| t.ends_with("Reservation")) {
        if let Some((date, time)) = reservation_start(&map).and_then(|s| split_timestamp(&s)) {
            map.insert(DATE_KEY.into(), Value::String(date));
            if let Some(time) = time {
                map.insert(TIME_KEY.into(), Value::String(time));
            }
        }
    }

    let mut collapsed = Value::Object(map);
    collapse_arrays(&mut collapsed);
    let Value::Object(mut map) = collapsed else {
        return Map::new();
    };

    if let Some(t) = schema_type {
        map.insert(TYPE_KEY.into(), Value::String(t));
    }
    if let Some(image) = image_url(&map) {
        map.insert(IMAGE_KEY.into(), Value::String(image));
    }
    map
}

/// The first start/departure/arrival timestamp of a reservation.
fn reservation_start(map: &Map<String, Value>) -> Option<String> {
    let direct = ["startDate", "startTime", "checkinTime"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str));
    if let Some(ts) = direct {
        return Some(ts.to_string());
    }
    let target = map.get("reservationFor").map(|r| match r {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    })?;
    ["departureTime", "startDate", "arrivalTime"]
        .iter()
        .find_map(|k| target.get(*k).and_then(Value::as_str))
        .map(String::from)
}

/// Split an ISO-8601 timestamp into localized date and (optional) time.
pub fn split_timestamp(ts: &str) -> Option<(String, Option<String>)> {
    let ts = ts.trim();
    let date_fmt = i18n::date_format();
    let time_fmt = i18n::time_format();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        let local = dt.naive_local();
        return Some((
            local.format(date_fmt).to_string(),
            Some(local.format(time_fmt).to_string()),
        ));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, pattern) {
            return Some((
                dt.format(date_fmt).to_string(),
                Some(dt.format(time_fmt).to_string()),
            ));
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .map(|d| (d.format(date_fmt).to_string(), None))
}

/// Replace every array by its first element, recursively. Empty arrays are dropped.
pub fn collapse_arrays(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };
    map.retain(|_, v| !matches!(v, Value::Array(items) if items.is_empty()));
    for v in map.values_mut() {
        if let Value::Array(items) = v {
            let first = std::mem::take(items).into_iter().next().unwrap_or(Value::Null);
            *v = first;
        }
        collapse_arrays(v);
    }
}

fn image_url(map: &Map<String, Value>) -> Option<String> {
    ["image", "thumbnailUrl", "thumbnail"]
        .iter()
        .filter_map(|k| map.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(o) => o
                .get("url")
                .or_else(|| o.get("contentUrl"))
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;
    use crate::template::IconSet;

    fn renderer() -> CardRenderer {
        CardRenderer::new(Arc::new(Registry::builtin())).unwrap()
    }

    #[test]
    fn test_collapse_arrays_recursive() {
        let mut v = json!({
            "name": ["First", "Second"],
            "offers": [],
            "reservationFor": {"provider": [{"name": "Air A"}, {"name": "Air B"}]}
        });
        collapse_arrays(&mut v);
        assert_eq!(
            v,
            json!({"name": "First", "reservationFor": {"provider": {"name": "Air A"}}})
        );
    }

    #[test]
    fn test_split_timestamp_forms() {
        let (date, time) = split_timestamp("2025-03-14T07:05:00+01:00").unwrap();
        assert_eq!(date, "Mar 14, 2025");
        assert_eq!(time.as_deref(), Some("7:05 AM"));
        let (date, time) = split_timestamp("2025-12-01").unwrap();
        assert_eq!(date, "Dec 1, 2025");
        assert_eq!(time, None);
        assert!(split_timestamp("tomorrow").is_none());
    }

    #[test]
    fn test_prepare_reservation_fields() {
        let ctx = prepare(&json!({
            "@type": "FlightReservation",
            "reservationFor": [{"departureTime": "2025-06-01T18:45:00Z"}],
            "image": {"@type": "ImageObject", "url": "https://img.example/p.png"}
        }));
        assert_eq!(ctx["ld2hDate"], "Jun 1, 2025");
        assert_eq!(ctx["ld2hTime"], "6:45 PM");
        assert_eq!(ctx["ld2hType"], "FlightReservation");
        assert_eq!(ctx["ld2hImage"], "https://img.example/p.png");
        assert!(ctx["reservationFor"].is_object());
    }

    #[test]
    fn test_non_reservation_gets_no_date_fields() {
        let ctx = prepare(&json!({"@type": "Event", "startDate": "2025-06-01T18:45:00Z"}));
        assert!(ctx.get("ld2hDate").is_none());
    }

    #[test]
    fn test_render_default_card_with_buttons() {
        let r = renderer();
        let obj = StructuredObject::new(
            json!({"@type": "Thing", "name": "A <Thing>", "description": ["One", "Two"]}),
            Source::JsonLd,
        );
        let buttons = vec![
            ButtonDescription::icon("open_in_browser", "https://x.example/"),
            ButtonDescription::new(Some("Confirm"), None, "https://x.example/ok"),
        ];
        let mapping = r.registry().resolve(obj.schema_type(), false);
        let html = r.render(&obj, &buttons, &mapping).unwrap();
        assert!(html.contains("A &lt;Thing&gt;"));
        assert!(html.contains(">One</h3>"));
        assert!(!html.contains("Two"));
        assert!(html.contains("material-icons mdc-button__icon\" aria-hidden=\"true\">open_in_browser</i>"));
        assert!(html.contains("<span class=\"mdc-button__label\">Confirm</span>"));
        assert_eq!(html.matches("mdc-card__action--button").count(), 2);
    }

    #[test]
    fn test_card_without_buttons_has_no_action_row() {
        let r = renderer();
        let obj = StructuredObject::new(json!({"name": "Plain"}), Source::JsonLd);
        let html = r.render(&obj, &[], &r.registry().resolve(None, false)).unwrap();
        assert!(html.contains("Plain"));
        assert!(!html.contains("mdc-card__actions"));
    }

    #[test]
    fn test_subtemplate_injected_into_custom_card() {
        let reg = Registry::builtin()
            .with_card_template("Recipe", "<article>{{{ld2hSubtemplateContent}}}|{{ld2hType}}</article>")
            .with_subtemplate("Recipe", "<em>{{name}}</em>");
        let r = CardRenderer::new(Arc::new(reg)).unwrap();
        let obj = StructuredObject::new(json!({"@type": "Recipe", "name": "Soup"}), Source::JsonLd);
        let html = r.render(&obj, &[], &r.registry().resolve(Some("Recipe"), false)).unwrap();
        assert_eq!(html, "<article><em>Soup</em>|Recipe</article>");
    }

    #[test]
    fn test_svg_icon_set_used_for_session() {
        let reg = Registry::builtin().with_icon_set(IconSet::svg());
        let r = CardRenderer::new(Arc::new(reg)).unwrap();
        let obj = StructuredObject::new(json!({"name": "x"}), Source::JsonLd);
        let html = r
            .render(&obj, &[ButtonDescription::icon("call", "tel:1")], &r.registry().resolve(None, false))
            .unwrap();
        assert!(html.contains("<svg"));
    }

    #[test]
    fn test_broken_template_is_an_error() {
        let reg = Registry::builtin().with_subtemplate("Event", "{{#if}}");
        assert!(CardRenderer::new(Arc::new(reg)).is_err());
    }

    #[test]
    fn test_tabs_one_button_and_panel_per_item() {
        let r = renderer();
        let items: Vec<(Value, Vec<ButtonDescription>)> = (1..=3)
            .map(|i| {
                (
                    json!({
                        "@type": "TrainReservation",
                        "reservationFor": {
                            "name": format!("Leg {i}"),
                            "departureStation": {"name": "A"},
                            "arrivalStation": {"name": "B"}
                        }
                    }),
                    vec![ButtonDescription::icon("share", format!("xshareasfile://{i}"))],
                )
            })
            .collect();
        let mapping = r.registry().resolve(Some("TrainReservation"), true);
        let html = r.render_tabs(&items, &mapping).unwrap();
        assert_eq!(html.matches("data-tab-index=").count(), 3);
        assert_eq!(html.matches("class=\"ld2h-tab-panel\"").count(), 3);
        assert_eq!(html.matches("mdc-tab--active").count(), 1);
        assert_eq!(html.matches(" hidden>").count(), 2);
        assert!(html.contains("Leg 2"));
        assert!(html.contains("xshareasfile://3"));
    }
}
