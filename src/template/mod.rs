//! Template registry and type-driven template resolution.
//!
//! A [`Registry`] is an immutable snapshot of card templates, subtemplates
//! and the icon set. Changes produce a new snapshot; [`SharedRegistry`]
//! publishes snapshots to concurrent renderers.

pub mod builtin;
pub mod icons;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

pub use icons::IconSet;

/// Key every registry resolves to when nothing more specific matches.
pub const DEFAULT_KEY: &str = "default";

/// Type suffixes that share a family template (`FlightReservation` → `Reservation`).
const FAMILIES: &[&str] = &["Reservation", "Event"];

/// Template keys chosen for one structured object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMapping {
    /// Card template key.
    pub card: String,
    /// Subtemplate key.
    pub subtemplate: String,
    /// `true` when the card renders a list of instances as tabs.
    pub tabbed: bool,
}

/// Card templates, subtemplates and icon set used by a rendering session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    cards: BTreeMap<String, String>,
    subtemplates: BTreeMap<String, String>,
    icon_set: IconSet,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// The shipped templates with the Material icon font.
    pub fn builtin() -> Self {
        let to_map = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            cards: to_map(builtin::CARDS),
            subtemplates: to_map(builtin::SUBTEMPLATES),
            icon_set: IconSet::material(),
        }
    }

    /// Return a copy with the card template for `key` set to `template`.
    pub fn with_card_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.cards.insert(key.into(), template.into());
        self
    }

    /// Return a copy with the subtemplate for `key` set to `template`.
    pub fn with_subtemplate(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.subtemplates.insert(key.into(), template.into());
        self
    }

    pub fn with_icon_set(mut self, icon_set: IconSet) -> Self {
        self.icon_set = icon_set;
        self
    }

    pub fn icon_set(&self) -> &IconSet {
        &self.icon_set
    }

    pub fn cards(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn subtemplates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.subtemplates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Choose the card template and subtemplate for `schema_type`.
    ///
    /// Each is looked up independently: exact type, then the type's family
    /// (`...Reservation`, `...Event`), then [`DEFAULT_KEY`]. A homogeneous
    /// array looks for the pluralized family card (`Reservations`) first.
    /// Never fails.
    pub fn resolve(&self, schema_type: Option<&str>, homogeneous_array: bool) -> TemplateMapping {
        let subtemplate = lookup(&self.subtemplates, schema_type);

        if homogeneous_array {
            if let Some(plural) = schema_type.map(plural_key) {
                if self.cards.contains_key(&plural) {
                    return TemplateMapping {
                        card: plural,
                        subtemplate,
                        tabbed: true,
                    };
                }
            }
        }

        TemplateMapping {
            card: lookup(&self.cards, schema_type),
            subtemplate,
            tabbed: false,
        }
    }
}

fn family(schema_type: &str) -> Option<&'static str> {
    FAMILIES
        .iter()
        .copied()
        .find(|suffix| schema_type.ends_with(suffix))
}

fn plural_key(schema_type: &str) -> String {
    format!("{}s", family(schema_type).unwrap_or(schema_type))
}

fn lookup(map: &BTreeMap<String, String>, schema_type: Option<&str>) -> String {
    if let Some(t) = schema_type {
        if map.contains_key(t) {
            return t.to_string();
        }
        if let Some(f) = family(t).filter(|f| map.contains_key(*f)) {
            return f.to_string();
        }
    }
    DEFAULT_KEY.to_string()
}

/// A registry that can be swapped while renderers hold older snapshots.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<Registry>>,
}

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The registry as of now. Use one snapshot for a whole rendering session.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the registry with `f(current)`.
    pub fn update(&self, f: impl FnOnce(Registry) -> Registry) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = f((**guard).clone());
        *guard = Arc::new(next);
    }

    pub fn set_card_template(&self, key: &str, template: &str) {
        self.update(|r| r.with_card_template(key, template));
    }

    pub fn set_subtemplate(&self, key: &str, template: &str) {
        self.update(|r| r.with_subtemplate(key, template));
    }

    pub fn set_icon_set(&self, icon_set: IconSet) {
        self.update(|r| r.with_icon_set(icon_set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservations_resolve_past_default() {
        let reg = Registry::builtin();
        let flight = reg.resolve(Some("FlightReservation"), false);
        let train = reg.resolve(Some("TrainReservation"), false);
        let unknown = reg.resolve(Some("UnknownType123"), false);
        assert_ne!(flight, unknown);
        assert_ne!(train, unknown);
        assert_ne!(flight.subtemplate, DEFAULT_KEY);
        assert_eq!(unknown, reg.resolve(None, false));
        assert_eq!(unknown.card, DEFAULT_KEY);
        assert_eq!(unknown.subtemplate, DEFAULT_KEY);
    }

    #[test]
    fn test_family_fallback() {
        let reg = Registry::builtin();
        let bus = reg.resolve(Some("BusReservation"), false);
        assert_eq!(bus.subtemplate, "Reservation");
        let gig = reg.resolve(Some("MusicEvent"), false);
        assert_eq!(gig.subtemplate, "Event");
        assert_eq!(gig.card, DEFAULT_KEY);
    }

    #[test]
    fn test_card_and_subtemplate_resolve_independently() {
        let reg = Registry::builtin().with_card_template("Recipe", "<div>{{{ld2hSubtemplateContent}}}</div>");
        let recipe = reg.resolve(Some("Recipe"), false);
        assert_eq!(recipe.card, "Recipe");
        assert_eq!(recipe.subtemplate, "Recipe");

        let reg = Registry::builtin().with_card_template("Person", "<p/>");
        let person = reg.resolve(Some("Person"), false);
        assert_eq!(person.card, "Person");
        assert_eq!(person.subtemplate, DEFAULT_KEY);
    }

    #[test]
    fn test_homogeneous_array_selects_tabbed_card() {
        let reg = Registry::builtin();
        let tabs = reg.resolve(Some("FlightReservation"), true);
        assert_eq!(tabs.card, "Reservations");
        assert!(tabs.tabbed);
        assert_eq!(tabs.subtemplate, "FlightReservation");

        let events = reg.resolve(Some("Event"), true);
        assert!(!events.tabbed);
        assert_eq!(events.card, DEFAULT_KEY);
    }

    #[test]
    fn test_shared_registry_snapshots_are_stable() {
        let shared = SharedRegistry::new(Registry::builtin());
        let before = shared.snapshot();
        shared.set_subtemplate("Person", "<b>{{name}}</b>");
        shared.set_icon_set(IconSet::svg());
        let after = shared.snapshot();

        assert_eq!(before.resolve(Some("Person"), false).subtemplate, DEFAULT_KEY);
        assert_eq!(after.resolve(Some("Person"), false).subtemplate, "Person");
        assert_eq!(before.icon_set().name(), "material");
        assert_eq!(after.icon_set().name(), "svg");
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let shared = Arc::new(SharedRegistry::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        if i == 0 {
                            shared.set_card_template(&format!("T{j}"), "<p/>");
                        } else {
                            let snap = shared.snapshot();
                            assert_eq!(snap.resolve(None, false).card, DEFAULT_KEY);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.snapshot().resolve(Some("T49"), false).card, "T49");
    }
}
