//! Icon sets: how an icon name becomes markup inside a button.

use std::collections::BTreeMap;

use crate::parser::html::escape;

/// Maps icon names to markup. Names without an explicit entry fall back to
/// the Material Icons font glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    name: String,
    overrides: BTreeMap<String, String>,
}

impl Default for IconSet {
    fn default() -> Self {
        Self::material()
    }
}

impl IconSet {
    /// Ligature glyphs from the Material Icons web font.
    pub fn material() -> Self {
        Self {
            name: "material".to_string(),
            overrides: BTreeMap::new(),
        }
    }

    /// Inline SVG for the common actions, so cards render without the icon font.
    pub fn svg() -> Self {
        let overrides = SVG_PATHS
            .iter()
            .map(|(name, path)| {
                (
                    name.to_string(),
                    format!(
                        "<svg class=\"mdc-button__icon\" aria-hidden=\"true\" width=\"18\" height=\"18\" viewBox=\"0 0 24 24\"><path fill=\"currentColor\" d=\"{path}\"/></svg>"
                    ),
                )
            })
            .collect();
        Self {
            name: "svg".to_string(),
            overrides,
        }
    }

    /// Look up a built-in set by its config name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "material" => Some(Self::material()),
            "svg" => Some(Self::svg()),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy with `icon` rendered as `markup`.
    pub fn with_icon(mut self, icon: impl Into<String>, markup: impl Into<String>) -> Self {
        self.overrides.insert(icon.into(), markup.into());
        self
    }

    /// Markup for `icon`.
    pub fn render(&self, icon: &str) -> String {
        match self.overrides.get(icon) {
            Some(markup) => markup.clone(),
            None => format!(
                "<i class=\"material-icons mdc-button__icon\" aria-hidden=\"true\">{}</i>",
                escape(icon)
            ),
        }
    }
}

const SVG_PATHS: &[(&str, &str)] = &[
    ("call", "M6.62 10.79c1.44 2.83 3.76 5.14 6.59 6.59l2.2-2.2c.27-.27.67-.36 1.02-.24 1.12.37 2.33.57 3.57.57.55 0 1 .45 1 1V20c0 .55-.45 1-1 1-9.39 0-17-7.61-17-17 0-.55.45-1 1-1h3.5c.55 0 1 .45 1 1 0 1.25.2 2.45.57 3.57.11.35.03.74-.25 1.02l-2.2 2.2z"),
    ("mail", "M20 4H4c-1.1 0-1.99.9-1.99 2L2 18c0 1.1.9 2 2 2h16c1.1 0 2-.9 2-2V6c0-1.1-.9-2-2-2zm0 4l-8 5-8-5V6l8 5 8-5v2z"),
    ("map", "M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7zm0 9.5c-1.38 0-2.5-1.12-2.5-2.5s1.12-2.5 2.5-2.5 2.5 1.12 2.5 2.5-1.12 2.5-2.5 2.5z"),
    ("event", "M17 12h-5v5h5v-5zM16 1v2H8V1H6v2H5c-1.11 0-1.99.9-1.99 2L3 19c0 1.1.89 2 2 2h14c1.1 0 2-.9 2-2V5c0-1.1-.9-2-2-2h-1V1h-2zm3 18H5V8h14v11z"),
    ("share", "M18 16.08c-.76 0-1.44.3-1.96.77L8.91 12.7c.05-.23.09-.46.09-.7s-.04-.47-.09-.7l7.05-4.11c.54.5 1.25.81 2.04.81 1.66 0 3-1.34 3-3s-1.34-3-3-3-3 1.34-3 3c0 .24.04.47.09.7L8.04 9.81C7.5 9.31 6.79 9 6 9c-1.66 0-3 1.34-3 3s1.34 3 3 3c.79 0 1.5-.31 2.04-.81l7.12 4.16c-.05.21-.08.43-.08.65 0 1.61 1.31 2.92 2.92 2.92 1.61 0 2.92-1.31 2.92-2.92s-1.31-2.92-2.92-2.92z"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_glyph() {
        let html = IconSet::material().render("open_in_browser");
        assert_eq!(
            html,
            "<i class=\"material-icons mdc-button__icon\" aria-hidden=\"true\">open_in_browser</i>"
        );
    }

    #[test]
    fn test_svg_set_with_glyph_fallback() {
        let set = IconSet::svg();
        assert!(set.render("call").starts_with("<svg"));
        assert!(set.render("replay").contains("material-icons"));
    }

    #[test]
    fn test_by_name_and_override() {
        assert_eq!(IconSet::by_name("SVG").map(|s| s.name().to_string()), Some("svg".into()));
        assert!(IconSet::by_name("emoji").is_none());
        let set = IconSet::material().with_icon("call", "📞");
        assert_eq!(set.render("call"), "📞");
    }
}
