//! Internationalization (i18n) module.
//!
//! Localized strings for card labels, header tables, banners and CLI help.
//! English is the default language; Spanish is available as an alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es-ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `MAILCARDS_LANG`, `LC_MESSAGES` or `LANG`.
pub fn detect_system_lang() -> Lang {
    ["MAILCARDS_LANG", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| Lang::from_code(&v))
        .unwrap_or(Lang::En)
}

/// Defines a translatable message function returning a `&'static str`
/// for the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(
    app_about,
    "mailcards \u{2014} Render email bodies and the structured data they carry as interactive cards.",
    "mailcards \u{2014} Convierte el cuerpo de un correo y sus datos estructurados en tarjetas interactivas."
);
msg!(
    app_long_about,
    "mailcards \u{2014} Flattens multipart messages into synchronized text and HTML,\nextracts JSON-LD, microdata and iCalendar data, and renders them as cards\nwith action buttons.",
    "mailcards \u{2014} Aplana mensajes multiparte en texto y HTML sincronizados,\nextrae datos JSON-LD, microdatos e iCalendar y los muestra como tarjetas\ncon botones de acci\u{f3}n."
);
msg!(
    app_after_help,
    "Configuration: $MAILCARDS_CONFIG or ~/.config/mailcards/config.toml",
    "Configuraci\u{f3}n: $MAILCARDS_CONFIG o ~/.config/mailcards/config.toml"
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_cmd_render,
    "Render a message (.eml) to HTML with cards",
    "Renderizar un mensaje (.eml) a HTML con tarjetas"
);
msg!(
    help_cmd_extract,
    "Print the structured data found in a message as JSON",
    "Mostrar como JSON los datos estructurados de un mensaje"
);
msg!(
    help_cmd_buttons,
    "Print the action buttons generated for a JSON-LD document",
    "Mostrar los botones de acci\u{f3}n generados para un documento JSON-LD"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "Generar autocompletado para la shell"
);
msg!(
    help_cmd_manpage,
    "Generate a man page",
    "Generar p\u{e1}gina de manual"
);

// ── Errors ───────────────────────────────────────────────────────

msg!(
    err_file_not_found,
    "File not found",
    "Fichero no encontrado"
);

// ── Message header table ─────────────────────────────────────────

msg!(header_from, "From:", "De:");
msg!(header_to, "To:", "Para:");
msg!(header_cc, "Cc:", "Cc:");
msg!(header_date, "Date:", "Fecha:");
msg!(header_subject, "Subject:", "Asunto:");
msg!(no_subject, "(No subject)", "(Sin asunto)");

// ── Buttons ──────────────────────────────────────────────────────

msg!(
    btn_copy_to_clipboard,
    "Copy to clipboard",
    "Copiar al portapapeles"
);
msg!(btn_confirm, "Confirm", "Confirmar");
msg!(btn_deny, "Deny", "Rechazar");
msg!(btn_accept, "Accept", "Aceptar");
msg!(btn_decline, "Decline", "Declinar");
msg!(btn_tentative, "Tentative", "Provisional");
msg!(btn_add_to_calendar, "Add to calendar", "A\u{f1}adir al calendario");
msg!(btn_close_poll, "Close poll", "Cerrar encuesta");
msg!(btn_retract_vote, "Retract vote", "Retirar voto");
msg!(btn_load_cards, "Load cards", "Cargar tarjetas");
msg!(btn_show_source, "Show source", "Ver c\u{f3}digo");

// ── Composer banners ─────────────────────────────────────────────

msg!(
    confirmation_code,
    "Confirmation code: ",
    "C\u{f3}digo de confirmaci\u{f3}n: "
);

// ── Date formats for card display fields ─────────────────────────

msg!(date_format, "%b %-d, %Y", "%-d %b %Y");
msg!(time_format, "%-I:%M %p", "%H:%M");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_code() {
        assert_eq!(Lang::from_code("en"), Some(Lang::En));
        assert_eq!(Lang::from_code("es_ES.UTF-8"), Some(Lang::Es));
        assert_eq!(Lang::from_code("EN-us"), Some(Lang::En));
        assert_eq!(Lang::from_code("fr"), None);
    }

    #[test]
    fn test_default_strings_are_english() {
        // No set_lang in unit tests: the default applies.
        assert_eq!(lang(), Lang::En);
        assert_eq!(header_from(), "From:");
        assert_eq!(no_subject(), "(No subject)");
    }
}
