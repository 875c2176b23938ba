//! Internationalization (i18n) module.
//!
//! Translations are embedded at build time and looked up by dotted keys,
//! e.g. `draw.cancelled`. Missing keys fall back to English, then to the key.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "pt";

/// Global translation store: LangCode -> nested JSON.
static TRANSLATIONS: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (lang, raw) in [("pt", include_str!("pt.json")), ("en", include_str!("en.json"))] {
        match serde_json::from_str(raw) {
            Ok(val) => {
                map.insert(lang, val);
            }
            Err(e) => tracing::error!("Failed to parse {} translations: {}", lang, e),
        }
    }
    map
});

/// Get text for a key in a specific language.
pub fn get_text(lang: &str, key: &str) -> String {
    if let Some(text) = TRANSLATIONS.get(lang).and_then(|val| resolve_key(val, key)) {
        return text;
    }

    if lang != "en"
        && let Some(text) = TRANSLATIONS.get("en").and_then(|val| resolve_key(val, key))
    {
        return text;
    }

    key.to_string()
}

/// Whether translations exist for `lang`.
pub fn is_supported(lang: &str) -> bool {
    TRANSLATIONS.contains_key(lang)
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_fallback() {
        assert_eq!(get_text("pt", "draw.cancelled"), "🚪 Comando cancelado.");
        assert_eq!(get_text("en", "draw.cancelled"), "🚪 Command cancelled.");
        // Unknown locale falls back to English.
        assert_eq!(get_text("fr", "draw.cancelled"), "🚪 Command cancelled.");
        assert_eq!(get_text("pt", "draw.nope"), "draw.nope");
        assert!(is_supported("pt"));
        assert!(!is_supported("fr"));
    }

    #[test]
    fn test_locales_share_keys() {
        fn keys(val: &Value, prefix: String, out: &mut Vec<String>) {
            if let Some(obj) = val.as_object() {
                for (k, v) in obj {
                    keys(v, format!("{}{}.", prefix, k), out);
                }
            } else {
                out.push(prefix);
            }
        }

        let mut pt = Vec::new();
        let mut en = Vec::new();
        keys(&TRANSLATIONS["pt"], String::new(), &mut pt);
        keys(&TRANSLATIONS["en"], String::new(), &mut en);
        pt.sort();
        en.sort();
        assert_eq!(pt, en);
    }
}
