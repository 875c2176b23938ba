//! Image references and media framing.

use url::Url;

/// Crop applied to card art so it renders as a portrait.
pub const CARD_TRANSFORM: &str = "ar_3:4,c_crop";

/// How Telegram should frame a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Animation,
    Video,
}

impl MediaKind {
    /// Classify a resolved URL by its file extension.
    pub fn of(url: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();

        match ext {
            "gif" => MediaKind::Animation,
            "mp4" | "webm" | "mov" => MediaKind::Video,
            _ => MediaKind::Photo,
        }
    }
}

/// A URL together with how to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

impl Media {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: MediaKind::of(&url),
            url,
        }
    }
}

/// Turns stored image references into fetchable URLs.
///
/// Absolute http(s) URLs pass through untouched. Anything else is a key on
/// the CDN and gets the optional transform prepended as a path segment.
#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    base_url: Option<Url>,
}

impl ImageResolver {
    pub fn new(base_url: Option<&str>) -> Self {
        let base_url = base_url.and_then(|raw| {
            let raw = if raw.ends_with('/') {
                raw.to_string()
            } else {
                format!("{}/", raw)
            };
            Url::parse(&raw).ok()
        });
        Self { base_url }
    }

    pub fn resolve(&self, reference: &str, transform: Option<&str>) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        if let Ok(url) = Url::parse(reference)
            && matches!(url.scheme(), "http" | "https")
        {
            return Some(url.into());
        }

        let base = self.base_url.as_ref()?;
        let key = reference.trim_start_matches('/');
        // "./" keeps a transform like "ar_3:4" from being read as a scheme.
        let path = match transform {
            Some(t) if !t.is_empty() => format!("./{}/{}", t, key),
            _ => format!("./{}", key),
        };
        base.join(&path).ok().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind() {
        assert_eq!(MediaKind::of("https://cdn.example/a.gif"), MediaKind::Animation);
        assert_eq!(MediaKind::of("https://cdn.example/a.MP4?c"), MediaKind::Video);
        assert_eq!(MediaKind::of("https://cdn.example/a.webm#t=1"), MediaKind::Video);
        assert_eq!(MediaKind::of("https://cdn.example/a.png"), MediaKind::Photo);
        assert_eq!(
            MediaKind::of("https://placehold.co/400x624.png?text=x.gif"),
            MediaKind::Photo
        );
        assert_eq!(MediaKind::of("no-extension"), MediaKind::Photo);
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let resolver = ImageResolver::new(None);
        assert_eq!(
            resolver.resolve("https://img.example/1.png", Some(CARD_TRANSFORM)),
            Some("https://img.example/1.png".to_string())
        );
        assert_eq!(resolver.resolve("abc.png", None), None);
        assert_eq!(resolver.resolve("   ", None), None);
    }

    #[test]
    fn test_resolve_cdn_key() {
        let resolver = ImageResolver::new(Some("https://cdn.example/images"));
        assert_eq!(
            resolver.resolve("cards/abc.png", None),
            Some("https://cdn.example/images/cards/abc.png".to_string())
        );
        assert_eq!(
            resolver.resolve("/abc.png", Some(CARD_TRANSFORM)),
            Some("https://cdn.example/images/ar_3:4,c_crop/abc.png".to_string())
        );
    }
}
