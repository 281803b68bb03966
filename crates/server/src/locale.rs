//! Locale resolution from `Accept-Language`.

use axum::http::{header::ACCEPT_LANGUAGE, HeaderMap};

const MAX_TAG_LEN: usize = 35;

/// Preferred language tag of the request, or `default` when the header is
/// missing, unparsable, or only contains `*`.
///
/// Picks the tag with the highest `q` weight; ties keep header order. Tags
/// containing anything but ASCII letters, digits and `-` are ignored.
pub fn resolve_locale(headers: &HeaderMap, default: &str) -> String {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(preferred_tag)
        .unwrap_or_else(|| default.to_string())
}

fn preferred_tag(header: &str) -> Option<String> {
    let mut best: Option<(&str, f32)> = None;
    for part in header.split(',') {
        let mut pieces = part.split(';');
        let tag = pieces.next().unwrap_or_default().trim();
        if !is_valid_tag(tag) {
            continue;
        }
        let q = pieces
            .find_map(|p| p.trim().strip_prefix("q="))
            .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
            .unwrap_or(1.0);
        if q <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, b)| q > b) {
            best = Some((tag, q));
        }
    }
    best.map(|(tag, _)| tag.to_string())
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag.len() <= MAX_TAG_LEN
        && tag != "*"
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn missing_header_uses_default() {
        assert_eq!(resolve_locale(&HeaderMap::new(), "en-US"), "en-US");
    }

    #[test]
    fn picks_highest_weight() {
        assert_eq!(resolve_locale(&headers("fr-FR;q=0.5, de-DE, en;q=0.9"), "en-US"), "de-DE");
        assert_eq!(resolve_locale(&headers("es-ES, ja-JP"), "en-US"), "es-ES");
    }

    #[test]
    fn ignores_wildcards_and_junk() {
        assert_eq!(resolve_locale(&headers("*"), "en-US"), "en-US");
        assert_eq!(resolve_locale(&headers("../x, fr-FR;q=0.2"), "en-US"), "fr-FR");
        assert_eq!(resolve_locale(&headers("de-DE;q=0"), "en-US"), "en-US");
    }
}
