//! URL canonicalization and manifest entry resolution.

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent cache keys.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(mut host) = parsed.host_str() {
        let h = host.to_lowercase();
        host = h.as_str();
        parsed
            .set_host(Some(host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a precache manifest entry against the configured origin.
///
/// Absolute entries (anything carrying a scheme) go through
/// [`canonicalize`]; everything else is joined to the origin, so `/`,
/// `/offline.html` and `static/css/main.css` all work.
pub fn resolve(origin: &url::Url, entry: &str) -> Result<url::Url, UrlError> {
    let trimmed = entry.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if trimmed.contains("://") {
        return canonicalize(trimmed);
    }

    origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// Whether two URLs share scheme, host, and port.
pub fn same_origin(a: &url::Url, b: &url::Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("https://example.com?a=1&b=2").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        let result = canonicalize("");
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_root_relative() {
        let origin = url::Url::parse("https://app.example.org").unwrap();
        let url = resolve(&origin, "/offline.html").unwrap();
        assert_eq!(url.as_str(), "https://app.example.org/offline.html");
    }

    #[test]
    fn test_resolve_bare_relative() {
        let origin = url::Url::parse("https://app.example.org").unwrap();
        let url = resolve(&origin, "static/css/main.css").unwrap();
        assert_eq!(url.as_str(), "https://app.example.org/static/css/main.css");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let origin = url::Url::parse("https://app.example.org").unwrap();
        let url = resolve(&origin, "https://cdn.example.net/lib.min.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.net"));
    }

    #[test]
    fn test_resolve_empty() {
        let origin = url::Url::parse("https://app.example.org").unwrap();
        assert!(matches!(resolve(&origin, "  "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let a = url::Url::parse("https://app.example.org/page").unwrap();
        let b = url::Url::parse("https://app.example.org/other?x=1").unwrap();
        let c = url::Url::parse("https://cdn.example.net/lib.min.js").unwrap();
        let d = url::Url::parse("http://app.example.org/page").unwrap();
        assert!(same_origin(&a, &b));
        assert!(!same_origin(&a, &c));
        assert!(!same_origin(&a, &d));
    }

    #[test]
    fn test_same_origin_default_ports() {
        let a = url::Url::parse("https://app.example.org/").unwrap();
        let b = url::Url::parse("https://app.example.org:443/").unwrap();
        assert!(same_origin(&a, &b));
    }
}
