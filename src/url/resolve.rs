use url::Url;

/// Returns true if an href points somewhere a browser would navigate to
///
/// Empty hrefs, same-page fragments, `javascript:` pseudo-URLs and mail links
/// are rejected. The check is case-insensitive on the scheme.
pub fn is_navigable_href(href: &str) -> bool {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !(lower.starts_with("javascript:") || lower.contains("mailto:"))
}

/// Resolves an href or form action to an absolute URL
///
/// Relative references are joined against `base`, which must be the URL of
/// the page that actually hosted the link or form (after redirects), not the
/// URL that was originally requested.
///
/// Returns None if the href is not navigable, fails to parse, or resolves to
/// something other than HTTP(S).
///
/// # Examples
///
/// ```
/// use moodle_reminder::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://lms.example.ac.jp/login/index.php").unwrap();
/// let url = resolve_link("/my/", &base).unwrap();
/// assert_eq!(url.as_str(), "https://lms.example.ac.jp/my/");
/// assert!(resolve_link("javascript:void(0)", &base).is_none());
/// ```
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    if !is_navigable_href(href) {
        return None;
    }

    match base.join(href.trim()) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
