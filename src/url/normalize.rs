use url::Url;

/// Strips the query string from a URL for deduplication
///
/// Assignment links differ only in tracking or navigation parameters when
/// they come from different pages, so everything from the first `?` on is
/// dropped. Strings that are not URLs are handled the same way.
///
/// # Examples
///
/// ```
/// use moodle_reminder::url::strip_query;
///
/// assert_eq!(
///     strip_query("https://lms.example.ac.jp/mod/assign/view.php?id=42"),
///     "https://lms.example.ac.jp/mod/assign/view.php"
/// );
/// ```
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Removes trailing slashes from a configured portal base URL
pub fn trim_base_url(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// Builds an absolute portal endpoint from the base URL and a path
///
/// The base is treated as a directory even when it has no trailing slash, so
/// portals mounted below the host root (`https://host/moodle`) keep their
/// prefix.
pub fn portal_endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    let root = Url::parse(&format!("{}/", trim_base_url(base)))?;
    root.join(path.trim_start_matches('/'))
}
