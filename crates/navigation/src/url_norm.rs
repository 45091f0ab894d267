use url::Url;

/// Canonical form used to compare navigation targets and key the page cache.
///
/// Strips one trailing slash from any non-root path. Scheme, host, port,
/// path, query and fragment are otherwise kept as parsed.
pub fn normalize(url: &Url) -> String {
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let mut trimmed = url.clone();
        trimmed.set_path(&path[..path.len() - 1]);
        return trimmed.into();
    }
    url.as_str().to_string()
}

/// Parse an absolute URL and normalize it.
pub fn normalize_str(raw: &str) -> Option<String> {
    Url::parse(raw).ok().map(|u| normalize(&u))
}

/// The URL relative hrefs resolve against: `base_href` joined onto the
/// document URL, or the document URL itself when there is no usable base.
pub fn base_url(document_url: &str, base_href: Option<&str>) -> Result<Url, url::ParseError> {
    let document = Url::parse(document_url)?;
    Ok(base_href
        .and_then(|href| document.join(href.trim()).ok())
        .unwrap_or(document))
}

/// Resolve `href` against `base`.
pub fn resolve(base: &Url, href: &str) -> Result<Url, url::ParseError> {
    base.join(href.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_trailing_slash() {
        assert_eq!(normalize_str("https://site/a/"), normalize_str("https://site/a"));
        assert_eq!(normalize_str("https://site/a/").as_deref(), Some("https://site/a"));
        assert_eq!(normalize_str("https://site/a//").as_deref(), Some("https://site/a/"));
    }

    #[test]
    fn root_slash_is_preserved() {
        assert_eq!(normalize_str("https://site/").as_deref(), Some("https://site/"));
        assert_eq!(normalize_str("https://site").as_deref(), Some("https://site/"));
    }

    #[test]
    fn query_and_fragment_are_significant() {
        assert_eq!(
            normalize_str("https://site/a/?q=1#top").as_deref(),
            Some("https://site/a?q=1#top")
        );
        assert_ne!(normalize_str("https://site/a#x"), normalize_str("https://site/a"));
        assert_ne!(normalize_str("https://site/a?p=2"), normalize_str("https://site/a"));
    }

    #[test]
    fn resolves_relative_hrefs() {
        let base = Url::parse("https://site/posts/one/").unwrap();
        assert_eq!(resolve(&base, "../two/").unwrap().as_str(), "https://site/posts/two/");
        assert_eq!(resolve(&base, "/about").unwrap().as_str(), "https://site/about");
    }

    #[test]
    fn base_href_rebases_relative_links() {
        let base = base_url("https://site/", Some("/blog/")).unwrap();
        assert_eq!(base.as_str(), "https://site/blog/");
        assert_eq!(resolve(&base, "post/").unwrap().as_str(), "https://site/blog/post/");

        let base = base_url("https://site/a/", None).unwrap();
        assert_eq!(base.as_str(), "https://site/a/");
        let base = base_url("https://site/a/", Some("http://[bad")).unwrap();
        assert_eq!(base.as_str(), "https://site/a/");
        assert!(base_url("not a url", Some("/x/")).is_err());
    }
}
