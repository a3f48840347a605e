//! Name and URL matching used to decide whether a remote resource already
//! belongs to a domain.
//!
//! Property names are compared by substring and callers take the first hit,
//! so two properties whose names both mention a domain are indistinguishable.
//! Stream URIs are compared by host: the domain itself or any subdomain of it
//! matches, while a host that merely ends in the same characters
//! (`notexample.com` against `example.com`) does not.

use crate::sites::Domain;

/// Normalise a display name for comparison: lowercase, spaces and dots removed.
fn normalize_display_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '.')
        .collect()
}

/// `true` if an analytics property's display name refers to `domain`.
///
/// `"British Pennies (britishpennies.com)"` and `"britishpennies com"` both
/// match `britishpennies.com`.
#[must_use]
pub fn property_matches(display_name: &str, domain: &Domain) -> bool {
    normalize_display_name(display_name).contains(&domain.compact())
}

/// Host part of a URI: scheme, userinfo, port, path, query and fragment removed.
fn uri_host(uri: &str) -> &str {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host.split_once(':').map_or(host, |(host, _)| host);
    host.strip_suffix('.').unwrap_or(host)
}

/// `true` if a web stream's default URI points at `domain` or one of its
/// subdomains.
#[must_use]
pub fn stream_uri_matches(default_uri: &str, domain: &Domain) -> bool {
    let uri = default_uri.trim().to_lowercase();
    let host = uri_host(&uri);
    let wanted = domain.as_str();
    host == wanted
        || host
            .strip_suffix(wanted)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// `true` if a Search Console site entry is the URL-prefix or domain
/// property for `domain`.
#[must_use]
pub fn site_url_matches(site_url: &str, domain: &Domain) -> bool {
    let site = site_url.trim().to_lowercase();
    if let Some(rest) = site.strip_prefix("sc-domain:") {
        return rest == domain.as_str();
    }
    let host = site
        .strip_prefix("https://")
        .or_else(|| site.strip_prefix("http://"));
    host.is_some_and(|h| h.trim_end_matches('/') == domain.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(raw: &str) -> Domain {
        Domain::parse(raw).unwrap()
    }

    #[test]
    fn property_matches_generated_display_name() {
        assert!(property_matches(
            "British Pennies (britishpennies.com)",
            &domain("britishpennies.com")
        ));
    }

    #[test]
    fn property_matches_ignores_case_spaces_and_dots() {
        assert!(property_matches(
            "BritishPennies COM",
            &domain("britishpennies.com")
        ));
    }

    #[test]
    fn property_does_not_match_sibling_tld() {
        assert!(!property_matches(
            "British Pennies (britishpennies.org)",
            &domain("britishpennies.com")
        ));
    }

    #[test]
    fn stream_uri_matches_with_and_without_trailing_slash() {
        let d = domain("example.com");
        assert!(stream_uri_matches("https://example.com", &d));
        assert!(stream_uri_matches("https://www.example.com/", &d));
        assert!(stream_uri_matches("HTTPS://EXAMPLE.COM/", &d));
    }

    #[test]
    fn stream_uri_does_not_match_other_domain() {
        assert!(!stream_uri_matches("https://example.org", &domain("example.com")));
        assert!(!stream_uri_matches("", &domain("example.com")));
    }

    #[test]
    fn stream_uri_requires_label_boundary() {
        let d = domain("example.com");
        assert!(!stream_uri_matches("https://notexample.com", &d));
        assert!(!stream_uri_matches("https://www.notexample.com/", &d));
        assert!(!stream_uri_matches("https://example.com.evil.net", &d));
    }

    #[test]
    fn stream_uri_ignores_path_port_and_query() {
        let d = domain("example.com");
        assert!(stream_uri_matches("https://example.com/blog", &d));
        assert!(stream_uri_matches("https://shop.example.com:8443/?utm=x", &d));
        assert!(stream_uri_matches("example.com", &d));
        assert!(!stream_uri_matches("https://other.org/example.com", &d));
    }

    #[test]
    fn site_url_matches_prefix_and_domain_properties() {
        let d = domain("example.com");
        assert!(site_url_matches("https://example.com/", &d));
        assert!(site_url_matches("http://example.com/", &d));
        assert!(site_url_matches("https://example.com", &d));
        assert!(site_url_matches("sc-domain:example.com", &d));
    }

    #[test]
    fn site_url_rejects_subdomains_and_paths() {
        let d = domain("example.com");
        assert!(!site_url_matches("https://www.example.com/", &d));
        assert!(!site_url_matches("https://example.com/blog/", &d));
        assert!(!site_url_matches("sc-domain:www.example.com", &d));
    }
}
