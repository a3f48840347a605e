use super::*;

const TWO_SITES: &str = r"
organization: British Pennies
sites:
  - domain: britishpennies.com
  - domain: britishpennies.org
";

fn domain(raw: &str) -> Domain {
    Domain::parse(raw).unwrap()
}

#[test]
fn domain_is_lowercased_and_trimmed() {
    assert_eq!(domain("  Example.COM. ").as_str(), "example.com");
}

#[test]
fn domain_rejects_scheme() {
    let err = Domain::parse("https://example.com").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDomain { .. }), "got: {err:?}");
}

#[test]
fn domain_rejects_path_port_and_bare_names() {
    for raw in ["example.com/blog", "example.com:8080", "localhost", "", "a..com", "my site.com"] {
        assert!(Domain::parse(raw).is_err(), "expected '{raw}' to be rejected");
    }
}

#[test]
fn domain_derived_values() {
    let d = domain("britishpennies.org");
    assert_eq!(d.compact(), "britishpenniesorg");
    assert_eq!(d.site_url(), "https://britishpennies.org/");
    assert_eq!(d.default_uri(), "https://britishpennies.org");
    assert_eq!(stream_display_name(&d), "britishpennies.org Web Stream");
}

#[test]
fn parse_sites_applies_defaults() {
    let file = parse_sites(TWO_SITES).unwrap();
    assert_eq!(file.organization, "British Pennies");
    assert_eq!(file.time_zone, "Europe/London");
    assert_eq!(file.currency_code, "GBP");
    assert!(file.analytics_account.is_none());
    let domains: Vec<&str> = file.sites.iter().map(|s| s.domain.as_str()).collect();
    assert_eq!(domains, vec!["britishpennies.com", "britishpennies.org"]);
}

#[test]
fn property_display_name_defaults_to_organization_and_domain() {
    let file = parse_sites(TWO_SITES).unwrap();
    assert_eq!(
        file.property_display_name(&file.sites[0]),
        "British Pennies (britishpennies.com)"
    );
}

#[test]
fn property_display_name_override() {
    let yaml = r"
organization: Acme
sites:
  - domain: acme.io
    display_name: Acme Marketing Site
";
    let file = parse_sites(yaml).unwrap();
    assert_eq!(
        file.property_display_name(&file.sites[0]),
        "Acme Marketing Site"
    );
}

#[test]
fn parse_sites_rejects_invalid_domain_in_yaml() {
    let yaml = r"
organization: Acme
sites:
  - domain: https://acme.io
";
    let err = parse_sites(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::SitesFileParse(_)), "got: {err:?}");
}

#[test]
fn parse_sites_rejects_duplicates_case_insensitively() {
    let yaml = r"
organization: Acme
sites:
  - domain: acme.io
  - domain: ACME.io
";
    let err = parse_sites(yaml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")),
        "got: {err:?}"
    );
}

#[test]
fn parse_sites_rejects_empty_site_list() {
    let yaml = "organization: Acme\nsites: []\n";
    let err = parse_sites(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn parse_sites_rejects_blank_organization() {
    let yaml = "organization: '  '\nsites:\n  - domain: acme.io\n";
    let err = parse_sites(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn select_with_empty_filter_keeps_all() {
    let file = parse_sites(TWO_SITES).unwrap();
    assert_eq!(file.select(&[]).unwrap().len(), 2);
}

#[test]
fn select_keeps_file_order() {
    let file = parse_sites(TWO_SITES).unwrap();
    let picked = file
        .select(&[domain("britishpennies.org"), domain("britishpennies.com")])
        .unwrap();
    let names: Vec<&str> = picked.iter().map(|s| s.domain.as_str()).collect();
    assert_eq!(names, vec!["britishpennies.com", "britishpennies.org"]);
}

#[test]
fn select_rejects_unknown_domain() {
    let file = parse_sites(TWO_SITES).unwrap();
    let err = file.select(&[domain("example.com")]).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn load_sites_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_sites(&dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SitesFileIo { .. }), "got: {err:?}");
}

#[test]
fn load_sites_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.yaml");
    std::fs::write(&path, TWO_SITES).unwrap();
    let file = load_sites(&path).unwrap();
    assert_eq!(file.sites.len(), 2);
}
