//! Measurement-ID persistence and tracking-snippet rendering.

use std::collections::BTreeMap;
use std::path::Path;

use crate::sites::Domain;

/// Domain -> GA4 measurement ID, e.g. `example.com -> G-ABC123XYZ`.
pub type MeasurementIds = BTreeMap<Domain, String>;

/// Write the map as 2-space-indented JSON, creating the parent directory.
///
/// # Errors
///
/// Returns any I/O error from creating the directory or writing the file.
pub fn write_measurement_ids(path: &Path, ids: &MeasurementIds) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(ids).map_err(std::io::Error::other)?;
    json.push('\n');
    std::fs::write(path, json)
}

/// Render the gtag.js snippet to paste into the `<head>` of every page.
#[must_use]
pub fn tracking_snippet(measurement_id: &str) -> String {
    format!(
        r#"<!-- Google Analytics -->
<script async src="https://www.googletagmanager.com/gtag/js?id={measurement_id}"></script>
<script>
  window.dataLayer = window.dataLayer || [];
  function gtag(){{dataLayer.push(arguments);}}
  gtag('js', new Date());
  gtag('config', '{measurement_id}');
</script>"#
    )
}

/// Snippets for each domain in `order` that has a measurement ID, each
/// preceded by a `<!-- For {domain} -->` marker.
pub fn tracking_snippets<'a>(
    order: impl IntoIterator<Item = &'a Domain>,
    ids: &MeasurementIds,
) -> Vec<String> {
    order
        .into_iter()
        .filter_map(|domain| {
            ids.get(domain)
                .map(|id| format!("<!-- For {domain} -->\n{}", tracking_snippet(id)))
        })
        .collect()
}
