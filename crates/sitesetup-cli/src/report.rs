//! Console report printed at the end of a run.

use std::path::Path;

use sitesetup_core::{tracking_snippets, write_measurement_ids, MeasurementIds, Mode, SiteConfig};

const RULE: &str = "============================================================";

const NEXT_STEPS: &str = "Next steps:
1. Verify domains in Search Console
2. Add the GA tracking code to all HTML files
3. Submit sitemaps in Search Console";

/// Tracking-code section for the selected sites, in configured order.
/// `None` when no measurement IDs were collected.
pub(crate) fn tracking_section(selected: &[&SiteConfig], ids: &MeasurementIds) -> Option<String> {
    let snippets = tracking_snippets(selected.iter().map(|s| &s.domain), ids);
    if snippets.is_empty() {
        return None;
    }
    let mut section = format!("{RULE}\nGA4 tracking code: add to the <head> of all HTML files\n{RULE}");
    for snippet in snippets {
        section.push_str("\n\n");
        section.push_str(&snippet);
    }
    section.push('\n');
    section.push_str(RULE);
    Some(section)
}

/// Print the tracking snippets, persist the measurement IDs and print the
/// closing guidance.
///
/// # Errors
///
/// Returns an error if the measurement-ID file cannot be written.
pub(crate) fn finish_setup(
    output_path: &Path,
    selected: &[&SiteConfig],
    ids: &MeasurementIds,
    mode: Mode,
) -> anyhow::Result<()> {
    if let Some(section) = tracking_section(selected, ids) {
        println!("\n{section}");
        match mode {
            Mode::Apply => {
                write_measurement_ids(output_path, ids).map_err(|e| {
                    anyhow::anyhow!("failed to write {}: {e}", output_path.display())
                })?;
                tracing::info!(path = %output_path.display(), count = ids.len(), "saved measurement IDs");
                println!("\nMeasurement IDs saved to: {}", output_path.display());
            }
            Mode::DryRun => {
                println!(
                    "\ndry-run: would save {} measurement IDs to {}",
                    ids.len(),
                    output_path.display()
                );
            }
        }
    }

    println!("\nSetup complete!\n\n{NEXT_STEPS}");
    Ok(())
}

/// Plain `domain: id` listing for runs that skip the full setup report.
pub(crate) fn print_measurement_ids(selected: &[&SiteConfig], ids: &MeasurementIds) {
    println!("\nMeasurement IDs:");
    for site in selected {
        if let Some(id) = ids.get(&site.domain) {
            println!("  {}: {id}", site.domain);
        }
    }
}
