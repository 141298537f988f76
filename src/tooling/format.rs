//! Format branch listings and revision details as text.

use crate::views::{BranchListing, RevisionDetail};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Format the branch overview printed by `list` without a revision number.
pub fn format_branch_listing_text(listing: &BranchListing) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Repository {}", listing.repository))
    ));
    let branches: Vec<String> = listing
        .branches
        .iter()
        .map(|name| {
            if *name == listing.default_branch {
                format!("{} (default)", name)
            } else {
                name.clone()
            }
        })
        .collect();
    out.push_str(&format!("  Branches: {}\n", branches.join(", ")));
    out.push_str(&format!("  Branch: {}\n", listing.branch));
    out.push_str(&format!("  Path: {}\n\n", listing.path));

    if listing.revisions.is_empty() {
        out.push_str("No revisions.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Created", "Stored", "Description"]);
    for revision in &listing.revisions {
        table.add_row(vec![
            revision.number.to_string(),
            revision.created_at.format(TIME_FORMAT).to_string(),
            format_size(revision.stored_size),
            revision.description.clone().unwrap_or_default(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Format one revision with its files; new content is marked with `*`.
pub fn format_revision_detail_text(detail: &RevisionDetail) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!(
            "Revision {} of branch {}",
            detail.revision.number, detail.branch
        ))
    ));
    out.push_str(&format!(
        "  Created: {}\n",
        detail.revision.created_at.format(TIME_FORMAT)
    ));
    out.push_str(&format!(
        "  Stored: {}\n",
        format_size(detail.revision.stored_size)
    ));
    if let Some(description) = &detail.revision.description {
        out.push_str(&format!("  Description: {}\n", description));
    }
    out.push('\n');

    if detail.files.is_empty() {
        out.push_str("No files.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["File", "New"]);
    for file in &detail.files {
        let mark = if file.changed {
            format!("{}", "*".green())
        } else {
            String::new()
        };
        table.add_row(vec![file.path.clone(), mark]);
    }
    out.push_str(&format!("{}\n", table));
    out
}
