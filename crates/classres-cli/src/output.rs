//! Formatted output helpers for CLI commands.

use classres_common::types::{ClassInfo, DomainInfo};

/// Formats a class capacity, zero meaning no limit.
#[must_use]
pub fn format_capacity(capacity: u64) -> String {
    if capacity == 0 {
        "-".to_string()
    } else {
        capacity.to_string()
    }
}

/// Formats a class list as `name(capacity)` entries.
#[must_use]
pub fn format_classes(classes: &[ClassInfo]) -> String {
    classes
        .iter()
        .map(|c| {
            if c.capacity == 0 {
                c.name.clone()
            } else {
                format!("{}({})", c.name, c.capacity)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders discovery results as a table, one row per domain.
#[must_use]
pub fn domain_table(level: &str, domains: &[DomainInfo]) -> Vec<String> {
    let mut rows = Vec::with_capacity(domains.len() + 1);
    rows.push(format!("{:<10} {:<16} {:<8} {}", "LEVEL", "DOMAIN", "MUTABLE", "CLASSES"));
    for d in domains {
        rows.push(format!(
            "{:<10} {:<16} {:<8} {}",
            level,
            d.name,
            if d.mutable { "yes" } else { "no" },
            format_classes(&d.classes)
        ));
    }
    rows
}
