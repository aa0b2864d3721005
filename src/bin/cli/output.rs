//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;

use rdasave::catalog::{Dlc, describe};
use rdasave::tree::Node;
use rdasave::{EditResult, FileEntry, Tree};

/// What `show` reports about a save.
pub struct SaveSummary<'a> {
    pub entry: &'a FileEntry,
    pub payload_size: usize,
    pub node_count: usize,
    pub counter: Option<u64>,
    pub items: &'a [u64],
}

/// What `extract` reports.
pub struct ExtractSummary<'a> {
    pub entry: &'a FileEntry,
    pub output: &'a Path,
    pub bytes_written: usize,
    pub raw: bool,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the directory listing
    fn format_list(&self, entries: &[FileEntry]) -> String;

    /// Formats the active item summary
    fn format_show(&self, summary: &SaveSummary<'_>) -> String;

    /// Formats the decoded tree
    fn format_dump(&self, tree: &Tree) -> String;

    /// Formats extraction results
    fn format_extract(&self, summary: &ExtractSummary<'_>) -> String;

    /// Formats activation results
    fn format_activate(&self, result: &EditResult, output: Option<&Path>) -> String;

    /// Formats the item catalogue
    fn format_catalog(&self) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[FileEntry]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:>12} {:>12} {:>19} {:>12} {}\n",
            "Size", "Compressed", "Modified", "Offset", "Name"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut total_size: u64 = 0;
        for entry in entries {
            total_size = total_size.saturating_add(entry.size);
            output.push_str(&format!(
                "{:>12} {:>12} {:>19} {:>12} {}\n",
                format_size(entry.size),
                format_size(entry.compressed_size),
                format_timestamp(entry.timestamp),
                format!("{:#x}", entry.data_pointer),
                entry.name
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} total\n",
            entries.len(),
            format_size(total_size)
        ));

        output
    }

    fn format_show(&self, summary: &SaveSummary<'_>) -> String {
        let mut output = String::new();

        output.push_str("Game Setup:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  File:           {}\n", summary.entry.name));
        output.push_str(&format!(
            "  Stored size:    {}\n",
            format_size(summary.entry.size)
        ));
        output.push_str(&format!(
            "  Payload size:   {}\n",
            format_size(summary.payload_size as u64)
        ));
        output.push_str(&format!("  Nodes:          {}\n", summary.node_count));
        match summary.counter {
            Some(count) => output.push_str(&format!("  Counter:        {}\n", count)),
            None => output.push_str("  Counter:        -\n"),
        }

        output.push_str(&format!("\nActive items ({}):\n", summary.items.len()));
        for &value in summary.items {
            output.push_str(&format!("  {:#010x}  {}\n", value, describe(value)));
        }

        output
    }

    fn format_dump(&self, tree: &Tree) -> String {
        tree.render()
    }

    fn format_extract(&self, summary: &ExtractSummary<'_>) -> String {
        format!(
            "Extracted {} ({}, {}) to {}\n",
            summary.entry.name,
            if summary.raw { "stored" } else { "decompressed" },
            format_size(summary.bytes_written as u64),
            summary.output.display()
        )
    }

    fn format_activate(&self, result: &EditResult, output: Option<&Path>) -> String {
        let mut text = String::new();

        for &value in &result.added {
            text.push_str(&format!("  + {}\n", describe(u64::from(value))));
        }
        for &value in &result.skipped {
            text.push_str(&format!(
                "  = {} (already active)\n",
                describe(u64::from(value))
            ));
        }

        match output {
            Some(path) if result.changed() => text.push_str(&format!(
                "Activated {} items ({} inserted, {} compressed) -> {}\n",
                result.added.len(),
                format_size(result.inserted_bytes as u64),
                format_size(result.compressed_size),
                path.display()
            )),
            _ => text.push_str("Nothing to activate; no file written\n"),
        }

        text
    }

    fn format_catalog(&self) -> String {
        Dlc::ALL
            .iter()
            .map(|dlc| format!("{:#010x}  {:>10}  {}\n", dlc.value(), dlc.value(), dlc))
            .collect()
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[FileEntry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "offset": e.data_pointer,
                    "size": e.size,
                    "compressed_size": e.compressed_size,
                    "modified": e.timestamp,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_show(&self, summary: &SaveSummary<'_>) -> String {
        let obj = json!({
            "file": summary.entry.name,
            "stored_size": summary.entry.size,
            "payload_size": summary.payload_size,
            "node_count": summary.node_count,
            "counter": summary.counter,
            "items": summary.items.iter().map(|&v| json!({
                "value": v,
                "name": Dlc::from_value(v).map(Dlc::name),
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_dump(&self, tree: &Tree) -> String {
        let nodes: Vec<_> = tree
            .iter()
            .filter_map(|(id, node)| match node {
                Node::Document { .. } => None,
                Node::Tag(tag) => Some(json!({
                    "kind": "tag",
                    "path": tree.path(id),
                    "id": tag.element_id,
                    "offset": tag.offset,
                })),
                Node::Attribute(attr) => Some(json!({
                    "kind": "attribute",
                    "path": tree.path(id),
                    "id": attr.element_id,
                    "offset": attr.offset,
                    "width": attr.width(),
                    "value": attr.value(),
                })),
            })
            .collect();

        serde_json::to_string_pretty(&nodes).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_extract(&self, summary: &ExtractSummary<'_>) -> String {
        let obj = json!({
            "file": summary.entry.name,
            "output": summary.output.display().to_string(),
            "bytes_written": summary.bytes_written,
            "raw": summary.raw,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_activate(&self, result: &EditResult, output: Option<&Path>) -> String {
        let obj = json!({
            "changed": result.changed(),
            "added": result.added,
            "skipped": result.skipped,
            "inserted_bytes": result.inserted_bytes,
            "compressed_size": result.compressed_size,
            "container_size": result.container_size,
            "output": output.filter(|_| result.changed()).map(|p| p.display().to_string()),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_catalog(&self) -> String {
        let items: Vec<_> = Dlc::ALL
            .iter()
            .map(|dlc| json!({ "name": dlc.name(), "value": dlc.value() }))
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Formats a byte count with a binary unit.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Last second of 9999-12-31, UTC.
const LAST_DISPLAYED_SECOND: u64 = 253_402_300_799;

/// Formats an entry timestamp (Unix seconds, UTC).
///
/// Zero prints as `-`. Values past the year 9999 print as the raw number.
pub fn format_timestamp(secs: u64) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    if secs > LAST_DISPLAYED_SECOND {
        return secs.to_string();
    }
    // bounded above, so the day count fits in i64
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time = secs % 86_400;
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        time / 3600,
        time % 3600 / 60,
        time % 60
    )
}

/// Converts days since 1970-01-01 to a proleptic Gregorian date.
///
/// Counts in 400-year eras starting on March 1st, so leap days fall at the
/// end of each computed year.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let shifted = days + 719_468;
    let era = shifted.div_euclid(146_097);
    let day_of_era = shifted.rem_euclid(146_097);
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * month_index + 2) / 5 + 1) as u32;
    let month = (if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
