//! Formatting helpers for the playground binaries.

use std::fmt::Write;

use tessera_core::{Row, Value};

/// Render rows as a fixed-width table, showing at most `max_rows`.
pub fn format_rows(rows: &[Row], max_rows: usize) -> String {
    let mut output = String::new();
    let Some(first) = rows.first() else {
        output.push_str("(no rows)\n");
        return output;
    };

    let _ = write!(output, "| ");
    for name in first.names() {
        let _ = write!(output, "{:15} | ", truncate(name, 15));
    }
    let _ = writeln!(output);

    let _ = write!(output, "|");
    for _ in first.names() {
        let _ = write!(output, "{:-<17}|", "");
    }
    let _ = writeln!(output);

    for row in rows.iter().take(max_rows) {
        let _ = write!(output, "| ");
        for (_, value) in row.iter() {
            let _ = write!(output, "{:15} | ", truncate(&value.to_string(), 15));
        }
        let _ = writeln!(output);
    }

    if rows.len() > max_rows {
        let _ = writeln!(output, "... ({} more rows)", rows.len() - max_rows);
    }
    output
}

/// Render values as a comma-separated list, showing at most `max_values`.
pub fn format_values(values: &[Value], max_values: usize) -> String {
    let mut shown: Vec<String> = values.iter().take(max_values).map(ToString::to_string).collect();
    if values.len() > max_values {
        shown.push(format!("... ({} more)", values.len() - max_values));
    }
    format!("[{}]", shown.join(", "))
}

/// Print the partitioning of a dataset.
pub fn print_plan_summary(description: &str, block_sizes: &[usize]) {
    println!("{description}");
    println!("Blocks: {}", block_sizes.len());
    println!("Block sizes: {block_sizes:?}");
    println!("Total records: {}", block_sizes.iter().sum::<usize>());
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("  {title}");
    println!("{}", "=".repeat(60));
}
