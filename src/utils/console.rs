// src/utils/console.rs

//! Console output for batch summaries.
//!
//! Diagnostics go through the `log` facade; this module only prints the
//! human-facing summary blocks the CLI shows after each batch.

use chrono::Local;

/// Format a console line with a timestamp and tag.
fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

/// Print a header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line("INFO", &border));
    println!("{}", format_line("INFO", &format!("  {}", title)));
    println!("{}", format_line("INFO", &border));
}

/// Print a sub-item (indented).
pub fn sub_item(message: &str) {
    println!("{}", format_line("INFO", &format!("    {}", message)));
}

/// Print a summary section.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!("{}", format_line("SUMMARY", title));
    for (key, value) in items {
        sub_item(&format!("{}: {}", key, value));
    }
}
