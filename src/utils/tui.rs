//! Text User Interface (TUI) utilities.
//!
//! Handles formatted output for the CLI. Sweeps write finished lines to a
//! [`Report`]; the console implementation prints them, tests collect them.

use crate::registry::HashRegistry;
use terminal_size::{terminal_size, Width};

/// Receives finished report lines.
pub trait Report {
    fn line(&mut self, text: &str);

    fn blank(&mut self) {
        self.line("");
    }
}

/// Prints report lines to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct Console;

impl Report for Console {
    fn line(&mut self, text: &str) {
        println!("{}", text);
    }
}

impl Report for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Human-readable speed, base 1024, two decimals. `None` is printed as
/// `n/a`.
pub fn format_speed(bytes_per_second: Option<f64>) -> String {
    const UNITS: [&str; 5] = ["B/s", "KB/s", "MB/s", "GB/s", "TB/s"];

    let Some(mut value) = bytes_per_second.filter(|v| v.is_finite()) else {
        return "n/a".to_string();
    };

    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Title framed by `#` lines, e.g. `# HASH: FNV-1a-32 #`.
pub fn framed_title(hash_name: &str) -> [String; 3] {
    let title = format!("# HASH: {} #", hash_name);
    let frame = "#".repeat(title.chars().count());
    [frame.clone(), title, frame]
}

/// Truncate string with ellipsis if it exceeds width (character-wise)
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut result: String = s.chars().take(width.saturating_sub(3)).collect();
        result.push_str("...");
        result
    }
}

/// Print the application header
pub fn print_header() {
    let term_width = get_term_width().min(80); // Cap header at 80
    let title = " Hash Throughput Benchmarks ";
    let padding = term_width.saturating_sub(title.len() + 2) / 2;
    let right_padding = term_width.saturating_sub(padding + title.len());

    let border = "═".repeat(term_width);

    println!("╔{}╗", border);
    println!(
        "║{}{}{}║",
        " ".repeat(padding),
        title,
        " ".repeat(right_padding)
    );
    println!("╚{}╝", border);
    println!();
}

/// Print the list of available hashes
pub fn print_available_hashes(registry: &HashRegistry) {
    let description_width = get_term_width().saturating_sub(26).max(20);

    println!("Available hashes:");
    println!();
    for case in registry.all() {
        println!(
            "  {:<22} {}",
            case.name,
            truncate(case.description, description_width)
        );
    }
}
