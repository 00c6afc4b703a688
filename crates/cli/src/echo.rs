use std::path::Path;

use owo_colors::OwoColorize;
use ttharvest_core::CrawlReport;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "ttharvest".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Harvest table-tennis coaching articles\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the outcome of a crawl
pub fn print_report(report: &CrawlReport, output: &Path) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Crawl Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Discovered:".dimmed(), report.discovered.to_string().bright_white());
    eprintln!("  {} {}", "Written:".dimmed(), report.written.to_string().bright_green());
    if report.skipped > 0 {
        eprintln!("  {} {}", "Skipped:".dimmed(), report.skipped.to_string().bright_yellow());
    }
    if report.failed > 0 {
        eprintln!("  {} {}", "Failed:".dimmed(), report.failed.to_string().bright_red());
    }
    if !report.external.is_empty() {
        eprintln!("  {} {}", "External:".dimmed(), report.external.len().to_string().bright_white());
    }
    eprintln!();

    print_success(&format!(
        "Wrote {} articles to {}",
        report.written,
        output.display().bright_white()
    ));
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
