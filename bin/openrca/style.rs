//! Terminal styling for status output
//!
//! Everything here writes to stderr; stdout carries the JSON reports.

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use colors::*;
use openrca_pipeline::RunStatus;

pub fn style_red(s: &str) -> String {
    format!("{}{}{}", RED, s, RESET)
}

pub fn style_yellow(s: &str) -> String {
    format!("{}{}{}", YELLOW, s, RESET)
}

pub fn style_dim(s: &str) -> String {
    format!("{}{}{}", DIM, s, RESET)
}

pub fn icon_success() -> String {
    format!("{}✓{}", GREEN, RESET)
}

pub fn icon_error() -> String {
    format!("{}✗{}", RED, RESET)
}

pub fn icon_warning() -> String {
    format!("{}⚠{}", YELLOW, RESET)
}

pub fn icon_info() -> String {
    format!("{}ℹ{}", BLUE, RESET)
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}{}{}", icon_error(), RED, msg, RESET);
}

pub fn print_info(msg: &str) {
    eprintln!("{} {}", icon_info(), msg);
}

pub fn print_header(title: &str) {
    eprintln!();
    eprintln!(
        "{}{} {} {}{}",
        BOLD,
        CYAN,
        title,
        "─".repeat(50usize.saturating_sub(title.chars().count())),
        RESET
    );
    eprintln!();
}

pub fn print_section(title: &str) {
    eprintln!();
    eprintln!("  {}{}{}", BOLD, title, RESET);
    eprintln!("  {}", style_dim(&"─".repeat(40)));
}

pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {}{}:{} {}", GRAY, key, RESET, value);
}

pub fn print_messages(errors: &[String], warnings: &[String]) {
    if !errors.is_empty() {
        print_section("Errors");
        for error in errors {
            eprintln!("    {} {}", icon_error(), style_red(error));
        }
    }
    if !warnings.is_empty() {
        print_section("Warnings");
        for warning in warnings {
            eprintln!("    {} {}", icon_warning(), style_yellow(warning));
        }
    }
}

/// Final status line of a stage
pub fn print_status(status: RunStatus) {
    eprintln!();
    match status {
        RunStatus::Success => eprintln!("{} Completed successfully", icon_success()),
        RunStatus::Partial => eprintln!(
            "{} {}Completed with partial success{}",
            icon_warning(),
            YELLOW,
            RESET
        ),
        RunStatus::Failed => print_error("Failed"),
    }
}
