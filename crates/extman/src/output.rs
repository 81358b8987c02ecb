//! Terminal output for extman commands
//!
//! Progress and notes go to stderr so that `--json` output on stdout stays
//! machine-readable.

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Width of the key column in `field` listings
const FIELD_WIDTH: usize = 12;

/// Print a success line
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print a note about an empty or unusual result
pub fn note(msg: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), msg);
}

/// Print the heading for one extension, with its version when known
pub fn extension_heading(name: &str, version: Option<&str>) {
    match version {
        Some(version) => println!("\n{} {}", style(name).bold().underlined(), style(version).dim()),
        None => println!("\n{}", style(name).bold().underlined()),
    }
}

/// Print one aligned `key  value` line under a heading
pub fn field(key: &str, value: impl std::fmt::Display) {
    println!("  {:<width$} {}", style(key).dim(), value, width = FIELD_WIDTH);
}

/// Run `work` behind a spinner on stderr, cleared once it returns
///
/// The spinner is hidden when stderr is not a terminal.
pub fn with_spinner<T>(msg: &str, work: impl FnOnce() -> T) -> T {
    let spinner = if Term::stderr().is_term() {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(template);
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(msg.to_string());

    let result = work();
    spinner.finish_and_clear();
    result
}
