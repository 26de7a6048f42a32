use std::io::Write;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a status line: `      Locked 12 packages`
///
/// The `label` is right-aligned to 12 columns in bold green, followed by the
/// `message` in the default terminal colour. Written to stderr; stdout is
/// reserved for `lockwise tree`.
pub fn status(label: &str, message: &str) {
    emit(Style::new().green().bold(), label, message);
}

/// Like [`status`] but in bold cyan, for runs that changed nothing.
pub fn status_info(label: &str, message: &str) {
    emit(Style::new().cyan().bold(), label, message);
}

fn emit(style: Style, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}

/// Create an animated spinner shown while the resolver searches.
///
/// Finish it with [`ProgressBar::finish_and_clear`] once the search returns.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
