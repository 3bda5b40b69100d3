//! Progress bar utilities.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Create a progress bar counting processed items.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template = format!(
        "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
        message.replace(['{', '}'], "")
    );
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
