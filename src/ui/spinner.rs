//! Progress spinner utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner on stderr with the given message
///
/// Returns `None` in quiet mode.
pub fn create_spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    // Falls back to the default template if ours is rejected
    let style = match style.clone().template("{spinner:.blue} {msg} [{elapsed}]") {
        Ok(templated) => templated,
        Err(_) => style,
    };
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Finish spinner with a message, or clear it when the wait failed
pub fn finish_spinner(spinner: Option<ProgressBar>, message: Option<&str>) {
    if let Some(s) = spinner {
        match message {
            Some(msg) => s.finish_with_message(msg.to_string()),
            None => s.finish_and_clear(),
        }
    }
}
