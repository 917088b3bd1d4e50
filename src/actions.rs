// GitHub Actions workflow commands

/// Escape a message for use as workflow command data
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::error::` command that marks the step as failed with `message`
pub(crate) fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}
