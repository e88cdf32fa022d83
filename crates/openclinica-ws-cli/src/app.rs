use colored::Colorize;

use openclinica_ws::protocol::responses::ResponseStatus;

/// Pretty-print a JSON value, falling back to the compact form.
pub fn print_pretty_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("{} {}", "Failed to format JSON output:".yellow(), err);
            println!("{value}");
        }
    }
}

/// One-line, colored summary of a service result.
pub fn format_status(status: &ResponseStatus) -> String {
    if status.is_success() {
        format!("{} {}", "Result:".bold(), status.result.green())
    } else if status.errors.is_empty() {
        format!("{} {}", "Result:".bold(), status.result.red())
    } else {
        format!(
            "{} {} ({})",
            "Result:".bold(),
            status.result.red(),
            status.errors.join("; ")
        )
    }
}
