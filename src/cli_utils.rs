/// CLI utilities for consistent output formatting
use std::io::IsTerminal;

/// Get a colored prefix
///
/// Returns bright cyan if stderr is a TTY, plain text otherwise.
pub fn devstart_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[devstart]\x1b[0m"
    } else {
        "[devstart]"
    }
}

/// Print one operator-facing progress line on stderr
pub fn progress(message: &str) {
    eprintln!("{} {}", devstart_prefix(), message);
}

/// Render a program and its arguments the way a user would type them
pub fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push_str(&format!("\"{}\"", arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}
