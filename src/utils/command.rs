//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run `program` in `dir` and capture its output.
///
/// Only a failure to spawn is an error here; callers decide what a non-zero
/// exit status means.
pub fn capture_in(dir: &Path, program: &str, args: &[String], context: &str) -> Result<Output> {
    Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to run {}: {}", program, e),
                Some(context.to_string()),
            )
        })
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

/// Render a program and its arguments as a single display line.
pub fn display_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_in_returns_output() {
        let output = capture_in(Path::new("/tmp"), "echo", &["hello".to_string()], "echo test")
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn capture_in_fails_for_unknown_program() {
        let err = capture_in(Path::new("/tmp"), "nonexistent_command_xyz", &[], "test")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = capture_in(
            Path::new("/tmp"),
            "sh",
            &["-c".to_string(), "echo oops; exit 3".to_string()],
            "test",
        )
        .unwrap();
        assert!(!output.status.success());
        assert_eq!(error_text(&output), "oops");
    }

    #[test]
    fn display_line_joins_arguments() {
        assert_eq!(
            display_line("composer", &["dump-autoload".to_string()]),
            "composer dump-autoload"
        );
    }
}
