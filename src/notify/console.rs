//! Colored console output for validation and check results.

use crate::name::ValidationResult;
use crate::types::CheckResult;
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// Status markers, Unicode or ASCII.
#[derive(Debug, Clone, Copy)]
struct Symbols {
    success: &'static str,
    failure: &'static str,
    warning: &'static str,
    info: &'static str,
}

const UNICODE: Symbols = Symbols {
    success: "✔",
    failure: "✖",
    warning: "⚠",
    info: "ℹ",
};

const ASCII: Symbols = Symbols {
    success: "[ok]",
    failure: "[x]",
    warning: "[!]",
    info: "[i]",
};

/// A validation result labelled with its name, for JSON output.
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub validation: &'a ValidationResult,
}

/// Console output handler with colors and formatting.
#[derive(Debug)]
pub struct ConsoleOutput {
    json_mode: bool,
    quiet: bool,
    symbols: Symbols,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(json_mode: bool, quiet: bool, ascii: bool) -> Self {
        Self {
            json_mode,
            quiet,
            symbols: if ascii { ASCII } else { UNICODE },
        }
    }

    fn silent(&self) -> bool {
        self.quiet || self.json_mode
    }

    /// Print the outcome of validating one name.
    pub fn print_validation(&self, name: &str, validation: &ValidationResult) {
        if self.silent() {
            return;
        }

        println!("{}", self.validation_line(name, validation));
        self.print_details(validation);
    }

    /// Print the outcome of a full check; `details` adds the validation messages.
    pub fn print_check(&self, result: &CheckResult, details: bool) {
        if self.silent() {
            return;
        }

        println!("{}", self.check_line(result));
        if let Some(ref error) = result.error {
            println!("    {}", error.dimmed());
        }
        if details || !result.validation.valid_for_new_packages {
            self.print_details(&result.validation);
        }
    }

    /// Print any serializable value as pretty JSON.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        if !self.json_mode {
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: failed to serialize results: {e}"),
        }
    }

    fn validation_line(&self, name: &str, validation: &ValidationResult) -> String {
        if validation.valid_for_new_packages {
            format!("{} {} is valid", self.symbols.success.green(), name.bold())
        } else if validation.valid_for_old_packages {
            format!(
                "{} {} is only valid for existing packages",
                self.symbols.warning.yellow(),
                name.bold()
            )
        } else {
            format!("{} {} is invalid", self.symbols.failure.red(), name.bold())
        }
    }

    fn check_line(&self, result: &CheckResult) -> String {
        let name = result.name.bold();
        if !result.validation.valid_for_new_packages {
            return format!("{} {} is not a valid package name", self.symbols.failure.red(), name);
        }

        match result.available {
            Some(true) => format!("{} {} is available", self.symbols.success.green(), name),
            Some(false) => format!("{} {} is unavailable", self.symbols.failure.red(), name),
            None if result.error.is_some() => {
                format!("{} {} could not be checked", self.symbols.warning.yellow(), name)
            }
            None => format!(
                "{} {} availability is unknown (registry requires authentication)",
                self.symbols.warning.yellow(),
                name
            ),
        }
    }

    fn print_details(&self, validation: &ValidationResult) {
        for line in self.detail_lines(validation) {
            println!("    {}", line);
        }
    }

    fn detail_lines(&self, validation: &ValidationResult) -> Vec<ColoredString> {
        let mut lines = Vec::new();
        for error in &validation.errors {
            lines.push(format!("{} {}", self.symbols.failure, error).red());
        }
        for warning in &validation.warnings {
            lines.push(format!("{} {}", self.symbols.warning, warning).yellow());
        }
        if let Some(ref suggestions) = validation.suggestions {
            for suggestion in suggestions {
                lines.push(format!("{} did you mean {}?", self.symbols.info, suggestion).cyan());
            }
        }
        lines
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::validate;

    fn ascii_output() -> ConsoleOutput {
        colored::control::set_override(false);
        ConsoleOutput::new(false, false, true)
    }

    #[test]
    fn test_ascii_symbols() {
        let output = ascii_output();
        let line = output.validation_line("ok-name", &validate("ok-name"));
        assert_eq!(line, "[ok] ok-name is valid");
    }

    #[test]
    fn test_detail_lines_cover_every_message() {
        let output = ascii_output();
        let validation = validate("_Bad Name");
        let lines: Vec<String> = output.detail_lines(&validation).iter().map(ToString::to_string).collect();

        assert_eq!(
            lines.len(),
            validation.errors.len()
                + validation.warnings.len()
                + validation.suggestions.as_ref().map_or(0, Vec::len)
        );
        assert!(lines.iter().any(|l| l.contains("did you mean _bad name?")));
    }

    #[test]
    fn test_check_lines() {
        let output = ascii_output();
        let mut result = CheckResult {
            name: "pkg".to_string(),
            available: Some(true),
            validation: validate("pkg"),
            error: None,
        };
        assert_eq!(output.check_line(&result), "[ok] pkg is available");

        result.available = Some(false);
        assert_eq!(output.check_line(&result), "[x] pkg is unavailable");

        result.available = None;
        result.error = Some("Request timed out after 10ms".to_string());
        assert_eq!(output.check_line(&result), "[!] pkg could not be checked");
    }

    #[test]
    fn test_validation_report_flattens() {
        let validation = validate("my-package");
        let report = ValidationReport {
            name: "my-package",
            validation: &validation,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "my-package");
        assert_eq!(json["valid"], true);
    }
}
