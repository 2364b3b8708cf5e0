use std::ops::Range;

use crate::map_config::DeclarationWarning;
use crate::substitute::Substitution;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub code: String,
}

impl Diagnostic {
    pub fn error(location: Location, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location,
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn warning(
        location: Location,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            location,
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn info(location: Location, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            location,
            message: message.into(),
            code: code.into(),
        }
    }
}

impl Location {
    pub fn from_range(range: Range<usize>, input: &str) -> Self {
        let (line, column) = offset_to_line_col(input, range.start);

        Self {
            line,
            column,
            range,
        }
    }
}

fn offset_to_line_col(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in input.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

/// Diagnostics for every skipped declaration and every warning.
///
/// `input` must be the content `substitution` was extracted from.
pub fn collect(substitution: &Substitution, input: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for outcome in &substitution.outcomes {
        let location = Location::from_range(outcome.span.clone(), input);

        if let Err(e) = &outcome.result {
            diagnostics.push(Diagnostic::error(
                location.clone(),
                "invalid-map-block",
                format!("map {} skipped: {}", outcome.dialect, e),
            ));
        }

        for warning in &outcome.warnings {
            let message = warning.to_string();
            let diagnostic = match warning {
                DeclarationWarning::UnknownBasemap { .. } => {
                    Diagnostic::info(location.clone(), warning.code(), message)
                }
                _ => Diagnostic::warning(location.clone(), warning.code(), message),
            };
            diagnostics.push(diagnostic);
        }
    }

    diagnostics
}
