use std::path::PathBuf;

/// Result type alias for the annotation parsers
pub type Result<T> = std::result::Result<T, ParseError>;

/// Problems found while reading annotation blocks.
///
/// Line numbers are 1-based and point at the line that triggered the problem,
/// or at the first line of the block when no better position is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The file could not be read
    Io { message: String },
    /// `@path` line with an unknown verb or an empty path
    MalformedPath { line: usize, message: String },
    /// `@parameter` line with a missing or unknown location
    MalformedParameter { line: usize, message: String },
    /// `@response` line without a response code
    MalformedResponse { line: usize, message: String },
    /// Endpoint blocks without a preceding `@resource` block
    MissingResourceContext { line: usize },
    /// A model line that also carries a parameter marker
    AmbiguousModelProperty { line: usize, model: String },
    /// Two endpoint blocks documenting the same path and verb
    DuplicateOperation { path: String, method: String },
}

impl ParseError {
    /// Warnings leave the affected unit in the output; errors drop it.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ParseError::MissingResourceContext { .. }
                | ParseError::AmbiguousModelProperty { .. }
                | ParseError::DuplicateOperation { .. }
        )
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParseError::Io { message } => write!(f, "IO error: {}", message),
            ParseError::MalformedPath { line, message } => {
                write!(f, "malformed @path at line {}: {}", line, message)
            }
            ParseError::MalformedParameter { line, message } => {
                write!(f, "malformed @parameter at line {}: {}", line, message)
            }
            ParseError::MalformedResponse { line, message } => {
                write!(f, "malformed @response at line {}: {}", line, message)
            }
            ParseError::MissingResourceContext { line } => write!(
                f,
                "endpoint block at line {} has no preceding @resource block, skipped",
                line
            ),
            ParseError::AmbiguousModelProperty { line, model } => write!(
                f,
                "model {} contains a @parameter tag at line {}",
                model, line
            ),
            ParseError::DuplicateOperation { path, method } => write!(
                f,
                "{} {} is documented more than once, the last block wins",
                method, path
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parse problem tied to the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source file (empty for problems found after aggregation)
    pub file: PathBuf,
    pub error: ParseError,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, error: ParseError) -> Self {
        Self {
            file: file.into(),
            error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.error.is_warning()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.file.as_os_str().is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{}: {}", self.file.display(), self.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_classification() {
        assert!(ParseError::MissingResourceContext { line: 3 }.is_warning());
        assert!(ParseError::AmbiguousModelProperty {
            line: 4,
            model: "Widget".to_string()
        }
        .is_warning());
        assert!(!ParseError::MalformedPath {
            line: 1,
            message: "bad verb".to_string()
        }
        .is_warning());
        assert!(!ParseError::Io {
            message: "denied".to_string()
        }
        .is_warning());
    }

    #[test]
    fn test_diagnostic_display_includes_file_and_line() {
        let diagnostic = Diagnostic::new(
            "app/controllers/widgets.rb",
            ParseError::MalformedParameter {
                line: 12,
                message: "unknown location 'cookie'".to_string(),
            },
        );

        let text = diagnostic.to_string();
        assert!(text.starts_with("app/controllers/widgets.rb: "));
        assert!(text.contains("line 12"));
        assert!(text.contains("cookie"));
    }

    #[test]
    fn test_diagnostic_display_without_file() {
        let diagnostic = Diagnostic::new(
            PathBuf::new(),
            ParseError::DuplicateOperation {
                path: "/widgets".to_string(),
                method: "GET".to_string(),
            },
        );

        assert_eq!(
            diagnostic.to_string(),
            "GET /widgets is documented more than once, the last block wins"
        );
    }
}
