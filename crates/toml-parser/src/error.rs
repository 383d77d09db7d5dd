use std::fmt;

/// The typed reasons a parse (or a registry operation driving one) can fail.
///
/// Mirrors the error kinds of §7 that originate on the parsing side; the
/// builder crate defines its own kinds for the ones that only ever occur
/// while emitting text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    #[error("no token matched at line {line}")]
    LexerParse { line: usize },

    #[error("expected {expected}, found {actual} at line {line}")]
    UnexpectedToken {
        expected: String,
        actual: String,
        line: usize,
    },

    #[error("{message} at line {line}")]
    SyntaxError { message: String, line: usize },

    #[error("key `{path}` is already defined (line {line})")]
    InvalidKey { path: String, line: usize },

    #[error("table `{path}` is already defined, or redeclares an array of tables (line {line})")]
    InvalidTableKey { path: String, line: usize },

    #[error("`[[{path}]]` is not a valid array-of-tables declaration (line {line})")]
    InvalidArrayTableKey { path: String, line: usize },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("file not readable: {path}: {reason}")]
    FileNotReadable { path: String, reason: String },
}

impl ErrorKind {
    /// The 1-based source line this error points at, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ErrorKind::LexerParse { line }
            | ErrorKind::UnexpectedToken { line, .. }
            | ErrorKind::SyntaxError { line, .. }
            | ErrorKind::InvalidKey { line, .. }
            | ErrorKind::InvalidTableKey { line, .. }
            | ErrorKind::InvalidArrayTableKey { line, .. } => Some(*line),
            ErrorKind::InvalidUtf8 | ErrorKind::FileNotFound { .. } | ErrorKind::FileNotReadable { .. } => None,
        }
    }
}

/// The error returned by [`crate::parse`] and [`crate::parse_file`].
///
/// Carries the originating [`ErrorKind`] plus, when the failure was reached
/// through `parse_file`, the path of the file being read.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub file: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, file: None }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.kind.line()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{} (in {file})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
