use serde::de;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type used by the parser, the decode table and the serde glue.
#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    /// 1-based physical line number, 0 if the error is not tied to a line.
    pub line: u32,
    pub file_name: String,
}

/// What went wrong.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    MalformedSectionHeader(HeaderFault),
    DuplicateSection(String),
    EmptyOrMissingKey(PropertyFault),
    DanglingContinuation(Dangling),
    UnexpectedProperty(String),
    RepeatedUniqueProperty(String),
    ConversionFailure {
        property: String,
        source: Arc<dyn StdError + Send + Sync>,
    },
    Io(Arc<io::Error>),
    Message(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderFault {
    Unclosed,
    TrailingCharacters,
    EmptyName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyFault {
    NoSeparator,
    EmptyKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dangling {
    IntoComment,
    AtEndOfFile,
}

impl Error {
    pub fn new(kind: ErrorKind, line: u32) -> Error {
        Error {
            kind,
            line,
            file_name: "config-text".to_string(),
        }
    }

    // Errors from the decode layer have no position.
    pub(crate) fn decode(kind: ErrorKind) -> Error {
        Error {
            kind,
            line: 0,
            file_name: String::new(),
        }
    }

    pub(crate) fn io(e: io::Error, file_name: impl Into<String>) -> Error {
        Error {
            kind: ErrorKind::Io(Arc::new(e)),
            line: 0,
            file_name: file_name.into(),
        }
    }

    pub(crate) fn conversion(property: &str, msg: String) -> Error {
        let source: Box<dyn StdError + Send + Sync> = msg.into();
        Error::decode(ErrorKind::ConversionFailure {
            property: property.to_string(),
            source: Arc::from(source),
        })
    }

    pub(crate) fn with_file_name(mut self, file_name: impl Into<String>) -> Error {
        self.file_name = file_name.into();
        self
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::decode(ErrorKind::Message(msg.to_string()))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::MalformedSectionHeader(HeaderFault::Unclosed) => {
                f.write_str("no section header end character found")
            }
            ErrorKind::MalformedSectionHeader(HeaderFault::TrailingCharacters) => {
                f.write_str("trailing characters after section header")
            }
            ErrorKind::MalformedSectionHeader(HeaderFault::EmptyName) => {
                f.write_str("empty section name")
            }
            ErrorKind::DuplicateSection(ref name) => write!(f, "duplicate section name {:?}", name),
            ErrorKind::EmptyOrMissingKey(PropertyFault::NoSeparator) => {
                f.write_str("invalid property line: missing '='")
            }
            ErrorKind::EmptyOrMissingKey(PropertyFault::EmptyKey) => {
                f.write_str("invalid property line: empty key")
            }
            ErrorKind::DanglingContinuation(Dangling::IntoComment) => {
                f.write_str("invalid continuation into comment line")
            }
            ErrorKind::DanglingContinuation(Dangling::AtEndOfFile) => {
                f.write_str("continuation at end of file")
            }
            ErrorKind::UnexpectedProperty(ref name) => write!(f, "unexpected property `{}'", name),
            ErrorKind::RepeatedUniqueProperty(ref name) => {
                write!(f, "property `{}' may only be set once", name)
            }
            ErrorKind::ConversionFailure {
                ref property,
                ref source,
            } => write!(f, "property `{}': {}", property, source),
            ErrorKind::Io(ref e) => write!(f, "{}", e),
            ErrorKind::Message(ref msg) => f.write_str(msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file_name.is_empty() {
            write!(f, "{}", self.kind)
        } else if self.line == 0 {
            write!(f, "{}: {}", self.file_name, self.kind)
        } else {
            write!(f, "{}:{}: {}", self.file_name, self.line, self.kind)
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind {
            ErrorKind::ConversionFailure { ref source, .. } => Some(&**source),
            ErrorKind::Io(ref e) => Some(&**e),
            _ => None,
        }
    }
}
