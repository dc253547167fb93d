use std::io::BufRead;
use std::path::Path;

use crate::document::Config;
use crate::error::Result;
use crate::parser::Parser;

/// Parse configuration text.
pub fn from_str(s: &str) -> Result<Config> {
    Builder::new().from_str(s)
}

/// Parse configuration from a reader.
pub fn from_reader<R: BufRead>(reader: R) -> Result<Config> {
    Builder::new().from_reader(reader)
}

/// Parse a configuration file.
pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
    Builder::new().from_file(path)
}

/// Parse and merge all files matching a glob pattern, in sorted order.
pub fn from_glob(pattern: &str) -> Result<Config> {
    Builder::new().from_glob(pattern)
}

/// Parser options.
///
/// Example:
///
/// ```
/// let config = rawini::Builder::new()
///     .name("inline")
///     .from_str("[server]\nport = 8080\n")?;
///
/// let port = config.section("server").and_then(|s| s.number("port"));
/// assert_eq!(port.map(|n| n.parse::<u16>()), Some(Ok(8080)));
/// # Ok::<(), rawini::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    name: String,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder {
            name: "config-text".to_string(),
        }
    }
}

impl Builder {
    /// New builder with default options.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Name used in error messages for text that is not read from a file.
    pub fn name(mut self, name: impl Into<String>) -> Builder {
        self.name = name.into();
        self
    }

    /// Create a parser for incremental use.
    pub fn build(self) -> Parser {
        Parser::with_name(self.name)
    }

    pub fn from_str(self, s: &str) -> Result<Config> {
        let mut parser = self.build();
        parser.feed_str(s)?;
        parser.finish()
    }

    pub fn from_reader<R: BufRead>(self, reader: R) -> Result<Config> {
        let mut parser = self.build();
        parser.feed(reader)?;
        parser.finish()
    }

    pub fn from_file(self, path: impl AsRef<Path>) -> Result<Config> {
        let mut parser = self.build();
        parser.feed_file(path)?;
        parser.finish()
    }

    pub fn from_glob(self, pattern: &str) -> Result<Config> {
        let mut parser = self.build();
        parser.feed_glob(pattern)?;
        parser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Dangling, ErrorKind};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn section() {
        init();
        let config = from_str("\n[section]\nmessage=hello\n\t").unwrap();
        let section = config.section("section").unwrap();
        assert_eq!(section.values("message").join(" "), "hello");
    }

    #[test]
    fn continuation() {
        init();
        let config = from_str("\nmessage=hello \\\nworld\n\t").unwrap();
        assert_eq!(config.global_section().values("message"), ["hello world"]);
    }

    #[test]
    fn named_source_in_errors() {
        init();
        let e = Builder::new()
            .name("inline")
            .from_str("a=1\n; fine\nb=\\\n# not fine")
            .unwrap_err();
        assert!(matches!(
            e.kind,
            ErrorKind::DanglingContinuation(Dangling::IntoComment)
        ));
        assert_eq!(e.to_string(), "inline:4: invalid continuation into comment line");
    }

    #[test]
    fn reader_and_file() {
        init();
        let text = "number=1\nmessage=hello\nmessage=world\n";
        let config = from_reader(text.as_bytes()).unwrap();
        let global = config.global_section();
        assert_eq!(global.number("number").unwrap().parse::<i64>(), Ok(1));
        assert_eq!(global.number("message").unwrap().to_string(), "hello world");

        let path = std::env::temp_dir().join(format!("rawini-cfg-{}.ini", std::process::id()));
        std::fs::write(&path, text).unwrap();
        assert_eq!(from_file(&path).unwrap(), config);
        std::fs::remove_file(&path).unwrap();

        let e = from_file(&path).unwrap_err();
        assert!(matches!(e.kind, ErrorKind::Io(_)));
    }
}
