use std::fs;
use std::io::{self, BufRead, BufReader, ErrorKind as IoKind};
use std::mem;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Config, Section};
use crate::error::{Dangling, Error, ErrorKind, HeaderFault, PropertyFault, Result};
use crate::lines::{Assembled, LineAssembler};

/// Incremental parser.
///
/// Feed it one or more sources, then call [`finish`](Parser::finish) to
/// get the merged [`Config`]. The first error poisons the parser: later
/// input is still read and counted, but every call returns that same
/// error until `finish` hands it out and resets the parser for a new,
/// independent parse.
///
/// A `Parser` is not meant to be shared between threads; use one per parse.
#[derive(Debug)]
pub struct Parser {
    name: String,
    source: String,
    line: u32,
    lines: LineAssembler,
    state: State,
}

#[derive(Debug)]
enum State {
    Building(Document),
    Errored(Error),
}

// The configuration under construction.
#[derive(Debug, Default)]
struct Document {
    config: Config,
    // The section that is being filled. `None` means the global section.
    // It moves into `config.sections` when the next header shows up.
    current: Option<(String, Section)>,
}

impl Document {
    fn apply(&mut self, text: &str) -> Result<(), ErrorKind> {
        if text.starts_with('[') {
            let name = parse_section_header(text)?;
            self.add_section(name)
        } else {
            let (property, value) = parse_property(text)?;
            self.section_mut().add_property(property, value);
            Ok(())
        }
    }

    fn section_mut(&mut self) -> &mut Section {
        match self.current {
            Some((_, ref mut section)) => section,
            None => &mut self.config.global,
        }
    }

    fn add_section(&mut self, name: String) -> Result<(), ErrorKind> {
        let is_current = match self.current {
            Some((ref current, _)) => *current == name,
            None => false,
        };
        if is_current || self.config.sections.contains_key(&name) {
            return Err(ErrorKind::DuplicateSection(name));
        }
        debug!("section [{}]", name);
        if let Some((done, section)) = self.current.take() {
            self.config.sections.insert(done, section);
        }
        self.current = Some((name, Section::new()));
        Ok(())
    }

    fn into_config(mut self) -> Config {
        if let Some((name, section)) = self.current.take() {
            self.config.sections.insert(name, section);
        }
        self.config
    }
}

fn parse_section_header(text: &str) -> Result<String, ErrorKind> {
    static RE_HEADER: Lazy<Regex> = Lazy::new(|| {
        let re = r"^\[([^\]]*)\](.*)$";
        Regex::new(re).expect("could not compile RE_HEADER regexp")
    });
    let caps = RE_HEADER
        .captures(text)
        .ok_or(ErrorKind::MalformedSectionHeader(HeaderFault::Unclosed))?;
    if !caps[2].is_empty() {
        return Err(ErrorKind::MalformedSectionHeader(HeaderFault::TrailingCharacters));
    }
    let name = &caps[1];
    if name.is_empty() {
        return Err(ErrorKind::MalformedSectionHeader(HeaderFault::EmptyName));
    }
    Ok(name.to_string())
}

fn parse_property(text: &str) -> Result<(&str, &str), ErrorKind> {
    let (key, value) = text
        .split_once('=')
        .ok_or(ErrorKind::EmptyOrMissingKey(PropertyFault::NoSeparator))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ErrorKind::EmptyOrMissingKey(PropertyFault::EmptyKey));
    }
    Ok((key, value.trim()))
}

impl Default for Parser {
    fn default() -> Parser {
        Parser::new()
    }
}

impl Parser {
    /// Create a parser with default options. See also [`Builder`](crate::Builder).
    pub fn new() -> Parser {
        Parser::with_name("config-text")
    }

    pub(crate) fn with_name(name: impl Into<String>) -> Parser {
        let name = name.into();
        Parser {
            source: name.clone(),
            name,
            line: 0,
            lines: LineAssembler::new(),
            state: State::Building(Document::default()),
        }
    }

    /// Number of physical lines read from the current source.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Has an error been recorded in this pass.
    pub fn is_poisoned(&self) -> bool {
        matches!(self.state, State::Errored(_))
    }

    /// Push a single physical line, without its line terminator.
    ///
    /// Lines pushed this way continue the current source; a continuation
    /// may carry over into the next call.
    pub fn feed_line(&mut self, line: &str) -> Result<()> {
        self.line += 1;
        trace!("{}:{}: {:?}", self.source, self.line, line);

        let document = match self.state {
            State::Errored(ref e) => return Err(e.clone()),
            State::Building(ref mut document) => document,
        };
        let res = match self.lines.push(line) {
            Ok(Assembled::Logical(text)) => document.apply(&text),
            Ok(_) => Ok(()),
            Err(kind) => Err(kind),
        };
        res.map_err(|kind| self.poison(kind))
    }

    /// Read a complete source.
    ///
    /// Line numbers in errors are relative to this source. The source
    /// must not end in the middle of a continuation.
    pub fn feed<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let name = self.name.clone();
        self.feed_source(name, reader)
    }

    /// Read a complete source from a string.
    pub fn feed_str(&mut self, text: &str) -> Result<()> {
        self.feed(text.as_bytes())
    }

    /// Read a complete source from a file.
    ///
    /// Failing to open the file is returned as an error, but does not
    /// poison the parser.
    pub fn feed_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                let e = Error::io(e, name.as_str());
                return Err(self.stored_error().unwrap_or(e));
            }
        };
        self.feed_source(name, BufReader::new(file))
    }

    /// Read every file that matches a glob pattern, in sorted order.
    pub fn feed_glob(&mut self, pattern: &str) -> Result<()> {
        let paths = match expand(pattern) {
            Ok(paths) => paths,
            Err(e) => return Err(self.stored_error().unwrap_or(Error::io(e, pattern))),
        };
        for path in &paths {
            if let Err(e) = self.feed_file(path) {
                if !self.is_poisoned() {
                    return Err(e);
                }
            }
        }
        self.status()
    }

    // Reads the source to the end even after an error, so that `line`
    // keeps counting. A read error ends the source.
    fn feed_source<R: BufRead>(&mut self, name: String, reader: R) -> Result<()> {
        // a continuation pushed with feed_line cannot run into a new source.
        self.check_dangling();
        debug!("reading {}", name);
        self.source = name;
        self.line = 0;

        for line in reader.lines() {
            match line {
                Ok(line) => {
                    let _ = self.feed_line(&line);
                }
                Err(e) => {
                    self.line += 1;
                    if !self.is_poisoned() {
                        self.poison(ErrorKind::Io(e.into()));
                    }
                    break;
                }
            }
        }
        self.check_dangling();
        self.status()
    }

    /// Finish the pass.
    ///
    /// Returns the configuration, or the first error that was recorded.
    /// Either way the parser is reset and can be used again.
    pub fn finish(&mut self) -> Result<Config> {
        self.check_dangling();
        let state = mem::replace(&mut self.state, State::Building(Document::default()));
        self.source = self.name.clone();
        self.line = 0;
        self.lines.reset();

        match state {
            State::Building(document) => {
                let config = document.into_config();
                debug!("finished: {} section(s)", config.sections.len());
                Ok(config)
            }
            State::Errored(e) => Err(e),
        }
    }

    fn stored_error(&self) -> Option<Error> {
        match self.state {
            State::Errored(ref e) => Some(e.clone()),
            State::Building(_) => None,
        }
    }

    fn status(&self) -> Result<()> {
        match self.stored_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn check_dangling(&mut self) {
        if self.lines.is_pending() && !self.is_poisoned() {
            self.poison(ErrorKind::DanglingContinuation(Dangling::AtEndOfFile));
        }
    }

    // Record the first error. Later input is ignored.
    fn poison(&mut self, kind: ErrorKind) -> Error {
        let e = Error::new(kind, self.line).with_file_name(self.source.as_str());
        warn!("{}", e);
        self.state = State::Errored(e.clone());
        e
    }
}

// Expand a glob pattern into a sorted list of files.
fn expand(pattern: &str) -> io::Result<Vec<PathBuf>> {
    let globresult = glob::glob(pattern).map_err(|e| {
        io::Error::new(IoKind::InvalidInput, format!("{}: {}", pattern, e.msg))
    })?;
    let mut files = globresult.collect::<std::result::Result<Vec<_>, _>>().map_err(|e| {
        io::Error::new(
            e.error().kind(),
            format!("{}: {}", e.path().to_string_lossy(), e.error()),
        )
    })?;
    if files.is_empty() {
        return Err(io::Error::new(IoKind::NotFound, format!("{}: file not found", pattern)));
    }
    files.sort();
    Ok(files)
}
