use std::borrow::Cow;
use std::mem;

use crate::error::{Dangling, ErrorKind};

/// What a physical line turned into.
#[derive(Debug, PartialEq)]
pub(crate) enum Assembled<'a> {
    /// `;` or `#` comment line.
    Comment,
    /// Line ended in a `\`, more input is needed.
    Continued,
    /// Logical line that was nothing but whitespace.
    Blank,
    /// Complete logical line, trimmed.
    Logical(Cow<'a, str>),
}

/// Joins `\`-continued physical lines into logical lines.
///
/// Knows nothing about sections or properties. Comments are recognized
/// here because they are a property of the physical line: a comment is
/// never part of a continuation.
#[derive(Debug, Default)]
pub(crate) struct LineAssembler {
    pending: String,
}

impl LineAssembler {
    pub fn new() -> LineAssembler {
        LineAssembler::default()
    }

    /// Is a continuation in progress.
    ///
    /// A continuation that has collected nothing at all (a lone `\`)
    /// does not count.
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }

    /// Feed one physical line, without its line terminator.
    pub fn push<'a>(&mut self, line: &'a str) -> Result<Assembled<'a>, ErrorKind> {
        let first = line.trim_start().chars().next();
        if first == Some(';') || first == Some('#') {
            if self.is_pending() {
                return Err(ErrorKind::DanglingContinuation(Dangling::IntoComment));
            }
            return Ok(Assembled::Comment);
        }

        if let Some(head) = line.strip_suffix('\\') {
            self.pending.push_str(head);
            return Ok(Assembled::Continued);
        }

        let logical = if self.pending.is_empty() {
            Cow::Borrowed(line.trim())
        } else {
            let mut joined = mem::take(&mut self.pending);
            joined.push_str(line);
            Cow::Owned(joined.trim().to_string())
        };

        if logical.is_empty() {
            Ok(Assembled::Blank)
        } else {
            Ok(Assembled::Logical(logical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(s: &str) -> Assembled<'_> {
        Assembled::Logical(Cow::Borrowed(s))
    }

    fn push<'a>(la: &mut LineAssembler, line: &'a str) -> Assembled<'a> {
        la.push(line).expect("line should assemble")
    }

    #[test]
    fn plain_line_is_trimmed() {
        let mut la = LineAssembler::new();
        assert_eq!(push(&mut la, "\t key = value  "), logical("key = value"));
        assert!(!la.is_pending());
    }

    #[test]
    fn continuation_joins_without_separator() {
        let mut la = LineAssembler::new();
        assert_eq!(push(&mut la, "key=value \\"), Assembled::Continued);
        assert!(la.is_pending());
        assert_eq!(push(&mut la, "more\\"), Assembled::Continued);
        assert_eq!(push(&mut la, "end"), logical("key=value moreend"));
        assert!(!la.is_pending());
    }

    #[test]
    fn continuation_on_first_line() {
        let mut la = LineAssembler::new();
        assert_eq!(push(&mut la, "\\"), Assembled::Continued);
        assert!(!la.is_pending());
        assert_eq!(push(&mut la, "a=b"), logical("a=b"));
    }

    #[test]
    fn continuation_into_blank() {
        let mut la = LineAssembler::new();
        assert_eq!(push(&mut la, "   \\"), Assembled::Continued);
        assert_eq!(push(&mut la, ""), Assembled::Blank);
        assert!(!la.is_pending());
    }

    #[test]
    fn comments() {
        let mut la = LineAssembler::new();
        assert_eq!(push(&mut la, "; note"), Assembled::Comment);
        assert_eq!(push(&mut la, "   # note \\"), Assembled::Comment);
        assert!(!la.is_pending());

        assert_eq!(push(&mut la, "key=\\"), Assembled::Continued);
        assert!(matches!(
            la.push("; not allowed"),
            Err(ErrorKind::DanglingContinuation(Dangling::IntoComment))
        ));
    }
}
