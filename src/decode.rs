//! Declarative decoding of a [`Section`] into a typed destination.
//!
//! A [`DecodeTable`] lists the properties a section may contain. Each
//! entry has an [`Arity`], a usage string and a conversion routine that
//! is called once per value with a mutable reference to the destination.
//!
//! ```
//! use rawini::{DecodeTable, Section};
//!
//! #[derive(Default)]
//! struct Server {
//!     port: u16,
//!     aliases: Vec<String>,
//! }
//!
//! let table = DecodeTable::new()
//!     .unique("port", "TCP port to listen on.", |v, s: &mut Server| {
//!         s.port = v.parse()?;
//!         Ok(())
//!     })
//!     .multi("alias", "Extra host name, may be repeated.", |v, s: &mut Server| {
//!         s.aliases.push(v.to_string());
//!         Ok(())
//!     });
//!
//! let section: Section = vec![("port", "8080"), ("alias", "a"), ("alias", "b")]
//!     .into_iter()
//!     .collect();
//! let mut server = Server::default();
//! table.decode(&section, &mut server)?;
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.aliases, ["a", "b"]);
//! # Ok::<(), rawini::Error>(())
//! ```
use std::fmt;
use std::sync::Arc;

use linked_hash_map::LinkedHashMap;

use crate::document::Section;
use crate::error::{Error, ErrorKind, Result};

/// Error type returned by conversion routines.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How many values a property may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one.
    Unique,
    /// Any number.
    Multi,
}

impl Arity {
    fn as_str(&self) -> &'static str {
        match *self {
            Arity::Unique => "unique",
            Arity::Multi => "multi",
        }
    }
}

/// Conversion routine: applies one value to the destination.
///
/// Implemented for every `Fn(&str, &mut T) -> Result<(), BoxError>`.
pub trait Accept<T> {
    fn accept(&self, value: &str, dest: &mut T) -> Result<(), BoxError>;
}

impl<T, F> Accept<T> for F
where
    F: Fn(&str, &mut T) -> Result<(), BoxError>,
{
    fn accept(&self, value: &str, dest: &mut T) -> Result<(), BoxError> {
        self(value, dest)
    }
}

struct DecodeOption<T> {
    arity: Arity,
    usage: String,
    accept: Box<dyn Accept<T>>,
}

/// Maps property names to an arity rule and a conversion routine.
pub struct DecodeTable<T> {
    options: LinkedHashMap<String, DecodeOption<T>>,
}

impl<T> fmt::Debug for DecodeTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.options.iter().map(|(n, o)| (n, o.arity)))
            .finish()
    }
}

impl<T> Default for DecodeTable<T> {
    fn default() -> DecodeTable<T> {
        DecodeTable {
            options: LinkedHashMap::new(),
        }
    }
}

impl<T> DecodeTable<T> {
    /// Create an empty table.
    pub fn new() -> DecodeTable<T> {
        DecodeTable::default()
    }

    /// Add an entry. An existing entry with the same name is replaced.
    pub fn option<A>(
        mut self,
        name: impl Into<String>,
        arity: Arity,
        usage: impl Into<String>,
        accept: A,
    ) -> DecodeTable<T>
    where
        A: Accept<T> + 'static,
    {
        let option = DecodeOption {
            arity,
            usage: usage.into(),
            accept: Box::new(accept),
        };
        self.options.insert(name.into(), option);
        self
    }

    /// Add a property that may be set only once.
    pub fn unique<F>(self, name: impl Into<String>, usage: impl Into<String>, f: F) -> DecodeTable<T>
    where
        F: Fn(&str, &mut T) -> Result<(), BoxError> + 'static,
    {
        self.option(name, Arity::Unique, usage, f)
    }

    /// Add a property that may be set any number of times.
    pub fn multi<F>(self, name: impl Into<String>, usage: impl Into<String>, f: F) -> DecodeTable<T>
    where
        F: Fn(&str, &mut T) -> Result<(), BoxError> + 'static,
    {
        self.option(name, Arity::Multi, usage, f)
    }

    /// Apply every property of `section` to `dest`.
    ///
    /// Fails on a property that is not in the table, on a unique property
    /// with more than one value, and on the first conversion error. On
    /// failure `dest` may be partially updated and should be discarded.
    pub fn decode(&self, section: &Section, dest: &mut T) -> Result<()> {
        for (name, values) in section.iter() {
            let option = self
                .options
                .get(name)
                .ok_or_else(|| Error::decode(ErrorKind::UnexpectedProperty(name.to_string())))?;
            if option.arity == Arity::Unique && values.len() > 1 {
                return Err(Error::decode(ErrorKind::RepeatedUniqueProperty(
                    name.to_string(),
                )));
            }
            debug!("decode {} ({} value(s))", name, values.len());
            for value in values {
                option.accept.accept(value, dest).map_err(|e| {
                    Error::decode(ErrorKind::ConversionFailure {
                        property: name.to_string(),
                        source: Arc::from(e),
                    })
                })?;
            }
        }
        Ok(())
    }

    /// Help text listing every entry with its arity and usage.
    pub fn usage(&self) -> String {
        self.to_string()
    }
}

impl<T> fmt::Display for DecodeTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.options.keys().map(|n| n.len()).max().unwrap_or(0);
        for (name, option) in self.options.iter() {
            writeln!(
                f,
                "  {:width$}  ({:6})  {}",
                name,
                option.arity.as_str(),
                option.usage,
                width = width
            )?;
        }
        Ok(())
    }
}

/// Apply `section` to `dest` using `table`. Same as [`DecodeTable::decode`].
pub fn decode<T>(table: &DecodeTable<T>, dest: &mut T, section: &Section) -> Result<()> {
    table.decode(section, dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_table() -> DecodeTable<i32> {
        DecodeTable::new().unique("key", "A help message.", |v, d: &mut i32| {
            *d = v.parse()?;
            Ok(())
        })
    }

    fn section(pairs: &[(&str, &str)]) -> Section {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn unique_value() {
        let mut key = 0;
        decode(&int_table(), &mut key, &section(&[("key", "1")])).unwrap();
        assert_eq!(key, 1);
    }

    #[test]
    fn repeated_unique_value() {
        let mut key = 0;
        let e = decode(&int_table(), &mut key, &section(&[("key", "1"), ("key", "2")])).unwrap_err();
        assert!(matches!(e.kind, ErrorKind::RepeatedUniqueProperty(ref p) if p == "key"));
    }

    #[test]
    fn unexpected_property() {
        let mut key = 0;
        let e = decode(&int_table(), &mut key, &section(&[("other", "1")])).unwrap_err();
        assert!(matches!(e.kind, ErrorKind::UnexpectedProperty(ref p) if p == "other"));
        assert_eq!(e.to_string(), "unexpected property `other'");
    }

    #[test]
    fn conversion_failure() {
        let mut key = 0;
        let e = decode(&int_table(), &mut key, &section(&[("key", "one")])).unwrap_err();
        match e.kind {
            ErrorKind::ConversionFailure { ref property, .. } => assert_eq!(property, "key"),
            ref other => panic!("unexpected {:?}", other),
        }
        assert!(e.to_string().starts_with("property `key': "));
    }

    #[test]
    fn multi_values_in_order() {
        let table = DecodeTable::new().multi("item", "List item.", |v, d: &mut Vec<String>| {
            d.push(v.to_uppercase());
            Ok(())
        });
        let mut items = Vec::new();
        table
            .decode(&section(&[("item", "a"), ("item", "b"), ("item", "c")]), &mut items)
            .unwrap();
        assert_eq!(items, ["A", "B", "C"]);

        let mut none = Vec::new();
        table.decode(&Section::new(), &mut none).unwrap();
        assert!(none.is_empty());
    }

    struct Flag;

    impl Accept<bool> for Flag {
        fn accept(&self, value: &str, dest: &mut bool) -> Result<(), BoxError> {
            *dest = match value {
                "yes" => true,
                "no" => false,
                other => return Err(format!("not a flag: {}", other).into()),
            };
            Ok(())
        }
    }

    #[test]
    fn trait_implementor() {
        let table = DecodeTable::new().option("debug", Arity::Unique, "Enable debugging.", Flag);
        let mut debug = false;
        table.decode(&section(&[("debug", "yes")]), &mut debug).unwrap();
        assert!(debug);
        let e = table.decode(&section(&[("debug", "maybe")]), &mut debug).unwrap_err();
        assert_eq!(e.to_string(), "property `debug': not a flag: maybe");
    }

    #[test]
    fn usage_text() {
        let table = int_table().multi("longer", "Repeatable.", |_, _: &mut i32| Ok(()));
        assert_eq!(
            table.usage(),
            "  key     (unique)  A help message.\n  longer  (multi )  Repeatable.\n"
        );
    }
}
