//! Parser for a simple INI configuration dialect.
//!
//! ```text
//! ; comment
//! # also a comment
//! global = value
//!
//! [section]
//! key = first
//! key = second
//! long = this value continues \
//! on the next line
//! ```
//!
//! - Lines starting with `;` or `#` are comments.
//! - A line ending in `\` continues on the next line. The lines are joined
//!   as-is. A continuation may not run into a comment or the end of input.
//! - `[name]` starts a section. Properties before the first header go into
//!   the global section. A section may be declared only once.
//! - `key = value` adds a value to a property. Keys and values are trimmed;
//!   a key may be repeated and keeps all its values in order.
//!
//! Use [`from_str`], [`from_file`] and friends for a one-shot parse, or a
//! [`Parser`] to merge several sources. A parsed [`Section`] can be mapped
//! onto a struct with a [`DecodeTable`] or with serde via [`from_section`].
#[macro_use]
extern crate log;

mod cfg;
mod de;
pub mod decode;
mod document;
mod error;
mod lines;
mod parser;

pub use cfg::{from_file, from_glob, from_reader, from_str, Builder};
pub use de::from_section;
pub use decode::{decode, Accept, Arity, DecodeTable};
pub use document::{Config, Number, Section};
pub use error::{Dangling, Error, ErrorKind, HeaderFault, PropertyFault, Result};
pub use parser::Parser;
