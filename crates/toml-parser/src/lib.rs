//! A TOML v0.4.0 parser: tokenize, validate key/table uniqueness, and build
//! a nested [`Value::Table`] from UTF-8 input (§2, §6).
//!
//! The two entry points are [`parse`] and [`parse_file`]; everything else in
//! this crate (`Scanner`, `TokenCursor`, `KeyRegistry`, `DocumentTree`,
//! `Parser`) is exposed so [`toml-builder`](https://docs.rs/toml-builder)
//! can reuse the key-registry and value model rather than duplicating them.

mod error;
mod lexer;
mod parser;
mod registry;
mod tree;
mod value;

pub use error::{Error, ErrorKind};
pub use lexer::{Scanner, Token, TokenCursor, TokenKind};
pub use parser::Parser;
pub use registry::{KeyRegistry, RegistryError};
pub use tree::{escape_key, unescape_key, DocumentTree};
pub use value::{Datetime, DatetimeKind, Table, Value, ValueKind};

use std::fs;
use std::path::Path;

/// Parse `input` as a complete TOML document.
///
/// Empty-after-trim input returns `Ok(None)`; anything else returns the
/// top-level table on success. `as_object` is accepted for parity with the
/// distributed ecosystem's parse surface, where it selects an object-style
/// container for the top level only — this crate has a single [`Table`]
/// representation for every level, so the flag has no observable effect
/// here and exists only so callers migrating from that surface don't have
/// to drop the argument.
pub fn parse(input: &[u8], as_object: bool) -> Result<Option<Value>, Error> {
    let _ = as_object;
    let text = std::str::from_utf8(input).map_err(|_| Error::from(ErrorKind::InvalidUtf8))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let tokens = Scanner::scan(text)?;
    log::debug!("parsing {} tokens", tokens.len());
    let root = Parser::new(tokens).parse()?;
    Ok(Some(Value::Table(root)))
}

/// Read `path` in full and defer to [`parse`]. Parse errors carry `path` as
/// context (§6); I/O failures are translated to `FILE_NOT_FOUND` /
/// `FILE_NOT_READABLE` rather than surfacing the raw [`std::io::Error`].
pub fn parse_file(path: impl AsRef<Path>, as_object: bool) -> Result<Option<Value>, Error> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|err| {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::FileNotFound { path: display.clone() }
        } else {
            ErrorKind::FileNotReadable {
                path: display.clone(),
                reason: err.to_string(),
            }
        };
        Error::from(kind)
    })?;
    parse(&bytes, as_object).map_err(|err| err.with_file(display))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_after_trim_input_is_none() {
        assert_eq!(parse(b"   \n\t\n", false).unwrap(), None);
    }

    #[test]
    fn a_minimal_document_round_trips_through_the_public_facade() {
        let value = parse(b"title = \"TOML Example\"\n", false).unwrap().unwrap();
        let table = value.as_table().unwrap();
        assert_eq!(table["title"], Value::String("TOML Example".into()));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = parse(&[0xFF, 0xFE, 0xFD], false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUtf8);
    }

    #[test]
    fn parse_file_reports_file_not_found() {
        let err = parse_file("/nonexistent/path/does-not-exist.toml", false).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FileNotFound { .. }));
    }
}
