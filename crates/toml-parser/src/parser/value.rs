//! Simple-value dispatch, integer/float literal validation, array parsing,
//! and standalone (array-element) inline tables (§4.5, §4.6).

use super::{string, Parser};
use crate::error::{Error, ErrorKind};
use crate::lexer::TokenKind;
use crate::registry::KeyRegistry;
use crate::value::{Datetime, Table, Value};

/// A boolean/datetime/float/integer/string token, or a quoted-string
/// delimiter. Does not handle `[` or `{`, which the caller dispatches on
/// first since they can recurse into [`array`] or [`inline_table`].
pub(super) fn simple_value(parser: &mut Parser) -> Result<Value, Error> {
    if parser.cursor.peek(TokenKind::Boolean) {
        let lexeme = parser.cursor.expect(TokenKind::Boolean)?;
        return Ok(Value::Boolean(lexeme == "true"));
    }
    if parser.cursor.peek(TokenKind::Datetime) {
        let lexeme = parser.cursor.expect(TokenKind::Datetime)?;
        let kind = Datetime::classify(&lexeme);
        return Ok(Value::Datetime(Datetime::new(lexeme, kind)));
    }
    if parser.cursor.peek(TokenKind::Float) {
        let lexeme = parser.cursor.expect(TokenKind::Float)?;
        return Ok(Value::Float(parse_float(parser, &lexeme)?));
    }
    if parser.cursor.peek(TokenKind::Integer) {
        let lexeme = parser.cursor.expect(TokenKind::Integer)?;
        return Ok(Value::Integer(parse_integer(parser, &lexeme)?));
    }
    if parser.cursor.peek(TokenKind::TripleQuote) {
        parser.cursor.advance();
        return Ok(Value::String(string::multiline_basic_string(parser)?));
    }
    if parser.cursor.peek(TokenKind::Quote) {
        parser.cursor.advance();
        return Ok(Value::String(string::basic_string(parser)?));
    }
    if parser.cursor.peek(TokenKind::TripleApostrophe) {
        parser.cursor.advance();
        return Ok(Value::String(string::multiline_literal_string(parser)?));
    }
    if parser.cursor.peek(TokenKind::Apostrophe) {
        parser.cursor.advance();
        return Ok(Value::String(string::literal_string(parser)?));
    }
    Err(super::unexpected(parser, "a value"))
}

/// Any value that can appear as an array element: a nested array, a
/// standalone inline table, or a simple value.
fn element(parser: &mut Parser) -> Result<Value, Error> {
    if parser.cursor.peek(TokenKind::LBracket) {
        return array(parser);
    }
    if parser.cursor.peek(TokenKind::LBrace) {
        return inline_table(parser);
    }
    simple_value(parser)
}

/// `[elem, elem, ...]`, assuming the caller has not yet consumed `[`.
/// Elements may span multiple lines and be interleaved with comments; a
/// trailing comma before `]` is permitted. All elements must share a
/// [`ValueKind`](crate::value::ValueKind) (§4.6, SYNTAX_ERROR otherwise).
pub(super) fn array(parser: &mut Parser) -> Result<Value, Error> {
    parser.cursor.expect(TokenKind::LBracket)?;
    let mut elements = Vec::new();
    skip_layout(parser);
    if parser.cursor.peek(TokenKind::RBracket) {
        parser.cursor.advance();
        return Ok(Value::Array(elements));
    }
    loop {
        let value = element(parser)?;
        if let Some(first) = elements.first() {
            if Value::kind(first) != value.kind() {
                return Err(super::syntax_error(
                    parser,
                    &format!(
                        "Data types cannot be mixed in an array: expected {}, found {value:?}",
                        first.kind()
                    ),
                ));
            }
        }
        elements.push(value);
        skip_layout(parser);
        if parser.cursor.peek(TokenKind::Comma) {
            parser.cursor.advance();
            skip_layout(parser);
            if parser.cursor.peek(TokenKind::RBracket) {
                break;
            }
            continue;
        }
        break;
    }
    parser.cursor.expect(TokenKind::RBracket)?;
    Ok(Value::Array(elements))
}

/// Whitespace, newlines, and comments are all insignificant between array
/// elements, unlike at the top level where a comment still ends at a line.
fn skip_layout(parser: &mut Parser) {
    loop {
        if parser.cursor.peek_any(&[TokenKind::Space, TokenKind::Newline]) {
            parser.cursor.advance();
            continue;
        }
        if parser.cursor.peek(TokenKind::Hash) {
            super::skip_comment(parser);
            continue;
        }
        break;
    }
}

/// `{ k = v, ... }` appearing as a value in its own right (typically an
/// array element), rather than at key-value position. Keys are only
/// required to be unique among themselves, enforced with a throwaway
/// registry scoped to this literal; the result never touches the document
/// tree, since nothing here is addressable by a later table header.
pub(super) fn inline_table(parser: &mut Parser) -> Result<Value, Error> {
    parser.cursor.expect(TokenKind::LBrace)?;
    let mut table = Table::new();
    let mut registry = KeyRegistry::new();
    parser.cursor.skip_while(TokenKind::Space);
    if parser.cursor.peek(TokenKind::RBrace) {
        parser.cursor.advance();
        return Ok(Value::Table(table));
    }
    loop {
        if parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
            return Err(super::syntax_error(parser, "newline is not allowed inside an inline table"));
        }
        let name = super::key_name(parser)?;
        parser.cursor.skip_while(TokenKind::Space);
        parser.cursor.expect(TokenKind::Equal)?;
        parser.cursor.skip_while(TokenKind::Space);
        if !registry.is_valid_key(&name) {
            return Err(ErrorKind::InvalidKey {
                path: name,
                line: parser.cursor.line(),
            }
            .into());
        }
        registry.add_key(&name).expect("is_valid_key just confirmed this");
        let value = element(parser)?;
        table.insert(name, value);
        parser.cursor.skip_while(TokenKind::Space);
        if parser.cursor.peek(TokenKind::Comma) {
            parser.cursor.advance();
            parser.cursor.skip_while(TokenKind::Space);
            continue;
        }
        break;
    }
    parser.cursor.expect(TokenKind::RBrace)?;
    Ok(Value::Table(table))
}

/// Every underscore in an INTEGER/FLOAT lexeme must sit between two digits;
/// the scanner's grammar is loose enough to admit `42_` or `_42`-shaped
/// lexemes (§4.1), so the parser is where that gets rejected (§4.5, §8).
fn validate_underscore_placement(parser: &Parser, lexeme: &str) -> Result<(), Error> {
    let chars: Vec<char> = lexeme.chars().collect();
    for (index, ch) in chars.iter().enumerate() {
        if *ch != '_' {
            continue;
        }
        let prev_is_digit = index > 0 && chars[index - 1].is_ascii_digit();
        let next_is_digit = index + 1 < chars.len() && chars[index + 1].is_ascii_digit();
        if !prev_is_digit || !next_is_digit {
            return Err(super::syntax_error(
                parser,
                &format!("misplaced underscore in `{lexeme}`"),
            ));
        }
    }
    Ok(())
}

/// Underscore-placement and leading-zero validation shared by integer
/// values (§4.6) and bare-integer key names (§4.5: "INTEGER (stringified,
/// underscores removed, leading-zero check applied like value-integer)").
/// Returns the lexeme with its underscores stripped, sign intact.
pub(super) fn normalize_integer_lexeme(parser: &Parser, lexeme: &str) -> Result<String, Error> {
    validate_underscore_placement(parser, lexeme)?;
    let (sign, digits) = split_sign(lexeme);
    let stripped: String = digits.chars().filter(|c| *c != '_').collect();
    if stripped.len() > 1 && stripped.starts_with('0') {
        return Err(super::syntax_error(
            parser,
            &format!("leading zero in integer `{lexeme}`"),
        ));
    }
    Ok(format!("{sign}{stripped}"))
}

fn parse_integer(parser: &Parser, lexeme: &str) -> Result<i64, Error> {
    normalize_integer_lexeme(parser, lexeme)?
        .parse::<i64>()
        .map_err(|_| super::syntax_error(parser, &format!("integer `{lexeme}` is out of range")))
}

fn parse_float(parser: &Parser, lexeme: &str) -> Result<f64, Error> {
    validate_underscore_placement(parser, lexeme)?;
    let stripped: String = lexeme.chars().filter(|c| *c != '_').collect();
    stripped
        .parse::<f64>()
        .map_err(|_| super::syntax_error(parser, &format!("invalid float literal `{lexeme}`")))
}

fn split_sign(lexeme: &str) -> (&str, &str) {
    if let Some(rest) = lexeme.strip_prefix('+') {
        ("", rest)
    } else if let Some(rest) = lexeme.strip_prefix('-') {
        ("-", rest)
    } else {
        ("", lexeme)
    }
}
