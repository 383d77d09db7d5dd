//! Recursive-descent grammar driver (§4.5). `Parser` owns the three pieces
//! of parse state — the token cursor, the key registry, and the document
//! tree being built — and each grammar rule below is a free function taking
//! `&mut Parser` rather than a method, so the call graph mirrors the
//! grammar's own structure (top-level loop -> header / key-value -> value
//! dispatch -> string/array).

mod string;
mod value;

use crate::error::{Error, ErrorKind};
use crate::lexer::{Token, TokenCursor, TokenKind};
use crate::registry::KeyRegistry;
use crate::tree::{self, DocumentTree};
use crate::value::{Table, Value};

pub struct Parser {
    cursor: TokenCursor,
    registry: KeyRegistry,
    tree: DocumentTree,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            registry: KeyRegistry::new(),
            tree: DocumentTree::new(),
        }
    }

    /// Run the top-level loop to exhaustion and hand back the finished tree.
    pub fn parse(mut self) -> Result<Table, Error> {
        while self.cursor.has_more() {
            if self.cursor.peek(TokenKind::Hash) {
                skip_comment(&mut self);
            } else if self.cursor.peek_sequence(&[TokenKind::LBracket, TokenKind::LBracket]) {
                array_of_tables_header(&mut self)?;
            } else if self.cursor.peek(TokenKind::LBracket) {
                table_header(&mut self)?;
            } else if self
                .cursor
                .peek_any(&[TokenKind::Quote, TokenKind::UnquotedKey, TokenKind::Integer])
            {
                key_value(&mut self, false)?;
            } else if self.cursor.peek_any(&[TokenKind::Space, TokenKind::Newline]) {
                self.cursor.advance();
            } else if self.cursor.peek(TokenKind::End) {
                break;
            } else {
                return Err(unexpected(&self, "a table header or a key"));
            }
        }
        Ok(self.tree.into_root())
    }
}

/// A key name: an unquoted-key lexeme, an integer lexeme (underscores
/// stripped, leading-zero and underscore-placement checked the same way a
/// value-position integer is), or a basic-string body.
fn key_name(parser: &mut Parser) -> Result<String, Error> {
    if parser.cursor.peek(TokenKind::UnquotedKey) {
        return parser.cursor.expect(TokenKind::UnquotedKey);
    }
    if parser.cursor.peek(TokenKind::Integer) {
        let lexeme = parser.cursor.expect(TokenKind::Integer)?;
        return value::normalize_integer_lexeme(parser, &lexeme);
    }
    if parser.cursor.peek(TokenKind::Quote) {
        parser.cursor.advance();
        return string::basic_string(parser);
    }
    Err(unexpected(parser, "a key"))
}

/// A dot-joined path of key names, each escaped via [`tree::escape_key`] so
/// a literal `.` inside a quoted segment never splits the path.
fn dotted_path(parser: &mut Parser) -> Result<String, Error> {
    let mut segments = Vec::new();
    loop {
        parser.cursor.skip_while(TokenKind::Space);
        let segment = key_name(parser)?;
        segments.push(tree::escape_key(&segment));
        parser.cursor.skip_while(TokenKind::Space);
        if parser.cursor.peek(TokenKind::Dot) {
            parser.cursor.advance();
            continue;
        }
        break;
    }
    Ok(segments.join("."))
}

fn table_header(parser: &mut Parser) -> Result<(), Error> {
    parser.cursor.expect(TokenKind::LBracket)?;
    let path = dotted_path(parser)?;
    parser.cursor.expect(TokenKind::RBracket)?;
    if !parser.registry.is_valid_table_key(&path) {
        return Err(invalid_table_key(parser, &path));
    }
    parser
        .registry
        .add_table_key(&path)
        .map_err(|_| invalid_table_key(parser, &path))?;
    parser.tree.enter_table(&path);
    finish_header_line(parser)?;
    Ok(())
}

fn array_of_tables_header(parser: &mut Parser) -> Result<(), Error> {
    parser.cursor.expect(TokenKind::LBracket)?;
    parser.cursor.expect(TokenKind::LBracket)?;
    let path = dotted_path(parser)?;
    parser.cursor.expect(TokenKind::RBracket)?;
    parser.cursor.expect(TokenKind::RBracket)?;
    if !parser.registry.is_valid_array_table_key(&path)
        || parser.registry.is_table_implicit_from_array_table(&path)
    {
        return Err(invalid_array_table_key(parser, &path));
    }
    parser
        .registry
        .add_array_table_key(&path)
        .map_err(|_| invalid_array_table_key(parser, &path))?;
    parser.tree.append_array_element(&path);
    finish_header_line(parser)?;
    Ok(())
}

/// Optional trailing space, optional comment, then a mandatory line end.
fn finish_header_line(parser: &mut Parser) -> Result<(), Error> {
    parser.cursor.skip_while(TokenKind::Space);
    if parser.cursor.peek(TokenKind::Hash) {
        skip_comment(parser);
    }
    if !parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
        return Err(unexpected(parser, "a newline"));
    }
    if parser.cursor.peek(TokenKind::Newline) {
        parser.cursor.advance();
    }
    Ok(())
}

/// `key = value`. `in_inline` suppresses the trailing newline-or-end
/// requirement, since a field inside `{ ... }` is terminated by `,` or `}`
/// instead.
fn key_value(parser: &mut Parser, in_inline: bool) -> Result<(), Error> {
    let name = key_name(parser)?;
    parser.cursor.skip_while(TokenKind::Space);
    parser.cursor.expect(TokenKind::Equal)?;
    parser.cursor.skip_while(TokenKind::Space);

    if parser.cursor.peek(TokenKind::LBrace) {
        assign_inline_table(parser, &name)?;
    } else {
        let rhs = if parser.cursor.peek(TokenKind::LBracket) {
            value::array(parser)?
        } else {
            value::simple_value(parser)?
        };
        register_and_store(parser, &name, rhs)?;
    }

    if !in_inline {
        parser.cursor.skip_while(TokenKind::Space);
        if parser.cursor.peek(TokenKind::Hash) {
            skip_comment(parser);
        }
        if !parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
            return Err(unexpected(parser, "a newline"));
        }
        if parser.cursor.peek(TokenKind::Newline) {
            parser.cursor.advance();
        }
    }
    Ok(())
}

/// A named inline table at key-value position (`point = { x = 1, y = 2 }`),
/// as opposed to one appearing bare inside an array — this variant is
/// addressable by later dotted paths, so it pushes scope on both the
/// registry and the document tree rather than building a standalone value.
fn assign_inline_table(parser: &mut Parser, name: &str) -> Result<(), Error> {
    if !parser.registry.is_valid_inline_table(name) {
        return Err(ErrorKind::InvalidKey {
            path: name.to_string(),
            line: parser.cursor.line(),
        }
        .into());
    }
    parser
        .registry
        .add_inline_table_key(name)
        .expect("is_valid_inline_table just confirmed this");
    let scope = parser.registry.push_inline_scope(name);
    parser.tree.begin_inline_table(name);
    parser.cursor.advance(); // consume `{`

    let result = inline_table_fields(parser);

    parser.tree.end_inline_table();
    parser.registry.pop_inline_scope(scope);
    result
}

fn inline_table_fields(parser: &mut Parser) -> Result<(), Error> {
    parser.cursor.skip_while(TokenKind::Space);
    if parser.cursor.peek(TokenKind::RBrace) {
        parser.cursor.advance();
        return Ok(());
    }
    loop {
        if parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
            return Err(syntax_error(parser, "newline is not allowed inside an inline table"));
        }
        key_value(parser, true)?;
        parser.cursor.skip_while(TokenKind::Space);
        if parser.cursor.peek(TokenKind::Comma) {
            parser.cursor.advance();
            parser.cursor.skip_while(TokenKind::Space);
            continue;
        }
        break;
    }
    parser.cursor.expect(TokenKind::RBrace)?;
    Ok(())
}

fn register_and_store(parser: &mut Parser, name: &str, value: Value) -> Result<(), Error> {
    if !parser.registry.is_valid_key(name) {
        return Err(ErrorKind::InvalidKey {
            path: name.to_string(),
            line: parser.cursor.line(),
        }
        .into());
    }
    parser
        .registry
        .add_key(name)
        .expect("is_valid_key just confirmed this");
    parser.tree.put_value(name, value);
    Ok(())
}

fn skip_comment(parser: &mut Parser) {
    while !parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
        parser.cursor.advance();
    }
}

fn unexpected(parser: &Parser, expected: &str) -> Error {
    let line = parser.cursor.line();
    ErrorKind::UnexpectedToken {
        expected: expected.to_string(),
        actual: format!("line {line}"),
        line,
    }
    .into()
}

fn syntax_error(parser: &Parser, message: &str) -> Error {
    ErrorKind::SyntaxError {
        message: message.to_string(),
        line: parser.cursor.line(),
    }
    .into()
}

fn invalid_table_key(parser: &Parser, path: &str) -> Error {
    ErrorKind::InvalidTableKey {
        path: tree::unescape_key(path),
        line: parser.cursor.line(),
    }
    .into()
}

fn invalid_array_table_key(parser: &Parser, path: &str) -> Error {
    ErrorKind::InvalidArrayTableKey {
        path: tree::unescape_key(path),
        line: parser.cursor.line(),
    }
    .into()
}
