//! Basic- and literal-string body parsing (§4.5). Assumes the caller has
//! already consumed the opening delimiter.

use super::Parser;
use crate::error::Error;
use crate::lexer::TokenKind;

/// `"..."`, terminated by the matching QUOTE. No bare newline is allowed.
pub(super) fn basic_string(parser: &mut Parser) -> Result<String, Error> {
    let mut out = String::new();
    loop {
        if parser.cursor.peek(TokenKind::Quote) {
            parser.cursor.advance();
            return Ok(out);
        }
        if parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
            return Err(super::syntax_error(parser, "unterminated string"));
        }
        append_unit(parser, &mut out)?;
    }
}

/// `"""..."""`. A newline immediately after the opening delimiter is
/// trimmed, and a backslash at the end of a physical line swallows the
/// newline plus any leading whitespace on the next (a "line continuation").
pub(super) fn multiline_basic_string(parser: &mut Parser) -> Result<String, Error> {
    if parser.cursor.peek(TokenKind::Newline) {
        parser.cursor.advance();
    }
    let mut out = String::new();
    loop {
        if parser.cursor.peek(TokenKind::TripleQuote) {
            parser.cursor.advance();
            return Ok(out);
        }
        if parser.cursor.peek(TokenKind::End) {
            return Err(super::syntax_error(parser, "unterminated multi-line string"));
        }
        if parser.cursor.peek(TokenKind::Escape) && consume_line_continuation(parser) {
            continue;
        }
        if parser.cursor.peek(TokenKind::Newline) {
            parser.cursor.advance();
            out.push('\n');
            continue;
        }
        append_unit(parser, &mut out)?;
    }
}

/// A line continuation is an ESCAPE followed by a run of SPACE/NEWLINE/
/// ESCAPE tokens that contains at least one NEWLINE (trailing spaces before
/// the backslash's newline are otherwise-insignificant whitespace, per
/// §4.5). Consumes the whole run and returns `true` on a match; otherwise
/// leaves the cursor untouched so the caller can fall back to
/// [`append_unit`]'s ordinary (and here, erroring) handling of a bare
/// ESCAPE.
fn consume_line_continuation(parser: &mut Parser) -> bool {
    let mut trial = parser.cursor.clone();
    trial.advance();
    let mut saw_newline = false;
    while trial.peek_any(&[TokenKind::Space, TokenKind::Newline, TokenKind::Escape]) {
        saw_newline |= trial.peek(TokenKind::Newline);
        trial.advance();
    }
    if saw_newline {
        parser.cursor = trial;
    }
    saw_newline
}

/// `'...'`. Entirely literal: no escape sequence has any special meaning.
pub(super) fn literal_string(parser: &mut Parser) -> Result<String, Error> {
    let mut out = String::new();
    loop {
        if parser.cursor.peek(TokenKind::Apostrophe) {
            parser.cursor.advance();
            return Ok(out);
        }
        if parser.cursor.peek_any(&[TokenKind::Newline, TokenKind::End]) {
            return Err(super::syntax_error(parser, "unterminated literal string"));
        }
        out.push_str(&take_raw_lexeme(parser));
    }
}

/// `'''...'''`. Same line-leading-newline trim as the basic form, but no
/// escapes and no line continuations: the content is verbatim.
pub(super) fn multiline_literal_string(parser: &mut Parser) -> Result<String, Error> {
    if parser.cursor.peek(TokenKind::Newline) {
        parser.cursor.advance();
    }
    let mut out = String::new();
    loop {
        if parser.cursor.peek(TokenKind::TripleApostrophe) {
            parser.cursor.advance();
            return Ok(out);
        }
        if parser.cursor.peek(TokenKind::End) {
            return Err(super::syntax_error(parser, "unterminated multi-line literal string"));
        }
        if parser.cursor.peek(TokenKind::Newline) {
            parser.cursor.advance();
            out.push('\n');
            continue;
        }
        out.push_str(&take_raw_lexeme(parser));
    }
}

/// One content unit inside a basic (escaping) string: a decoded escape, a
/// rejected bare backslash, or any other token's lexeme taken verbatim.
fn append_unit(parser: &mut Parser, out: &mut String) -> Result<(), Error> {
    if parser.cursor.peek(TokenKind::EscapedChar) {
        let lexeme = parser.cursor.expect(TokenKind::EscapedChar)?;
        out.push_str(&decode_escape(&lexeme));
        return Ok(());
    }
    if parser.cursor.peek(TokenKind::Escape) {
        return Err(super::syntax_error(parser, "invalid escape sequence"));
    }
    out.push_str(&take_raw_lexeme(parser));
    Ok(())
}

fn take_raw_lexeme(parser: &mut Parser) -> String {
    parser
        .cursor
        .advance()
        .expect("not at END: callers check Newline/End first")
        .lexeme()
        .to_string()
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::lexer::Scanner;
    use crate::value::Value;

    fn parse(text: &str) -> Result<crate::value::Table, crate::error::Error> {
        Parser::new(Scanner::scan(text)?).parse()
    }

    #[test]
    fn a_trailing_backslash_with_no_following_whitespace_swallows_just_the_newline() {
        let root = parse("s = \"\"\"abc\\\ndef\"\"\"\n").unwrap();
        assert_eq!(root["s"], Value::String("abcdef".into()));
    }

    #[test]
    fn a_trailing_backslash_followed_by_spaces_before_the_newline_is_still_a_continuation() {
        let root = parse("s = \"\"\"abc\\  \ndef\"\"\"\n").unwrap();
        assert_eq!(root["s"], Value::String("abcdef".into()));
    }

    #[test]
    fn a_continuation_may_also_swallow_leading_whitespace_on_the_next_line() {
        let root = parse("s = \"\"\"abc\\\n   def\"\"\"\n").unwrap();
        assert_eq!(root["s"], Value::String("abcdef".into()));
    }

    #[test]
    fn a_bare_backslash_with_no_following_newline_is_still_a_syntax_error() {
        assert!(parse("s = \"\"\"abc\\zdef\"\"\"\n").is_err());
    }
}

fn decode_escape(lexeme: &str) -> String {
    let body = &lexeme[1..];
    match body.chars().next().expect("escape lexeme has a body") {
        // `\b` is preserved as the two literal characters, not BACKSPACE.
        'b' => "\\b".to_string(),
        't' => "\t".to_string(),
        'n' => "\n".to_string(),
        'f' => "\u{0C}".to_string(),
        'r' => "\r".to_string(),
        '"' => "\"".to_string(),
        '\\' => "\\".to_string(),
        'u' | 'U' => {
            let hex = &body[1..];
            let code = u32::from_str_radix(hex, 16).expect("scanner validated hex digits");
            char::from_u32(code).map(String::from).unwrap_or_default()
        }
        other => unreachable!("scanner only produces recognized escapes, got {other:?}"),
    }
}
