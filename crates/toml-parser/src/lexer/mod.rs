mod cursor;
mod token;

pub use cursor::TokenCursor;
pub use token::{Token, TokenKind};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, ErrorKind};

/// One ordered alternative of the scanner's grammar (§4.1): a regex anchored
/// to the start of the remaining line, and the kind it produces on match.
struct Rule {
    pattern: Regex,
    kind: TokenKind,
}

fn rule(pattern: &str, kind: TokenKind) -> Rule {
    Rule {
        pattern: Regex::new(&format!("^(?:{pattern})")).expect("rule pattern is valid regex"),
        kind,
    }
}

/// A digit, optionally followed by an underscore, repeated one or more
/// times — e.g. `1_000` or `42_`. Whether a trailing/leading underscore is
/// actually legal is a semantic check the parser performs on the matched
/// lexeme, not something the scanner's grammar rejects (§4.1, §4.5).
const DIGIT_RUN: &str = r"(?:\d_?)+";

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"=", TokenKind::Equal),
        rule(r"true|false", TokenKind::Boolean),
        rule(
            r"\d{4}-\d{2}-\d{2}(?:[Tt]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:[Zz]|[+-]\d{2}:\d{2})?)?|\d{2}:\d{2}:\d{2}(?:\.\d+)?",
            TokenKind::Datetime,
        ),
        rule(
            &format!(
                r"[+-]?(?:{DIGIT_RUN}\.?{DIGIT_RUN}*[eE][+-]?{DIGIT_RUN}|{DIGIT_RUN}\.{DIGIT_RUN})"
            ),
            TokenKind::Float,
        ),
        rule(&format!(r"[+-]?{DIGIT_RUN}"), TokenKind::Integer),
        rule(r#"""""#, TokenKind::TripleQuote),
        rule(r#"""#, TokenKind::Quote),
        rule(r"'''", TokenKind::TripleApostrophe),
        rule(r"'", TokenKind::Apostrophe),
        rule(r"#", TokenKind::Hash),
        rule(r" +", TokenKind::Space),
        rule(r"\[", TokenKind::LBracket),
        rule(r"\]", TokenKind::RBracket),
        rule(r"\{", TokenKind::LBrace),
        rule(r"\}", TokenKind::RBrace),
        rule(r",", TokenKind::Comma),
        rule(r"\.", TokenKind::Dot),
        rule(r"[-A-Za-z_0-9]+", TokenKind::UnquotedKey),
        rule(
            r#"\\(?:[btnfr"\\]|u[0-9A-Fa-f]{4}|U[0-9A-Fa-f]{8})"#,
            TokenKind::EscapedChar,
        ),
        rule(r"\\", TokenKind::Escape),
        rule(
            "[\u{08}-\u{0D}\u{20}-\u{21}\u{23}-\u{26}\u{28}-\u{5A}\u{5E}-\u{10FFFF}]+",
            TokenKind::BasicUnescaped,
        ),
    ]
});

/// Turns UTF-8 text into a finite token sequence (§4.1).
///
/// `Scanner` is stateless beyond its compiled rule table: `scan` is the only
/// entry point, and each call is independent.
pub struct Scanner;

impl Scanner {
    /// Normalize line endings (CRLF/CR -> LF), replace tabs with a single
    /// space, then scan line-at-a-time against the ordered rule table,
    /// injecting NEWLINE between lines and a trailing END.
    pub fn scan(text: &str) -> Result<Vec<Token>, Error> {
        let normalized = normalize(text);
        let lines: Vec<&str> = normalized.split('\n').collect();
        let mut tokens = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            let mut column = 0;
            while column < line.len() {
                let remaining = &line[column..];
                let matched = RULES
                    .iter()
                    .find_map(|rule| rule.pattern.find(remaining).map(|m| (rule.kind, m.as_str())));
                match matched {
                    Some((kind, lexeme)) => {
                        log::trace!("line {line_no}: {kind:?} {lexeme:?}");
                        column += lexeme.len();
                        tokens.push(Token::new(kind, lexeme, line_no));
                    }
                    None => {
                        return Err(ErrorKind::LexerParse { line: line_no }.into());
                    }
                }
            }
            if index + 1 != lines.len() {
                tokens.push(Token::new(TokenKind::Newline, "\n", line_no));
            }
        }

        let last_line = lines.len().max(1);
        tokens.push(Token::new(TokenKind::End, "", last_line));
        log::debug!("scanned {} tokens over {} lines", tokens.len(), lines.len());
        Ok(tokens)
    }
}

fn normalize(text: &str) -> String {
    let crlf_normalized = text.replace("\r\n", "\n");
    let cr_normalized = crlf_normalized.replace('\r', "\n");
    cr_normalized.replace('\t', " ")
}
