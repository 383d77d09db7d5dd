use super::token::{Token, TokenKind};
use crate::error::{Error, ErrorKind};

/// Lookahead / match / skip over a finished token sequence (§4.2).
///
/// Every peek-family method leaves the cursor exactly where it found it;
/// only `advance`, `expect`, and the `skip_while*` family move it forward.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        // The scanner always appends an END token, so this is in range for
        // every cursor produced by `Scanner::scan`.
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream is never empty"))
    }

    pub fn peek(&self, kind: TokenKind) -> bool {
        self.current().kind() == kind
    }

    pub fn peek_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current().kind())
    }

    pub fn peek_sequence(&self, kinds: &[TokenKind]) -> bool {
        kinds
            .iter()
            .enumerate()
            .all(|(offset, kind)| self.tokens.get(self.pos + offset).map(Token::kind) == Some(*kind))
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<String, Error> {
        if self.current().kind() == kind {
            let lexeme = self.current().lexeme().to_string();
            self.pos += 1;
            Ok(lexeme)
        } else {
            let actual = self.current();
            Err(ErrorKind::UnexpectedToken {
                expected: format!("{kind:?}"),
                actual: format!("{:?} {:?}", actual.kind(), actual.lexeme()),
                line: actual.line(),
            }
            .into())
        }
    }

    pub fn skip_while(&mut self, kind: TokenKind) {
        while self.peek(kind) {
            self.pos += 1;
        }
    }

    pub fn skip_while_any(&mut self, kinds: &[TokenKind]) {
        while self.peek_any(kinds) {
            self.pos += 1;
        }
    }

    pub fn has_more(&self) -> bool {
        !self.peek(TokenKind::End)
    }

    pub fn line(&self) -> usize {
        self.current().line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> Vec<Token> {
        vec![
            Token::new(TokenKind::LBracket, "[", 1),
            Token::new(TokenKind::UnquotedKey, "a", 1),
            Token::new(TokenKind::RBracket, "]", 1),
            Token::new(TokenKind::End, "", 1),
        ]
    }

    #[test]
    fn peek_does_not_advance() {
        let cursor = TokenCursor::new(tokens());
        assert!(cursor.peek(TokenKind::LBracket));
        assert!(cursor.peek(TokenKind::LBracket));
    }

    #[test]
    fn peek_sequence_checks_without_consuming() {
        let cursor = TokenCursor::new(tokens());
        assert!(cursor.peek_sequence(&[TokenKind::LBracket, TokenKind::UnquotedKey]));
        assert!(cursor.peek(TokenKind::LBracket));
    }

    #[test]
    fn expect_consumes_on_match_and_errors_otherwise() {
        let mut cursor = TokenCursor::new(tokens());
        assert_eq!(cursor.expect(TokenKind::LBracket).unwrap(), "[");
        assert!(cursor.expect(TokenKind::RBracket).is_err());
    }

    #[test]
    fn has_more_is_false_at_end() {
        let mut cursor = TokenCursor::new(vec![Token::new(TokenKind::End, "", 1)]);
        assert!(!cursor.has_more());
        assert!(cursor.advance().is_some());
    }
}
