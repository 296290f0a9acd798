//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption. The stream
//! is always `Eof`-terminated, so `current()` never runs off the end.

use std::mem::discriminant;

use lua_ir::{Name, Span, Token, TokenKind};

use crate::ParseError;

/// Cursor over an `Eof`-terminated token slice.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token stream must be Eof-terminated"
        );
        Cursor { tokens, pos: 0 }
    }

    /// The current token. Invariant: `pos` never passes the `Eof` token.
    #[inline]
    pub(crate) fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.current().span
    }

    /// One-token lookahead; returns `Eof` at the end of the stream.
    #[inline]
    pub(crate) fn peek_kind(&self) -> &'a TokenKind {
        static EOF: TokenKind = TokenKind::Eof;
        match self.tokens.get(self.pos + 1) {
            Some(token) => &token.kind,
            None => &EOF,
        }
    }

    /// Advance past the current token. A no-op on `Eof`.
    #[inline]
    pub(crate) fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check whether the current token has the same kind (payloads ignored).
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        discriminant(self.current_kind()) == discriminant(kind)
    }

    /// Consume the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or produce a parse error.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(ParseError::new(
                format!("expected {}, found {}", kind.describe(), self.current_kind()),
                self.current_span(),
            ))
        }
    }

    /// Consume an identifier or produce a parse error.
    pub(crate) fn expect_ident(&mut self) -> Result<Name, ParseError> {
        match *self.current_kind() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            ref other => Err(ParseError::new(
                format!("expected identifier, found {other}"),
                self.current_span(),
            )),
        }
    }
}
