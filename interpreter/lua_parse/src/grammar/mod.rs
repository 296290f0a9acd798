//! The grammar proper, split by syntactic class.
//!
//! `stmt` owns blocks and statements, `expr` owns expressions and prefix
//! chains. Both hang off the [`Parser`] state machine defined here.

mod expr;
mod stmt;

use lua_ir::ast::{Block, Chunk};
use lua_ir::TokenKind;

use crate::cursor::Cursor;
use crate::ParseError;

/// Recursive-descent parser over a token stream.
///
/// Errors are collected rather than aborting: a failed statement records
/// its error, the parser synchronizes at the next statement boundary, and
/// parsing continues so one run reports as much as possible.
pub(crate) struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [lua_ir::Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            errors: Vec::new(),
        }
    }

    /// Parse a whole chunk. The returned chunk is only meaningful when the
    /// error list comes back empty.
    pub(crate) fn parse_chunk(mut self, name: String) -> (Chunk, Vec<ParseError>) {
        let block = self.parse_block();
        if !self.cursor.is_at_end() {
            self.errors.push(ParseError::new(
                format!("expected end of input, found {}", self.cursor.current_kind()),
                self.cursor.current_span(),
            ));
        }
        let chunk = Chunk {
            name,
            block: std::rc::Rc::new(block),
        };
        (chunk, self.errors)
    }

    /// Record an error and skip ahead to a likely statement boundary.
    pub(crate) fn recover(&mut self, err: ParseError) {
        self.errors.push(err);
        self.synchronize();
    }

    /// Skip tokens until something that can plausibly start or end a
    /// statement. Always makes progress.
    fn synchronize(&mut self) {
        self.cursor.advance();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Until
                | TokenKind::Semicolon
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Repeat
                | TokenKind::Function
                | TokenKind::Local
                | TokenKind::Return
                | TokenKind::Break => return,
                _ => self.cursor.advance(),
            }
        }
    }

    /// Check whether the current token terminates a block.
    pub(crate) fn at_block_end(&self) -> bool {
        matches!(
            self.cursor.current_kind(),
            TokenKind::Eof
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::ElseIf
                | TokenKind::Until
        )
    }

    /// Used by `stmt` and `expr` to balance `do`/`then`/`end` style pairs.
    pub(crate) fn expect_block_end(&mut self, construct: &str) -> Block {
        let block = self.parse_block();
        if let Err(err) = self.cursor.expect(&TokenKind::End) {
            self.errors.push(ParseError::new(
                format!("{} near {}", err.message, construct),
                err.span,
            ));
        }
        block
    }
}
