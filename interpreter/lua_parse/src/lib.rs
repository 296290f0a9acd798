//! Recursive-descent parser for the 5.x dialect.
//!
//! Consumes the lexer's token stream and produces a [`Chunk`]. Syntax
//! errors come back as a sequence; when any are present the chunk must not
//! be evaluated.
//!
//! [`Chunk`]: lua_ir::ast::Chunk

mod cursor;
mod error;
mod grammar;

use lua_ir::ast::Chunk;
use lua_ir::Token;

pub use error::ParseError;

/// Parse an `Eof`-terminated token stream into a chunk named `chunk_name`.
///
/// The parser keeps going after an error, synchronizing at statement
/// boundaries, so the returned list covers every problem it could find.
pub fn parse(tokens: &[Token], chunk_name: impl Into<String>) -> Result<Chunk, Vec<ParseError>> {
    let parser = grammar::Parser::new(tokens);
    let (chunk, errors) = parser.parse_chunk(chunk_name.into());
    if errors.is_empty() {
        Ok(chunk)
    } else {
        Err(errors)
    }
}
