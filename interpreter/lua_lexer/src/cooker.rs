//! Cooking: raw logos tokens into `lua_ir::Token`s.
//!
//! Cooking interns identifiers, parses number payloads, and decodes string
//! literals. Raw tokens that logos rejects become [`LexError`]s; cooking
//! continues so one pass reports every lexical problem.

use logos::Logos;

use lua_ir::{Span, StringInterner, Token, TokenKind};

use crate::escape::decode_escapes;
use crate::raw_token::RawToken;
use crate::LexError;

/// Cook `source` into a token stream terminated by `Eof`.
pub(crate) fn cook(source: &str, interner: &StringInterner) -> (Vec<Token>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        match result {
            Ok(raw) => match cook_one(raw, slice, span, interner) {
                Ok(Some(kind)) => tokens.push(Token::new(kind, span)),
                Ok(None) => {}
                Err(err) => errors.push(err),
            },
            Err(()) => errors.push(unexpected(slice, span)),
        }
    }

    let end = Span::from_range(source.len()..source.len());
    tokens.push(Token::new(TokenKind::Eof, end));
    (tokens, errors)
}

/// Cook a single raw token. `Ok(None)` means the token is trivia.
fn cook_one(
    raw: RawToken,
    slice: &str,
    span: Span,
    interner: &StringInterner,
) -> Result<Option<TokenKind>, LexError> {
    let kind = match raw {
        RawToken::Comment => return Ok(None),

        RawToken::And => TokenKind::And,
        RawToken::Break => TokenKind::Break,
        RawToken::Do => TokenKind::Do,
        RawToken::Else => TokenKind::Else,
        RawToken::ElseIf => TokenKind::ElseIf,
        RawToken::End => TokenKind::End,
        RawToken::False => TokenKind::False,
        RawToken::For => TokenKind::For,
        RawToken::Function => TokenKind::Function,
        RawToken::If => TokenKind::If,
        RawToken::In => TokenKind::In,
        RawToken::Local => TokenKind::Local,
        RawToken::Nil => TokenKind::Nil,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Repeat => TokenKind::Repeat,
        RawToken::Return => TokenKind::Return,
        RawToken::Then => TokenKind::Then,
        RawToken::True => TokenKind::True,
        RawToken::Until => TokenKind::Until,
        RawToken::While => TokenKind::While,

        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::SlashSlash => TokenKind::SlashSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Hash => TokenKind::Hash,
        RawToken::Ampersand => TokenKind::Ampersand,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::LtLt => TokenKind::LtLt,
        RawToken::GtGt => TokenKind::GtGt,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Assign => TokenKind::Assign,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Ellipsis => TokenKind::Ellipsis,

        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::HexNumber => TokenKind::Number(parse_hex(&slice[2..])),
        RawToken::Number => match slice.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => {
                return Err(LexError {
                    message: format!("malformed number near '{slice}'"),
                    span,
                })
            }
        },

        RawToken::DoubleQuoted | RawToken::SingleQuoted => {
            let body = &slice[1..slice.len() - 1];
            match decode_escapes(body) {
                Ok(bytes) => TokenKind::Str(bytes.into_boxed_slice()),
                Err(err) => {
                    return Err(LexError {
                        message: err.message,
                        span: Span::new(
                            span.start + 1 + err.offset as u32,
                            span.end,
                        ),
                    })
                }
            }
        }

        RawToken::LongString => {
            // Strip delimiters; a newline right after `[[` does not count.
            let body = &slice[2..slice.len() - 2];
            let body = body.strip_prefix('\n').unwrap_or(body);
            TokenKind::Str(body.as_bytes().to_vec().into_boxed_slice())
        }
    };
    Ok(Some(kind))
}

/// Parse hex digits with wrapping 64-bit accumulation, the dialect's
/// behavior for oversized hex literals.
fn parse_hex(digits: &str) -> f64 {
    let mut value: u64 = 0;
    for b in digits.bytes() {
        let d = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => b - b'A' + 10,
        };
        value = value.wrapping_mul(16).wrapping_add(u64::from(d));
    }
    value as f64
}

fn unexpected(slice: &str, span: Span) -> LexError {
    let message = if slice.starts_with('"') || slice.starts_with('\'') {
        "unterminated string".to_string()
    } else if slice.starts_with("[[") {
        "unterminated long string".to_string()
    } else if slice.starts_with("--") {
        "unterminated comment".to_string()
    } else {
        format!("unexpected character '{slice}'")
    };
    LexError { message, span }
}
