//! Raw token definition.
//!
//! The `RawToken` enum is the logos-derived tokenizer output before string
//! decoding and interning. Comments and long brackets are handled by
//! callbacks because their extent is not regular.

use logos::{Lexer, Logos};

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    /// `--` line comment or `--[[ ... ]]` block comment.
    #[token("--", lex_comment)]
    Comment,

    // Keywords
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    ElseIf,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    // Symbols
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Ampersand,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("==")]
    EqEq,
    #[token("~=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexNumber,

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?|\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.|\\\n)*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\\n]|\\.|\\\n)*'")]
    SingleQuoted,

    /// `[[ ... ]]` long-bracket string (level 0 only).
    #[token("[[", lex_long_string)]
    LongString,
}

/// Consume a comment after its `--` introducer.
///
/// A `[[` immediately after the dashes starts a block comment that runs to
/// the matching `]]`; anything else runs to the end of the line. Returns
/// `false` when a block comment is unterminated.
fn lex_comment(lex: &mut Lexer<'_, RawToken>) -> bool {
    let rest = lex.remainder();
    if let Some(after) = rest.strip_prefix("[[") {
        match after.find("]]") {
            Some(pos) => {
                lex.bump(2 + pos + 2);
                true
            }
            None => false,
        }
    } else {
        let line_end = rest.find('\n').unwrap_or(rest.len());
        lex.bump(line_end);
        true
    }
}

/// Consume a long-bracket string after its `[[` opener.
///
/// Returns `false` when the closing `]]` is missing.
fn lex_long_string(lex: &mut Lexer<'_, RawToken>) -> bool {
    match lex.remainder().find("]]") {
        Some(pos) => {
            lex.bump(pos + 2);
            true
        }
        None => false,
    }
}
