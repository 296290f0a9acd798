//! Scanner for the 5.x dialect.
//!
//! Turns source text into a stream of [`Token`]s with identifier interning
//! and string-escape decoding already applied. Lexical problems come back
//! as a sequence of [`LexError`]s alongside whatever tokens did cook, so
//! the caller can report them all at once.

mod cooker;
mod escape;
mod raw_token;

use lua_ir::{line_col, Span, StringInterner, Token};

pub use escape::{decode_escapes, EscapeError};

/// A lexical error with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    /// Render as `line:col: message` against the source text.
    pub fn render(&self, source: &str) -> String {
        let (line, col) = line_col(source, self.span.start);
        format!("{line}:{col}: {}", self.message)
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LexError {}

/// Lex `source` into a token stream terminated by `Eof`.
///
/// Identifiers are interned into `interner`. The token stream is returned
/// even when errors occurred; callers must treat a non-empty error list as
/// fatal for evaluation.
pub fn lex(source: &str, interner: &StringInterner) -> (Vec<Token>, Vec<LexError>) {
    cooker::cook(source, interner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lua_ir::TokenKind;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        let (tokens, errors) = lex(source, &interner);
        assert_eq!(errors, vec![], "unexpected lex errors for {source:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_symbols() {
        let interner = StringInterner::new();
        let (tokens, errors) = lex("local x = nil", &interner);
        assert_eq!(errors, vec![]);
        let x = interner.intern("x");
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Local,
                TokenKind::Ident(x),
                TokenKind::Assign,
                TokenKind::Nil,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_still_an_identifier() {
        let interner = StringInterner::new();
        let (tokens, _) = lex("android endif", &interner);
        assert!(matches!(tokens[0].kind, TokenKind::Ident(_)));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(_)));
    }

    #[test]
    fn dots_disambiguate_by_length() {
        assert_eq!(
            kinds(". .. ..."),
            vec![
                TokenKind::Dot,
                TokenKind::DotDot,
                TokenKind::Ellipsis,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_literals() {
        assert_eq!(
            kinds("3 3.5 .5 1e3 2E-2 0xFF"),
            vec![
                TokenKind::Number(3.0),
                TokenKind::Number(3.5),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.02),
                TokenKind::Number(255.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literals_decode_escapes() {
        assert_eq!(
            kinds(r#""a\tb" 'c\x21'"#),
            vec![
                TokenKind::Str(b"a\tb".to_vec().into_boxed_slice()),
                TokenKind::Str(b"c!".to_vec().into_boxed_slice()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn long_string_keeps_raw_bytes_and_strips_leading_newline() {
        assert_eq!(
            kinds("[[\nline\\n]]"),
            vec![
                TokenKind::Str(b"line\\n".to_vec().into_boxed_slice()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_trivia() {
        assert_eq!(
            kinds("1 -- a comment\n--[[ block\ncomment ]] 2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn shift_and_floor_div_tokens() {
        let interner = StringInterner::new();
        let (tokens, errors) = lex("a << 1 >> 2 // 3", &interner);
        assert_eq!(errors, vec![]);
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds[0], TokenKind::Ident(interner.intern("a")));
        assert_eq!(
            kinds[1..],
            [
                TokenKind::LtLt,
                TokenKind::Number(1.0),
                TokenKind::GtGt,
                TokenKind::Number(2.0),
                TokenKind::SlashSlash,
                TokenKind::Number(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_error() {
        let interner = StringInterner::new();
        let (_, errors) = lex("x = \"abc", &interner);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("unterminated string"));
    }

    #[test]
    fn unexpected_character_reports_error_with_position() {
        let interner = StringInterner::new();
        let source = "x = 1\n@";
        let (_, errors) = lex(source, &interner);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].render(source), "2:1: unexpected character '@'");
    }

    #[test]
    fn bad_escape_reports_error() {
        let interner = StringInterner::new();
        let (_, errors) = lex(r#"s = "a\q""#, &interner);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("invalid escape"));
    }
}
