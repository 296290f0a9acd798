//! Expression and prefix-chain parsing.
//!
//! Binary expressions use the dialect's precedence-climbing scheme: each
//! operator carries a left and a right priority, and right-associative
//! operators (`..`, `^`) have a right priority one below their left one.

use lua_ir::ast::{
    BinaryOp, Expr, Fragment, PrefixBase, PrefixExp, TableField, UnaryOp,
};
use lua_ir::TokenKind;

use super::Parser;
use crate::ParseError;

/// Priority of unary operators. Binds tighter than every binary operator
/// except `^`.
const UNARY_PRIORITY: u8 = 12;

/// Left/right binding priority for a binary operator token.
fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8, u8)> {
    let entry = match kind {
        TokenKind::Or => (BinaryOp::Or, 1, 1),
        TokenKind::And => (BinaryOp::And, 2, 2),
        TokenKind::Lt => (BinaryOp::Lt, 3, 3),
        TokenKind::Gt => (BinaryOp::Gt, 3, 3),
        TokenKind::LtEq => (BinaryOp::LtEq, 3, 3),
        TokenKind::GtEq => (BinaryOp::GtEq, 3, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3, 3),
        TokenKind::EqEq => (BinaryOp::Eq, 3, 3),
        TokenKind::Pipe => (BinaryOp::BitOr, 4, 4),
        TokenKind::Tilde => (BinaryOp::BitXor, 5, 5),
        TokenKind::Ampersand => (BinaryOp::BitAnd, 6, 6),
        TokenKind::LtLt => (BinaryOp::Shl, 7, 7),
        TokenKind::GtGt => (BinaryOp::Shr, 7, 7),
        TokenKind::DotDot => (BinaryOp::Concat, 9, 8),
        TokenKind::Plus => (BinaryOp::Add, 10, 10),
        TokenKind::Minus => (BinaryOp::Sub, 10, 10),
        TokenKind::Star => (BinaryOp::Mul, 11, 11),
        TokenKind::Slash => (BinaryOp::Div, 11, 11),
        TokenKind::SlashSlash => (BinaryOp::FloorDiv, 11, 11),
        TokenKind::Percent => (BinaryOp::Mod, 11, 11),
        TokenKind::Caret => (BinaryOp::Pow, 14, 13),
        _ => return None,
    };
    Some(entry)
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Not => Some(UnaryOp::Not),
        TokenKind::Hash => Some(UnaryOp::Len),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        _ => None,
    }
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_sub_expr(0)
    }

    /// `explist`: one or more comma-separated expressions.
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.cursor.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_sub_expr(&mut self, limit: u8) -> Result<Expr, ParseError> {
        let mut left = if let Some(op) = unary_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let operand = self.parse_sub_expr(UNARY_PRIORITY)?;
            Expr::Unary {
                op,
                operand: Box::new(operand),
            }
        } else {
            self.parse_simple_expr()?
        };

        while let Some((op, left_prio, right_prio)) = binary_op(self.cursor.current_kind()) {
            if left_prio <= limit {
                break;
            }
            self.cursor.advance();
            let rhs = self.parse_sub_expr(right_prio)?;
            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
            };
        }
        Ok(left)
    }

    fn parse_simple_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.cursor.current_kind() {
            TokenKind::Nil => {
                self.cursor.advance();
                Expr::Nil
            }
            TokenKind::True => {
                self.cursor.advance();
                Expr::True
            }
            TokenKind::False => {
                self.cursor.advance();
                Expr::False
            }
            TokenKind::Ellipsis => {
                self.cursor.advance();
                Expr::Ellipsis
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.cursor.advance();
                Expr::Number(n)
            }
            TokenKind::Str(bytes) => {
                let bytes = bytes.clone();
                self.cursor.advance();
                Expr::Str(bytes)
            }
            TokenKind::Function => {
                self.cursor.advance();
                Expr::Function(self.parse_func_body()?)
            }
            TokenKind::LBrace => self.parse_table_constructor()?,
            _ => return Ok(Expr::Prefix(self.parse_prefix_exp()?)),
        };
        Ok(expr)
    }

    /// `prefixexp`: a name or parenthesized expression followed by any
    /// number of field, index, call, and method-call fragments.
    pub(crate) fn parse_prefix_exp(&mut self) -> Result<PrefixExp, ParseError> {
        let base = match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let name = *name;
                self.cursor.advance();
                PrefixBase::Name(name)
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen)?;
                PrefixBase::Paren(Box::new(inner))
            }
            other => {
                return Err(ParseError::new(
                    format!("unexpected {other}"),
                    self.cursor.current_span(),
                ))
            }
        };

        let mut fragments = Vec::new();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    fragments.push(Fragment::Field(self.cursor.expect_ident()?));
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let key = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    fragments.push(Fragment::Index(key));
                }
                TokenKind::Colon => {
                    self.cursor.advance();
                    let name = self.cursor.expect_ident()?;
                    let args = self.parse_call_args()?;
                    fragments.push(Fragment::MethodCall { name, args });
                }
                TokenKind::LParen | TokenKind::Str(_) | TokenKind::LBrace => {
                    fragments.push(Fragment::Call(self.parse_call_args()?));
                }
                _ => break,
            }
        }

        Ok(PrefixExp { base, fragments })
    }

    /// Call arguments: `( explist )`, a lone string literal, or a table
    /// constructor.
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::LParen => {
                self.cursor.advance();
                let args = if self.cursor.check(&TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                self.cursor.expect(&TokenKind::RParen)?;
                Ok(args)
            }
            TokenKind::Str(bytes) => {
                let bytes = bytes.clone();
                self.cursor.advance();
                Ok(vec![Expr::Str(bytes)])
            }
            TokenKind::LBrace => Ok(vec![self.parse_table_constructor()?]),
            other => Err(ParseError::new(
                format!("expected arguments, found {other}"),
                self.cursor.current_span(),
            )),
        }
    }

    /// `{ [field {fieldsep field} [fieldsep]] }`
    fn parse_table_constructor(&mut self) -> Result<Expr, ParseError> {
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            if self.cursor.check(&TokenKind::RBrace) {
                break;
            }
            let field = match self.cursor.current_kind() {
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let key = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::RBracket)?;
                    self.cursor.expect(&TokenKind::Assign)?;
                    let value = self.parse_expr()?;
                    TableField::Keyed { key, value }
                }
                TokenKind::Ident(name) if matches!(self.cursor.peek_kind(), TokenKind::Assign) => {
                    let key = *name;
                    self.cursor.advance();
                    self.cursor.advance();
                    let value = self.parse_expr()?;
                    TableField::Named {
                        key,
                        value,
                    }
                }
                _ => TableField::Positional(self.parse_expr()?),
            };
            fields.push(field);
            if !self.cursor.eat(&TokenKind::Comma) && !self.cursor.eat(&TokenKind::Semicolon) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(Expr::Table(fields))
    }
}
