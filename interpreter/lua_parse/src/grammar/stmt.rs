//! Statement and block parsing.

use lua_ir::ast::{
    Block, ElseIfClause, Expr, FuncBody, FuncName, Fragment, PrefixExp, Stmt,
};
use lua_ir::{Name, TokenKind};

use super::Parser;
use crate::ParseError;

impl Parser<'_> {
    /// Parse statements until a block terminator.
    ///
    /// `return` and `break` close the block they appear in; anything after
    /// them belongs to the enclosing construct and will be reported as an
    /// unbalanced-block error there.
    pub(crate) fn parse_block(&mut self) -> Block {
        let mut stmts = Vec::new();
        loop {
            while self.cursor.eat(&TokenKind::Semicolon) {}
            if self.at_block_end() {
                break;
            }
            match self.cursor.current_kind() {
                TokenKind::Return => {
                    match self.parse_return() {
                        Ok(stmt) => stmts.push(stmt),
                        Err(err) => self.recover(err),
                    }
                    break;
                }
                TokenKind::Break => {
                    self.cursor.advance();
                    while self.cursor.eat(&TokenKind::Semicolon) {}
                    stmts.push(Stmt::Break);
                    break;
                }
                _ => match self.parse_statement() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(err) => self.recover(err),
                },
            }
        }
        Block::new(stmts)
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let exprs = if self.at_block_end() || self.cursor.check(&TokenKind::Semicolon) {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        while self.cursor.eat(&TokenKind::Semicolon) {}
        Ok(Stmt::Return(exprs))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => {
                self.cursor.advance();
                Ok(Stmt::Do(self.expect_block_end("'do' block")))
            }
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::Local => self.parse_local(),
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Then)?;
        let then_block = self.parse_block();

        let mut else_ifs = Vec::new();
        let mut else_block = None;
        loop {
            match self.cursor.current_kind() {
                TokenKind::ElseIf => {
                    self.cursor.advance();
                    let cond = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::Then)?;
                    let block = self.parse_block();
                    else_ifs.push(ElseIfClause { cond, block });
                }
                TokenKind::Else => {
                    self.cursor.advance();
                    else_block = Some(self.parse_block());
                    self.cursor.expect(&TokenKind::End)?;
                    break;
                }
                _ => {
                    self.cursor.expect(&TokenKind::End)?;
                    break;
                }
            }
        }

        Ok(Stmt::If {
            cond,
            then_block,
            else_ifs,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let cond = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Do)?;
        let body = self.expect_block_end("'while' block");
        Ok(Stmt::While { cond, body })
    }

    fn parse_repeat(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let body = self.parse_block();
        self.cursor.expect(&TokenKind::Until)?;
        let cond = self.parse_expr()?;
        Ok(Stmt::Repeat { body, cond })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let first = self.cursor.expect_ident()?;
        if self.cursor.eat(&TokenKind::Assign) {
            // Numeric: for i = from, to [, step] do ... end
            let from = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Comma)?;
            let to = self.parse_expr()?;
            let step = if self.cursor.eat(&TokenKind::Comma) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.cursor.expect(&TokenKind::Do)?;
            let body = self.expect_block_end("'for' block");
            return Ok(Stmt::NumericFor {
                var: first,
                from,
                to,
                step,
                body,
            });
        }

        // Generic: for a, b, ... in explist do ... end
        let mut names = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.cursor.expect_ident()?);
        }
        self.cursor.expect(&TokenKind::In)?;
        let exprs = self.parse_expr_list()?;
        self.cursor.expect(&TokenKind::Do)?;
        let body = self.expect_block_end("'for' block");
        Ok(Stmt::GenericFor { names, exprs, body })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let target = self.parse_func_name()?;
        // The implicit `self` parameter of `function t:m()` is added by the
        // evaluator when it builds the closure; the body itself is the same.
        let body = self.parse_func_body()?;
        Ok(Stmt::FunctionDecl { target, body })
    }

    fn parse_func_name(&mut self) -> Result<FuncName, ParseError> {
        let mut path = vec![self.cursor.expect_ident()?];
        while self.cursor.eat(&TokenKind::Dot) {
            path.push(self.cursor.expect_ident()?);
        }
        let method = if self.cursor.eat(&TokenKind::Colon) {
            Some(self.cursor.expect_ident()?)
        } else {
            None
        };
        Ok(FuncName { path, method })
    }

    fn parse_local(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        if self.cursor.eat(&TokenKind::Function) {
            let name = self.cursor.expect_ident()?;
            let body = self.parse_func_body()?;
            return Ok(Stmt::LocalFunction { name, body });
        }

        let mut names = vec![self.cursor.expect_ident()?];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.cursor.expect_ident()?);
        }
        let exprs = if self.cursor.eat(&TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stmt::Local { names, exprs })
    }

    /// A statement that starts with a prefix expression: either a call or
    /// an assignment target list.
    fn parse_expr_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.cursor.current_span();
        let first = self.parse_prefix_exp()?;

        if !self.cursor.check(&TokenKind::Assign) && !self.cursor.check(&TokenKind::Comma) {
            if first.ends_in_call() {
                return Ok(Stmt::Call(first));
            }
            return Err(ParseError::new("syntax error: expected statement", start));
        }

        let mut targets = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            targets.push(self.parse_prefix_exp()?);
        }
        for target in &targets {
            Self::check_assignable(target, start)?;
        }
        self.cursor.expect(&TokenKind::Assign)?;
        let exprs = self.parse_expr_list()?;
        Ok(Stmt::Assign { targets, exprs })
    }

    /// An assignment target is a bare name or a chain ending in a field or
    /// index access; calls and parenthesized values are not assignable.
    fn check_assignable(target: &PrefixExp, span: lua_ir::Span) -> Result<(), ParseError> {
        let ok = match target.fragments.last() {
            Some(Fragment::Field(_) | Fragment::Index(_)) => true,
            Some(Fragment::Call(_) | Fragment::MethodCall { .. }) => false,
            None => matches!(target.base, lua_ir::ast::PrefixBase::Name(_)),
        };
        if ok {
            Ok(())
        } else {
            Err(ParseError::new("cannot assign to this expression", span))
        }
    }

    /// Parse a function body: `( params ) block end`.
    pub(crate) fn parse_func_body(&mut self) -> Result<FuncBody, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;

        let mut params: Vec<Name> = Vec::new();
        let mut is_vararg = false;
        if !self.cursor.check(&TokenKind::RParen) {
            loop {
                if self.cursor.eat(&TokenKind::Ellipsis) {
                    is_vararg = true;
                    break;
                }
                params.push(self.cursor.expect_ident()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;

        let block = self.expect_block_end("function body");
        Ok(FuncBody {
            params,
            is_vararg,
            block: std::rc::Rc::new(block),
        })
    }
}
