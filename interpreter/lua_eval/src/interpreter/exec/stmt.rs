//! Statement execution.
//!
//! Scope bookkeeping is paired on every path: helpers enter a frame,
//! run, and leave before propagating whatever came out — normal result
//! or unwind alike.

use lua_ir::ast::{Block, Expr, Fragment, FuncName, PrefixBase, PrefixExp, Stmt};
use lua_ir::Name;

use crate::control::{Control, Exec};
use crate::errors::LuaError;
use crate::interpreter::Engine;
use crate::value::Value;

impl Engine {
    /// Execute a statement sequence in the current scope.
    pub(crate) fn exec_statements(&mut self, stmts: &[Stmt]) -> Exec<()> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Execute a block inside its own scope frame.
    fn exec_block_scoped(&mut self, block: &Block) -> Exec<()> {
        self.env.enter();
        let result = self.exec_statements(&block.stmts);
        self.env.leave();
        result
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Assign { targets, exprs } => self.exec_assign(targets, exprs),
            Stmt::Local { names, exprs } => self.exec_local(names, exprs),
            Stmt::Call(prefix) => {
                self.eval_prefix(prefix)?;
                Ok(())
            }
            Stmt::FunctionDecl { target, body } => self.exec_function_decl(target, body),
            Stmt::LocalFunction { name, body } => {
                // Bind the name first so the body can call itself.
                self.env.assign_local(*name, Value::Nil);
                let function =
                    self.make_function(self.interner.lookup(*name), body, false);
                self.env.assign_local(*name, function);
                Ok(())
            }
            Stmt::If {
                cond,
                then_block,
                else_ifs,
                else_block,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    return self.exec_block_scoped(then_block);
                }
                for clause in else_ifs {
                    if self.eval_expr(&clause.cond)?.is_truthy() {
                        return self.exec_block_scoped(&clause.block);
                    }
                }
                match else_block {
                    Some(block) => self.exec_block_scoped(block),
                    None => Ok(()),
                }
            }
            Stmt::While { cond, body } => self.exec_while(cond, body),
            Stmt::Repeat { body, cond } => self.exec_repeat(body, cond),
            Stmt::NumericFor {
                var,
                from,
                to,
                step,
                body,
            } => self.exec_numeric_for(*var, from, to, step.as_ref(), body),
            Stmt::GenericFor { names, exprs, body } => {
                self.exec_generic_for(names, exprs, body)
            }
            Stmt::Do(block) => self.exec_block_scoped(block),
            Stmt::Return(exprs) => {
                let values = self.eval_expr_list(exprs)?;
                Err(Control::Return(values))
            }
            Stmt::Break => Err(Control::Break),
        }
    }

    /// `v1, ..., vn = e1, ..., em`: the whole expression list evaluates
    /// first, then the targets assign left-to-right.
    fn exec_assign(&mut self, targets: &[PrefixExp], exprs: &[Expr]) -> Exec<()> {
        let mut values = self.eval_expr_list(exprs)?;
        values.resize(targets.len(), Value::Nil);
        for (target, value) in targets.iter().zip(values) {
            self.assign_target(target, value)?;
        }
        Ok(())
    }

    fn assign_target(&mut self, target: &PrefixExp, value: Value) -> Exec<()> {
        // Bare name: the visible-scope rule.
        if target.fragments.is_empty() {
            if let PrefixBase::Name(name) = target.base {
                self.assign_visible(name, value);
                return Ok(());
            }
        }

        // Chained target: resolve everything but the last fragment, then
        // new-index through the final one.
        let (last, init) = match target.fragments.split_last() {
            Some(split) => split,
            None => return self.fail(LuaError::runtime("cannot assign to this expression")),
        };
        let object_prefix = PrefixExp {
            base: target.base.clone(),
            fragments: init.to_vec(),
        };
        let object = {
            let values = self.eval_prefix(&object_prefix)?;
            values.into_iter().next().unwrap_or(Value::Nil)
        };
        let key = match last {
            Fragment::Field(name) => self.name_value(*name),
            Fragment::Index(expr) => self.eval_expr(expr)?,
            Fragment::Call(_) | Fragment::MethodCall { .. } => {
                return self.fail(LuaError::runtime("cannot assign to this expression"))
            }
        };
        self.new_index(&object, key, value)
    }

    /// The visible-scope rule: write where the name already lives, else
    /// to `_G`.
    pub(crate) fn assign_visible(&mut self, name: Name, value: Value) {
        if !self.env.assign_existing(name, value.clone()) {
            self.set_global_name(name, value);
        }
    }

    fn exec_local(&mut self, names: &[Name], exprs: &[Expr]) -> Exec<()> {
        let mut values = self.eval_expr_list(exprs)?;
        values.resize(names.len(), Value::Nil);
        for (name, value) in names.iter().zip(values) {
            self.env.assign_local(*name, value);
        }
        Ok(())
    }

    /// `function a.b.c() ...` / `function t:m() ...`.
    ///
    /// A plain `function f()` binds `f` in `_G`; dotted and method forms
    /// new-index into the resolved owner.
    fn exec_function_decl(&mut self, target: &FuncName, body: &lua_ir::ast::FuncBody) -> Exec<()> {
        let display = self.function_display_name(target);
        let function = self.make_function(display, body, target.method.is_some());

        if target.path.len() == 1 && target.method.is_none() {
            self.set_global_name(target.path[0], function);
            return Ok(());
        }

        let mut owner = self.resolve_name(target.path[0]);
        let middle_end = if target.method.is_some() {
            target.path.len()
        } else {
            target.path.len() - 1
        };
        for segment in &target.path[1..middle_end] {
            let key = self.name_value(*segment);
            owner = self.index(&owner, &key)?;
        }
        let last = target.method.unwrap_or_else(|| {
            // No method part, so the path has at least the final segment.
            target.path[target.path.len() - 1]
        });
        let key = self.name_value(last);
        self.new_index(&owner, key, function)
    }

    fn function_display_name(&self, target: &FuncName) -> String {
        let mut name = String::new();
        for (i, segment) in target.path.iter().enumerate() {
            if i > 0 {
                name.push('.');
            }
            name.push_str(self.interner.lookup(*segment));
        }
        if let Some(method) = target.method {
            name.push(':');
            name.push_str(self.interner.lookup(method));
        }
        name
    }

    fn exec_while(&mut self, cond: &Expr, body: &Block) -> Exec<()> {
        loop {
            if !self.eval_expr(cond)?.is_truthy() {
                return Ok(());
            }
            match self.exec_block_scoped(body) {
                Ok(()) => {}
                Err(Control::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
    }

    /// `repeat body until cond` runs the body at least once; the
    /// condition is evaluated inside the body's scope so it sees the
    /// body's locals.
    fn exec_repeat(&mut self, body: &Block, cond: &Expr) -> Exec<()> {
        loop {
            self.env.enter();
            let iteration = match self.exec_statements(&body.stmts) {
                Ok(()) => self.eval_expr(cond).map(|v| v.is_truthy()),
                Err(Control::Break) => Ok(true),
                Err(other) => Err(other),
            };
            self.env.leave();
            if iteration? {
                return Ok(());
            }
        }
    }

    fn exec_numeric_for(
        &mut self,
        var: Name,
        from: &Expr,
        to: &Expr,
        step: Option<&Expr>,
        body: &Block,
    ) -> Exec<()> {
        let from = self.numeric_for_operand(from, "initial value")?;
        let to = self.numeric_for_operand(to, "limit")?;
        let step = match step {
            Some(expr) => self.numeric_for_operand(expr, "step")?,
            None => 1.0,
        };
        if step == 0.0 {
            return self.fail(LuaError::runtime("'for' step is zero"));
        }

        let mut i = from;
        loop {
            if (step > 0.0 && i > to) || (step < 0.0 && i < to) {
                return Ok(());
            }
            self.env.enter();
            self.env.assign_local(var, Value::Number(i));
            let result = self.exec_statements(&body.stmts);
            self.env.leave();
            match result {
                Ok(()) => {}
                Err(Control::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
            i += step;
        }
    }

    fn numeric_for_operand(&mut self, expr: &Expr, what: &str) -> Exec<f64> {
        let value = self.eval_expr(expr)?;
        match value.coerce_number() {
            Some(n) => Ok(n),
            None => self.fail(LuaError::runtime(format!(
                "'for' {what} must be a number"
            ))),
        }
    }

    /// Generic `for`: call `iter(state, ctrl)` until the first result is
    /// nil, rebinding `ctrl` to that first result between iterations.
    fn exec_generic_for(&mut self, names: &[Name], exprs: &[Expr], body: &Block) -> Exec<()> {
        let mut setup = self.eval_expr_list(exprs)?;
        setup.resize(3, Value::Nil);
        let state = setup[1].clone();
        let iter = setup[0].clone();
        let mut control = setup[2].clone();

        loop {
            let results = self.call_value(iter.clone(), vec![state.clone(), control.clone()])?;
            let first = results.first().cloned().unwrap_or(Value::Nil);
            if first.is_nil() {
                return Ok(());
            }
            control = first;

            self.env.enter();
            for (i, name) in names.iter().enumerate() {
                let value = results.get(i).cloned().unwrap_or(Value::Nil);
                self.env.assign_local(*name, value);
            }
            let result = self.exec_statements(&body.stmts);
            self.env.leave();
            match result {
                Ok(()) => {}
                Err(Control::Break) => return Ok(()),
                Err(other) => return Err(other),
            }
        }
    }
}
