//! Expression evaluation, the indexing protocols, and multi-value
//! adjustment.
//!
//! Two entry points: [`Engine::eval_expr`] adjusts to exactly one value,
//! [`Engine::eval_expr_multi`] lets calls and `...` contribute their full
//! sequence. Expression lists expand only their final element; every
//! other position truncates to one value.

use lua_ir::ast::{BinaryOp, Expr, Fragment, PrefixBase, PrefixExp, TableField};

use crate::control::Exec;
use crate::errors::{self, LuaError};
use crate::interpreter::Engine;
use crate::meta::Metamethod;
use crate::value::{LuaStr, Table, Value};

/// Bound on `__index`/`__newindex` chains; a longer chain is assumed to
/// be a loop.
const META_CHAIN_LIMIT: usize = 100;

impl Engine {
    /// Evaluate to exactly one value.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::True => Ok(Value::Boolean(true)),
            Expr::False => Ok(Value::Boolean(false)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(bytes) => Ok(Value::Str(LuaStr::from(bytes.as_ref()))),
            Expr::Ellipsis => {
                let varargs = self.current_varargs()?;
                Ok(varargs.first().cloned().unwrap_or(Value::Nil))
            }
            Expr::Prefix(prefix) => {
                let values = self.eval_prefix(prefix)?;
                Ok(values.into_iter().next().unwrap_or(Value::Nil))
            }
            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    let left = self.eval_expr(lhs)?;
                    if left.is_truthy() {
                        self.eval_expr(rhs)
                    } else {
                        Ok(left)
                    }
                }
                BinaryOp::Or => {
                    let left = self.eval_expr(lhs)?;
                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        self.eval_expr(rhs)
                    }
                }
                eager => {
                    let left = self.eval_expr(lhs)?;
                    let right = self.eval_expr(rhs)?;
                    self.eval_binary_op(*eager, left, right)
                }
            },
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.eval_unary_op(*op, value)
            }
            Expr::Function(body) => Ok(self.make_function("<anonymous>", body, false)),
            Expr::Table(fields) => self.eval_table_constructor(fields),
        }
    }

    /// Evaluate with multi-value results preserved. Only calls and `...`
    /// produce more (or fewer) than one value.
    pub(crate) fn eval_expr_multi(&mut self, expr: &Expr) -> Exec<Vec<Value>> {
        match expr {
            Expr::Ellipsis => self.current_varargs(),
            Expr::Prefix(prefix) => self.eval_prefix(prefix),
            other => Ok(vec![self.eval_expr(other)?]),
        }
    }

    /// Evaluate an expression list left-to-right into a flat sequence:
    /// every element adjusts to one value except the last, which
    /// contributes its whole tail.
    pub(crate) fn eval_expr_list(&mut self, exprs: &[Expr]) -> Exec<Vec<Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        if let Some((last, init)) = exprs.split_last() {
            for expr in init {
                values.push(self.eval_expr(expr)?);
            }
            values.extend(self.eval_expr_multi(last)?);
        }
        Ok(values)
    }

    /// Walk a prefix chain. The result is multi-valued only when the
    /// final fragment is a call.
    pub(crate) fn eval_prefix(&mut self, prefix: &PrefixExp) -> Exec<Vec<Value>> {
        let mut current = match &prefix.base {
            PrefixBase::Name(name) => self.resolve_name(*name),
            PrefixBase::Paren(inner) => self.eval_expr(inner)?,
        };

        let count = prefix.fragments.len();
        for (i, fragment) in prefix.fragments.iter().enumerate() {
            let is_last = i + 1 == count;
            match fragment {
                Fragment::Field(name) => {
                    let key = self.name_value(*name);
                    current = self.index(&current, &key)?;
                }
                Fragment::Index(key_expr) => {
                    let key = self.eval_expr(key_expr)?;
                    current = self.index(&current, &key)?;
                }
                Fragment::Call(args) => {
                    let argv = self.eval_expr_list(args)?;
                    let results = self.call_value(current, argv)?;
                    if is_last {
                        return Ok(results);
                    }
                    current = results.into_iter().next().unwrap_or(Value::Nil);
                }
                Fragment::MethodCall { name, args } => {
                    let key = self.name_value(*name);
                    let method = self.index(&current, &key)?;
                    let mut argv = Vec::with_capacity(args.len() + 1);
                    argv.push(current);
                    argv.extend(self.eval_expr_list(args)?);
                    let results = self.call_value(method, argv)?;
                    if is_last {
                        return Ok(results);
                    }
                    current = results.into_iter().next().unwrap_or(Value::Nil);
                }
            }
        }
        Ok(vec![current])
    }

    /// The index protocol: raw hit, else `__index` function or table,
    /// chained until something answers.
    pub(crate) fn index(&mut self, target: &Value, key: &Value) -> Exec<Value> {
        let mut current = target.clone();
        for _ in 0..META_CHAIN_LIMIT {
            if let Value::Table(t) = &current {
                let raw = t.borrow().raw_get(key);
                if !raw.is_nil() {
                    return Ok(raw);
                }
            }
            let handler = self.metamethod(&current, Metamethod::Index);
            match handler {
                Value::Nil => {
                    return if matches!(current, Value::Table(_)) {
                        Ok(Value::Nil)
                    } else {
                        self.fail(errors::index_error(current.type_name()))
                    };
                }
                Value::Function(f) => {
                    let results = self.call_function(&f, vec![current, key.clone()])?;
                    return Ok(results.into_iter().next().unwrap_or(Value::Nil));
                }
                other => current = other,
            }
        }
        self.fail(LuaError::runtime("'__index' chain too long; possible loop"))
    }

    /// The new-index protocol: write raw when the key is present or no
    /// `__newindex` applies; otherwise defer to the handler.
    pub(crate) fn new_index(&mut self, target: &Value, key: Value, value: Value) -> Exec<()> {
        let mut current = target.clone();
        for _ in 0..META_CHAIN_LIMIT {
            if let Value::Table(t) = &current {
                let present = !t.borrow().raw_get(&key).is_nil();
                if present {
                    return self.raw_set_checked(t.clone(), key, value);
                }
                let handler = self.metamethod(&current, Metamethod::NewIndex);
                match handler {
                    Value::Nil => return self.raw_set_checked(t.clone(), key, value),
                    Value::Function(f) => {
                        self.call_function(&f, vec![current, key, value])?;
                        return Ok(());
                    }
                    other => current = other,
                }
            } else {
                let handler = self.metamethod(&current, Metamethod::NewIndex);
                match handler {
                    Value::Nil => {
                        return self.fail(errors::index_error(current.type_name()));
                    }
                    Value::Function(f) => {
                        self.call_function(&f, vec![current, key, value])?;
                        return Ok(());
                    }
                    other => current = other,
                }
            }
        }
        self.fail(LuaError::runtime(
            "'__newindex' chain too long; possible loop",
        ))
    }

    pub(crate) fn raw_set_checked(
        &self,
        table: crate::value::Heap<Table>,
        key: Value,
        value: Value,
    ) -> Exec<()> {
        let result = table.borrow_mut().raw_set(key, value);
        result.map_err(|err| self.error(err.into()))
    }

    fn eval_table_constructor(&mut self, fields: &[TableField]) -> Exec<Value> {
        let handle = crate::value::Heap::new(Table::new());
        let mut next_index = 1.0f64;
        let count = fields.len();
        for (i, field) in fields.iter().enumerate() {
            match field {
                TableField::Positional(expr) => {
                    let is_last = i + 1 == count;
                    if is_last && is_multi_valued(expr) {
                        for value in self.eval_expr_multi(expr)? {
                            self.raw_set_checked(
                                handle.clone(),
                                Value::Number(next_index),
                                value,
                            )?;
                            next_index += 1.0;
                        }
                    } else {
                        let value = self.eval_expr(expr)?;
                        self.raw_set_checked(handle.clone(), Value::Number(next_index), value)?;
                        next_index += 1.0;
                    }
                }
                TableField::Named { key, value } => {
                    let key = self.name_value(*key);
                    let value = self.eval_expr(value)?;
                    self.raw_set_checked(handle.clone(), key, value)?;
                }
                TableField::Keyed { key, value } => {
                    let key = self.eval_expr(key)?;
                    let value = self.eval_expr(value)?;
                    self.raw_set_checked(handle.clone(), key, value)?;
                }
            }
        }
        Ok(Value::Table(handle))
    }

    /// The trailing arguments of the enclosing vararg function.
    fn current_varargs(&self) -> Exec<Vec<Value>> {
        match self.varargs.last() {
            Some(Some(values)) => Ok(values.clone()),
            _ => self.fail(LuaError::runtime(
                "cannot use '...' outside a vararg function",
            )),
        }
    }
}

/// Whether an expression can produce a multi-value sequence.
fn is_multi_valued(expr: &Expr) -> bool {
    match expr {
        Expr::Ellipsis => true,
        Expr::Prefix(prefix) => prefix.ends_in_call(),
        _ => false,
    }
}
