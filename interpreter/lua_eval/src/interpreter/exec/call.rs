//! Call protocols and closure creation.

use lua_ir::ast::FuncBody;

use crate::control::{Control, Exec};
use crate::diagnostics::CallFrame;
use crate::errors::{self, LuaError};
use crate::interpreter::Engine;
use crate::meta::Metamethod;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Function, FunctionKind, Heap, LuaClosure, Value};

impl Engine {
    /// Call any value: functions directly, everything else through
    /// `__call`.
    pub(crate) fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Exec<Vec<Value>> {
        match callee {
            Value::Function(f) => self.call_function(&f, args),
            other => {
                let handler = self.metamethod(&other, Metamethod::Call);
                match handler {
                    Value::Function(f) => {
                        let mut full = Vec::with_capacity(args.len() + 1);
                        full.push(other);
                        full.extend(args);
                        self.call_function(&f, full)
                    }
                    _ => self.fail(errors::call_error(other.type_name())),
                }
            }
        }
    }

    /// The call protocol shared by host and interpreted functions:
    /// push a named frame (stack overflow checked before the push
    /// completes), dispatch, pop on every exit path, and turn a `Return`
    /// unwind into the call's result.
    pub(crate) fn call_function(
        &mut self,
        handle: &Heap<Function>,
        args: Vec<Value>,
    ) -> Exec<Vec<Value>> {
        let (name, kind) = {
            let function = handle.borrow();
            (function.name().to_string(), function.kind.clone())
        };
        if !self.call_stack.push(CallFrame { name: name.clone() }) {
            return self.fail(errors::stack_overflow(&name));
        }
        tracing::trace!(name = %name, depth = self.call_stack.depth(), "call");

        let result = match kind {
            FunctionKind::Host(f) => f(self, &args),
            FunctionKind::Lua(closure) => self.call_closure(&closure, args),
        };
        self.call_stack.pop();

        match result {
            Err(Control::Return(values)) => Ok(values),
            Err(Control::Break) => self.fail(LuaError::runtime("break outside a loop")),
            other => other,
        }
    }

    /// Run an interpreted body: install the captured chain plus a fresh
    /// frame, bind parameters, execute. Extra arguments feed `...` in
    /// vararg functions and are discarded otherwise; missing parameters
    /// bind to `nil`.
    fn call_closure(&mut self, closure: &LuaClosure, args: Vec<Value>) -> Exec<Vec<Value>> {
        ensure_sufficient_stack(|| {
            let saved = self.env.swap_chain(closure.upvalues.clone());
            self.env.enter();
            for (i, param) in closure.params.iter().enumerate() {
                let value = args.get(i).cloned().unwrap_or(Value::Nil);
                self.env.assign_local(*param, value);
            }
            let varargs = closure
                .is_vararg
                .then(|| args.get(closure.params.len()..).unwrap_or(&[]).to_vec());
            self.varargs.push(varargs);

            let result = self.exec_statements(&closure.body.stmts);

            self.varargs.pop();
            self.env.leave();
            self.env.swap_chain(saved);

            result.map(|()| Vec::new())
        })
    }

    /// Build a function value from a body, capturing the live scope
    /// chain. `prepend_self` adds the implicit receiver of method
    /// declarations.
    pub(crate) fn make_function(
        &self,
        name: impl Into<String>,
        body: &FuncBody,
        prepend_self: bool,
    ) -> Value {
        let mut params = body.params.clone();
        if prepend_self {
            params.insert(0, self.self_name);
        }
        Value::function(Function::lua(
            name,
            LuaClosure {
                params,
                is_vararg: body.is_vararg,
                body: std::rc::Rc::clone(&body.block),
                upvalues: self.env.capture_chain(),
            },
        ))
    }
}
