//! Function values: host built-ins and interpreted closures.

use std::rc::Rc;

use lua_ir::ast::Block;
use lua_ir::Name;

use crate::control::Exec;
use crate::environment::SharedFrame;
use crate::interpreter::Engine;
use crate::value::Value;

/// A host-implemented callable: stdlib entries and metamethod bridges.
pub type HostFn = fn(&mut Engine, &[Value]) -> Exec<Vec<Value>>;

/// A callable value. The display name is used in tracebacks and error
/// messages only; it never affects dispatch.
pub struct Function {
    name: String,
    pub(crate) kind: FunctionKind,
}

#[derive(Clone)]
pub(crate) enum FunctionKind {
    Host(HostFn),
    Lua(LuaClosure),
}

/// An interpreted function: parameters, body, and the scope chain captured
/// at creation time.
///
/// Captured frames are shared, not copied: a closure mutating an upvalue
/// is visible to every closure over the same frame, and to the defining
/// scope while it is still live.
#[derive(Clone)]
pub(crate) struct LuaClosure {
    pub(crate) params: Vec<Name>,
    pub(crate) is_vararg: bool,
    pub(crate) body: Rc<Block>,
    pub(crate) upvalues: Vec<SharedFrame>,
}

impl Function {
    /// Create a host function.
    pub(crate) fn host(name: impl Into<String>, f: HostFn) -> Self {
        Function {
            name: name.into(),
            kind: FunctionKind::Host(f),
        }
    }

    /// Create an interpreted function.
    pub(crate) fn lua(name: impl Into<String>, closure: LuaClosure) -> Self {
        Function {
            name: name.into(),
            kind: FunctionKind::Lua(closure),
        }
    }

    /// Display name, e.g. `print` or `<anonymous>`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function({})", self.name)
    }
}
