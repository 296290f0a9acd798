//! The engine: evaluator state and the embedder-facing API.
//!
//! An [`Engine`] owns everything an evaluation touches: the globals
//! table, the scope chain, the per-type metatables, the call stack, the
//! three byte streams, the filesystem abstraction, and the clock. State
//! persists across [`Engine::eval`] calls, so consecutive evaluations
//! build on one another:
//!
//! ```
//! use lua_eval::Engine;
//!
//! let mut engine = Engine::new();
//! engine.eval("a = 5", "first").unwrap();
//! let values = engine.eval("return a", "second").unwrap();
//! assert_eq!(values[0].display_string(), "5");
//! ```
//!
//! The engine is single-threaded by specification; nothing here is
//! `Send`, and host callbacks run on the evaluator's thread.

mod builder;
mod exec;

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

use lua_ir::{Name, StringInterner};

use crate::clock::Clock;
use crate::control::{Control, Exec};
use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::errors::LuaError;
use crate::fs::ScriptFs;
use crate::io::Streams;
use crate::meta::{EventKeys, Metamethod, TypeMetatables};
use crate::value::{Function, Heap, HostFn, LuaStr, Table, Value};

pub use builder::EngineBuilder;

/// Collector bookkeeping behind the `collectgarbage` stub.
pub(crate) struct GcState {
    pub(crate) running: bool,
    pub(crate) pause: f64,
    pub(crate) step_mul: f64,
}

impl Default for GcState {
    fn default() -> Self {
        GcState {
            running: true,
            pause: 200.0,
            step_mul: 100.0,
        }
    }
}

/// A complete interpreter instance.
pub struct Engine {
    pub(crate) interner: StringInterner,
    /// Pre-interned name of the implicit method receiver.
    pub(crate) self_name: Name,
    pub(crate) globals: Heap<Table>,
    pub(crate) env: Environment,
    pub(crate) type_metatables: TypeMetatables,
    pub(crate) events: EventKeys,
    pub(crate) call_stack: CallStack,
    /// Trailing arguments of each live vararg call, innermost last.
    /// `None` entries belong to non-vararg functions, where `...` is an
    /// error.
    pub(crate) varargs: Vec<Option<Vec<Value>>>,
    pub(crate) streams: Streams,
    pub(crate) fs: ScriptFs,
    pub(crate) clock: Clock,
    pub(crate) gc: GcState,
    /// Cache of `Name` → string-value conversions for identifier keys.
    name_values: RefCell<FxHashMap<Name, Value>>,
}

/// Failure surfaced to the embedder by [`Engine::eval`].
#[derive(Debug)]
pub enum EngineError {
    /// The scanner or parser rejected the source; evaluation never ran.
    Syntax {
        chunk: String,
        messages: Vec<String>,
    },
    /// An error unwind escaped the top-level chunk.
    Runtime(LuaError),
    /// A script file could not be read.
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Syntax { chunk, messages } => {
                write!(f, "errors occurred while parsing {chunk}")?;
                for message in messages {
                    write!(f, "\n\t{message}")?;
                }
                Ok(())
            }
            EngineError::Runtime(err) => f.write_str(&err.message_display()),
            EngineError::Io { path, source } => write!(f, "open {path}: {source}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Engine {
    /// A ready-to-use engine with default streams, filesystem, and
    /// limits.
    pub fn new() -> Self {
        EngineBuilder::default().build()
    }

    /// Configure streams, filesystem, clock, or the call-stack bound.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The globals table `_G`.
    pub fn globals(&self) -> Heap<Table> {
        self.globals.clone()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Evaluate source text against the engine's live state.
    ///
    /// Returns the chunk's return values. Parse errors leave the engine
    /// state untouched.
    pub fn eval(&mut self, source: &str, chunk_name: &str) -> Result<Vec<Value>, EngineError> {
        let (tokens, lex_errors) = lua_lexer::lex(source, &self.interner);
        if !lex_errors.is_empty() {
            return Err(EngineError::Syntax {
                chunk: chunk_name.to_string(),
                messages: lex_errors.iter().map(|e| e.render(source)).collect(),
            });
        }
        let chunk = lua_parse::parse(&tokens, chunk_name).map_err(|errors| {
            EngineError::Syntax {
                chunk: chunk_name.to_string(),
                messages: errors.iter().map(|e| e.render(source)).collect(),
            }
        })?;
        tracing::debug!(chunk = chunk_name, "evaluating chunk");
        self.run_chunk(&chunk).map_err(EngineError::Runtime)
    }

    /// Evaluate a script file resolved through the filesystem
    /// abstraction.
    pub fn eval_file(&mut self, path: &str) -> Result<Vec<Value>, EngineError> {
        let bytes = self.fs.read(path).map_err(|source| EngineError::Io {
            path: path.to_string(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        self.eval(&source, path)
    }

    /// Run a parsed chunk as an anonymous vararg call.
    pub(crate) fn run_chunk(&mut self, chunk: &lua_ir::ast::Chunk) -> Result<Vec<Value>, LuaError> {
        let function = self.chunk_function(&chunk.block);
        match self.call_value(function, Vec::new()) {
            Ok(values) => Ok(values),
            Err(Control::Error(err)) => Err(err),
            Err(Control::Return(values)) => Ok(values),
            Err(Control::Break) => Err(LuaError::runtime("break outside a loop")),
        }
    }

    /// Evaluate a nested chunk (e.g. `dofile`) inside the current
    /// evaluation, sharing the call stack and globals.
    pub(crate) fn eval_nested(&mut self, source: &str, chunk_name: &str) -> Exec<Vec<Value>> {
        let (tokens, lex_errors) = lua_lexer::lex(source, &self.interner);
        if !lex_errors.is_empty() {
            let rendered: Vec<String> = lex_errors.iter().map(|e| e.render(source)).collect();
            return self.fail(LuaError::runtime(format!(
                "errors occurred while parsing {chunk_name}: {}",
                rendered.join("; ")
            )));
        }
        match lua_parse::parse(&tokens, chunk_name) {
            Ok(chunk) => {
                let function = self.chunk_function(&chunk.block);
                self.call_value(function, Vec::new())
            }
            Err(errors) => {
                let rendered: Vec<String> = errors.iter().map(|e| e.render(source)).collect();
                self.fail(LuaError::runtime(format!(
                    "errors occurred while parsing {chunk_name}: {}",
                    rendered.join("; ")
                )))
            }
        }
    }

    fn chunk_function(&self, block: &std::rc::Rc<lua_ir::ast::Block>) -> Value {
        Value::function(Function::lua(
            "<chunk>",
            crate::value::LuaClosure {
                params: Vec::new(),
                is_vararg: true,
                body: std::rc::Rc::clone(block),
                upvalues: Vec::new(),
            },
        ))
    }

    /// The string value for an interned identifier, cached per name.
    pub(crate) fn name_value(&self, name: Name) -> Value {
        if let Some(value) = self.name_values.borrow().get(&name) {
            return value.clone();
        }
        let value = Value::string(self.interner.lookup(name));
        self.name_values.borrow_mut().insert(name, value.clone());
        value
    }

    /// Resolve a name through the scope chain, falling back to `_G`.
    pub(crate) fn resolve_name(&self, name: Name) -> Value {
        if let Some(value) = self.env.lookup(name) {
            return value;
        }
        let key = self.name_value(name);
        self.globals.borrow().raw_get(&key)
    }

    /// Write a global by identifier.
    pub(crate) fn set_global_name(&mut self, name: Name, value: Value) {
        let key = self.name_value(name);
        // Identifier keys are never nil or NaN.
        let _ = self.globals.borrow_mut().raw_set(key, value);
    }

    /// Write a global by string key.
    pub(crate) fn set_global_str(&mut self, key: &str, value: Value) {
        let _ = self.globals.borrow_mut().raw_set(Value::string(key), value);
    }

    /// Register a host function under a global name.
    pub(crate) fn register_host(&mut self, name: &'static str, f: HostFn) {
        let function = Value::function(Function::host(name, f));
        self.set_global_str(name, function);
    }

    /// The metatable governing a value: per-instance for tables,
    /// per-type for everything else.
    pub(crate) fn metatable_of(&self, value: &Value) -> Option<Heap<Table>> {
        match value {
            Value::Table(t) => t.borrow().metatable(),
            other => self.type_metatables.for_tag(other.type_tag()),
        }
    }

    /// Raw metamethod lookup; `Nil` when any link is absent.
    pub(crate) fn metamethod(&self, value: &Value, mm: Metamethod) -> Value {
        match self.metatable_of(value) {
            Some(mt) => mt.borrow().raw_get(self.events.key(mm)),
            None => Value::Nil,
        }
    }

    /// Attach the raise-site traceback and wrap into an unwind.
    pub(crate) fn error(&self, err: LuaError) -> Control {
        Control::Error(err.with_traceback(self.call_stack.snapshot()))
    }

    /// Shorthand for raising from an `Exec` context.
    pub(crate) fn fail<T>(&self, err: LuaError) -> Exec<T> {
        Err(self.error(err))
    }

    /// `tostring` semantics: `__tostring` when present, else the plain
    /// display string.
    pub(crate) fn tostring_value(&mut self, value: &Value) -> Exec<LuaStr> {
        let handler = self.metamethod(value, Metamethod::Tostring);
        if handler.is_nil() {
            return Ok(LuaStr::from(value.display_string()));
        }
        let results = self.call_value(handler, vec![value.clone()])?;
        match results.into_iter().next() {
            Some(Value::Str(s)) => Ok(s),
            _ => self.fail(LuaError::runtime("'__tostring' must return a string")),
        }
    }

    /// Estimate live heap usage in KiB by walking everything reachable
    /// from `_G`. Cycle-safe: objects are visited once by identity.
    pub(crate) fn heap_estimate_kb(&self) -> f64 {
        use rustc_hash::FxHashSet;

        const TABLE_OVERHEAD: usize = 56;
        const ENTRY_OVERHEAD: usize = 32;
        const FUNCTION_OVERHEAD: usize = 48;
        const STRING_OVERHEAD: usize = 24;

        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut pending: Vec<Value> = vec![Value::Table(self.globals.clone())];
        let mut bytes = 0usize;

        while let Some(value) = pending.pop() {
            match value {
                Value::Str(s) => bytes += STRING_OVERHEAD + s.len(),
                Value::Table(t) => {
                    if !visited.insert(t.as_ptr() as usize) {
                        continue;
                    }
                    bytes += TABLE_OVERHEAD;
                    let table = t.borrow();
                    for (key, entry) in table.iter() {
                        bytes += ENTRY_OVERHEAD;
                        pending.push(key.clone());
                        pending.push(entry.clone());
                    }
                    if let Some(mt) = table.metatable() {
                        pending.push(Value::Table(mt));
                    }
                }
                Value::Function(f) => {
                    if !visited.insert(f.as_ptr() as usize) {
                        continue;
                    }
                    bytes += FUNCTION_OVERHEAD;
                    if let crate::value::FunctionKind::Lua(closure) = &f.borrow().kind {
                        for frame in &closure.upvalues {
                            if !visited.insert(frame.as_ptr() as usize) {
                                continue;
                            }
                            for entry in frame.borrow().values() {
                                bytes += ENTRY_OVERHEAD;
                                pending.push(entry.clone());
                            }
                        }
                    }
                }
                Value::Nil | Value::Boolean(_) | Value::Number(_) => {}
            }
        }

        bytes as f64 / 1024.0
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
