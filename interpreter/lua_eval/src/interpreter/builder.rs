//! Engine construction.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use lua_ir::StringInterner;

use crate::clock::Clock;
use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::fs::ScriptFs;
use crate::io::{InputSource, OutputSink, Streams};
use crate::meta::{EventKeys, TypeMetatables};
use crate::value::{Heap, Table, Value};

use super::{Engine, GcState};

/// Default recursion bound; the conventional small limit of the original
/// runtime. Embedders raise it through [`EngineBuilder::max_call_depth`].
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Builder for [`Engine`] instances.
///
/// ```
/// use lua_eval::{Engine, OutputSink};
///
/// let (stdout, captured) = OutputSink::buffer();
/// let mut engine = Engine::builder().stdout(stdout).build();
/// engine.eval("print('hi')", "demo").unwrap();
/// assert_eq!(captured.contents_string(), "hi\n");
/// ```
pub struct EngineBuilder {
    stdin: InputSource,
    stdout: OutputSink,
    stderr: OutputSink,
    fs: ScriptFs,
    clock: Clock,
    max_call_depth: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        EngineBuilder {
            stdin: InputSource::Stdin,
            stdout: OutputSink::Stdout,
            stderr: OutputSink::Stderr,
            fs: ScriptFs::os("."),
            clock: Clock::System,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl EngineBuilder {
    pub fn stdin(mut self, stdin: InputSource) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn stdout(mut self, stdout: OutputSink) -> Self {
        self.stdout = stdout;
        self
    }

    pub fn stderr(mut self, stderr: OutputSink) -> Self {
        self.stderr = stderr;
        self
    }

    pub fn fs(mut self, fs: ScriptFs) -> Self {
        self.fs = fs;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Bound the call stack. Recursion reaching the bound raises a
    /// stack-overflow error instead of exhausting the host.
    pub fn max_call_depth(mut self, max: usize) -> Self {
        self.max_call_depth = max;
        self
    }

    pub fn build(self) -> Engine {
        let interner = StringInterner::new();
        let self_name = interner.intern("self");
        let mut engine = Engine {
            interner,
            self_name,
            globals: Heap::new(Table::new()),
            env: Environment::new(),
            type_metatables: TypeMetatables::new(),
            events: EventKeys::new(),
            call_stack: CallStack::new(Some(self.max_call_depth)),
            varargs: Vec::new(),
            streams: Streams {
                stdin: self.stdin,
                stdout: self.stdout,
                stderr: self.stderr,
            },
            fs: self.fs,
            clock: self.clock,
            gc: GcState::default(),
            name_values: RefCell::new(FxHashMap::default()),
        };
        crate::stdlib::register(&mut engine);
        let globals = engine.globals();
        engine.set_global_str("_G", Value::Table(globals));
        engine
    }
}
