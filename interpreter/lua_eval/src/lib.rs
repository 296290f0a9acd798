//! Runtime core of the interpreter.
//!
//! # Architecture
//!
//! - [`value`] — the tagged [`Value`] variant, tables, functions, byte
//!   strings, shared heap handles
//! - `environment` — the scope chain; shared frames so closures capture
//!   lexically
//! - [`diagnostics`] — the bounded call stack and traceback capture
//! - [`meta`] — metatable registry and metamethod lookup
//! - `operators` / `unary_operators` — primitive rules with metamethod
//!   fallback
//! - [`control`] — `return`/`break`/error unwinds as the `Err` side of
//!   every evaluation result
//! - [`interpreter`] — the [`Engine`]: state, builder, and the
//!   recursive statement/expression walk
//! - `stdlib` — the built-in globals
//! - [`io`] / [`fs`] / [`clock`] — embedder-provided streams,
//!   filesystem, and clock
//!
//! The scanner and parser live in their own crates (`lua_lexer`,
//! `lua_parse`); this crate consumes their output through `lua_ir`.

pub mod clock;
pub mod control;
pub mod diagnostics;
mod environment;
pub mod errors;
pub mod fs;
pub mod interpreter;
pub mod io;
pub mod meta;
mod operators;
mod stack;
mod stdlib;
mod unary_operators;
pub mod value;

pub use clock::Clock;
pub use control::{Control, Exec};
pub use errors::LuaError;
pub use fs::ScriptFs;
pub use interpreter::{Engine, EngineBuilder, EngineError};
pub use io::{InputSource, OutputSink, SharedBuffer, Streams};
pub use meta::Metamethod;
pub use value::{Function, Heap, HostFn, LuaStr, Table, TypeTag, Value};
