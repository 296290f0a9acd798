//! Non-local control transfers.
//!
//! `return`, `break`, and runtime errors all unwind through the same
//! channel: the `Err` side of [`Exec`]. Every evaluator function
//! propagates unwinds with `?`; the construct that may catch a given kind
//! matches on it explicitly:
//!
//! - function boundaries catch [`Control::Return`]
//! - loops catch [`Control::Break`]
//! - `pcall` catches [`Control::Error`] — and only that
//!
//! Anything a frame does not catch passes through unchanged.

use crate::errors::LuaError;
use crate::value::Value;

/// An in-flight unwind.
#[derive(Debug)]
pub enum Control {
    /// `return e1, ..., en` heading for the nearest function boundary.
    Return(Vec<Value>),
    /// `break` heading for the nearest enclosing loop.
    Break,
    /// A runtime error heading for the nearest `pcall`, or the embedder.
    Error(LuaError),
}

/// Result of one evaluation step: a normal value or an unwind.
pub type Exec<T> = Result<T, Control>;

impl From<LuaError> for Control {
    fn from(err: LuaError) -> Self {
        Control::Error(err)
    }
}
