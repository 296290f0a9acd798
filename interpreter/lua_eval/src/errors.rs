//! The runtime error value and its constructor catalog.
//!
//! A guest error carries an arbitrary message *value* (usually a string,
//! but `error({...})` is legal and the payload survives `pcall`
//! round-trips by identity), an optional level, and the call-stack
//! snapshot captured when it was raised.

use std::fmt;

use crate::value::{TableKeyError, Value};

/// A runtime error travelling up the call stack.
#[derive(Debug, Clone)]
pub struct LuaError {
    /// The guest message; any value.
    pub message: Value,
    /// Stack level passed to `error(msg, level)`, if any.
    pub level: Option<f64>,
    /// Call-stack snapshot at raise time, innermost frame first.
    pub traceback: Vec<String>,
}

impl LuaError {
    /// An error with a host-produced string message.
    pub fn runtime(message: impl Into<String>) -> Self {
        LuaError {
            message: Value::string(message.into()),
            level: None,
            traceback: Vec::new(),
        }
    }

    /// An error carrying a guest value verbatim.
    pub fn with_value(message: Value) -> Self {
        LuaError {
            message,
            level: None,
            traceback: Vec::new(),
        }
    }

    /// Attach the call-stack snapshot captured at the raise site.
    #[must_use]
    pub fn with_traceback(mut self, traceback: Vec<String>) -> Self {
        self.traceback = traceback;
        self
    }

    /// The message rendered as text, without metamethod participation.
    pub fn message_display(&self) -> String {
        match &self.message {
            Value::Nil => "error called with <nil>".to_string(),
            other => other.display_string(),
        }
    }

    /// Multi-line traceback rendering, one frame per line.
    pub fn render_traceback(&self) -> String {
        let mut out = String::from("stack traceback:");
        for frame in &self.traceback {
            out.push_str("\n\t");
            out.push_str(frame);
        }
        out
    }
}

impl fmt::Display for LuaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message_display())
    }
}

impl std::error::Error for LuaError {}

impl From<TableKeyError> for LuaError {
    fn from(err: TableKeyError) -> Self {
        LuaError::runtime(err.message())
    }
}

// Constructors for the runtime's error vocabulary. Messages follow the
// dialect's conventional wording; tests assert several of them verbatim.

pub fn arith_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!(
        "attempt to perform arithmetic on a {type_name} value"
    ))
}

pub fn concat_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!("attempt to concatenate a {type_name} value"))
}

pub fn compare_error(lhs: &str, rhs: &str) -> LuaError {
    if lhs == rhs {
        LuaError::runtime(format!("attempt to compare two {lhs} values"))
    } else {
        LuaError::runtime(format!("attempt to compare {lhs} with {rhs}"))
    }
}

pub fn index_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!("attempt to index a {type_name} value"))
}

pub fn call_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!("attempt to call a {type_name} value"))
}

pub fn length_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!("attempt to get length of a {type_name} value"))
}

pub fn bitwise_error(type_name: &str) -> LuaError {
    LuaError::runtime(format!(
        "attempt to perform bitwise operation on a {type_name} value"
    ))
}

pub fn no_integer_representation() -> LuaError {
    LuaError::runtime("number has no integer representation")
}

pub fn stack_overflow(name: &str) -> LuaError {
    LuaError::runtime(format!("Stack overflow while calling '{name}'"))
}

pub fn bad_argument(n: usize, fname: &str, detail: impl fmt::Display) -> LuaError {
    LuaError::runtime(format!("bad argument #{n} to '{fname}' ({detail})"))
}

pub fn protected_metatable() -> LuaError {
    LuaError::runtime("cannot change a protected metatable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nil_message_renders_placeholder() {
        let err = LuaError::with_value(Value::Nil);
        assert_eq!(err.message_display(), "error called with <nil>");
    }

    #[test]
    fn string_message_renders_verbatim() {
        let err = LuaError::with_value(Value::string("boom"));
        assert_eq!(err.message_display(), "boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn number_message_uses_number_display() {
        let err = LuaError::with_value(Value::Number(3.0));
        assert_eq!(err.message_display(), "3");
    }

    #[test]
    fn traceback_renders_one_frame_per_line() {
        let err = LuaError::runtime("x")
            .with_traceback(vec!["error".into(), "f".into(), "<chunk>".into()]);
        assert_eq!(
            err.render_traceback(),
            "stack traceback:\n\terror\n\tf\n\t<chunk>"
        );
    }

    #[test]
    fn message_wording() {
        assert_eq!(
            arith_error("table").to_string(),
            "attempt to perform arithmetic on a table value"
        );
        assert_eq!(
            concat_error("nil").to_string(),
            "attempt to concatenate a nil value"
        );
        assert_eq!(
            compare_error("number", "string").to_string(),
            "attempt to compare number with string"
        );
        assert_eq!(
            compare_error("table", "table").to_string(),
            "attempt to compare two table values"
        );
        assert_eq!(
            stack_overflow("f").to_string(),
            "Stack overflow while calling 'f'"
        );
        assert_eq!(
            bad_argument(2, "select", "index out of range").to_string(),
            "bad argument #2 to 'select' (index out of range)"
        );
    }
}
