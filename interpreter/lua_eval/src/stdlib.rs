//! The standard library: host functions registered as globals.
//!
//! Each entry is a plain function pointer taking the engine and the
//! argument slice; errors raise the same unwind guest errors do, so a
//! stdlib failure is indistinguishable from a guest `error(...)` at a
//! `pcall` site.

use crate::control::{Control, Exec};
use crate::errors::{self, LuaError};
use crate::interpreter::Engine;
use crate::meta::Metamethod;
use crate::value::{parse_number, Function, Value};

/// Register every stdlib global on a fresh engine.
pub(crate) fn register(engine: &mut Engine) {
    engine.register_host("print", lua_print);
    engine.register_host("error", lua_error);
    engine.register_host("pcall", lua_pcall);
    engine.register_host("assert", lua_assert);
    engine.register_host("type", lua_type);
    engine.register_host("tostring", lua_tostring);
    engine.register_host("tonumber", lua_tonumber);
    engine.register_host("select", lua_select);
    engine.register_host("ipairs", lua_ipairs);
    engine.register_host("rawget", lua_rawget);
    engine.register_host("rawset", lua_rawset);
    engine.register_host("getmetatable", lua_getmetatable);
    engine.register_host("setmetatable", lua_setmetatable);
    engine.register_host("dofile", lua_dofile);
    engine.register_host("collectgarbage", lua_collectgarbage);
}

fn arg_or_nil(args: &[Value], n: usize) -> Value {
    args.get(n).cloned().unwrap_or(Value::Nil)
}

fn required<'a>(
    engine: &Engine,
    args: &'a [Value],
    n: usize,
    fname: &str,
) -> Exec<&'a Value> {
    match args.get(n) {
        Some(value) => Ok(value),
        None => Err(engine.error(errors::bad_argument(n + 1, fname, "value expected"))),
    }
}

/// `print(...)`: each argument through `tostring`, tab-separated, one
/// trailing newline, to the engine's stdout.
fn lua_print(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let mut line = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(b'\t');
        }
        let text = engine.tostring_value(arg)?;
        line.extend_from_slice(text.as_bytes());
    }
    line.push(b'\n');
    engine.streams.stdout.write(&line);
    Ok(Vec::new())
}

/// `error(msg, level?)`: raise an error unwind carrying `msg` verbatim
/// and the call stack captured here.
fn lua_error(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let mut err = LuaError::with_value(arg_or_nil(args, 0));
    if let Some(Value::Number(level)) = args.get(1) {
        err.level = Some(*level);
    }
    Err(engine.error(err))
}

/// `pcall(f, ...)`: call `f`, catching error unwinds — and only those.
fn lua_pcall(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let callee = required(engine, args, 0, "pcall")?.clone();
    let rest = args.get(1..).unwrap_or(&[]).to_vec();
    match engine.call_value(callee, rest) {
        Ok(mut values) => {
            values.insert(0, Value::Boolean(true));
            Ok(values)
        }
        Err(Control::Error(err)) => Ok(vec![Value::Boolean(false), err.message]),
        Err(other) => Err(other),
    }
}

/// `assert(v, msg?)`: all arguments when `v` is truthy, else an error
/// with `msg` (any value) or the stock message.
fn lua_assert(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let value = required(engine, args, 0, "assert")?;
    if value.is_truthy() {
        return Ok(args.to_vec());
    }
    let err = match args.get(1) {
        Some(message) => LuaError::with_value(message.clone()),
        None => LuaError::runtime("assertion failed!"),
    };
    Err(engine.error(err))
}

fn lua_type(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let value = required(engine, args, 0, "type")?;
    Ok(vec![Value::string(value.type_name())])
}

fn lua_tostring(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let value = required(engine, args, 0, "tostring")?.clone();
    let text = engine.tostring_value(&value)?;
    Ok(vec![Value::Str(text)])
}

/// `tonumber(v)`: identity on numbers, decimal parse on strings, nil
/// otherwise.
fn lua_tonumber(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let value = required(engine, args, 0, "tonumber")?;
    let result = match value {
        Value::Number(n) => Value::Number(*n),
        Value::Str(s) => match parse_number(s.as_bytes()) {
            Some(n) => Value::Number(n),
            None => Value::Nil,
        },
        _ => Value::Nil,
    };
    Ok(vec![result])
}

/// `select('#', ...)` or `select(n, ...)` with positive or negative `n`.
fn lua_select(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let selector = required(engine, args, 0, "select")?;
    let rest = args.get(1..).unwrap_or(&[]);
    match selector {
        Value::Str(s) if s.as_bytes() == b"#" => Ok(vec![Value::Number(rest.len() as f64)]),
        Value::Number(n) => {
            if n.trunc() != *n || !n.is_finite() {
                return Err(engine.error(errors::bad_argument(
                    1,
                    "select",
                    "number has no integer representation",
                )));
            }
            let n = *n as i64;
            if n > 0 {
                let start = (n as usize - 1).min(rest.len());
                Ok(rest[start..].to_vec())
            } else if n < 0 {
                let back = n.unsigned_abs() as usize;
                if back > rest.len() {
                    return Err(engine.error(errors::bad_argument(
                        1,
                        "select",
                        "index out of range",
                    )));
                }
                Ok(rest[rest.len() - back..].to_vec())
            } else {
                Err(engine.error(errors::bad_argument(1, "select", "index out of range")))
            }
        }
        other => Err(engine.error(errors::bad_argument(
            1,
            "select",
            format_args!("number expected, got {}", other.type_name()),
        ))),
    }
}

/// `ipairs(t)`: the iterator triple `(step, t, 0)`.
fn lua_ipairs(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let table = required(engine, args, 0, "ipairs")?;
    if !matches!(table, Value::Table(_)) {
        return Err(engine.error(errors::bad_argument(
            1,
            "ipairs",
            format_args!("table expected, got {}", table.type_name()),
        )));
    }
    let iterator = Value::function(Function::host("ipairs iterator", ipairs_step));
    Ok(vec![iterator, table.clone(), Value::Number(0.0)])
}

/// One `ipairs` step: `(t, i) -> i+1, t[i+1]`, stopping at the first
/// nil.
fn ipairs_step(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let table = match args.first() {
        Some(Value::Table(t)) => t.clone(),
        _ => {
            return Err(engine.error(errors::bad_argument(
                1,
                "ipairs iterator",
                "table expected",
            )))
        }
    };
    let i = match args.get(1) {
        Some(Value::Number(n)) => *n,
        _ => 0.0,
    };
    let next = i + 1.0;
    let value = table.borrow().raw_get(&Value::Number(next));
    if value.is_nil() {
        Ok(vec![Value::Nil])
    } else {
        Ok(vec![Value::Number(next), value])
    }
}

fn lua_rawget(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let table = match required(engine, args, 0, "rawget")? {
        Value::Table(t) => t.clone(),
        other => {
            return Err(engine.error(errors::bad_argument(
                1,
                "rawget",
                format_args!("table expected, got {}", other.type_name()),
            )))
        }
    };
    let key = arg_or_nil(args, 1);
    let result = table.borrow().raw_get(&key);
    Ok(vec![result])
}

fn lua_rawset(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let table = match required(engine, args, 0, "rawset")? {
        Value::Table(t) => t.clone(),
        other => {
            return Err(engine.error(errors::bad_argument(
                1,
                "rawset",
                format_args!("table expected, got {}", other.type_name()),
            )))
        }
    };
    let key = arg_or_nil(args, 1);
    let value = arg_or_nil(args, 2);
    let result = table.borrow_mut().raw_set(key, value);
    result.map_err(|err| engine.error(err.into()))?;
    Ok(vec![Value::Table(table)])
}

/// `getmetatable(v)`: the metatable, unless it hides behind
/// `__metatable`.
fn lua_getmetatable(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let value = required(engine, args, 0, "getmetatable")?;
    let result = match engine.metatable_of(value) {
        None => Value::Nil,
        Some(mt) => {
            let protected = mt.borrow().raw_get(engine.events.key(Metamethod::Metatable));
            if protected.is_nil() {
                Value::Table(mt)
            } else {
                protected
            }
        }
    };
    Ok(vec![result])
}

/// `setmetatable(t, mt)`: install or clear a table's metatable,
/// refusing when the current one is protected.
fn lua_setmetatable(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let table = match required(engine, args, 0, "setmetatable")? {
        Value::Table(t) => t.clone(),
        other => {
            return Err(engine.error(errors::bad_argument(
                1,
                "setmetatable",
                format_args!("table expected, got {}", other.type_name()),
            )))
        }
    };
    let new_mt = match arg_or_nil(args, 1) {
        Value::Nil => None,
        Value::Table(mt) => Some(mt),
        other => {
            return Err(engine.error(errors::bad_argument(
                2,
                "setmetatable",
                format_args!("nil or table expected, got {}", other.type_name()),
            )))
        }
    };

    let protected = table.borrow().metatable().is_some_and(|mt| {
        !mt.borrow()
            .raw_get(engine.events.key(Metamethod::Metatable))
            .is_nil()
    });
    if protected {
        return Err(engine.error(errors::protected_metatable()));
    }

    table.borrow_mut().set_metatable(new_mt);
    Ok(vec![Value::Table(table)])
}

/// `dofile(path?)`: evaluate a file through the filesystem abstraction;
/// a nil path evaluates stdin.
fn lua_dofile(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    match arg_or_nil(args, 0) {
        Value::Nil => {
            let bytes = match engine.streams.stdin.read_to_end() {
                Ok(bytes) => bytes,
                Err(err) => {
                    return Err(engine.error(LuaError::runtime(format!("cannot read stdin: {err}"))))
                }
            };
            let source = String::from_utf8_lossy(&bytes).into_owned();
            tracing::debug!(chunk = "=stdin", "dofile");
            engine.eval_nested(&source, "=stdin")
        }
        Value::Str(path) => {
            let path = path.to_text().into_owned();
            let bytes = match engine.fs.read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    return Err(
                        engine.error(LuaError::runtime(format!("cannot open {path}: {err}")))
                    )
                }
            };
            let source = String::from_utf8_lossy(&bytes).into_owned();
            tracing::debug!(chunk = %path, "dofile");
            engine.eval_nested(&source, &path)
        }
        other => Err(engine.error(errors::bad_argument(
            1,
            "dofile",
            format_args!("string expected, got {}", other.type_name()),
        ))),
    }
}

/// `collectgarbage(opt?)`: the documented option surface over a host
/// that manages memory itself. `count` walks the live heap; `stop`,
/// `restart`, and `isrunning` track a flag; the rest are stubs with
/// their conventional return values.
fn lua_collectgarbage(engine: &mut Engine, args: &[Value]) -> Exec<Vec<Value>> {
    let opt = match arg_or_nil(args, 0) {
        Value::Nil => "collect".to_string(),
        Value::Str(s) => s.to_text().into_owned(),
        other => {
            return Err(engine.error(errors::bad_argument(
                1,
                "collectgarbage",
                format_args!("string expected, got {}", other.type_name()),
            )))
        }
    };
    let result = match opt.as_str() {
        "collect" => Value::Number(0.0),
        "stop" => {
            engine.gc.running = false;
            Value::Number(0.0)
        }
        "restart" => {
            engine.gc.running = true;
            Value::Number(0.0)
        }
        "count" => Value::Number(engine.heap_estimate_kb()),
        "step" => Value::Boolean(false),
        "setpause" => {
            let previous = engine.gc.pause;
            if let Some(Value::Number(n)) = args.get(1) {
                engine.gc.pause = *n;
            }
            Value::Number(previous)
        }
        "setstepmul" => {
            let previous = engine.gc.step_mul;
            if let Some(Value::Number(n)) = args.get(1) {
                engine.gc.step_mul = *n;
            }
            Value::Number(previous)
        }
        "isrunning" => Value::Boolean(engine.gc.running),
        other => {
            return Err(engine.error(errors::bad_argument(
                1,
                "collectgarbage",
                format_args!("invalid option '{other}'"),
            )))
        }
    };
    Ok(vec![result])
}
