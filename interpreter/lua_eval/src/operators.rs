//! Binary operator core.
//!
//! Every operator applies its primitive rule first; when the primitives
//! reject, the metamethod of the left operand is consulted, then the
//! right. Only when both are absent does the operation fail with a typed
//! error naming the offending operand.
//!
//! `and`/`or` never reach this module: they short-circuit in the
//! evaluator and have no metamethods.

use lua_ir::ast::BinaryOp;

use crate::control::Exec;
use crate::errors;
use crate::interpreter::Engine;
use crate::meta::Metamethod;
use crate::value::{number_to_display, LuaStr, Value};

/// Why a value would not convert to a 64-bit integer.
pub(crate) enum IntConvError {
    /// Not a number at all (and not a numeric string).
    NotNumber,
    /// A number, but with a fractional part or out of range.
    NotIntegral,
}

/// Truncating conversion used by the bitwise operators.
pub(crate) fn to_integer(value: &Value) -> Result<i64, IntConvError> {
    let n = value.coerce_number().ok_or(IntConvError::NotNumber)?;
    if n.is_finite() && n.trunc() == n && (i64::MIN as f64..=i64::MAX as f64).contains(&n) {
        Ok(n as i64)
    } else {
        Err(IntConvError::NotIntegral)
    }
}

impl Engine {
    /// Evaluate an eager binary operator with both operands computed.
    pub(crate) fn eval_binary_op(
        &mut self,
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
    ) -> Exec<Value> {
        match op {
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::FloorDiv
            | BinaryOp::Mod
            | BinaryOp::Pow => self.arith(op, lhs, rhs),
            BinaryOp::Concat => self.concat(lhs, rhs),
            BinaryOp::Eq => self.values_equal(&lhs, &rhs).map(Value::Boolean),
            BinaryOp::NotEq => self.values_equal(&lhs, &rhs).map(|eq| Value::Boolean(!eq)),
            BinaryOp::Lt => self.less_than(lhs, rhs).map(Value::Boolean),
            BinaryOp::LtEq => self.less_equal(lhs, rhs).map(Value::Boolean),
            BinaryOp::Gt => self.less_than(rhs, lhs).map(Value::Boolean),
            BinaryOp::GtEq => self.less_equal(rhs, lhs).map(Value::Boolean),
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl
            | BinaryOp::Shr => self.bitwise(op, lhs, rhs),
            BinaryOp::And | BinaryOp::Or => {
                unreachable!("short-circuit operators are evaluated in exec::expr")
            }
        }
    }

    fn arith(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Exec<Value> {
        if let (Some(a), Some(b)) = (lhs.coerce_number(), rhs.coerce_number()) {
            return Ok(Value::Number(arith_apply(op, a, b)));
        }
        if let Some(result) = self.binary_metamethod(arith_event(op), &lhs, &rhs)? {
            return Ok(result);
        }
        let offender = if lhs.coerce_number().is_none() {
            &lhs
        } else {
            &rhs
        };
        self.fail(errors::arith_error(offender.type_name()))
    }

    fn concat(&mut self, lhs: Value, rhs: Value) -> Exec<Value> {
        if is_concatable(&lhs) && is_concatable(&rhs) {
            let mut bytes = concat_bytes(&lhs);
            bytes.extend_from_slice(&concat_bytes(&rhs));
            return Ok(Value::Str(LuaStr::from(bytes)));
        }
        if let Some(result) = self.binary_metamethod(Metamethod::Concat, &lhs, &rhs)? {
            return Ok(result);
        }
        let offender = if is_concatable(&lhs) { &rhs } else { &lhs };
        self.fail(errors::concat_error(offender.type_name()))
    }

    /// `==` with `__eq` participation.
    ///
    /// Primitive equality settles everything except two distinct tables:
    /// only then, and only because the types match, is `__eq` consulted.
    /// Its result coerces through truthiness.
    pub(crate) fn values_equal(&mut self, lhs: &Value, rhs: &Value) -> Exec<bool> {
        if lhs == rhs {
            return Ok(true);
        }
        if let (Value::Table(_), Value::Table(_)) = (lhs, rhs) {
            if let Some(result) = self.binary_metamethod(Metamethod::Eq, lhs, rhs)? {
                return Ok(result.is_truthy());
            }
        }
        Ok(false)
    }

    fn less_than(&mut self, lhs: Value, rhs: Value) -> Exec<bool> {
        match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(a < b),
            (Value::Str(a), Value::Str(b)) => Ok(a.as_bytes() < b.as_bytes()),
            _ => {
                if let Some(result) = self.binary_metamethod(Metamethod::Lt, &lhs, &rhs)? {
                    return Ok(result.is_truthy());
                }
                self.fail(errors::compare_error(lhs.type_name(), rhs.type_name()))
            }
        }
    }

    /// `<=`: primitive rule, then `__le`, then `not __lt(rhs, lhs)`.
    fn less_equal(&mut self, lhs: Value, rhs: Value) -> Exec<bool> {
        match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(a <= b),
            (Value::Str(a), Value::Str(b)) => Ok(a.as_bytes() <= b.as_bytes()),
            _ => {
                if let Some(result) = self.binary_metamethod(Metamethod::Le, &lhs, &rhs)? {
                    return Ok(result.is_truthy());
                }
                if let Some(result) = self.binary_metamethod(Metamethod::Lt, &rhs, &lhs)? {
                    return Ok(!result.is_truthy());
                }
                self.fail(errors::compare_error(lhs.type_name(), rhs.type_name()))
            }
        }
    }

    fn bitwise(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Exec<Value> {
        match (to_integer(&lhs), to_integer(&rhs)) {
            (Ok(a), Ok(b)) => Ok(Value::Number(bitwise_apply(op, a, b) as f64)),
            (Err(IntConvError::NotIntegral), Ok(_))
            | (Ok(_), Err(IntConvError::NotIntegral))
            | (Err(IntConvError::NotIntegral), Err(IntConvError::NotIntegral)) => {
                self.fail(errors::no_integer_representation())
            }
            (lhs_conv, _) => {
                if let Some(result) = self.binary_metamethod(bitwise_event(op), &lhs, &rhs)? {
                    return Ok(result);
                }
                let offender = if matches!(lhs_conv, Err(IntConvError::NotNumber)) {
                    &lhs
                } else {
                    &rhs
                };
                self.fail(errors::bitwise_error(offender.type_name()))
            }
        }
    }

    /// Look a binary metamethod up on the left operand, then the right,
    /// and call the first hit with `(lhs, rhs)`. `None` means neither
    /// operand has one; extra return values are discarded.
    pub(crate) fn binary_metamethod(
        &mut self,
        mm: Metamethod,
        lhs: &Value,
        rhs: &Value,
    ) -> Exec<Option<Value>> {
        let handler = {
            let left = self.metamethod(lhs, mm);
            if left.is_nil() {
                self.metamethod(rhs, mm)
            } else {
                left
            }
        };
        if handler.is_nil() {
            return Ok(None);
        }
        let results = self.call_value(handler, vec![lhs.clone(), rhs.clone()])?;
        Ok(Some(results.into_iter().next().unwrap_or(Value::Nil)))
    }
}

fn arith_apply(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        // Floored modulo: result takes the sign of the divisor.
        BinaryOp::Mod => a - (a / b).floor() * b,
        BinaryOp::Pow => a.powf(b),
        _ => unreachable!("not an arithmetic operator: {op:?}"),
    }
}

fn arith_event(op: BinaryOp) -> Metamethod {
    match op {
        BinaryOp::Add => Metamethod::Add,
        BinaryOp::Sub => Metamethod::Sub,
        BinaryOp::Mul => Metamethod::Mul,
        BinaryOp::Div => Metamethod::Div,
        BinaryOp::FloorDiv => Metamethod::Idiv,
        BinaryOp::Mod => Metamethod::Mod,
        BinaryOp::Pow => Metamethod::Pow,
        _ => unreachable!("not an arithmetic operator: {op:?}"),
    }
}

fn bitwise_event(op: BinaryOp) -> Metamethod {
    match op {
        BinaryOp::BitAnd => Metamethod::BAnd,
        BinaryOp::BitOr => Metamethod::BOr,
        BinaryOp::BitXor => Metamethod::BXor,
        BinaryOp::Shl => Metamethod::Shl,
        BinaryOp::Shr => Metamethod::Shr,
        _ => unreachable!("not a bitwise operator: {op:?}"),
    }
}

fn bitwise_apply(op: BinaryOp, a: i64, b: i64) -> i64 {
    match op {
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => shift_left(a, b),
        BinaryOp::Shr => shift_left(a, b.saturating_neg()),
        _ => unreachable!("not a bitwise operator: {op:?}"),
    }
}

/// Logical shift with the dialect's rules: negative counts shift the
/// other way, counts of 64 or more produce zero.
fn shift_left(a: i64, b: i64) -> i64 {
    if b <= -64 || b >= 64 {
        0
    } else if b < 0 {
        ((a as u64) >> -b) as i64
    } else {
        ((a as u64) << b) as i64
    }
}

fn is_concatable(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Number(_))
}

fn concat_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Str(s) => s.as_bytes().to_vec(),
        Value::Number(n) => number_to_display(*n).into_bytes(),
        _ => unreachable!("concat_bytes on non-concatable value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn floored_modulo_takes_divisor_sign() {
        assert_eq!(arith_apply(BinaryOp::Mod, 5.0, 3.0), 2.0);
        assert_eq!(arith_apply(BinaryOp::Mod, -5.0, 3.0), 1.0);
        assert_eq!(arith_apply(BinaryOp::Mod, 5.0, -3.0), -1.0);
        assert_eq!(arith_apply(BinaryOp::Mod, -5.0, -3.0), -2.0);
    }

    #[test]
    fn floor_division_floors_toward_negative_infinity() {
        assert_eq!(arith_apply(BinaryOp::FloorDiv, 7.0, 2.0), 3.0);
        assert_eq!(arith_apply(BinaryOp::FloorDiv, -7.0, 2.0), -4.0);
        assert_eq!(arith_apply(BinaryOp::FloorDiv, 7.0, -2.0), -4.0);
    }

    #[test]
    fn division_is_always_floating() {
        assert_eq!(arith_apply(BinaryOp::Div, 7.0, 2.0), 3.5);
    }

    #[test]
    fn to_integer_accepts_integral_doubles_and_strings() {
        assert!(matches!(to_integer(&Value::Number(5.0)), Ok(5)));
        assert!(matches!(to_integer(&Value::Number(-3.0)), Ok(-3)));
        assert!(matches!(to_integer(&Value::string("12")), Ok(12)));
    }

    #[test]
    fn to_integer_rejects_fractional_numbers() {
        assert!(matches!(
            to_integer(&Value::Number(1.5)),
            Err(IntConvError::NotIntegral)
        ));
        assert!(matches!(
            to_integer(&Value::Number(f64::NAN)),
            Err(IntConvError::NotIntegral)
        ));
        assert!(matches!(
            to_integer(&Value::Number(1e300)),
            Err(IntConvError::NotIntegral)
        ));
    }

    #[test]
    fn to_integer_rejects_non_numbers() {
        assert!(matches!(
            to_integer(&Value::Nil),
            Err(IntConvError::NotNumber)
        ));
        assert!(matches!(
            to_integer(&Value::Boolean(true)),
            Err(IntConvError::NotNumber)
        ));
    }

    #[test]
    fn shifts_handle_negative_and_oversized_counts() {
        assert_eq!(shift_left(1, 4), 16);
        assert_eq!(shift_left(16, -4), 1);
        assert_eq!(shift_left(1, 64), 0);
        assert_eq!(shift_left(1, -64), 0);
        // Logical, not arithmetic: sign bits do not smear on right shift.
        assert_eq!(shift_left(-1, -1), i64::MAX);
    }

    #[test]
    fn bitwise_ops_on_integers() {
        assert_eq!(bitwise_apply(BinaryOp::BitAnd, 0b1100, 0b1010), 0b1000);
        assert_eq!(bitwise_apply(BinaryOp::BitOr, 0b1100, 0b1010), 0b1110);
        assert_eq!(bitwise_apply(BinaryOp::BitXor, 0b1100, 0b1010), 0b0110);
    }
}
