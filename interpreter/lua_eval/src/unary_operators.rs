//! Unary operator core.

use lua_ir::ast::UnaryOp;

use crate::control::Exec;
use crate::errors;
use crate::interpreter::Engine;
use crate::meta::Metamethod;
use crate::operators::{to_integer, IntConvError};
use crate::value::Value;

impl Engine {
    pub(crate) fn eval_unary_op(&mut self, op: UnaryOp, operand: Value) -> Exec<Value> {
        match op {
            // `not` has no metamethod; it is pure truthiness.
            UnaryOp::Not => Ok(Value::Boolean(!operand.is_truthy())),
            UnaryOp::Neg => self.negate(operand),
            UnaryOp::Len => self.length(operand),
            UnaryOp::BitNot => self.bit_not(operand),
        }
    }

    fn negate(&mut self, operand: Value) -> Exec<Value> {
        if let Value::Number(n) = operand {
            return Ok(Value::Number(-n));
        }
        // The handler is called with the operand in both slots.
        if let Some(result) = self.binary_metamethod(Metamethod::Unm, &operand, &operand)? {
            return Ok(result);
        }
        self.fail(errors::arith_error(operand.type_name()))
    }

    /// `#`: byte length for strings; `__len`, else the border, for
    /// tables; `__len` alone for everything else.
    pub(crate) fn length(&mut self, operand: Value) -> Exec<Value> {
        if let Value::Str(s) = &operand {
            return Ok(Value::Number(s.len() as f64));
        }
        let handler = self.metamethod(&operand, Metamethod::Len);
        if !handler.is_nil() {
            let results = self.call_value(handler, vec![operand.clone()])?;
            return Ok(results.into_iter().next().unwrap_or(Value::Nil));
        }
        if let Value::Table(t) = &operand {
            return Ok(Value::Number(t.borrow().border()));
        }
        self.fail(errors::length_error(operand.type_name()))
    }

    fn bit_not(&mut self, operand: Value) -> Exec<Value> {
        match to_integer(&operand) {
            Ok(n) => Ok(Value::Number(!n as f64)),
            Err(IntConvError::NotIntegral) => self.fail(errors::no_integer_representation()),
            Err(IntConvError::NotNumber) => {
                if let Some(result) =
                    self.binary_metamethod(Metamethod::BNot, &operand, &operand)?
                {
                    return Ok(result);
                }
                self.fail(errors::bitwise_error(operand.type_name()))
            }
        }
    }
}
