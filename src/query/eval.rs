//! Query Evaluator Module
//!
//! A tree interpreter over the parsed AST. The evaluation rules that matter
//! most for messy datasets: a missing field is null rather than an error,
//! projections drop per-element nulls, ordering comparators yield null when
//! either side is not a number, and equality is deep with numeric coercion
//! so `1 == 1.0`. Logical operators return operand values, not booleans.

use serde_json::{Map, Value};

use super::functions;
use super::parser::{Ast, CmpOp};
use super::QueryError;

/// Evaluates `node` against the current value.
pub(crate) fn eval(node: &Ast, current: &Value) -> Result<Value, QueryError> {
    match node {
        Ast::Identity => Ok(current.clone()),
        Ast::Field(name) => Ok(match current {
            Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }),
        Ast::Subexpr(lhs, rhs) => {
            let base = eval(lhs, current)?;
            eval(rhs, &base)
        }
        Ast::Index(on, index) => {
            let base = eval(on, current)?;
            Ok(index_array(&base, *index))
        }
        Ast::Slice {
            on,
            start,
            stop,
            step,
        } => {
            let base = eval(on, current)?;
            Ok(match base {
                Value::Array(items) => Value::Array(slice_array(&items, *start, *stop, *step)),
                _ => Value::Null,
            })
        }
        Ast::Projection(lhs, rhs) => {
            let base = eval(lhs, current)?;
            let Value::Array(items) = base else {
                return Ok(Value::Null);
            };
            let mut collected = Vec::new();
            for item in &items {
                let value = eval(rhs, item)?;
                if !value.is_null() {
                    collected.push(value);
                }
            }
            Ok(Value::Array(collected))
        }
        Ast::ValueProjection(lhs, rhs) => {
            let base = eval(lhs, current)?;
            let Value::Object(map) = base else {
                return Ok(Value::Null);
            };
            let mut collected = Vec::new();
            for value in map.values() {
                let mapped = eval(rhs, value)?;
                if !mapped.is_null() {
                    collected.push(mapped);
                }
            }
            Ok(Value::Array(collected))
        }
        Ast::FilterProjection {
            on,
            then,
            condition,
        } => {
            let base = eval(on, current)?;
            let Value::Array(items) = base else {
                return Ok(Value::Null);
            };
            let mut collected = Vec::new();
            for item in &items {
                if is_truthy(&eval(condition, item)?) {
                    let value = eval(then, item)?;
                    if !value.is_null() {
                        collected.push(value);
                    }
                }
            }
            Ok(Value::Array(collected))
        }
        Ast::Flatten(inner) => {
            let base = eval(inner, current)?;
            let Value::Array(items) = base else {
                return Ok(Value::Null);
            };
            let mut merged = Vec::new();
            for item in items {
                match item {
                    Value::Array(nested) => merged.extend(nested),
                    other => merged.push(other),
                }
            }
            Ok(Value::Array(merged))
        }
        Ast::Literal(value) => Ok(value.clone()),
        Ast::MultiList(items) => {
            if current.is_null() {
                return Ok(Value::Null);
            }
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item, current)?);
            }
            Ok(Value::Array(out))
        }
        Ast::MultiHash(pairs) => {
            if current.is_null() {
                return Ok(Value::Null);
            }
            let mut map = Map::new();
            for (key, expr) in pairs {
                map.insert(key.clone(), eval(expr, current)?);
            }
            Ok(Value::Object(map))
        }
        Ast::And(lhs, rhs) => {
            let left = eval(lhs, current)?;
            if is_truthy(&left) {
                eval(rhs, current)
            } else {
                Ok(left)
            }
        }
        Ast::Or(lhs, rhs) => {
            let left = eval(lhs, current)?;
            if is_truthy(&left) {
                Ok(left)
            } else {
                eval(rhs, current)
            }
        }
        Ast::Not(inner) => Ok(Value::Bool(!is_truthy(&eval(inner, current)?))),
        Ast::Compare(op, lhs, rhs) => {
            let left = eval(lhs, current)?;
            let right = eval(rhs, current)?;
            Ok(compare(*op, &left, &right))
        }
        Ast::Pipe(lhs, rhs) => {
            let base = eval(lhs, current)?;
            eval(rhs, &base)
        }
        Ast::Function(name, args) => functions::call(name, args, current),
        Ast::ExpRef(_) => Err(QueryError::StrayExpref),
    }
}

// == Semantics Helpers ==
/// Null, false, the empty string, the empty array, and the empty object are
/// false; everything else, including every number, is true.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => true,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Deep equality with numeric coercion across integer and float
/// representations of the same value.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| json_eq(v, w))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| json_eq(v, w)))
        }
        _ => a == b,
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Value {
    let ordered = |check: fn(f64, f64) -> bool| match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => Value::Bool(check(l, r)),
        // Ordering is only defined between numbers
        _ => Value::Null,
    };
    match op {
        CmpOp::Eq => Value::Bool(json_eq(left, right)),
        CmpOp::Ne => Value::Bool(!json_eq(left, right)),
        CmpOp::Lt => ordered(|l, r| l < r),
        CmpOp::Lte => ordered(|l, r| l <= r),
        CmpOp::Gt => ordered(|l, r| l > r),
        CmpOp::Gte => ordered(|l, r| l >= r),
    }
}

fn index_array(base: &Value, index: i64) -> Value {
    let Value::Array(items) = base else {
        return Value::Null;
    };
    let len = items.len() as i64;
    let idx = if index < 0 { index + len } else { index };
    if idx < 0 || idx >= len {
        return Value::Null;
    }
    items[idx as usize].clone()
}

/// Slices with full negative-index and step support. Out-of-range endpoints
/// clamp instead of erroring.
fn slice_array(items: &[Value], start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<Value> {
    let len = items.len() as i64;
    let (begin, end) = if step > 0 {
        (
            endpoint(start.unwrap_or(0), len, 0, len),
            endpoint(stop.unwrap_or(len), len, 0, len),
        )
    } else {
        // An omitted stop on a negative step means "past the beginning";
        // -len - 1 normalizes to the -1 sentinel below
        (
            endpoint(start.unwrap_or(len - 1), len, -1, len - 1),
            endpoint(stop.unwrap_or(-len - 1), len, -1, len - 1),
        )
    };

    let mut out = Vec::new();
    let mut i = begin;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        out.push(items[i as usize].clone());
        i += step;
    }
    out
}

/// Resolves one slice endpoint: negatives count from the end, then the
/// result clamps to `[lo, hi]`.
fn endpoint(value: i64, len: i64, lo: i64, hi: i64) -> i64 {
    let resolved = if value < 0 { value + len } else { value };
    resolved.clamp(lo, hi)
}
