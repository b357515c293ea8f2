//! Query Functions Module
//!
//! The function library reachable from expressions. Alongside the standard
//! builtins, the `nvl`, `int`, `str`, and `regex_replace` extensions exist
//! because real datasets carry absent and mistyped fields; they make the
//! null cases explicit instead of erroring mid-filter.
//!
//! Arity and argument types are validated per call. `sort_by`, `min_by`,
//! and `max_by` receive their second argument unevaluated as an `&expr`
//! reference and apply it per element.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{Number, Value};

use super::eval::{self, json_eq};
use super::parser::Ast;
use super::QueryError;

/// Dispatches a function call by name.
pub(crate) fn call(name: &str, args: &[Ast], current: &Value) -> Result<Value, QueryError> {
    match name {
        "length" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            match &subject {
                Value::String(s) => Ok(Value::from(s.chars().count())),
                Value::Array(items) => Ok(Value::from(items.len())),
                Value::Object(map) => Ok(Value::from(map.len())),
                other => Err(invalid_type(name, other, "string, array, or object")),
            }
        }
        "contains" => {
            let [subject, search] = exactly(name, eval_args(args, current)?)?;
            match &subject {
                Value::Array(items) => {
                    Ok(Value::Bool(items.iter().any(|item| json_eq(item, &search))))
                }
                Value::String(haystack) => Ok(Value::Bool(match &search {
                    Value::String(needle) => haystack.contains(needle.as_str()),
                    _ => false,
                })),
                other => Err(invalid_type(name, other, "array or string")),
            }
        }
        "starts_with" => {
            let [subject, prefix] = exactly(name, eval_args(args, current)?)?;
            let subject = require_string(name, &subject)?;
            let prefix = require_string(name, &prefix)?;
            Ok(Value::Bool(subject.starts_with(prefix)))
        }
        "ends_with" => {
            let [subject, suffix] = exactly(name, eval_args(args, current)?)?;
            let subject = require_string(name, &subject)?;
            let suffix = require_string(name, &suffix)?;
            Ok(Value::Bool(subject.ends_with(suffix)))
        }
        "join" => {
            let [glue, subject] = exactly(name, eval_args(args, current)?)?;
            let glue = require_string(name, &glue)?;
            let Value::Array(items) = &subject else {
                return Err(invalid_type(name, &subject, "array of strings"));
            };
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(require_string(name, item)?);
            }
            Ok(Value::String(parts.join(glue)))
        }
        "reverse" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            match subject {
                Value::Array(mut items) => {
                    items.reverse();
                    Ok(Value::Array(items))
                }
                Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
                other => Err(invalid_type(name, &other, "array or string")),
            }
        }
        "sort" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let mut items = match subject {
                Value::Array(items) => items,
                other => return Err(invalid_type(name, &other, "array of strings or numbers")),
            };
            validate_homogeneous(name, &items)?;
            items.sort_by(cmp_keys);
            Ok(Value::Array(items))
        }
        "sort_by" => {
            let mut pairs = keyed_pairs(name, args, current)?;
            pairs.sort_by(|a, b| cmp_keys(&a.0, &b.0));
            Ok(Value::Array(pairs.into_iter().map(|(_, item)| item).collect()))
        }
        "min_by" => {
            let pairs = keyed_pairs(name, args, current)?;
            Ok(pairs
                .into_iter()
                .min_by(|a, b| cmp_keys(&a.0, &b.0))
                .map(|(_, item)| item)
                .unwrap_or(Value::Null))
        }
        "max_by" => {
            let pairs = keyed_pairs(name, args, current)?;
            Ok(pairs
                .into_iter()
                .max_by(|a, b| cmp_keys(&a.0, &b.0))
                .map(|(_, item)| item)
                .unwrap_or(Value::Null))
        }
        "min" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            ordered_extreme(name, subject, false)
        }
        "max" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            ordered_extreme(name, subject, true)
        }
        "sum" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let numbers = require_numbers(name, &subject)?;
            Ok(number_value(numbers.iter().sum()))
        }
        "avg" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let numbers = require_numbers(name, &subject)?;
            if numbers.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(number_value(
                    numbers.iter().sum::<f64>() / numbers.len() as f64,
                ))
            }
        }
        "keys" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let map = match subject {
                Value::Object(map) => map,
                other => return Err(invalid_type(name, &other, "object")),
            };
            Ok(Value::Array(
                map.keys().map(|k| Value::String(k.clone())).collect(),
            ))
        }
        "values" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let map = match subject {
                Value::Object(map) => map,
                other => return Err(invalid_type(name, &other, "object")),
            };
            Ok(Value::Array(map.into_iter().map(|(_, v)| v).collect()))
        }
        "type" => {
            let [subject] = exactly(name, eval_args(args, current)?)?;
            let kind = match subject {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            };
            Ok(Value::String(kind.to_string()))
        }
        "nvl" => {
            let [value, default] = exactly(name, eval_args(args, current)?)?;
            if default.is_null() {
                return Err(invalid_type(name, &default, "a non-null default"));
            }
            Ok(if value.is_null() { default } else { value })
        }
        "int" => {
            let [value] = exactly(name, eval_args(args, current)?)?;
            to_int(name, value)
        }
        "str" => {
            let [value] = exactly(name, eval_args(args, current)?)?;
            Ok(Value::String(to_str(&value)))
        }
        "regex_replace" => {
            let [pattern, replacement, value] = exactly(name, eval_args(args, current)?)?;
            let pattern = require_string(name, &pattern)?;
            let replacement = require_string(name, &replacement)?;
            match &value {
                Value::Null => Ok(Value::Null),
                Value::String(text) => Ok(match Regex::new(pattern) {
                    Ok(re) => Value::String(re.replace_all(text, replacement).into_owned()),
                    // An unusable pattern leaves the value untouched
                    Err(_) => value.clone(),
                }),
                other => Err(invalid_type(name, other, "string or null")),
            }
        }
        _ => Err(QueryError::UnknownFunction(name.to_string())),
    }
}

// == Argument Handling ==
fn eval_args(args: &[Ast], current: &Value) -> Result<Vec<Value>, QueryError> {
    args.iter().map(|arg| eval::eval(arg, current)).collect()
}

fn exactly<const N: usize>(function: &str, args: Vec<Value>) -> Result<[Value; N], QueryError> {
    let received = args.len();
    args.try_into().map_err(|_| QueryError::Arity {
        function: function.to_string(),
        expected: N,
        received,
    })
}

fn invalid_type(function: &str, value: &Value, expected: &str) -> QueryError {
    QueryError::InvalidType {
        function: function.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn require_string<'a>(function: &str, value: &'a Value) -> Result<&'a str, QueryError> {
    value
        .as_str()
        .ok_or_else(|| invalid_type(function, value, "string"))
}

fn require_numbers(function: &str, subject: &Value) -> Result<Vec<f64>, QueryError> {
    let Value::Array(items) = subject else {
        return Err(invalid_type(function, subject, "array of numbers"));
    };
    items
        .iter()
        .map(|item| {
            item.as_f64()
                .ok_or_else(|| invalid_type(function, item, "number"))
        })
        .collect()
}

/// Evaluates the `(array, &key_expr)` argument pair shared by `sort_by`,
/// `min_by`, and `max_by` into `(key, element)` pairs. Keys must all be
/// strings or all be numbers.
fn keyed_pairs(
    function: &str,
    args: &[Ast],
    current: &Value,
) -> Result<Vec<(Value, Value)>, QueryError> {
    if args.len() != 2 {
        return Err(QueryError::Arity {
            function: function.to_string(),
            expected: 2,
            received: args.len(),
        });
    }
    let items = match eval::eval(&args[0], current)? {
        Value::Array(items) => items,
        other => return Err(invalid_type(function, &other, "array")),
    };
    let Ast::ExpRef(key_expr) = &args[1] else {
        let shown = eval::eval(&args[1], current)?;
        return Err(invalid_type(function, &shown, "expression reference"));
    };

    let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(items.len());
    for item in items {
        let key = eval::eval(key_expr, &item)?;
        if !key.is_number() && !key.is_string() {
            return Err(invalid_type(function, &key, "string or number"));
        }
        if let Some((first_key, _)) = pairs.first() {
            if key.is_number() != first_key.is_number() {
                return Err(invalid_type(function, &key, "a key matching the first element's type"));
            }
        }
        pairs.push((key, item));
    }
    Ok(pairs)
}

// == Ordering Helpers ==
fn cmp_numbers(a: &Value, b: &Value) -> Ordering {
    let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// Callers validate homogeneity first, so the mixed arms are unreachable in
// practice and the comparator stays total either way.
fn cmp_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => cmp_numbers(a, b),
    }
}

fn validate_homogeneous(function: &str, items: &[Value]) -> Result<(), QueryError> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    let first_is_number = first.is_number();
    for item in items {
        if !item.is_number() && !item.is_string() {
            return Err(invalid_type(function, item, "string or number"));
        }
        if item.is_number() != first_is_number {
            return Err(invalid_type(function, item, "an element matching the first element's type"));
        }
    }
    Ok(())
}

fn ordered_extreme(function: &str, subject: Value, pick_max: bool) -> Result<Value, QueryError> {
    let items = match subject {
        Value::Array(items) => items,
        other => return Err(invalid_type(function, &other, "array of strings or numbers")),
    };
    if items.is_empty() {
        return Ok(Value::Null);
    }
    validate_homogeneous(function, &items)?;
    let found = if pick_max {
        items.into_iter().max_by(cmp_keys)
    } else {
        items.into_iter().min_by(cmp_keys)
    };
    Ok(found.unwrap_or(Value::Null))
}

// == Conversion Helpers ==
/// Renders an f64 back to JSON, preferring the integer form when exact.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Integer conversion used by `int()`: numbers truncate toward zero,
/// strings must hold a plain integer (else null), null passes through.
/// Booleans and containers are type errors, not nulls.
fn to_int(function: &str, value: Value) -> Result<Value, QueryError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => Ok(n
                .as_f64()
                .map(|f| Value::from(f.trunc() as i64))
                .unwrap_or(Value::Null)),
        },
        Value::String(s) => Ok(s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null)),
        other => Err(invalid_type(function, &other, "string or number")),
    }
}

/// String rendering used by `str()`: scalars in their plain form, arrays
/// and objects as compact JSON.
fn to_str(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
