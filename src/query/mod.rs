//! Query Module
//!
//! A small expression language for filtering, projecting, and sorting JSON
//! datasets: a tokenizer, a Pratt parser, and a tree interpreter, plus a set
//! of null-safe extension functions for records with absent fields. The
//! surface is a documented subset of the common JSON query idiom; it is
//! implemented natively so filter and null-handling semantics stay part of
//! this crate's contract.

mod eval;
mod functions;
mod lexer;
mod parser;

use serde_json::Value;
use thiserror::Error;

// == Query Error ==
/// Errors raised while parsing or evaluating an expression.
///
/// A null flowing into a typed builtin (the classic forgotten-`nvl` case)
/// surfaces as [`QueryError::InvalidType`], the same kind as any other
/// argument mismatch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The expression could not be tokenized or parsed
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A function call named something the language does not provide
    #[error("Unknown function: {0}()")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments
    #[error("Expected {expected} arguments for function {function}(), received {received}")]
    Arity {
        function: String,
        expected: usize,
        received: usize,
    },

    /// A function argument had an unusable type or value
    #[error("In function {function}(), invalid type for value: {value}, expected {expected}")]
    InvalidType {
        function: String,
        value: String,
        expected: String,
    },

    /// An `&expr` reference appeared outside a function argument
    #[error("Expression reference is only valid as a function argument")]
    StrayExpref,
}

impl QueryError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

// == Query Result ==
/// Outcome of evaluating a query: either an ordered sequence of records,
/// eligible for pagination, or a single aggregate value that pagination must
/// bypass. The split is a first-class case, not an error condition.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// A sequence of records, usually the filtered dataset
    Rows(Vec<Value>),
    /// An aggregate scalar or object, wrapped as a singleton downstream
    Single(Value),
}

impl From<Value> for QueryResult {
    fn from(value: Value) -> Self {
        match value {
            // A null result means "nothing matched", not a null payload
            Value::Null => QueryResult::Rows(Vec::new()),
            Value::Array(rows) => QueryResult::Rows(rows),
            other => QueryResult::Single(other),
        }
    }
}

// == Entry Points ==
/// Evaluates `expression` against `data`, returning the raw JSON result.
pub fn search(expression: &str, data: &Value) -> Result<Value, QueryError> {
    let ast = parser::parse(expression)?;
    eval::eval(&ast, data)
}

/// Evaluates `expression` against `data` and shapes the outcome for
/// pagination: null becomes an empty row set, an array becomes rows, and
/// anything else is a single aggregate value.
pub fn run(expression: &str, data: &Value) -> Result<QueryResult, QueryError> {
    Ok(QueryResult::from(search(expression, data)?))
}
