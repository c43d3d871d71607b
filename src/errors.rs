//! Error types for the lazy-params crate.
//!
//! This module defines the error types that can occur while building, evaluating and
//! parsing parameter expressions. The main error types are:
//!
//! - `VariableError`: Errors raised by variables and transforms (arity, evaluation, queries)
//! - `ConvertError`: Errors during conversion from the evalexpr AST to an operand tree
//! - `ExpressionError`: High-level errors when working with parsed expressions
//!
//! Each error type implements the standard Error trait and provides detailed error messages.

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

use crate::coerce::NumericType;
use crate::operators::Operator;

/// Errors raised while constructing or evaluating transforms and variables.
///
/// Construction-time failures (`Arity`) are reported immediately. Evaluation-time
/// failures (`DivisionByZero`, `UnsetValue`) are only raised once a transform is
/// actually evaluated, and leave the tree intact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VariableError {
    /// Error when a transform is built with the wrong number of operands
    #[error("operator `{operator}` takes {expected} operand(s), got {got}")]
    Arity {
        operator: Operator,
        expected: usize,
        got: usize,
    },
    /// Error when a dependency query is neither a variable nor a name
    #[error("unsupported dependency-query type: {0}")]
    UnsupportedQuery(&'static str),
    /// Error when a value cannot be coerced into the requested numeric type
    #[error("cannot convert {value} into {target}")]
    Coercion { value: String, target: NumericType },
    /// Error when a division resolves to a zero divisor
    #[error("division by zero")]
    DivisionByZero,
    /// Error when a variable without a value is evaluated
    #[error("variable `{0}` has no value")]
    UnsetValue(String),
}

/// Errors that can occur during conversion from the evalexpr AST to an operand tree.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Error when encountering an operator that is not supported by our implementation
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when encountering a function that is not supported by our implementation
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),
    /// Error when a node does not have the expected number of children
    #[error("Unexpected number of children: {0}")]
    Children(String),
    /// Error when a constant value is not numeric
    #[error("Expected numeric constant: {0}")]
    ConstOperator(String),
    /// Error when an identifier has no bound variable
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
}

/// High-level errors that can occur when working with parsed expressions.
///
/// This enum wraps lower-level errors from the parsing, conversion and
/// evaluation stages.
#[derive(Debug, Error)]
pub enum ExpressionError {
    /// Error when parsing the initial expression string with evalexpr
    #[error("Failed to build Evalexpr AST")]
    BuildEvalexprError(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when converting from the evalexpr AST to an operand tree
    #[error("Failed to build operand tree")]
    BuildTreeError(#[from] ConvertError),
    /// Error when evaluating or querying the expression
    #[error(transparent)]
    Variable(#[from] VariableError),
    /// Error when identifiers in the expression have no bound variable
    #[error("Variable not found in bindings: {0}")]
    VariableNotFound(String),
}
