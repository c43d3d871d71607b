//! Lazily evaluated parameter expressions.
//!
//! This crate lets named, mutable scalar parameters be combined with ordinary
//! arithmetic operators into expression trees that are evaluated on demand. A
//! parameterized quantity is built once and re-evaluated as often as needed; it
//! always reflects the current values of its variables and can report which
//! variables it depends on.
//!
//! # Features
//!
//! - Shared, mutable `Variable`s that any number of trees can reference
//! - Operator overloading (`+ - * /`, unary `-`) plus `pow` and `inverse`
//! - Deferred evaluation with no caching
//! - Dependency extraction and dependency queries
//! - Deep cloning with configurable aliasing
//! - Parsing of infix text into live trees via [evalexpr](https://github.com/ISibboI/evalexpr)
//!
//! # Example
//!
//! ```rust
//! use lazy_params::prelude::*;
//!
//! let x = Variable::new("x", 2.0);
//! let y = Variable::new("y", 3.0);
//! let e = &x * &y + 1.0;
//!
//! assert_eq!(e.evaluate().unwrap(), 7.0);
//! x.set_value(5.0);
//! assert_eq!(e.evaluate().unwrap(), 16.0);
//! assert_eq!(e.variables(), vec![x, y]);
//! ```

pub use expression::Expression;
pub use transform::Transform;
pub use variable::Variable;

pub mod prelude {
    pub use crate::errors::{ExpressionError, VariableError};
    pub use crate::expression::Expression;
    pub use crate::operators::Operator;
    pub use crate::transform::{has_variable, CloneMode, Dependency, Operand, Transform};
    pub use crate::variable::Variable;
}

/// Numeric coercion of loosely typed values
pub mod coerce;
/// Conversion from parsed expressions to operand trees
pub mod convert;
/// Error types for the various failure modes
pub mod errors;
/// Expressions parsed from text and bound to variables
pub mod expression;
/// Operator functions applied during evaluation
pub mod operators;
/// Expression tree representation and lazy evaluation
pub mod transform;
/// Named mutable parameters
pub mod variable;
