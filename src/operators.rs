//! Operator functions applied when a transform is evaluated.
//!
//! Every function resolves its operands through [`resolve`] before applying the
//! scalar operation, so constants, variables and nested transforms are handled
//! uniformly. Nothing here runs at construction time: a zero divisor is only
//! reported once a transform is actually evaluated.

use std::fmt;

use crate::errors::VariableError;
use crate::transform::Operand;

/// The operation stored in a transform node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Inverse,
}

impl Operator {
    /// Number of operands the operator takes.
    pub fn arity(self) -> usize {
        match self {
            Operator::Inverse => 1,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Pow => 2,
        }
    }

    /// Infix symbol used when displaying binary operators.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Inverse => "inv",
        }
    }

    /// Checks that `got` operands match the operator's arity.
    pub fn check_arity(self, got: usize) -> Result<(), VariableError> {
        if got == self.arity() {
            Ok(())
        } else {
            Err(VariableError::Arity {
                operator: self,
                expected: self.arity(),
                got,
            })
        }
    }

    /// Applies the operator to `operands`, resolving each of them first.
    ///
    /// # Errors
    /// Returns `VariableError::Arity` if the operand count is wrong, and any error
    /// raised while resolving the operands or applying the operation.
    pub fn call(self, operands: &[Operand]) -> Result<f64, VariableError> {
        self.check_arity(operands.len())?;
        match self {
            Operator::Add => add(&operands[0], &operands[1]),
            Operator::Sub => sub(&operands[0], &operands[1]),
            Operator::Mul => mul(&operands[0], &operands[1]),
            Operator::Div => div(&operands[0], &operands[1]),
            Operator::Pow => pow(&operands[0], &operands[1]),
            Operator::Inverse => inverse(&operands[0]),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Obtains the current scalar value of an operand.
///
/// Variables and transforms are evaluated; constants are returned as they are.
pub fn resolve(operand: &Operand) -> Result<f64, VariableError> {
    match operand {
        Operand::Constant(c) => Ok(*c),
        Operand::Parameter(v) => v.evaluate(),
        Operand::Node(t) => t.evaluate(),
    }
}

/// Adds two operands.
///
/// # Arguments
/// * `l` - Left operand
/// * `r` - Right operand
///
/// # Returns
/// The sum of the resolved values, or the error raised while resolving either side.
pub fn add(l: &Operand, r: &Operand) -> Result<f64, VariableError> {
    Ok(resolve(l)? + resolve(r)?)
}

/// Subtracts `r` from `l`.
pub fn sub(l: &Operand, r: &Operand) -> Result<f64, VariableError> {
    Ok(resolve(l)? - resolve(r)?)
}

/// Multiplies two operands.
pub fn mul(l: &Operand, r: &Operand) -> Result<f64, VariableError> {
    Ok(resolve(l)? * resolve(r)?)
}

/// Divides `l` by `r`, failing if `r` resolves to zero.
pub fn div(l: &Operand, r: &Operand) -> Result<f64, VariableError> {
    let lv = resolve(l)?;
    let rv = resolve(r)?;
    if rv == 0.0 {
        tracing::debug!(dividend = lv, "division by zero during evaluation");
        return Err(VariableError::DivisionByZero);
    }
    Ok(lv / rv)
}

/// Raises `l` to the power `r`.
///
/// Invalid combinations (negative base with a fractional exponent) yield NaN,
/// as `f64::powf` does.
pub fn pow(l: &Operand, r: &Operand) -> Result<f64, VariableError> {
    Ok(resolve(l)?.powf(resolve(r)?))
}

/// Computes `1 / l`, failing if `l` resolves to zero.
pub fn inverse(l: &Operand) -> Result<f64, VariableError> {
    let lv = resolve(l)?;
    if lv == 0.0 {
        tracing::debug!("inverse of zero during evaluation");
        return Err(VariableError::DivisionByZero);
    }
    Ok(1.0 / lv)
}
