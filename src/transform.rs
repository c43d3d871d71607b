//! Lazily evaluated expression trees over variables.
//!
//! This module defines the core tree types:
//!
//! - `Operand`: a tagged operand that is a constant, a variable or a nested transform
//! - `Transform`: an operator together with its operands
//! - `Dependency`: the query accepted by `depends_on`
//!
//! A transform is immutable once built and computes nothing until
//! [`Transform::evaluate`] is called. Every evaluation walks the whole tree again,
//! so the result always reflects the current values of the variables it holds.
//! Variables are shared, not copied, when they enter a tree.
//!
//! # Cloning
//! `Clone` is a shallow copy: the new tree holds handles to the same variables.
//! [`Transform::deep_clone`] copies the variables too. By default a variable that
//! appears in several places of one tree is copied once and the copy is reused in
//! each of those places; [`CloneMode::PerPath`] copies it once per occurrence.
//!
//! # Example
//!
//! ```
//! use lazy_params::prelude::*;
//!
//! let x = Variable::new("x", 2.0);
//! let e = x.pow(2.0) - &x;
//! assert_eq!(e.evaluate().unwrap(), 2.0);
//! assert_eq!(e.to_string(), "((x^2) - x)");
//! assert_eq!(e.variables(), vec![x]);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::VariableError;
use crate::operators::{self, Operator};
use crate::variable::Variable;

/// One operand of a transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A raw scalar
    Constant(f64),
    /// A shared variable
    Parameter(Variable),
    /// A nested transform
    Node(Transform),
}

/// How variables are treated by a deep clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneMode {
    /// Each distinct variable is copied once; repeated occurrences share the copy
    #[default]
    PreserveAliasing,
    /// Every occurrence of a variable gets its own copy
    PerPath,
}

/// A dependency query for `depends_on`.
///
/// Only `Variable` and `Name` queries are meaningful; the other kinds exist so
/// that an arbitrary operand can be passed and rejected with
/// `VariableError::UnsupportedQuery`.
#[derive(Debug, Clone, Copy)]
pub enum Dependency<'a> {
    Variable(&'a Variable),
    Name(&'a str),
    Constant(f64),
    Transform(&'a Transform),
}

impl Dependency<'_> {
    /// Short name of the query type, as reported in `UnsupportedQuery`.
    pub fn kind(&self) -> &'static str {
        match self {
            Dependency::Variable(_) => "variable",
            Dependency::Name(_) => "name",
            Dependency::Constant(_) => "constant",
            Dependency::Transform(_) => "transform",
        }
    }
}

impl<'a> From<&'a Variable> for Dependency<'a> {
    fn from(v: &'a Variable) -> Self {
        Dependency::Variable(v)
    }
}

impl<'a> From<&'a str> for Dependency<'a> {
    fn from(name: &'a str) -> Self {
        Dependency::Name(name)
    }
}

impl<'a> From<&'a String> for Dependency<'a> {
    fn from(name: &'a String) -> Self {
        Dependency::Name(name)
    }
}

impl From<f64> for Dependency<'_> {
    fn from(c: f64) -> Self {
        Dependency::Constant(c)
    }
}

impl<'a> From<&'a Transform> for Dependency<'a> {
    fn from(t: &'a Transform) -> Self {
        Dependency::Transform(t)
    }
}

impl<'a> From<&'a Operand> for Dependency<'a> {
    fn from(operand: &'a Operand) -> Self {
        match operand {
            Operand::Constant(c) => Dependency::Constant(*c),
            Operand::Parameter(v) => Dependency::Variable(v),
            Operand::Node(t) => Dependency::Transform(t),
        }
    }
}

impl Operand {
    /// Resolves the operand to its current scalar value.
    pub fn evaluate(&self) -> Result<f64, VariableError> {
        operators::resolve(self)
    }

    /// Returns the unique variables reachable from this operand.
    pub fn variables(&self) -> Vec<Variable> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    /// Tests whether this operand depends on `query`.
    ///
    /// Constants depend on nothing but still reject unsupported query kinds.
    pub fn depends_on<'a>(&self, query: impl Into<Dependency<'a>>) -> Result<bool, VariableError> {
        match self {
            Operand::Constant(_) => match query.into() {
                Dependency::Variable(_) | Dependency::Name(_) => Ok(false),
                other => Err(VariableError::UnsupportedQuery(other.kind())),
            },
            Operand::Parameter(v) => v.depends_on(query),
            Operand::Node(t) => t.depends_on(query),
        }
    }

    /// Builds `self ^ exponent`. Useful when the base is a plain constant.
    pub fn pow(self, exponent: impl Into<Operand>) -> Transform {
        Transform::binary(Operator::Pow, self, exponent.into())
    }

    /// Copies the operand, including every variable it references.
    pub fn deep_clone(&self) -> Operand {
        self.deep_clone_with(CloneMode::default())
    }

    /// Copies the operand with an explicit [`CloneMode`].
    pub fn deep_clone_with(&self, mode: CloneMode) -> Operand {
        self.copy_with(mode, &mut HashMap::new())
    }

    fn copy_with(&self, mode: CloneMode, clones: &mut HashMap<*const (), Variable>) -> Operand {
        match self {
            Operand::Constant(c) => Operand::Constant(*c),
            Operand::Parameter(v) => Operand::Parameter(match mode {
                CloneMode::PerPath => v.deep_clone(),
                CloneMode::PreserveAliasing => clones
                    .entry(v.identity())
                    .or_insert_with(|| v.deep_clone())
                    .clone(),
            }),
            Operand::Node(t) => Operand::Node(t.copy_with(mode, clones)),
        }
    }

    fn collect_variables(&self, found: &mut Vec<Variable>) {
        match self {
            Operand::Constant(_) => {}
            Operand::Parameter(v) => {
                if !found.contains(v) {
                    found.push(v.clone());
                }
            }
            Operand::Node(t) => t.collect_variables(found),
        }
    }
}

impl From<f64> for Operand {
    fn from(c: f64) -> Self {
        Operand::Constant(c)
    }
}

impl From<Variable> for Operand {
    fn from(v: Variable) -> Self {
        Operand::Parameter(v)
    }
}

impl From<&Variable> for Operand {
    fn from(v: &Variable) -> Self {
        Operand::Parameter(v.clone())
    }
}

impl From<Transform> for Operand {
    fn from(t: Transform) -> Self {
        Operand::Node(t)
    }
}

impl From<&Transform> for Operand {
    fn from(t: &Transform) -> Self {
        Operand::Node(t.clone())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(c) => write!(f, "{c}"),
            Operand::Parameter(v) => write!(f, "{v}"),
            Operand::Node(t) => write!(f, "{t}"),
        }
    }
}

/// An operator applied to a fixed list of operands.
#[derive(Debug, Clone)]
pub struct Transform {
    operator: Operator,
    operands: Vec<Operand>,
}

impl Transform {
    /// Creates a transform, checking the operand count against the operator's arity.
    ///
    /// # Errors
    /// Returns `VariableError::Arity` if the counts differ. Operands are never
    /// truncated or padded.
    ///
    /// # Example
    /// ```
    /// use lazy_params::prelude::*;
    ///
    /// let x = Variable::new("x", 4.0);
    /// let t = Transform::new(Operator::Inverse, vec![x.into()]).unwrap();
    /// assert_eq!(t.evaluate().unwrap(), 0.25);
    /// assert!(Transform::new(Operator::Add, vec![1.0.into()]).is_err());
    /// ```
    pub fn new(operator: Operator, operands: Vec<Operand>) -> Result<Self, VariableError> {
        if let Err(err) = operator.check_arity(operands.len()) {
            tracing::debug!(%operator, got = operands.len(), "rejected transform construction");
            return Err(err);
        }
        Ok(Self { operator, operands })
    }

    pub(crate) fn binary(operator: Operator, l: Operand, r: Operand) -> Self {
        debug_assert_eq!(operator.arity(), 2);
        Self {
            operator,
            operands: vec![l, r],
        }
    }

    pub(crate) fn unary(operator: Operator, operand: Operand) -> Self {
        debug_assert_eq!(operator.arity(), 1);
        Self {
            operator,
            operands: vec![operand],
        }
    }

    /// Returns the operator applied at this node.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the operands in the order they are resolved.
    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// Evaluates the tree with the current variable values.
    ///
    /// Operands are resolved left to right; the first error aborts the evaluation.
    pub fn evaluate(&self) -> Result<f64, VariableError> {
        tracing::trace!(operator = %self.operator, "evaluating transform");
        self.operator.call(&self.operands)
    }

    /// Returns the unique variables reachable from this transform.
    ///
    /// Variables are deduplicated by name and value, keeping the first one met in a
    /// left-to-right walk. Constants are ignored.
    pub fn variables(&self) -> Vec<Variable> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut Vec<Variable>) {
        for operand in &self.operands {
            operand.collect_variables(found);
        }
    }

    /// Tests whether the transform depends on a variable, or on a variable with the
    /// given name.
    ///
    /// # Errors
    /// Returns `VariableError::UnsupportedQuery` for constant or transform queries.
    pub fn depends_on<'a>(&self, query: impl Into<Dependency<'a>>) -> Result<bool, VariableError> {
        match query.into() {
            Dependency::Variable(v) => Ok(self.variables().contains(v)),
            Dependency::Name(name) => Ok(self.variables().iter().any(|v| v.name() == name)),
            other => Err(VariableError::UnsupportedQuery(other.kind())),
        }
    }

    /// Builds `self ^ exponent`.
    pub fn pow(&self, exponent: impl Into<Operand>) -> Transform {
        Transform::binary(Operator::Pow, self.into(), exponent.into())
    }

    /// Builds `1 / self`.
    pub fn inverse(&self) -> Transform {
        Transform::unary(Operator::Inverse, self.into())
    }

    /// Copies the whole tree, variables included, preserving aliasing.
    pub fn deep_clone(&self) -> Transform {
        self.deep_clone_with(CloneMode::default())
    }

    /// Copies the whole tree, variables included.
    ///
    /// # Arguments
    /// * `mode` - Whether a variable met several times becomes one copy or one copy
    ///   per occurrence
    ///
    /// # Returns
    /// A transform sharing no variable with `self`.
    pub fn deep_clone_with(&self, mode: CloneMode) -> Transform {
        self.copy_with(mode, &mut HashMap::new())
    }

    fn copy_with(&self, mode: CloneMode, clones: &mut HashMap<*const (), Variable>) -> Transform {
        Transform {
            operator: self.operator,
            operands: self
                .operands
                .iter()
                .map(|operand| operand.copy_with(mode, clones))
                .collect(),
        }
    }
}

/// Tests whether `obj` references `var`. Constants never do.
pub fn has_variable(obj: &Operand, var: &Variable) -> bool {
    obj.variables().contains(var)
}

/// Two transforms are equal when both evaluate to the same scalar.
impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.evaluate(), other.evaluate()), (Ok(a), Ok(b)) if a == b)
    }
}

impl PartialEq<f64> for Transform {
    fn eq(&self, other: &f64) -> bool {
        self.evaluate().is_ok_and(|v| v == *other)
    }
}

impl PartialOrd<f64> for Transform {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.evaluate().ok()?.partial_cmp(other)
    }
}

/// Orders two transforms by their evaluated values.
impl PartialOrd for Transform {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.evaluate().ok()?.partial_cmp(&other.evaluate().ok()?)
    }
}

impl PartialEq<Variable> for Transform {
    fn eq(&self, other: &Variable) -> bool {
        matches!((self.evaluate(), other.evaluate()), (Ok(a), Ok(b)) if a == b)
    }
}

impl PartialOrd<Variable> for Transform {
    fn partial_cmp(&self, other: &Variable) -> Option<Ordering> {
        self.evaluate().ok()?.partial_cmp(&other.evaluate().ok()?)
    }
}

impl PartialEq<Transform> for Variable {
    fn eq(&self, other: &Transform) -> bool {
        other == self
    }
}

impl PartialOrd<Transform> for Variable {
    fn partial_cmp(&self, other: &Transform) -> Option<Ordering> {
        other.partial_cmp(self).map(Ordering::reverse)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operator, self.operands.as_slice()) {
            (Operator::Pow, [l, r]) => write!(f, "({l}^{r})"),
            (op, [l, r]) => write!(f, "({l} {op} {r})"),
            (op, [operand]) => write!(f, "{op}({operand})"),
            (op, operands) => write!(f, "{op}{operands:?}"),
        }
    }
}

macro_rules! impl_arithmetic {
    (@op $lhs:ty, $trait:ident, $method:ident, $operator:expr) => {
        impl<R: Into<Operand>> $trait<R> for $lhs {
            type Output = Transform;

            fn $method(self, rhs: R) -> Transform {
                Transform::binary($operator, self.into(), rhs.into())
            }
        }

        impl $trait<$lhs> for f64 {
            type Output = Transform;

            fn $method(self, rhs: $lhs) -> Transform {
                Transform::binary($operator, Operand::Constant(self), rhs.into())
            }
        }
    };
    ($($lhs:ty),*) => {$(
        impl_arithmetic!(@op $lhs, Add, add, Operator::Add);
        impl_arithmetic!(@op $lhs, Sub, sub, Operator::Sub);
        impl_arithmetic!(@op $lhs, Mul, mul, Operator::Mul);
        impl_arithmetic!(@op $lhs, Div, div, Operator::Div);

        impl Neg for $lhs {
            type Output = Transform;

            fn neg(self) -> Transform {
                Transform::binary(Operator::Mul, self.into(), Operand::Constant(-1.0))
            }
        }
    )*};
}

impl_arithmetic!(Variable, &Variable, Transform, &Transform);
