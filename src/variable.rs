//! Named, mutable scalar parameters.
//!
//! A [`Variable`] is a shared handle: cloning it yields another handle to the same
//! parameter, so a variable placed in several transforms is seen by all of them.
//! Setting its value changes what every one of those transforms evaluates to on
//! the next call. Use [`Variable::deep_clone`] for an independent copy.
//!
//! Arithmetic on a variable never touches its value; it builds a [`Transform`].
//! The `*_in_place` methods are the only way to mutate a value arithmetically.
//!
//! # Example
//!
//! ```
//! use lazy_params::Variable;
//!
//! let x = Variable::new("x", 2.0);
//! let y = Variable::new("y", 3.0);
//! let e = &x * &y + 1.0;
//! assert_eq!(e.evaluate().unwrap(), 7.0);
//!
//! x.set_value(5.0);
//! assert_eq!(e.evaluate().unwrap(), 16.0);
//! ```

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use evalexpr::Value;

use crate::coerce::as_scalar;
use crate::errors::VariableError;
use crate::operators::Operator;
use crate::transform::{Dependency, Operand, Transform};

#[derive(Debug)]
struct Parameter {
    name: String,
    value: Cell<Option<f64>>,
}

/// A named scalar parameter usable as an operand of a transform.
#[derive(Clone)]
pub struct Variable(Rc<Parameter>);

impl Variable {
    /// Creates a variable holding `value`.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self::with_value(name, Some(value))
    }

    /// Creates a variable without a value. Evaluating it fails until a value is set.
    pub fn unset(name: impl Into<String>) -> Self {
        Self::with_value(name, None)
    }

    /// Creates a variable from a loosely typed value, coercing it to a float first.
    ///
    /// # Errors
    /// Returns `VariableError::Coercion` if the value is not convertible.
    pub fn from_value(name: impl Into<String>, value: &Value) -> Result<Self, VariableError> {
        Ok(Self::new(name, as_scalar(value)?))
    }

    fn with_value(name: impl Into<String>, value: Option<f64>) -> Self {
        Self(Rc::new(Parameter {
            name: name.into(),
            value: Cell::new(value),
        }))
    }

    /// Returns the variable's name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the current value, or `None` if the variable is unset.
    pub fn value(&self) -> Option<f64> {
        self.0.value.get()
    }

    /// Sets the value seen by every handle to this parameter.
    ///
    /// # Arguments
    /// * `value` - The new value
    pub fn set_value(&self, value: f64) {
        self.0.value.set(Some(value));
    }

    /// Removes the value, leaving the variable unset.
    pub fn clear_value(&self) {
        self.0.value.set(None);
    }

    /// Returns the current value, failing if the variable is unset.
    pub fn evaluate(&self) -> Result<f64, VariableError> {
        self.value()
            .ok_or_else(|| VariableError::UnsetValue(self.name().to_string()))
    }

    /// Whether `other` is a handle to the very same parameter.
    pub fn same(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }

    /// Creates an independent parameter with the same name and value.
    pub fn deep_clone(&self) -> Self {
        Self::with_value(self.name(), self.value())
    }

    /// Tests whether this variable matches a dependency query.
    ///
    /// A variable query matches when name and value are equal; a name query matches
    /// on the name alone.
    ///
    /// # Errors
    /// Returns `VariableError::UnsupportedQuery` for constant or transform queries.
    pub fn depends_on<'a>(&self, query: impl Into<Dependency<'a>>) -> Result<bool, VariableError> {
        match query.into() {
            Dependency::Variable(v) => Ok(self == v),
            Dependency::Name(name) => Ok(self.name() == name),
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

    /// Adds `other` to the stored value.
    ///
    /// # Returns
    /// The variable itself, so calls can be chained.
    ///
    /// # Errors
    /// Returns `VariableError::UnsetValue` if the variable has no value. The same
    /// holds for the other `*_in_place` methods.
    pub fn add_in_place(&self, other: f64) -> Result<&Self, VariableError> {
        self.update(|v| Ok(v + other))
    }

    pub fn sub_in_place(&self, other: f64) -> Result<&Self, VariableError> {
        self.update(|v| Ok(v - other))
    }

    pub fn mul_in_place(&self, other: f64) -> Result<&Self, VariableError> {
        self.update(|v| Ok(v * other))
    }

    /// Divides the stored value by `other`. A zero divisor gives
    /// `VariableError::DivisionByZero` and leaves the value untouched.
    pub fn div_in_place(&self, other: f64) -> Result<&Self, VariableError> {
        self.update(|v| {
            if other == 0.0 {
                Err(VariableError::DivisionByZero)
            } else {
                Ok(v / other)
            }
        })
    }

    pub fn pow_in_place(&self, other: f64) -> Result<&Self, VariableError> {
        self.update(|v| Ok(v.powf(other)))
    }

    fn update(
        &self,
        f: impl FnOnce(f64) -> Result<f64, VariableError>,
    ) -> Result<&Self, VariableError> {
        let updated = f(self.evaluate()?)?;
        self.set_value(updated);
        Ok(self)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.value() == other.value()
    }
}

impl PartialEq<f64> for Variable {
    fn eq(&self, other: &f64) -> bool {
        self.value() == Some(*other)
    }
}

impl PartialOrd<f64> for Variable {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value()?.partial_cmp(other)
    }
}

/// Orders by value. Equal values under different names are incomparable, since
/// such variables are not equal.
impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match self.value()?.partial_cmp(&other.value()?)? {
            Ordering::Equal => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_access() {
        let x = Variable::new("x", 1.5);
        assert_eq!(x.name(), "x");
        assert_eq!(x.value(), Some(1.5));
        x.set_value(-2.0);
        assert_eq!(x.evaluate().unwrap(), -2.0);

        x.clear_value();
        assert_eq!(x.evaluate(), Err(VariableError::UnsetValue("x".to_string())));
    }

    #[test]
    fn test_handles_share_value() {
        let x = Variable::new("x", 1.0);
        let handle = x.clone();
        handle.set_value(4.0);
        assert_eq!(x.value(), Some(4.0));
        assert!(x.same(&handle));

        let copy = x.deep_clone();
        assert!(!x.same(&copy));
        assert_eq!(copy, x);
        copy.set_value(9.0);
        assert_eq!(x.value(), Some(4.0));
    }

    #[test]
    fn test_equality_compares_name_and_value() {
        assert_eq!(Variable::new("a", 1.0), Variable::new("a", 1.0));
        assert_ne!(Variable::new("a", 1.0), Variable::new("b", 1.0));
        assert_ne!(Variable::new("a", 1.0), Variable::new("a", 2.0));
        assert_eq!(Variable::unset("a"), Variable::unset("a"));
    }

    #[test]
    fn test_ordering_against_scalars() {
        let x = Variable::new("x", 2.0);
        assert!(x < 3.0);
        assert!(x > 1.0);
        assert!(x >= 2.0);
        assert!(x <= 2.0);
        assert!(x == 2.0);

        let unset = Variable::unset("u");
        assert!(!(unset < 3.0));
        assert!(!(unset >= 3.0));
    }

    #[test]
    fn test_ordering_between_variables() {
        let x = Variable::new("x", 2.0);
        let y = Variable::new("y", 3.0);
        assert!(x < y);
        assert!(y > x);
        assert!(x <= x.clone());
        assert_eq!(x.partial_cmp(&x.deep_clone()), Some(Ordering::Equal));

        // Same value under another name is neither equal nor ordered
        let twin = Variable::new("z", 2.0);
        assert_eq!(x.partial_cmp(&twin), None);
        assert!(!(x <= twin));
        assert!(!(x >= twin));

        let unset = Variable::unset("u");
        assert_eq!(x.partial_cmp(&unset), None);
        assert_eq!(unset.partial_cmp(&Variable::unset("u")), Some(Ordering::Equal));

        y.set_value(1.0);
        assert!(x > y);
    }

    #[test]
    fn test_in_place_arithmetic() {
        let x = Variable::new("x", 2.0);
        x.add_in_place(3.0).unwrap();
        assert_eq!(x.value(), Some(5.0));
        x.sub_in_place(1.0).unwrap().mul_in_place(2.0).unwrap();
        assert_eq!(x.value(), Some(8.0));
        x.div_in_place(4.0).unwrap();
        assert_eq!(x.value(), Some(2.0));
        x.pow_in_place(3.0).unwrap();
        assert_eq!(x.value(), Some(8.0));

        assert_eq!(x.div_in_place(0.0), Err(VariableError::DivisionByZero));
        assert_eq!(x.value(), Some(8.0));

        let unset = Variable::unset("u");
        assert!(unset.add_in_place(1.0).is_err());
    }

    #[test]
    fn test_in_place_does_not_build_trees() {
        let x = Variable::new("x", 1.0);
        let e = &x + 1.0;
        x.add_in_place(1.0).unwrap();
        assert_eq!(e.evaluate().unwrap(), 3.0);
    }

    #[test]
    fn test_depends_on() {
        let x = Variable::new("x", 1.0);
        assert!(x.depends_on(&x).unwrap());
        assert!(x.depends_on(&Variable::new("x", 1.0)).unwrap());
        assert!(!x.depends_on(&Variable::new("y", 1.0)).unwrap());
        assert!(x.depends_on("x").unwrap());
        assert!(!x.depends_on("y").unwrap());

        assert_eq!(
            x.depends_on(2.0),
            Err(VariableError::UnsupportedQuery("constant"))
        );
        let t = &x + 1.0;
        assert_eq!(
            x.depends_on(&t),
            Err(VariableError::UnsupportedQuery("transform"))
        );
    }

    #[test]
    fn test_from_value() {
        let x = Variable::from_value("x", &Value::from("2.5")).unwrap();
        assert_eq!(x.value(), Some(2.5));
        let n = Variable::from_value("n", &Value::Int(3)).unwrap();
        assert_eq!(n.value(), Some(3.0));
        assert!(Variable::from_value("bad", &Value::Empty).is_err());
    }

    #[test]
    fn test_formatting() {
        let x = Variable::new("theta", 0.5);
        assert_eq!(x.to_string(), "theta");
        assert_eq!(
            format!("{x:?}"),
            "Variable { name: \"theta\", value: Some(0.5) }"
        );
    }
}
