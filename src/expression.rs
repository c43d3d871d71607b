//! Parameter expressions parsed from text.
//!
//! An [`Expression`] keeps the source string together with the operand tree built
//! from it. Identifiers in the text are bound to existing [`Variable`]s, so the
//! expression stays live: it evaluates with whatever values those variables hold
//! at the time of the call.
//!
//! # Example
//!
//! ```
//! use lazy_params::{Expression, Variable};
//!
//! let theta = Variable::new("theta", 0.5);
//! let phi = Variable::new("phi", 2.0);
//! let expr = Expression::new("theta * phi ^ 2", &[theta.clone(), phi]).unwrap();
//! assert_eq!(expr.eval().unwrap(), 2.0);
//!
//! theta.set_value(1.0);
//! assert_eq!(expr.eval().unwrap(), 4.0);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use colored::Colorize;
use evalexpr::{build_operator_tree, DefaultNumericTypes, Node, Operator};
use itertools::Itertools;

use crate::convert::build_operand;
use crate::errors::ExpressionError;
use crate::transform::{Dependency, Operand};
use crate::variable::Variable;

/// A parsed expression bound to a set of variables.
#[derive(Clone)]
pub struct Expression {
    expression_str: String,
    operand: Operand,
    bindings: Vec<Variable>,
}

impl Expression {
    /// Parses `expression_str` and binds its identifiers to `bindings` by name.
    ///
    /// When several bindings share a name, the first one is used. Bindings that do
    /// not occur in the text are kept but contribute nothing.
    ///
    /// # Errors
    /// Returns `ExpressionError::VariableNotFound` listing every identifier without a
    /// binding, or the parse/conversion error if the text is not a supported
    /// arithmetic expression.
    pub fn new(
        expression_str: impl Into<String>,
        bindings: &[Variable],
    ) -> Result<Self, ExpressionError> {
        let expression_str = expression_str.into();
        let node = build_operator_tree::<DefaultNumericTypes>(&expression_str)?;

        let mut by_name: HashMap<String, Variable> = HashMap::new();
        for variable in bindings {
            by_name
                .entry(variable.name().to_string())
                .or_insert_with(|| variable.clone());
        }

        let unbound: Vec<String> = extract_symbols(&node)
            .into_iter()
            .filter(|symbol| !by_name.contains_key(symbol))
            .sorted()
            .collect();
        if !unbound.is_empty() {
            tracing::debug!(expression = %expression_str, ?unbound, "unbound identifiers");
            return Err(ExpressionError::VariableNotFound(unbound.join(", ")));
        }

        let operand = build_operand(&node, &by_name)?;
        tracing::debug!(expression = %expression_str, tree = %operand, "parsed expression");

        Ok(Self {
            expression_str,
            operand,
            bindings: bindings.to_vec(),
        })
    }

    /// Evaluates the expression with the current variable values.
    pub fn eval(&self) -> Result<f64, ExpressionError> {
        Ok(self.operand.evaluate()?)
    }

    /// Returns the unique variables the expression depends on.
    pub fn variables(&self) -> Vec<Variable> {
        self.operand.variables()
    }

    /// Returns the names of the variables the expression depends on, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables()
            .iter()
            .map(|v| v.name().to_string())
            .unique()
            .sorted()
            .collect()
    }

    /// Tests whether the expression depends on a variable, or on a variable with the
    /// given name.
    ///
    /// # Errors
    /// Returns `ExpressionError::Variable` wrapping `VariableError::UnsupportedQuery`
    /// for constant or transform queries.
    pub fn depends_on<'a>(
        &self,
        query: impl Into<Dependency<'a>>,
    ) -> Result<bool, ExpressionError> {
        Ok(self.operand.depends_on(query)?)
    }

    /// Returns the operand tree built from the text. A bare identifier or number
    /// yields a parameter or constant rather than a transform.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Returns the variables passed to `new`, including unused ones.
    pub fn bindings(&self) -> &[Variable] {
        &self.bindings
    }

    /// Returns the source text.
    pub fn as_str(&self) -> &str {
        &self.expression_str
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}: {}", "Expression".cyan(), self.expression_str)?;
        writeln!(f, "    {}: {}", "Tree".cyan(), self.operand)?;
        writeln!(f, "    {}: {:?}", "Variables".cyan(), self.variables())?;
        writeln!(f, "}}")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.operand.evaluate() {
            Ok(v) => v.to_string().green(),
            Err(e) => e.to_string().red(),
        };
        write!(
            f,
            "{} = {} [{}]",
            self.expression_str,
            value,
            self.variable_names().join(", ")
        )
    }
}

/// Collects the identifiers read by an evalexpr AST.
pub fn extract_symbols(node: &Node) -> HashSet<String> {
    let mut symbols = HashSet::new();
    extract_symbols_from_node(node, &mut symbols);
    symbols
}

fn extract_symbols_from_node(node: &Node, symbols: &mut HashSet<String>) {
    match node.operator() {
        Operator::VariableIdentifierRead { identifier } => {
            symbols.insert(identifier.to_string());
        }
        _ => {
            for child in node.children() {
                extract_symbols_from_node(child, symbols);
            }
        }
    }
}
