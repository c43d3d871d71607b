//! Conversion of evalexpr AST nodes into live operand trees.
//!
//! The parser only knows identifiers; this module looks each identifier up in a
//! map of bound variables and places the variable handle itself in the tree, so
//! the resulting transform follows later changes to those variables.
//!
//! The main entry point is `build_operand`, which recursively traverses the
//! evalexpr AST.

use std::collections::HashMap;

use evalexpr::{Node, Operator as EvalOperator};

use crate::errors::ConvertError;
use crate::operators::Operator;
use crate::transform::{Operand, Transform};
use crate::variable::Variable;

/// Converts an evalexpr AST node into an operand.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
/// * `bindings` - Variables by name; identifiers resolve to these handles
///
/// # Supported syntax
/// * Arithmetic: `+`, `-`, `*`, `/`, `^`, unary `-`
/// * Numeric constants (integers are widened to floats)
/// * Identifiers bound in `bindings`
/// * `inv(x)` for `1 / x`
pub fn build_operand(
    node: &Node,
    bindings: &HashMap<String, Variable>,
) -> Result<Operand, ConvertError> {
    match node.operator() {
        EvalOperator::Add => fold_children(node, Operator::Add, bindings),
        EvalOperator::Mul => fold_children(node, Operator::Mul, bindings),
        EvalOperator::Sub => binary(node, Operator::Sub, bindings),
        EvalOperator::Div => binary(node, Operator::Div, bindings),
        EvalOperator::Exp => binary(node, Operator::Pow, bindings),
        // Only numeric literals; strings and booleans are not coerced
        EvalOperator::Const { value } => match value {
            evalexpr::Value::Float(f) => Ok(Operand::Constant(*f)),
            evalexpr::Value::Int(i) => Ok(Operand::Constant(*i as f64)),
            _ => Err(ConvertError::ConstOperator(format!("{value:?}"))),
        },
        EvalOperator::VariableIdentifierRead { identifier } => bindings
            .get(identifier.as_str())
            .map(|v| Operand::Parameter(v.clone()))
            .ok_or_else(|| ConvertError::VariableNotFound(identifier.to_string())),
        EvalOperator::Neg => {
            let [child] = children::<1>(node)?;
            Ok(Operand::Node(Transform::binary(
                Operator::Mul,
                build_operand(child, bindings)?,
                Operand::Constant(-1.0),
            )))
        }
        EvalOperator::FunctionIdentifier { identifier } => match identifier.as_str() {
            "inv" => {
                let [child] = children::<1>(node)?;
                Ok(Operand::Node(Transform::unary(
                    Operator::Inverse,
                    build_operand(child, bindings)?,
                )))
            }
            _ => Err(ConvertError::UnsupportedFunction(identifier.to_string())),
        },
        EvalOperator::RootNode => {
            let [child] = children::<1>(node)?;
            build_operand(child, bindings)
        }
        other => Err(ConvertError::UnsupportedOperator(format!("{other:?}"))),
    }
}

/// Folds two or more children into a left-nested chain of binary transforms.
fn fold_children(
    node: &Node,
    operator: Operator,
    bindings: &HashMap<String, Variable>,
) -> Result<Operand, ConvertError> {
    let children = node.children();
    let (first, rest) = children
        .split_first()
        .ok_or_else(|| ConvertError::Children(format!("`{operator}` without operands")))?;
    if rest.is_empty() {
        return Err(ConvertError::Children(format!(
            "`{operator}` expects at least 2 operands"
        )));
    }
    rest.iter()
        .try_fold(build_operand(first, bindings)?, |acc, child| {
            Ok(Operand::Node(Transform::binary(
                operator,
                acc,
                build_operand(child, bindings)?,
            )))
        })
}

fn binary(
    node: &Node,
    operator: Operator,
    bindings: &HashMap<String, Variable>,
) -> Result<Operand, ConvertError> {
    let [l, r] = children::<2>(node)?;
    Ok(Operand::Node(Transform::binary(
        operator,
        build_operand(l, bindings)?,
        build_operand(r, bindings)?,
    )))
}

fn children<const N: usize>(node: &Node) -> Result<[&Node; N], ConvertError> {
    let children = node.children();
    let refs: Vec<&Node> = children.iter().collect();
    refs.try_into().map_err(|_| {
        ConvertError::Children(format!(
            "expected {} child node(s) for {:?}, got {}",
            N,
            node.operator(),
            children.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalexpr::{build_operator_tree, DefaultNumericTypes};

    fn parse(text: &str, vars: &[&Variable]) -> Result<Operand, ConvertError> {
        let node = build_operator_tree::<DefaultNumericTypes>(text).unwrap();
        let bindings = vars
            .iter()
            .map(|v| (v.name().to_string(), (*v).clone()))
            .collect();
        build_operand(&node, &bindings)
    }

    #[test]
    fn test_arithmetic() {
        let x = Variable::new("x", 2.0);
        let y = Variable::new("y", 3.0);
        let e = parse("x*y + 1", &[&x, &y]).unwrap();
        assert_eq!(e.evaluate().unwrap(), 7.0);
        assert_eq!(e.to_string(), "((x * y) + 1)");

        let e = parse("(x - y) / 2 ^ 2", &[&x, &y]).unwrap();
        assert_eq!(e.evaluate().unwrap(), -0.25);
    }

    #[test]
    fn test_bound_variables_stay_live() {
        let x = Variable::new("x", 2.0);
        let e = parse("-x + inv(x)", &[&x]).unwrap();
        assert_eq!(e.evaluate().unwrap(), -1.5);
        x.set_value(4.0);
        assert_eq!(e.evaluate().unwrap(), -3.75);
        assert!(e.variables()[0].same(&x));
    }

    #[test]
    fn test_bare_operands() {
        let x = Variable::new("x", 2.0);
        assert_eq!(parse("x", &[&x]).unwrap(), Operand::Parameter(x.clone()));
        assert_eq!(parse("3", &[]).unwrap(), Operand::Constant(3.0));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("a + 1", &[]),
            Err(ConvertError::VariableNotFound(name)) if name == "a"
        ));
        assert!(matches!(
            parse("sqrt(4)", &[]),
            Err(ConvertError::UnsupportedFunction(_))
        ));
        assert!(matches!(
            parse("1 == 1", &[]),
            Err(ConvertError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            parse("\"text\" + 1", &[]),
            Err(ConvertError::ConstOperator(_))
        ));
    }

    #[test]
    fn test_non_numeric_literals_rejected() {
        let a = Variable::new("a", 1.0);
        // Literals that would coerce to numbers are still rejected
        assert!(matches!(
            parse("\"2.5\" + a", &[&a]),
            Err(ConvertError::ConstOperator(_))
        ));
        assert!(matches!(
            parse("true + a", &[&a]),
            Err(ConvertError::ConstOperator(_))
        ));
        assert_eq!(parse("2 + a", &[&a]).unwrap().evaluate().unwrap(), 3.0);
    }
}
