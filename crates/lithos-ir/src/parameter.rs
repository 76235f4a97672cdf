//! Parameter expressions for variational circuits.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{IrError, IrResult};

/// A symbolic or concrete rotation angle.
///
/// Ansatz angles are always linear in the variational parameters, so the
/// expression language only needs scaling and sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A symbolic parameter.
    Symbol(String),
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// `factor · symbol`, the shape every ansatz rotation angle takes.
    pub fn scaled_symbol(factor: f64, name: impl Into<String>) -> Self {
        ParameterExpression::Mul(
            Box::new(ParameterExpression::Constant(factor)),
            Box::new(ParameterExpression::Symbol(name.into())),
        )
    }

    /// Check if this expression contains any symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Try to evaluate as a concrete f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// Evaluate against a binding table.
    pub fn evaluate(&self, bindings: &ParameterBindings) -> IrResult<f64> {
        match self {
            ParameterExpression::Constant(v) => Ok(*v),
            ParameterExpression::Symbol(name) => bindings
                .get(name)
                .ok_or_else(|| IrError::UnboundParameter(name.clone())),
            ParameterExpression::Neg(e) => Ok(-e.evaluate(bindings)?),
            ParameterExpression::Add(a, b) => Ok(a.evaluate(bindings)? + b.evaluate(bindings)?),
            ParameterExpression::Mul(a, b) => Ok(a.evaluate(bindings)? * b.evaluate(bindings)?),
        }
    }

    /// Get all symbol names in this expression.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.visit_symbols(&mut |name| {
            set.insert(name.to_string());
        });
        set
    }

    /// Call `f` for every symbol occurrence, left to right.
    pub(crate) fn visit_symbols(&self, f: &mut impl FnMut(&str)) {
        match self {
            ParameterExpression::Constant(_) => {}
            ParameterExpression::Symbol(name) => f(name),
            ParameterExpression::Neg(e) => e.visit_symbols(f),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.visit_symbols(f);
                b.visit_symbols(f);
            }
        }
    }

    /// Bind a symbol to a value, returning a new expression.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        match self {
            ParameterExpression::Symbol(n) if n == name => ParameterExpression::Constant(value),
            ParameterExpression::Constant(_) | ParameterExpression::Symbol(_) => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind(name, value))),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

/// Values assigned to circuit parameters for one evaluation.
#[derive(Debug, Clone, Default)]
pub struct ParameterBindings {
    values: FxHashMap<String, f64>,
}

impl ParameterBindings {
    /// Empty table, for circuits without parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip an ordered parameter list with a value slice.
    pub fn from_values(names: &[String], values: &[f64]) -> IrResult<Self> {
        if names.len() != values.len() {
            return Err(IrError::ParameterCountMismatch {
                expected: names.len(),
                got: values.len(),
            });
        }
        let values = names
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Ok(Self { values })
    }

    /// Set or overwrite one value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
    }

    #[test]
    fn test_symbol() {
        let p = ParameterExpression::symbol("theta");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(p.symbols().contains("theta"));
    }

    #[test]
    fn test_bind() {
        let p = ParameterExpression::scaled_symbol(-2.0, "theta");
        let bound = p.bind("theta", 0.5);
        assert!(!bound.is_symbolic());
        assert_eq!(bound.as_f64(), Some(-1.0));
    }

    #[test]
    fn test_evaluate_with_bindings() {
        let names = vec!["a".to_string(), "b".to_string()];
        let bindings = ParameterBindings::from_values(&names, &[2.0, 3.0]).unwrap();
        let expr = ParameterExpression::symbol("a") * ParameterExpression::symbol("b")
            + -ParameterExpression::constant(1.0);
        assert_eq!(expr.evaluate(&bindings).unwrap(), 5.0);
    }

    #[test]
    fn test_unbound_symbol_is_error() {
        let expr = ParameterExpression::symbol("missing");
        let err = expr.evaluate(&ParameterBindings::new()).unwrap_err();
        assert!(matches!(err, IrError::UnboundParameter(name) if name == "missing"));
    }

    #[test]
    fn test_binding_count_mismatch() {
        let names = vec!["a".to_string()];
        assert!(ParameterBindings::from_values(&names, &[1.0, 2.0]).is_err());
    }
}
