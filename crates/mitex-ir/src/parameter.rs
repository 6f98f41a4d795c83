//! Symbolic gate angles and bound parameter vectors.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;
use std::ops;

/// A gate angle: either a number or an arithmetic expression over named
/// parameters.
///
/// Arithmetic through the operator impls folds constant operands eagerly, so
/// rewrites like `theta + pi` on a bound angle stay a plain [`Constant`].
///
/// [`Constant`]: ParameterExpression::Constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A numeric value.
    Constant(f64),
    /// A free parameter, referenced by name.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Sum.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Product.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Quotient.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// A numeric angle.
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    /// A free parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// π.
    pub fn pi() -> Self {
        Self::Pi
    }

    /// Whether any free parameter remains in the expression.
    pub fn is_symbolic(&self) -> bool {
        match self {
            Self::Symbol(_) => true,
            Self::Constant(_) | Self::Pi => false,
            Self::Neg(e) => e.is_symbolic(),
            Self::Add(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Numeric value, if the expression has no free parameters.
    pub fn as_f64(&self) -> Option<f64> {
        self.evaluate(&FxHashMap::default())
    }

    /// Evaluate with the given parameter values. Returns `None` when a symbol
    /// has no value or a division by zero occurs.
    pub fn evaluate(&self, values: &FxHashMap<String, f64>) -> Option<f64> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Pi => Some(PI),
            Self::Symbol(name) => values.get(name).copied(),
            Self::Neg(e) => e.evaluate(values).map(|v| -v),
            Self::Add(a, b) => Some(a.evaluate(values)? + b.evaluate(values)?),
            Self::Mul(a, b) => Some(a.evaluate(values)? * b.evaluate(values)?),
            Self::Div(a, b) => {
                let d = b.evaluate(values)?;
                (d != 0.0).then_some(a.evaluate(values)? / d).filter(|v| v.is_finite())
            }
        }
    }

    /// Names of the free parameters, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_symbols(&mut |name| {
            out.insert(name.to_string());
        });
        out
    }

    /// Call `f` once per symbol occurrence.
    pub fn visit_symbols(&self, f: &mut impl FnMut(&str)) {
        match self {
            Self::Symbol(name) => f(name),
            Self::Constant(_) | Self::Pi => {}
            Self::Neg(e) => e.visit_symbols(f),
            Self::Add(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
                a.visit_symbols(f);
                b.visit_symbols(f);
            }
        }
    }

    /// Replace every symbol found in `values` by its number and fold what
    /// became constant.
    pub fn substitute(&self, values: &FxHashMap<String, f64>) -> Self {
        match self {
            Self::Symbol(name) => match values.get(name) {
                Some(v) => Self::Constant(*v),
                None => self.clone(),
            },
            Self::Constant(_) | Self::Pi => self.clone(),
            Self::Neg(e) => -e.substitute(values),
            Self::Add(a, b) => a.substitute(values) + b.substitute(values),
            Self::Mul(a, b) => a.substitute(values) * b.substitute(values),
            Self::Div(a, b) => a.substitute(values) / b.substitute(values),
        }
    }

    /// Half of this angle.
    pub fn half(&self) -> Self {
        self.clone() / Self::Constant(2.0)
    }

    /// Whether the angle is numerically a multiple of 2π within `tol`.
    pub fn is_zero_rotation(&self, tol: f64) -> bool {
        self.as_f64().is_some_and(|v| {
            let r = v.rem_euclid(2.0 * PI);
            r < tol || 2.0 * PI - r < tol
        })
    }

    fn fold(
        lhs: Self,
        rhs: Self,
        op: fn(f64, f64) -> Option<f64>,
        build: fn(Box<Self>, Box<Self>) -> Self,
    ) -> Self {
        match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => match op(a, b) {
                Some(v) => Self::Constant(v),
                None => build(Box::new(lhs), Box::new(rhs)),
            },
            _ => build(Box::new(lhs), Box::new(rhs)),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(v) => write!(f, "{v}"),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::Pi => write!(f, "pi"),
            Self::Neg(e) => write!(f, "-({e})"),
            Self::Add(a, b) => write!(f, "({a} + {b})"),
            Self::Mul(a, b) => write!(f, "{a}*{b}"),
            Self::Div(a, b) => write!(f, "{a}/{b}"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<&str> for ParameterExpression {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }
}

impl ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::fold(self, rhs, |a, b| Some(a + b), Self::Add)
    }
}

impl ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::fold(self, rhs, |a, b| Some(a * b), Self::Mul)
    }
}

impl ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::fold(self, rhs, |a, b| (b != 0.0).then_some(a / b), Self::Div)
    }
}

impl ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Constant(v) => Self::Constant(-v),
            Self::Pi => Self::Constant(-PI),
            Self::Neg(inner) => *inner,
            other => Self::Neg(Box::new(other)),
        }
    }
}

/// Concrete values for a circuit's free parameters, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterVector(Vec<f64>);

impl ParameterVector {
    /// Wrap a vector of values.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// An empty vector, for circuits without free parameters.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no values are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Consume into the underlying vector.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ParameterVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for ParameterVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
