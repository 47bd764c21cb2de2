use std::fmt;

use num::Float;

use crate::ops::{AndOp, OrOp};
use crate::terms::TermName;
use crate::variable::Variable;

/// "`variable` is `term`", referencing both by name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Proposition {
    pub variable: String,
    pub term: String,
}

impl Proposition {
    pub fn new(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            term: term.into(),
        }
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is {}", self.variable, self.term)
    }
}

/// A rule premise: propositions combined with binary `And` / `Or` nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr<P> {
    Is(P),
    And(Box<Expr<P>>, Box<Expr<P>>),
    Or(Box<Expr<P>>, Box<Expr<P>>),
}

impl Expr<Proposition> {
    pub fn is(variable: impl Into<String>, term: impl Into<String>) -> Self {
        Expr::Is(Proposition::new(variable, term))
    }
}

impl<P> Expr<P> {
    pub fn or(self, rhs: Expr<P>) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    pub fn and(self, rhs: Expr<P>) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    /// Every leaf, left to right.
    pub fn propositions(&self) -> Vec<&P> {
        fn walk<'p, P>(expr: &'p Expr<P>, out: &mut Vec<&'p P>) {
            match expr {
                Expr::Is(prop) => out.push(prop),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    walk(lhs, out);
                    walk(rhs, out);
                },
            }
        }

        let mut props = Vec::new();

        walk(self, &mut props);

        props
    }

    /// Rebuilds the same tree with every leaf mapped through `f`, stopping at the first error.
    pub(crate) fn try_map<Q, E>(&self, f: &mut impl FnMut(&P) -> Result<Q, E>) -> Result<Expr<Q>, E> {
        Ok(match self {
            Expr::Is(prop) => Expr::Is(f(prop)?),
            Expr::And(lhs, rhs) => Expr::And(Box::new(lhs.try_map(f)?), Box::new(rhs.try_map(f)?)),
            Expr::Or(lhs, rhs) => Expr::Or(Box::new(lhs.try_map(f)?), Box::new(rhs.try_map(f)?)),
        })
    }

    /// Depth first fold of the tree: leaves are looked up through `degree`,
    /// `And` nodes combine with `and_op` and `Or` nodes with `or_op`.
    pub(crate) fn eval<F: Float>(&self, degree: &impl Fn(&P) -> F, and_op: AndOp, or_op: OrOp) -> F {
        match self {
            Expr::Is(prop) => degree(prop),
            Expr::And(lhs, rhs) => and_op.call(lhs.eval(degree, and_op, or_op), rhs.eval(degree, and_op, or_op)),
            Expr::Or(lhs, rhs) => or_op.call(lhs.eval(degree, and_op, or_op), rhs.eval(degree, and_op, or_op)),
        }
    }
}

impl<P: fmt::Display> fmt::Display for Expr<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand<P: fmt::Display>(expr: &Expr<P>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match expr {
                Expr::Is(_) => write!(f, "{expr}"),
                _ => write!(f, "({expr})"),
            }
        }

        match self {
            Expr::Is(prop) => write!(f, "{prop}"),
            Expr::And(lhs, rhs) => {
                operand(lhs, f)?;
                f.write_str(" and ")?;
                operand(rhs, f)
            },
            Expr::Or(lhs, rhs) => {
                operand(lhs, f)?;
                f.write_str(" or ")?;
                operand(rhs, f)
            },
        }
    }
}

impl<I: TermName> Variable<I> {
    pub fn term(self, term: I) -> Proposition {
        Proposition::new(self.name, term.name())
    }

    pub fn is(self, term: I) -> Expr<Proposition> {
        Expr::Is(self.term(term))
    }
}

#[test]
fn test_propositions_and_display() {
    let expr = Expr::is("temperature", "normal")
        .and(Expr::is("pressure", "adequate"))
        .or(Expr::is("temperature", "hot"));

    assert_eq!(
        expr.propositions(),
        vec![
            &Proposition::new("temperature", "normal"),
            &Proposition::new("pressure", "adequate"),
            &Proposition::new("temperature", "hot"),
        ]
    );
    assert_eq!(
        expr.to_string(),
        "(temperature is normal and pressure is adequate) or temperature is hot"
    );
}

#[test]
fn test_eval_min_max() {
    let expr = Expr::Is(0.2).and(Expr::Is(0.7)).or(Expr::Is(0.4).and(Expr::Is(0.9)));
    let strength = expr.eval(&|degree: &f64| *degree, AndOp::Min, OrOp::Max);

    assert_eq!(strength, 0.4);

    let strength = expr.eval(&|degree: &f64| *degree, AndOp::Prod, OrOp::Max);

    assert!((strength - 0.36).abs() < 1e-12);
}

#[test]
fn test_try_map_stops_at_first_error() {
    let expr = Expr::is("a", "x").or(Expr::is("b", "y"));
    let mut seen = Vec::new();
    let mapped: Result<Expr<usize>, String> = expr.try_map(&mut |prop| {
        seen.push(prop.variable.clone());
        if prop.variable == "a" {
            Ok(1)
        } else {
            Err(prop.variable.clone())
        }
    });

    assert_eq!(mapped, Err("b".to_owned()));
    assert_eq!(seen, vec!["a", "b"]);
}
