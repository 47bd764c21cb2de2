//! A small Mamdani fuzzy inference engine.
//!
//! Crisp inputs are fuzzified against trapezoidal terms of their linguistic
//! variables, every rule fires with the strength of its premise, the
//! consequent terms are clipped at that strength and aggregated pointwise,
//! and the aggregated curve is reduced back to a crisp number.
//!
//! The [`diagnosis`] module wires the engine into a three rule system that
//! turns engine temperature and oil pressure into a mechanic urgency score.

mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
mod ops;
mod outputs;
mod rules;
mod session;
mod terms;
mod variable;

pub mod diagnosis;

pub use dsl::{Expr, Proposition};
pub use error::{FuzzyError, Result};
pub use inference::Mamdani;
pub use inputs::Inputs;
pub use ops::{AggregationOp, AndOp, DefuzzificationOp, ImplicationOp, OrOp};
pub use outputs::{Outputs, RuleActivation};
pub use rules::{Rule, RuleBase, Rules, TermRef};
pub use session::InferenceSession;
pub use terms::{Key, TermName, Terms, Trapezoid};
pub use variable::{FuzzySet, MAX_SAMPLES, LinguisticVariable, Memberships, Universe, Variable, VariableKey, Variables};
