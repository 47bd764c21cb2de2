use indexmap::IndexMap;

use crate::variable::{Memberships, Variable, VariableKey};

/// What a single rule contributed to an evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleActivation {
    pub firing_strength: f64,
    /// The consequent term clipped at `firing_strength`, over the consequent's universe
    pub implied: Vec<f64>,
}

/// Everything one evaluation produced: crisp results plus the intermediate
/// curves needed to draw them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outputs {
    pub(crate) crisp: IndexMap<VariableKey, f64>,
    pub(crate) memberships: IndexMap<VariableKey, Memberships>,
    pub(crate) aggregated: IndexMap<VariableKey, Vec<f64>>,
    pub(crate) activations: Vec<RuleActivation>,
}

impl Outputs {
    /// The defuzzified value of a consequent variable.
    pub fn crisp(&self, key: VariableKey) -> Option<f64> {
        self.crisp.get(&key).copied()
    }

    /// Typed shorthand for [`crisp`](Self::crisp).
    pub fn get_inferred_membership<I>(&self, var: Variable<I>) -> Option<f64> {
        self.crisp(var.key)
    }

    /// Term degrees of a variable at its current value: the input for an
    /// antecedent, the crisp result for a consequent.
    pub fn memberships(&self, key: VariableKey) -> Option<&Memberships> {
        self.memberships.get(&key)
    }

    /// Pointwise aggregate of every implied curve targeting `key`.
    pub fn aggregated(&self, key: VariableKey) -> Option<&[f64]> {
        self.aggregated.get(&key).map(Vec::as_slice)
    }

    /// One entry per rule, in rule order.
    pub fn activations(&self) -> &[RuleActivation] {
        &self.activations
    }

    /// The strongest firing of any rule, zero when nothing matched.
    pub fn max_firing_strength(&self) -> f64 {
        self.activations
            .iter()
            .map(|act| act.firing_strength)
            .fold(0., f64::max)
    }
}
