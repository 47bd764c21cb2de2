use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::ops::*;
use crate::outputs::{Outputs, RuleActivation};
use crate::rules::{RuleBase, TermRef};
use crate::variable::Variables;

/// Mamdani style inference: fuzzify, fire, imply, aggregate, defuzzify.
///
/// The default operator set is the classical one: min for `and`, max for
/// `or`, clipping implication, max aggregation and centroid defuzzification.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mamdani {
    and_op: AndOp,
    or_op: OrOp,
    imp_op: ImplicationOp,
    agg_op: AggregationOp,
    defuzz_op: DefuzzificationOp,
}

impl Mamdani {
    pub fn new(
        and_op: AndOp,
        or_op: OrOp,
        imp_op: ImplicationOp,
        agg_op: AggregationOp,
        defuzz_op: DefuzzificationOp,
    ) -> Self {
        Self {
            and_op,
            or_op,
            imp_op,
            agg_op,
            defuzz_op,
        }
    }

    /// Evaluates every rule against `inputs`.
    ///
    /// Fails when `rules` were resolved against another registry or an
    /// antecedent variable has no input; every numeric value, in range or
    /// not, yields a defined output.
    pub fn eval(&self, vars: &Variables, rules: &RuleBase, inputs: &Inputs) -> Result<Outputs> {
        if !rules.is_built_on(vars) {
            return Err(FuzzyError::ForeignRegistry);
        }

        // Fuzzificate facts, once per antecedent variable
        let mut memberships = IndexMap::with_capacity(rules.antecedent_variables().len());

        for &key in rules.antecedent_variables() {
            let var = &vars[key];
            let value = inputs.get(key).ok_or_else(|| FuzzyError::MissingInput {
                variable: var.name().to_owned(),
            })?;

            memberships.insert(key, var.fuzzify(value));
        }

        // Every antecedent was fuzzified above and term indices come from
        // resolving against this same registry
        let degree = |prop: &TermRef| memberships[&prop.variable].degree_at(prop.term);

        // Every consequent starts from the all-zero curve, so nothing firing
        // leaves it empty
        let mut aggregated: IndexMap<_, _> = rules
            .consequent_variables()
            .iter()
            .map(|&key| (key, vec![0.; vars[key].universe().len()]))
            .collect();
        let mut activations = Vec::with_capacity(rules.len());

        for (i, rule) in rules.resolved().iter().enumerate() {
            let firing_strength = rule.premise().eval(&degree, self.and_op, self.or_op);
            let consequence = rule.consequence();
            let set = vars[consequence.variable].term_at(consequence.term);
            let implied = self.imp_op.call(firing_strength, set.curve());

            trace!(rule = i, firing_strength, "rule fired");

            self.agg_op.call(&mut aggregated[&consequence.variable], &implied);

            activations.push(RuleActivation {
                firing_strength,
                implied,
            });
        }

        // Defuzzificate
        let mut crisp = IndexMap::with_capacity(aggregated.len());

        for (&key, curve) in &aggregated {
            let var = &vars[key];
            let value = self.defuzz_op.call(var.universe().points(), curve);

            if curve.iter().all(|m| *m == 0.) {
                debug!(variable = var.name(), "no rule fired, output falls back to zero");
            }
            debug!(variable = var.name(), value, "defuzzified");

            crisp.insert(key, value);
            memberships.insert(key, var.fuzzify(value));
        }

        Ok(Outputs {
            crisp,
            memberships,
            aggregated,
            activations,
        })
    }
}

#[cfg(test)]
fn braking_variables(order: [&str; 3]) -> Variables {
    use crate::variable::LinguisticVariable;

    let mut vars = Variables::new();

    for name in order {
        let var = match name {
            "speed" => LinguisticVariable::new(name, 0. ..=10., [("slow", 0., 0., 3., 6.), ("fast", 4., 7., 10., 10.)], None),
            "grip" => LinguisticVariable::new(name, 0. ..=10., [("poor", 0., 0., 2., 4.), ("good", 6., 8., 10., 10.)], None),
            _ => LinguisticVariable::new(name, 0. ..=10., [("soft", 0., 0., 2., 5.), ("hard", 5., 8., 10., 10.)], None),
        };

        vars.insert(var.unwrap()).unwrap();
    }

    vars
}

#[cfg(test)]
fn braking() -> (Variables, RuleBase) {
    use crate::dsl::{Expr, Proposition};
    use crate::rules::Rules;

    let vars = braking_variables(["speed", "grip", "brake"]);

    let mut rules = Rules::new();

    rules.add(
        Expr::is("speed", "fast").or(Expr::is("grip", "poor")),
        Proposition::new("brake", "hard"),
    );
    rules.add(
        Expr::is("speed", "slow").and(Expr::is("grip", "good")),
        Proposition::new("brake", "soft"),
    );

    let base = RuleBase::build(&vars, rules).unwrap();

    (vars, base)
}

#[test]
fn test_eval_braking() {
    let (vars, rules) = braking();
    let speed = vars.key("speed").unwrap();
    let grip = vars.key("grip").unwrap();
    let brake = vars.key("brake").unwrap();
    let mut inputs = Inputs::new();

    inputs.set(speed, 5.);
    inputs.set(grip, 7.);

    let outputs = Mamdani::default().eval(&vars, &rules, &inputs).unwrap();
    let strengths: Vec<_> = outputs.activations().iter().map(|a| a.firing_strength).collect();

    // fast(5) = 1/3, poor(7) = 0, slow(5) = 1/3, good(7) = 1/2
    assert!((strengths[0] - 1. / 3.).abs() < 1e-12);
    assert!((strengths[1] - 1. / 3.).abs() < 1e-12);
    assert_eq!(outputs.max_firing_strength(), strengths[0].max(strengths[1]));

    let aggregated = outputs.aggregated(brake).unwrap();

    assert_eq!(aggregated.len(), 11);
    assert!(aggregated.iter().all(|m| *m <= strengths[0] + 1e-12));
    for (i, act) in outputs.activations().iter().enumerate() {
        for (agg, imp) in aggregated.iter().zip(&act.implied) {
            assert!(agg >= imp, "rule {i} exceeds the aggregate");
        }
    }

    let crisp = outputs.crisp(brake).unwrap();
    let expected = DefuzzificationOp::Centroid.call(vars[brake].universe().points(), aggregated);

    assert_eq!(crisp, expected);
    assert!(outputs.memberships(speed).is_some());
    assert!(outputs.memberships(brake).is_some());
}

#[test]
fn test_eval_nothing_fires() {
    let (vars, rules) = braking();
    let brake = vars.key("brake").unwrap();
    let mut inputs = Inputs::new();

    // Neither fast nor poor, and slow but not good
    inputs.set(vars.key("speed").unwrap(), 3.);
    inputs.set(vars.key("grip").unwrap(), 5.);

    let outputs = Mamdani::default().eval(&vars, &rules, &inputs).unwrap();

    assert_eq!(outputs.max_firing_strength(), 0.);
    assert!(outputs.aggregated(brake).unwrap().iter().all(|m| *m == 0.));
    assert_eq!(outputs.crisp(brake), Some(0.));
}

#[test]
fn test_eval_missing_input() {
    let (vars, rules) = braking();
    let mut inputs = Inputs::new();

    inputs.set(vars.key("speed").unwrap(), 3.);

    let err = Mamdani::default().eval(&vars, &rules, &inputs).unwrap_err();

    assert_eq!(err, FuzzyError::MissingInput {
        variable: "grip".into(),
    });
}

#[test]
fn test_eval_rejects_rules_from_another_registry() {
    let (_, rules) = braking();
    // Same names, different registration order, so the raw keys line up with
    // other variables
    let other = braking_variables(["brake", "grip", "speed"]);
    let mut inputs = Inputs::new();

    inputs.set(other.key("speed").unwrap(), 10.);
    inputs.set(other.key("grip").unwrap(), 5.);

    let err = Mamdani::default().eval(&other, &rules, &inputs).unwrap_err();

    assert_eq!(err, FuzzyError::ForeignRegistry);
}
