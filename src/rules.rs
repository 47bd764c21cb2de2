use tracing::debug;

use crate::dsl::{Expr, Proposition};
use crate::error::{FuzzyError, Result};
use crate::variable::{VariableKey, Variables};

/// A proposition resolved against a registry: variable key plus term position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TermRef {
    pub(crate) variable: VariableKey,
    pub(crate) term: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule<P> {
    premise: Expr<P>,
    consequence: P,
}

impl<P> Rule<P> {
    pub fn premise(&self) -> &Expr<P> {
        &self.premise
    }

    pub fn consequence(&self) -> &P {
        &self.consequence
    }
}

/// The rule table as written, before any name is checked.
#[derive(Default)]
pub struct Rules(pub(crate) Vec<Rule<Proposition>>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, premise: Expr<Proposition>, consequence: Proposition) {
        self.0.push(Rule { premise, consequence });
    }
}

/// Validated rules with every name resolved. Immutable once built.
pub struct RuleBase {
    registry: u64,
    written: Vec<Rule<Proposition>>,
    resolved: Vec<Rule<TermRef>>,
    antecedents: Vec<VariableKey>,
    consequents: Vec<VariableKey>,
}

impl RuleBase {
    /// Resolves every proposition of `rules` against `vars`, failing on the
    /// first unknown variable or term.
    pub fn build(vars: &Variables, rules: Rules) -> Result<Self> {
        let mut resolved = Vec::with_capacity(rules.0.len());
        let mut antecedents = Vec::new();
        let mut consequents = Vec::new();

        for (i, rule) in rules.0.iter().enumerate() {
            let premise = rule.premise.try_map(&mut |prop| resolve(vars, i, prop))?;
            let consequence = resolve(vars, i, &rule.consequence)?;

            for prop in premise.propositions() {
                if !antecedents.contains(&prop.variable) {
                    antecedents.push(prop.variable);
                }
            }
            if !consequents.contains(&consequence.variable) {
                consequents.push(consequence.variable);
            }

            resolved.push(Rule { premise, consequence });
        }

        debug!(
            rules = resolved.len(),
            antecedents = antecedents.len(),
            consequents = consequents.len(),
            "built rule base"
        );

        Ok(Self {
            registry: vars.id(),
            written: rules.0,
            resolved,
            antecedents,
            consequents,
        })
    }

    /// Whether `vars` is the registry these rules were resolved against.
    pub fn is_built_on(&self, vars: &Variables) -> bool {
        self.registry == vars.id()
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Rules by name, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<Proposition>> {
        self.written.iter()
    }

    pub(crate) fn resolved(&self) -> &[Rule<TermRef>] {
        &self.resolved
    }

    /// Variables read by any premise, in first-use order.
    pub fn antecedent_variables(&self) -> &[VariableKey] {
        &self.antecedents
    }

    /// Variables named by any consequence, in first-use order.
    pub fn consequent_variables(&self) -> &[VariableKey] {
        &self.consequents
    }
}

fn resolve(vars: &Variables, rule: usize, prop: &Proposition) -> Result<TermRef> {
    let variable = vars.key(&prop.variable).ok_or_else(|| FuzzyError::InvalidRuleReference {
        rule,
        what: "variable",
        name: prop.variable.clone(),
    })?;
    let term = vars[variable]
        .term_index(&prop.term)
        .ok_or_else(|| FuzzyError::InvalidRuleReference {
            rule,
            what: "term",
            name: format!("{}.{}", prop.variable, prop.term),
        })?;

    Ok(TermRef { variable, term })
}

#[cfg(test)]
fn registry() -> Variables {
    use crate::variable::LinguisticVariable;

    let mut vars = Variables::new();
    let speed = LinguisticVariable::new("speed", 0. ..=10., [("slow", 0., 0., 3., 6.), ("fast", 4., 7., 10., 10.)], None);
    let brake = LinguisticVariable::new("brake", 0. ..=10., [("soft", 0., 0., 2., 5.), ("hard", 5., 8., 10., 10.)], None);

    vars.insert(speed.unwrap()).unwrap();
    vars.insert(brake.unwrap()).unwrap();
    vars
}

#[test]
fn test_build_resolves_names() {
    let vars = registry();
    let mut rules = Rules::new();

    rules.add(Expr::is("speed", "fast"), Proposition::new("brake", "hard"));
    rules.add(Expr::is("speed", "slow"), Proposition::new("brake", "soft"));

    let base = RuleBase::build(&vars, rules).unwrap();
    let speed = vars.key("speed").unwrap();
    let brake = vars.key("brake").unwrap();

    assert_eq!(base.len(), 2);
    assert!(base.is_built_on(&vars));
    assert!(!base.is_built_on(&registry()));
    assert_eq!(base.antecedent_variables(), &[speed]);
    assert_eq!(base.consequent_variables(), &[brake]);
    assert_eq!(base.resolved()[0].consequence(), &TermRef { variable: brake, term: 1 });
    assert_eq!(base.resolved()[1].premise(), &Expr::Is(TermRef { variable: speed, term: 0 }));
    assert_eq!(base.iter().next().unwrap().premise().to_string(), "speed is fast");
}

#[test]
fn test_build_rejects_unknown_references() {
    let vars = registry();
    let mut rules = Rules::new();

    rules.add(Expr::is("speed", "fast"), Proposition::new("brake", "hard"));
    rules.add(Expr::is("speed", "fast").or(Expr::is("rain", "heavy")), Proposition::new("brake", "hard"));

    let err = RuleBase::build(&vars, rules).err().unwrap();

    assert_eq!(err, FuzzyError::InvalidRuleReference {
        rule: 1,
        what: "variable",
        name: "rain".into(),
    });

    let mut rules = Rules::new();

    rules.add(Expr::is("speed", "fast"), Proposition::new("brake", "medium"));

    let err = RuleBase::build(&vars, rules).err().unwrap();

    assert_eq!(err, FuzzyError::InvalidRuleReference {
        rule: 0,
        what: "term",
        name: "brake.medium".into(),
    });
}
