//! Engine diagnosis: engine temperature (°C) and oil pressure (PSI) decide
//! how urgently a mechanic should look at the car, on a 0 to 100 scale.

use std::fmt;

use crate::dsl::Proposition;
use crate::error::Result;
use crate::inference::Mamdani;
use crate::inputs::Inputs;
use crate::outputs::{Outputs, RuleActivation};
use crate::rules::{RuleBase, Rules};
use crate::session::InferenceSession;
use crate::terms::{Key, TermName, Terms, Trapezoid};
use crate::variable::{LinguisticVariable, Memberships, Variable, Variables};

pub const TEMPERATURE: &str = "temperature";
pub const PRESSURE: &str = "pressure";
pub const ACTION: &str = "action";

/// Readings the original dashboard starts from.
pub const DEFAULT_TEMPERATURE: f64 = 80.;
pub const DEFAULT_PRESSURE: f64 = 55.;

#[derive(Clone, Copy, Debug, Eq, Hash, Key, Ord, PartialEq, PartialOrd)]
pub enum Temperature {
    Cold,
    Normal,
    Hot,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Key, Ord, PartialEq, PartialOrd)]
pub enum Pressure {
    Low,
    Adequate,
    High,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Key, Ord, PartialEq, PartialOrd)]
pub enum Action {
    Routine,
    Caution,
    Immediate,
}

impl TermName for Temperature {
    fn name(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Normal => "normal",
            Self::Hot => "hot",
        }
    }
}

impl TermName for Pressure {
    fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Adequate => "adequate",
            Self::High => "high",
        }
    }
}

impl TermName for Action {
    fn name(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Caution => "caution",
            Self::Immediate => "immediate",
        }
    }
}

impl Temperature {
    pub fn shape(self) -> Trapezoid {
        match self {
            Self::Cold => Trapezoid::new(0., 0., 25., 60.),
            Self::Normal => Trapezoid::new(50., 70., 90., 110.),
            Self::Hot => Trapezoid::new(90., 110., 120., 120.),
        }
    }
}

impl Pressure {
    pub fn shape(self) -> Trapezoid {
        match self {
            Self::Low => Trapezoid::new(0., 0., 10., 35.),
            Self::Adequate => Trapezoid::new(25., 45., 65., 85.),
            Self::High => Trapezoid::new(75., 90., 100., 100.),
        }
    }
}

impl Action {
    pub fn shape(self) -> Trapezoid {
        match self {
            Self::Routine => Trapezoid::new(0., 0., 20., 45.),
            Self::Caution => Trapezoid::new(35., 50., 65., 80.),
            Self::Immediate => Trapezoid::new(70., 85., 100., 100.),
        }
    }
}

/// Three level reading of the urgency score, for display.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Diagnosis {
    Routine,
    Caution,
    Immediate,
}

impl Diagnosis {
    /// `<= 40` is routine, `<= 70` caution, anything above needs immediate attention.
    pub fn classify(urgency: f64) -> Self {
        if urgency <= 40. {
            Self::Routine
        } else if urgency <= 70. {
            Self::Caution
        } else {
            Self::Immediate
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Routine => "routine",
            Self::Caution => "caution",
            Self::Immediate => "immediate attention",
        })
    }
}

/// The registered variables and typed handles to them.
pub struct Registry {
    pub variables: Variables,
    pub temperature: Variable<Temperature>,
    pub pressure: Variable<Pressure>,
    pub action: Variable<Action>,
}

/// Registers temperature (0 to 120), pressure (0 to 100) and action (0 to 100),
/// all sampled at every integer.
pub fn registry() -> Result<Registry> {
    let mut variables = Variables::new();
    let mut temperature_terms = Terms::new();
    let mut pressure_terms = Terms::new();
    let mut action_terms = Terms::new();

    for term in [Temperature::Cold, Temperature::Normal, Temperature::Hot] {
        temperature_terms.insert(term, term.shape());
    }
    for term in [Pressure::Low, Pressure::Adequate, Pressure::High] {
        pressure_terms.insert(term, term.shape());
    }
    for term in [Action::Routine, Action::Caution, Action::Immediate] {
        action_terms.insert(term, term.shape());
    }

    let temperature = variables.add(TEMPERATURE, 0. ..=120., temperature_terms, Some(1.))?;
    let pressure = variables.add(PRESSURE, 0. ..=100., pressure_terms, Some(1.))?;
    let action = variables.add(ACTION, 0. ..=100., action_terms, Some(1.))?;

    Ok(Registry {
        variables,
        temperature,
        pressure,
        action,
    })
}

/// The three diagnosis rules, in presentation order.
pub fn rules(registry: &Registry) -> Rules {
    let Registry {
        temperature,
        pressure,
        action,
        ..
    } = *registry;
    let mut rules = Rules::with_capacity(3);

    rules.add(
        temperature.is(Temperature::Hot).or(pressure.is(Pressure::Low)),
        action.term(Action::Immediate),
    );
    rules.add(
        temperature.is(Temperature::Normal).and(pressure.is(Pressure::Adequate)),
        action.term(Action::Routine),
    );
    rules.add(
        temperature.is(Temperature::Cold).or(pressure.is(Pressure::High)),
        action.term(Action::Caution),
    );

    rules
}

/// An [`InferenceSession`] over the diagnosis system with typed accessors.
pub struct DiagnosticSession {
    session: InferenceSession,
    temperature: Variable<Temperature>,
    pressure: Variable<Pressure>,
    action: Variable<Action>,
}

impl DiagnosticSession {
    /// Builds the system and evaluates it once at the default readings.
    pub fn new() -> Result<Self> {
        Self::with_engine(Mamdani::default())
    }

    pub fn with_engine(engine: Mamdani) -> Result<Self> {
        let registry = registry()?;
        let rules = RuleBase::build(&registry.variables, rules(&registry))?;
        let mut inputs = Inputs::new();

        inputs.add(registry.temperature, DEFAULT_TEMPERATURE);
        inputs.add(registry.pressure, DEFAULT_PRESSURE);

        let Registry {
            variables,
            temperature,
            pressure,
            action,
        } = registry;

        Ok(Self {
            session: InferenceSession::new(variables, rules, engine, inputs)?,
            temperature,
            pressure,
            action,
        })
    }

    /// Stores new readings. Values are taken as is; out of range readings
    /// saturate the edge terms.
    pub fn set_inputs(&mut self, temperature: f64, pressure: f64) {
        self.session.set_input(self.temperature.key(), temperature);
        self.session.set_input(self.pressure.key(), pressure);
    }

    /// Re-evaluates the current readings and returns the urgency score.
    pub fn recompute(&mut self) -> Result<f64> {
        let action = self.action;
        let outputs = self.session.recompute()?;

        Ok(outputs.get_inferred_membership(action).unwrap_or(0.))
    }

    pub fn urgency(&self) -> f64 {
        self.outputs().get_inferred_membership(self.action).unwrap_or(0.)
    }

    pub fn diagnosis(&self) -> Diagnosis {
        Diagnosis::classify(self.urgency())
    }

    pub fn temperature(&self) -> f64 {
        self.session.input(self.temperature.key()).unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn pressure(&self) -> f64 {
        self.session.input(self.pressure.key()).unwrap_or(DEFAULT_PRESSURE)
    }

    pub fn temperature_memberships(&self) -> Option<&Memberships> {
        self.outputs().memberships(self.temperature.key())
    }

    pub fn pressure_memberships(&self) -> Option<&Memberships> {
        self.outputs().memberships(self.pressure.key())
    }

    /// Degrees of the urgency score in each action term.
    pub fn action_memberships(&self) -> Option<&Memberships> {
        self.outputs().memberships(self.action.key())
    }

    /// Aggregated action curve over [`action_variable`](Self::action_variable)'s universe.
    pub fn aggregated(&self) -> &[f64] {
        self.outputs().aggregated(self.action.key()).unwrap_or(&[])
    }

    pub fn activations(&self) -> &[RuleActivation] {
        self.outputs().activations()
    }

    pub fn temperature_variable(&self) -> &LinguisticVariable {
        &self.session.variables()[self.temperature.key()]
    }

    pub fn pressure_variable(&self) -> &LinguisticVariable {
        &self.session.variables()[self.pressure.key()]
    }

    pub fn action_variable(&self) -> &LinguisticVariable {
        &self.session.variables()[self.action.key()]
    }

    /// The rules as written, paired with how strongly each fired.
    pub fn rule_report(&self) -> impl Iterator<Item = (String, &Proposition, f64)> {
        self.session
            .rules()
            .iter()
            .zip(self.activations())
            .map(|(rule, act)| (rule.premise().to_string(), rule.consequence(), act.firing_strength))
    }

    pub fn outputs(&self) -> &Outputs {
        self.session.outputs()
    }
}

#[test]
fn test_classify_boundaries() {
    assert_eq!(Diagnosis::classify(0.), Diagnosis::Routine);
    assert_eq!(Diagnosis::classify(40.), Diagnosis::Routine);
    assert_eq!(Diagnosis::classify(40.0001), Diagnosis::Caution);
    assert_eq!(Diagnosis::classify(70.), Diagnosis::Caution);
    assert_eq!(Diagnosis::classify(70.5), Diagnosis::Immediate);
    assert_eq!(Diagnosis::Immediate.to_string(), "immediate attention");
}

#[test]
fn test_registry_layout() {
    let registry = registry().unwrap();
    let temperature = &registry.variables[registry.temperature.key()];

    assert_eq!(temperature.universe().len(), 121);
    assert_eq!(registry.variables[registry.pressure.key()].universe().len(), 101);
    assert_eq!(
        temperature.terms().map(|set| set.name()).collect::<Vec<_>>(),
        vec!["cold", "normal", "hot"]
    );
    assert_eq!(
        temperature.term("hot").map(|set| set.shape().corners()),
        Some([90., 110., 120., 120.])
    );
    assert_eq!(registry.action.name(), ACTION);
}

#[test]
fn test_rules_written() {
    let registry = registry().unwrap();
    let rules = RuleBase::build(&registry.variables, rules(&registry)).unwrap();
    let written: Vec<_> = rules
        .iter()
        .map(|rule| format!("{} => {}", rule.premise(), rule.consequence()))
        .collect();

    assert_eq!(written, vec![
        "temperature is hot or pressure is low => action is immediate",
        "temperature is normal and pressure is adequate => action is routine",
        "temperature is cold or pressure is high => action is caution",
    ]);
}
