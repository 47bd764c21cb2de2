use std::marker::PhantomData;
use std::ops::{Index, RangeInclusive};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::error::{FuzzyError, Result};
use crate::linspace::Linspace;
use crate::math::interp;
use crate::terms::{Key, TermName, Terms, Trapezoid};

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// A typed handle to a registered variable whose terms are the enum `I`.
pub struct Variable<I> {
    pub(crate) key: VariableKey,
    pub(crate) name: &'static str,
    _terms: PhantomData<fn() -> I>,
}

impl<I> Clone for Variable<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> Copy for Variable<I> {}

impl<I> Variable<I> {
    pub fn key(&self) -> VariableKey {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Upper bound on the number of samples in one universe.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Sample points of a variable's domain, strictly increasing and at least two long.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    points: Vec<f64>,
    min: f64,
    max: f64,
}

impl Universe {
    fn new(range: RangeInclusive<f64>, step: f64) -> std::result::Result<Self, String> {
        let (min, max) = range.into_inner();

        if !min.is_finite() || !max.is_finite() {
            return Err("bounds must be finite".into());
        }
        if min >= max {
            return Err(format!("min {min} must be less than max {max}"));
        }
        if !step.is_finite() || step <= 0. {
            return Err(format!("step {step} must be a positive number"));
        }

        // floor is closest approx to what python does for int() conversion
        let steps = ((max - min) / step).floor();

        if steps < 1. {
            return Err(format!("step {step} is wider than the domain"));
        }
        if steps >= MAX_SAMPLES as f64 {
            return Err(format!("step {step} needs more than {MAX_SAMPLES} samples"));
        }

        let num = steps as usize + 1;

        Ok(Self {
            points: Linspace::new(min, max, num).collect(),
            min,
            max,
        })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Pulls `value` into `[min, max]`. The engine never does this itself,
    /// it is meant for whatever collects user input.
    pub fn clamp(&self, value: f64) -> f64 {
        f64::max(self.min, f64::min(self.max, value))
    }
}

/// A named trapezoid together with its curve sampled over the universe.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzySet {
    name: String,
    shape: Trapezoid,
    curve: Vec<f64>,
}

impl FuzzySet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Trapezoid {
        self.shape
    }

    /// Membership sampled at every point of the owning universe.
    pub fn curve(&self) -> &[f64] {
        &self.curve
    }
}

/// Degree of membership of one crisp value in every term of a variable,
/// in term registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Memberships(IndexMap<String, f64>);

impl Memberships {
    pub fn get(&self, term: &str) -> Option<f64> {
        self.0.get(term).copied()
    }

    pub(crate) fn degree_at(&self, index: usize) -> f64 {
        self.0[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(term, degree)| (term.as_str(), *degree))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    universe: Universe,
    terms: IndexMap<String, FuzzySet>,
}

impl LinguisticVariable {
    /// Builds a variable over `range` sampled every `step` (default `1.0`)
    /// from `(term, a, b, c, d)` rows.
    pub fn new<'t>(
        name: impl Into<String>,
        range: RangeInclusive<f64>,
        terms: impl IntoIterator<Item = (&'t str, f64, f64, f64, f64)>,
        step: Option<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let universe = Universe::new(range, step.unwrap_or(1.)).map_err(|reason| FuzzyError::InvalidDomain {
            variable: name.clone(),
            reason,
        })?;
        let mut sets = IndexMap::new();

        for (term, a, b, c, d) in terms {
            let shape = Trapezoid::new(a, b, c, d);

            shape
                .check(universe.min, universe.max)
                .map_err(|reason| FuzzyError::InvalidMembershipShape {
                    variable: name.clone(),
                    term: term.to_owned(),
                    corners: shape.corners(),
                    reason,
                })?;

            if sets.contains_key(term) {
                return Err(FuzzyError::DuplicateName {
                    scope: format!("terms of variable `{name}`"),
                    name: term.to_owned(),
                });
            }

            let curve = universe.points.iter().map(|u| shape.membership(*u)).collect();

            sets.insert(term.to_owned(), FuzzySet {
                name: term.to_owned(),
                shape,
                curve,
            });
        }

        debug!(variable = %name, samples = universe.len(), terms = sets.len(), "built linguistic variable");

        Ok(Self {
            name,
            universe,
            terms: sets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> impl Iterator<Item = &FuzzySet> {
        self.terms.values()
    }

    pub fn term(&self, name: &str) -> Option<&FuzzySet> {
        self.terms.get(name)
    }

    pub(crate) fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.get_index_of(name)
    }

    pub(crate) fn term_at(&self, index: usize) -> &FuzzySet {
        &self.terms[index]
    }

    /// Fuzzifies a crisp value by interpolating every term's sampled curve.
    ///
    /// Values outside the universe take the degree of the nearest edge sample,
    /// so shoulder terms saturate instead of dropping to zero. NaN is not a
    /// reading: it belongs to no term and every degree is zero.
    pub fn fuzzify(&self, value: f64) -> Memberships {
        if value.is_nan() {
            return Memberships(self.terms.keys().map(|term| (term.clone(), 0.)).collect());
        }

        let points = self.universe.points.iter().copied();
        let degrees = self
            .terms
            .iter()
            .map(|(term, set)| {
                let degree = interp(Some(value), points.clone().zip(set.curve.iter().copied()));

                (term.clone(), degree.into_iter().next().unwrap_or(0.))
            })
            .collect();

        Memberships(degrees)
    }
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// The registry of every variable of a fuzzy system.
///
/// Each registry carries a process unique id so that keys resolved against
/// one registry are never looked up in another.
pub struct Variables {
    id: u64,
    vars: SlotMap<VariableKey, LinguisticVariable>,
    names: IndexMap<String, VariableKey>,
}

impl Default for Variables {
    fn default() -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            vars: SlotMap::with_key(),
            names: IndexMap::new(),
        }
    }
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Registers an already built variable. Names must be unique.
    pub fn insert(&mut self, var: LinguisticVariable) -> Result<VariableKey> {
        if self.names.contains_key(var.name()) {
            return Err(FuzzyError::DuplicateName {
                scope: "variables".into(),
                name: var.name,
            });
        }

        let name = var.name.clone();
        let key = self.vars.insert(var);

        self.names.insert(name, key);

        Ok(key)
    }

    /// Registers a variable whose terms are the enum `I`. If the step value is
    /// not provided, it defaults to 1.
    pub fn add<I: Key + TermName>(
        &mut self,
        name: &'static str,
        range: RangeInclusive<f64>,
        terms: Terms<I>,
        step: Option<f64>,
    ) -> Result<Variable<I>> {
        let var = LinguisticVariable::new(name, range, terms.rows(), step)?;
        let key = self.insert(var)?;

        Ok(Variable {
            key,
            name,
            _terms: PhantomData,
        })
    }

    pub fn get(&self, key: VariableKey) -> Option<&LinguisticVariable> {
        self.vars.get(key)
    }

    pub fn key(&self, name: &str) -> Option<VariableKey> {
        self.names.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&LinguisticVariable> {
        self.key(name).and_then(|key| self.vars.get(key))
    }

    /// Variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &LinguisticVariable)> {
        self.names.values().map(|key| (*key, &self.vars[*key]))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Index<VariableKey> for Variables {
    type Output = LinguisticVariable;

    fn index(&self, key: VariableKey) -> &LinguisticVariable {
        &self.vars[key]
    }
}

#[cfg(test)]
fn temperature() -> LinguisticVariable {
    LinguisticVariable::new(
        "temperature",
        0. ..=120.,
        [
            ("cold", 0., 0., 25., 60.),
            ("normal", 50., 70., 90., 110.),
            ("hot", 90., 110., 120., 120.),
        ],
        None,
    )
    .unwrap()
}

#[test]
fn test_universe_sampling() {
    let var = temperature();
    let universe = var.universe();

    assert_eq!(universe.len(), 121);
    assert_eq!(universe.points()[0], 0.);
    assert_eq!(universe.points()[120], 120.);
    assert!(universe.points().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(universe.clamp(-3.), 0.);
    assert_eq!(universe.clamp(130.), 120.);
    assert_eq!(universe.clamp(42.5), 42.5);

    let fine = LinguisticVariable::new("x", 0. ..=1., [("all", 0., 0., 1., 1.)], Some(0.1)).unwrap();

    assert_eq!(fine.universe().len(), 11);
}

#[test]
fn test_term_curves_stay_in_unit_interval() {
    let var = temperature();

    for set in var.terms() {
        let [a, b, c, d] = set.shape().corners();

        for (u, m) in var.universe().points().iter().zip(set.curve()) {
            assert!((0. ..=1.).contains(m), "{} at {u} is {m}", set.name());
            if *u < a || *u > d {
                assert_eq!(*m, 0.);
            }
            if b <= *u && *u <= c {
                assert_eq!(*m, 1.);
            }
        }
    }
}

#[test]
fn test_fuzzify() {
    let var = temperature();
    let degrees = var.fuzzify(70.);

    assert_eq!(degrees.get("cold"), Some(0.));
    assert_eq!(degrees.get("normal"), Some(1.));
    assert_eq!(degrees.get("hot"), Some(0.));
    assert_eq!(degrees.get("lukewarm"), None);
    assert_eq!(
        degrees.iter().map(|(term, _)| term).collect::<Vec<_>>(),
        vec!["cold", "normal", "hot"]
    );

    let between = var.fuzzify(57.5);

    assert!((between.get("normal").unwrap() - 0.375).abs() < 1e-12);
    assert!((between.get("cold").unwrap() - 2.5 / 35.).abs() < 1e-12);
}

#[test]
fn test_fuzzify_saturates_outside_universe() {
    let var = temperature();
    let below = var.fuzzify(-40.);
    let above = var.fuzzify(500.);

    assert_eq!(below.get("cold"), Some(1.));
    assert_eq!(below.get("normal"), Some(0.));
    assert_eq!(above.get("hot"), Some(1.));
    assert_eq!(above.get("normal"), Some(0.));
}

#[test]
fn test_fuzzify_nan_belongs_to_no_term() {
    let var = temperature();
    let degrees = var.fuzzify(f64::NAN);

    assert_eq!(degrees.len(), 3);
    assert!(degrees.iter().all(|(_, degree)| degree == 0.));
}

#[test]
fn test_registries_get_distinct_ids() {
    assert_ne!(Variables::new().id(), Variables::new().id());
}

#[test]
fn test_invalid_definitions() {
    let err = LinguisticVariable::new("t", 10. ..=10., [("a", 10., 10., 10., 10.)], None).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidDomain { .. }));

    let err = LinguisticVariable::new("t", 0. ..=10., [("a", 0., 1., 2., 3.)], Some(0.)).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidDomain { .. }));

    let err = LinguisticVariable::new("t", 0. ..=10., [("a", 0., 1., 2., 3.)], Some(20.)).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidDomain { .. }));

    for step in [1e-300, 1e-12, 5e-6] {
        let err = LinguisticVariable::new("t", 0. ..=10., [("a", 0., 1., 2., 3.)], Some(step)).unwrap_err();
        assert!(matches!(err, FuzzyError::InvalidDomain { .. }), "{step}");
    }

    let err = LinguisticVariable::new("t", 0. ..=f64::MAX, [("a", 0., 1., 2., 3.)], Some(f64::MIN_POSITIVE)).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidDomain { .. }));

    let err = LinguisticVariable::new("t", 0. ..=10., [("a", 3., 1., 2., 3.)], None).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidMembershipShape { ref term, .. } if term == "a"));

    let err = LinguisticVariable::new("t", 0. ..=10., [("a", 0., 1., 2., 11.)], None).unwrap_err();
    assert!(matches!(err, FuzzyError::InvalidMembershipShape { .. }));

    let err = LinguisticVariable::new("t", 0. ..=10., [("a", 0., 1., 2., 3.), ("a", 4., 5., 6., 7.)], None)
        .unwrap_err();
    assert!(matches!(err, FuzzyError::DuplicateName { .. }));
}

#[test]
fn test_registry() {
    let mut vars = Variables::new();
    let key = vars.insert(temperature()).unwrap();

    assert_eq!(vars.key("temperature"), Some(key));
    assert_eq!(vars[key].name(), "temperature");
    assert!(vars.by_name("pressure").is_none());
    assert!(matches!(
        vars.insert(temperature()),
        Err(FuzzyError::DuplicateName { .. })
    ));
    assert_eq!(vars.len(), 1);
}
