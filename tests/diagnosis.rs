use fuzzy_autodiag::diagnosis::{self, Diagnosis, DiagnosticSession};
use fuzzy_autodiag::{
    DefuzzificationOp, Expr, FuzzyError, ImplicationOp, InferenceSession, Inputs, LinguisticVariable, Mamdani,
    Proposition, RuleBase, Rules, Variables,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn strengths(session: &DiagnosticSession) -> Vec<f64> {
    session.activations().iter().map(|act| act.firing_strength).collect()
}

#[test]
fn fuzzify_reference_points() {
    let registry = diagnosis::registry().unwrap();
    let temperature = registry.variables.by_name("temperature").unwrap().fuzzify(70.);

    assert_eq!(temperature.get("normal"), Some(1.));
    assert_eq!(temperature.get("cold"), Some(0.));
    assert_eq!(temperature.get("hot"), Some(0.));

    let pressure = registry.variables.by_name("pressure").unwrap().fuzzify(0.);

    assert_eq!(pressure.get("low"), Some(1.));
    assert_eq!(pressure.get("adequate"), Some(0.));
    assert_eq!(pressure.get("high"), Some(0.));
}

#[test]
fn every_term_stays_within_unit_interval() {
    let registry = diagnosis::registry().unwrap();

    for (_, var) in registry.variables.iter() {
        for set in var.terms() {
            let [a, b, c, d] = set.shape().corners();

            for (&u, &m) in var.universe().points().iter().zip(set.curve()) {
                assert!((0. ..=1.).contains(&m));
                if u < a || u > d {
                    assert_eq!(m, 0., "{}.{} at {u}", var.name(), set.name());
                }
                if b <= u && u <= c {
                    assert_eq!(m, 1., "{}.{} at {u}", var.name(), set.name());
                }
                assert_eq!(m, set.shape().membership(u));
            }
        }
    }
}

#[test]
fn normal_readings_call_for_routine_check() {
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(80., 55.);

    let urgency = session.recompute().unwrap();
    let fired = strengths(&session);

    assert_eq!(fired[0], 0.);
    assert!(fired[1] > 0.);
    assert_eq!(fired[2], 0.);
    assert!(urgency <= 40.);
    assert!(close(urgency, 16.787878787878785), "{urgency}");
    assert_eq!(session.diagnosis(), Diagnosis::Routine);
    assert_eq!(session.urgency(), urgency);

    // Only the routine rule fired, so the aggregate is exactly the routine term
    let routine = session.action_variable().term("routine").unwrap();

    assert_eq!(session.aggregated(), routine.curve());
}

#[test]
fn overheating_without_oil_needs_immediate_attention() {
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(120., 0.);

    let urgency = session.recompute().unwrap();
    let fired = strengths(&session);

    assert_eq!(fired, vec![1., 0., 0.]);
    assert!(urgency > 70.);
    assert!(close(urgency, 88.59420289855072), "{urgency}");
    assert_eq!(session.diagnosis(), Diagnosis::Immediate);

    let immediate = session.action_variable().term("immediate").unwrap();

    assert_eq!(session.aggregated(), immediate.curve());
    assert_eq!(session.action_memberships().unwrap().get("immediate"), Some(1.));
}

#[test]
fn cold_engine_calls_for_caution() {
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(10., 55.);

    let urgency = session.recompute().unwrap();

    assert_eq!(strengths(&session), vec![0., 0., 1.]);
    assert!(close(urgency, 57.5), "{urgency}");
    assert_eq!(session.diagnosis(), Diagnosis::Caution);
}

#[test]
fn aggregate_is_pointwise_max_of_implied_curves() {
    let mut session = DiagnosticSession::new().unwrap();

    // Warm engine with a slightly low pressure fires two rules partially
    session.set_inputs(100., 30.);
    session.recompute().unwrap();

    let fired = strengths(&session);

    assert!(fired[0] > 0. && fired[0] < 1.);
    assert!(fired[1] > 0. && fired[1] < 1.);

    for (i, &agg) in session.aggregated().iter().enumerate() {
        let max = session
            .activations()
            .iter()
            .map(|act| act.implied[i])
            .fold(0., f64::max);

        assert_eq!(agg, max);
    }
}

#[test]
fn recompute_is_idempotent() {
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(97.3, 31.8);

    let first = session.recompute().unwrap();
    let outputs = session.outputs().clone();
    let second = session.recompute().unwrap();

    assert_eq!(first.to_bits(), second.to_bits());
    assert_eq!(&outputs, session.outputs());
}

#[test]
fn hot_only_strengthens_the_low_pressure_rule() {
    let mut session = DiagnosticSession::new().unwrap();
    let low_only = 0.6;
    let mut previous = 0.;

    for temperature in 0..=120 {
        // low(20) = 0.6
        session.set_inputs(temperature as f64, 20.);
        session.recompute().unwrap();

        let fired = strengths(&session)[0];

        assert!(fired >= low_only - 1e-12, "{temperature}: {fired}");
        assert!(fired >= previous, "{temperature}: {fired} < {previous}");
        previous = fired;
    }

    assert_eq!(previous, 1.);
}

#[test]
fn out_of_range_readings_saturate() {
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(400., -20.);

    let urgency = session.recompute().unwrap();

    assert!(urgency.is_finite());
    assert_eq!(strengths(&session)[0], 1.);
    assert_eq!(session.temperature_memberships().unwrap().get("hot"), Some(1.));
    assert_eq!(session.pressure_memberships().unwrap().get("low"), Some(1.));
    assert_eq!(session.diagnosis(), Diagnosis::Immediate);
}

#[test]
fn nothing_fired_defuzzifies_to_zero() {
    let registry = diagnosis::registry().unwrap();
    let temperature = registry.variables.key("temperature").unwrap();
    let pressure = registry.variables.key("pressure").unwrap();
    let action = registry.variables.key("action").unwrap();
    let mut rules = Rules::new();

    rules.add(
        Expr::is("temperature", "normal").and(Expr::is("pressure", "adequate")),
        Proposition::new("action", "routine"),
    );

    let rules = RuleBase::build(&registry.variables, rules).unwrap();
    let mut inputs = Inputs::new();

    // A cold engine is not normal at all
    inputs.set(temperature, 10.);
    inputs.set(pressure, 55.);

    let outputs = Mamdani::default().eval(&registry.variables, &rules, &inputs).unwrap();

    assert_eq!(outputs.max_firing_strength(), 0.);
    assert!(outputs.aggregated(action).unwrap().iter().all(|m| *m == 0.));
    assert_eq!(outputs.crisp(action), Some(0.));
}

#[test]
fn tuple_definitions_match_typed_ones() {
    let mut vars = Variables::new();

    vars.insert(
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
        .unwrap(),
    )
    .unwrap();
    vars.insert(
        LinguisticVariable::new(
            "pressure",
            0. ..=100.,
            [
                ("low", 0., 0., 10., 35.),
                ("adequate", 25., 45., 65., 85.),
                ("high", 75., 90., 100., 100.),
            ],
            None,
        )
        .unwrap(),
    )
    .unwrap();
    vars.insert(
        LinguisticVariable::new(
            "action",
            0. ..=100.,
            [
                ("routine", 0., 0., 20., 45.),
                ("caution", 35., 50., 65., 80.),
                ("immediate", 70., 85., 100., 100.),
            ],
            None,
        )
        .unwrap(),
    )
    .unwrap();

    let mut rules = Rules::new();

    rules.add(
        Expr::is("temperature", "hot").or(Expr::is("pressure", "low")),
        Proposition::new("action", "immediate"),
    );
    rules.add(
        Expr::is("temperature", "normal").and(Expr::is("pressure", "adequate")),
        Proposition::new("action", "routine"),
    );
    rules.add(
        Expr::is("temperature", "cold").or(Expr::is("pressure", "high")),
        Proposition::new("action", "caution"),
    );

    let rules = RuleBase::build(&vars, rules).unwrap();
    let mut inputs = Inputs::new();

    inputs.set(vars.key("temperature").unwrap(), 100.);
    inputs.set(vars.key("pressure").unwrap(), 30.);

    let outputs = Mamdani::default().eval(&vars, &rules, &inputs).unwrap();
    let mut session = DiagnosticSession::new().unwrap();

    session.set_inputs(100., 30.);

    let urgency = session.recompute().unwrap();

    assert_eq!(outputs.crisp(vars.key("action").unwrap()), Some(urgency));
}

#[test]
fn unknown_rule_reference_fails_construction() {
    let registry = diagnosis::registry().unwrap();
    let mut rules = Rules::new();

    rules.add(Expr::is("temperature", "scorching"), Proposition::new("action", "immediate"));

    assert!(matches!(
        RuleBase::build(&registry.variables, rules),
        Err(FuzzyError::InvalidRuleReference { rule: 0, what: "term", .. })
    ));
}

#[test]
fn alternative_operators() {
    let larsen = Mamdani::new(
        Default::default(),
        Default::default(),
        ImplicationOp::Prod,
        Default::default(),
        DefuzzificationOp::MeanOfMax,
    );
    let mut session = DiagnosticSession::with_engine(larsen).unwrap();

    session.set_inputs(120., 0.);

    // Immediate is flat from 85 to 100
    assert_eq!(session.recompute().unwrap(), 92.5);
}

#[test]
fn nan_reading_matches_no_term() {
    let mut session = DiagnosticSession::new().unwrap();

    // With temperature unknown only the pressure side of each rule can fire
    session.set_inputs(f64::NAN, 20.);

    let urgency = session.recompute().unwrap();

    assert!(session.temperature_memberships().unwrap().iter().all(|(_, d)| d == 0.));
    assert_eq!(strengths(&session), vec![0.6, 0., 0.]);
    assert!(urgency.is_finite());
}

#[test]
fn session_rejects_rules_from_another_registry() {
    let registry = diagnosis::registry().unwrap();
    let rules = RuleBase::build(&registry.variables, diagnosis::rules(&registry)).unwrap();
    let other = diagnosis::registry().unwrap();
    let mut inputs = Inputs::new();

    inputs.add(other.temperature, 80.);
    inputs.add(other.pressure, 55.);

    assert!(matches!(
        InferenceSession::new(other.variables, rules, Mamdani::default(), inputs),
        Err(FuzzyError::ForeignRegistry)
    ));
}
