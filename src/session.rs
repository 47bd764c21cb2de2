use crate::error::{FuzzyError, Result};
use crate::inference::Mamdani;
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::rules::RuleBase;
use crate::variable::{VariableKey, Variables};

/// Holds the current crisp inputs of a fuzzy system and the outputs they
/// last produced.
///
/// The registry and rule base are only ever read. Not meant for concurrent
/// use: callers that share a session serialize `set_input` + `recompute`.
pub struct InferenceSession {
    vars: Variables,
    rules: RuleBase,
    engine: Mamdani,
    inputs: Inputs,
    outputs: Outputs,
}

impl InferenceSession {
    /// Checks that `inputs` covers every antecedent variable and runs a first
    /// evaluation, so a built session always has outputs.
    pub fn new(vars: Variables, rules: RuleBase, engine: Mamdani, inputs: Inputs) -> Result<Self> {
        if let Some(&missing) = rules
            .antecedent_variables()
            .iter()
            .find(|key| inputs.get(**key).is_none())
        {
            return Err(FuzzyError::MissingInput {
                variable: vars[missing].name().to_owned(),
            });
        }

        let outputs = engine.eval(&vars, &rules, &inputs)?;

        Ok(Self {
            vars,
            rules,
            engine,
            inputs,
            outputs,
        })
    }

    /// Replaces one crisp input. Takes effect on the next [`recompute`](Self::recompute).
    pub fn set_input(&mut self, key: VariableKey, value: f64) {
        self.inputs.set(key, value);
    }

    /// Runs the whole pipeline on the current inputs and stores the result.
    ///
    /// Same inputs give bit-identical outputs; nothing carries over between calls.
    pub fn recompute(&mut self) -> Result<&Outputs> {
        self.outputs = self.engine.eval(&self.vars, &self.rules, &self.inputs)?;

        Ok(&self.outputs)
    }

    pub fn input(&self, key: VariableKey) -> Option<f64> {
        self.inputs.get(key)
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }
}
